use std::collections::BTreeMap;
use std::path::PathBuf;

use stackgen_models::{DeploymentSpec, ImageSource};
use tracing::{debug, info, info_span};

use crate::SynthError;
use crate::assembly::CloudAssembly;
use crate::assets::{ImageAsset, ResolvedImage};
use crate::parameters::{ParameterStore, ResolvedParameter, resolve_secure};
use crate::stacks::{
    DatabaseDescriptor, NetworkDescriptor, ServiceDescriptor, ServiceInputs, StackDescriptor,
};

#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Base for relative image asset directories.
    pub asset_root: PathBuf,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
        }
    }
}

/// Compiles one deployment into its network, database and service stacks.
pub struct App<'a> {
    spec: &'a DeploymentSpec,
    parameters: &'a dyn ParameterStore,
    options: SynthOptions,
}

impl<'a> App<'a> {
    pub fn new(
        spec: &'a DeploymentSpec,
        parameters: &'a dyn ParameterStore,
        options: SynthOptions,
    ) -> Self {
        Self {
            spec,
            parameters,
            options,
        }
    }

    /// Resolve external references, then build the stacks in dependency
    /// order. Nothing is written here, so a failure has no side effects.
    pub fn synth(&self) -> Result<CloudAssembly, SynthError> {
        let spec = self.spec;
        let span = info_span!("synth", app = %spec.app);
        let _guard = span.enter();

        spec.check()?;
        let password = resolve_secure(self.parameters, &spec.database.master_password)?;
        let mut secrets: BTreeMap<String, ResolvedParameter> = BTreeMap::new();
        for (name, secret) in &spec.service.secrets {
            secrets.insert(name.clone(), resolve_secure(self.parameters, secret)?);
        }
        let image = self.resolve_image()?;

        let base_name = spec.base_stack_name();
        let network = NetworkDescriptor::new(&base_name, &spec.network, &spec.cluster)
            .synthesize()?;

        let db_name = spec.database_stack_name();
        let database =
            DatabaseDescriptor::new(&db_name, &spec.database, &network.outputs, &password)
                .synthesize()?;

        let svc_name = spec.service_stack_name();
        let service = ServiceDescriptor::new(
            &svc_name,
            &spec.app,
            &spec.service,
            &spec.dashboard,
            ServiceInputs {
                network: &network.outputs,
                database: &database.outputs,
                image: &image,
                password: &password,
                secrets: &secrets,
            },
        )
        .synthesize()?;

        let assembly = CloudAssembly::link(
            vec![
                (base_name, network.template),
                (db_name, database.template),
                (svc_name, service.template),
            ],
            image.asset().cloned().into_iter().collect(),
        )?;
        info!(
            stacks = assembly.stacks().len(),
            assets = assembly.assets().len(),
            "synthesis complete"
        );
        Ok(assembly)
    }

    fn resolve_image(&self) -> Result<ResolvedImage, SynthError> {
        match &self.spec.service.image {
            ImageSource::Asset {
                directory,
                build_args,
            } => {
                let directory = if directory.is_absolute() {
                    directory.clone()
                } else {
                    self.options.asset_root.join(directory)
                };
                debug!(directory = %directory.display(), "resolving image asset");
                Ok(ResolvedImage::Asset(ImageAsset::resolve(
                    &directory, build_args,
                )?))
            }
            ImageSource::Registry { uri } => Ok(ResolvedImage::Registry(uri.clone())),
        }
    }
}
