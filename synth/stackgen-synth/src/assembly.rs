use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stackgen_models::TemplateFormat;
use tracing::{debug, info, warn};

use crate::SynthError;
use crate::assets::{ASSET_REPOSITORY, ImageAsset};
use crate::template::Template;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
pub struct SynthesizedStack {
    pub name: String,
    pub template: Template,
    /// Stacks whose exports this one imports.
    pub dependencies: Vec<String>,
}

impl SynthesizedStack {
    pub fn template_file(&self, format: TemplateFormat) -> String {
        format!("{}.template.{}", self.name, format.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub template_file: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    pub id: String,
    pub path: String,
    pub repository: String,
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, String>,
}

/// Index of a cloud assembly directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: BTreeMap<String, Artifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetEntry>,
}

/// The synthesized stacks in deployment order, plus their assets.
#[derive(Debug, Clone)]
pub struct CloudAssembly {
    stacks: Vec<SynthesizedStack>,
    assets: Vec<ImageAsset>,
}

impl CloudAssembly {
    /// Link templates given in deployment order. Every import must name an
    /// export of an earlier stack; that stack becomes a dependency.
    pub fn link(
        templates: Vec<(String, Template)>,
        assets: Vec<ImageAsset>,
    ) -> Result<Self, SynthError> {
        let mut exporters: BTreeMap<String, String> = BTreeMap::new();
        let mut stacks = Vec::with_capacity(templates.len());
        for (name, template) in templates {
            let mut dependencies: Vec<String> = Vec::new();
            for import in template.imports() {
                let owner = exporters.get(&import).ok_or_else(|| SynthError::UnresolvedImport {
                    stack: name.clone(),
                    export: import.clone(),
                })?;
                if !dependencies.contains(owner) {
                    dependencies.push(owner.clone());
                }
            }
            for export in template.exports() {
                exporters.insert(export.to_string(), name.clone());
            }
            debug!(stack = %name, ?dependencies, "linked stack");
            stacks.push(SynthesizedStack {
                name,
                template,
                dependencies,
            });
        }
        Ok(Self { stacks, assets })
    }

    pub fn stacks(&self) -> &[SynthesizedStack] {
        &self.stacks
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    pub fn stack(&self, name: &str) -> Result<&SynthesizedStack, SynthError> {
        self.stacks
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SynthError::UnknownStack(name.to_string()))
    }

    pub fn render_template(
        &self,
        stack: &SynthesizedStack,
        format: TemplateFormat,
    ) -> Result<String, SynthError> {
        let body = match format {
            TemplateFormat::Json => serde_json::to_string_pretty(&stack.template)?,
            TemplateFormat::Yaml => serde_yaml::to_string(&stack.template)?,
        };
        Ok(body)
    }

    pub fn manifest(&self, format: TemplateFormat) -> Manifest {
        let artifacts = self
            .stacks
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    Artifact {
                        artifact_type: "aws:cloudformation:stack".to_string(),
                        template_file: s.template_file(format),
                        dependencies: s.dependencies.clone(),
                    },
                )
            })
            .collect();
        let assets = self
            .assets
            .iter()
            .map(|a| AssetEntry {
                id: a.id.clone(),
                path: a.directory.display().to_string(),
                repository: ASSET_REPOSITORY.to_string(),
                tag: a.id.clone(),
                build_args: a.build_args.clone(),
            })
            .collect();
        Manifest {
            version: MANIFEST_VERSION.to_string(),
            artifacts,
            assets,
        }
    }

    /// Replace `dir` with the assembly. Everything is rendered and staged
    /// next to `dir` first, so a failure leaves `dir` untouched.
    pub fn write_to(&self, dir: &Path, format: TemplateFormat) -> Result<(), SynthError> {
        let mut files = Vec::with_capacity(self.stacks.len() + 1);
        for stack in &self.stacks {
            files.push((stack.template_file(format), self.render_template(stack, format)?));
        }
        files.push((
            MANIFEST_FILE.to_string(),
            serde_json::to_string_pretty(&self.manifest(format))?,
        ));

        let parent = dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let staging = tempfile::Builder::new()
            .prefix(".stackgen-staging-")
            .tempdir_in(parent)?;
        for (name, body) in &files {
            fs::write(staging.path().join(name), body)?;
        }

        let staged = staging.keep();
        swap_dir_with(&staged, dir, |from, to| fs::rename(from, to))?;
        info!(dir = %dir.display(), files = files.len(), "wrote cloud assembly");
        Ok(())
    }
}

/// Move `staged` to `dir`. A previous `dir` is parked beside the staged
/// directory and only deleted once the new one is in place; on failure it
/// is moved back.
fn swap_dir_with<F>(staged: &Path, dir: &Path, rename: F) -> io::Result<()>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    let backup = dir.exists().then(|| {
        let mut name = staged.as_os_str().to_owned();
        name.push(".previous");
        PathBuf::from(name)
    });
    if let Some(backup) = &backup {
        if let Err(e) = rename(dir, backup) {
            let _ = fs::remove_dir_all(staged);
            return Err(e);
        }
    }
    if let Err(e) = rename(staged, dir) {
        if let Some(backup) = &backup {
            if let Err(restore) = rename(backup, dir) {
                warn!(path = %backup.display(), error = %restore, "previous assembly left in place");
            }
        }
        let _ = fs::remove_dir_all(staged);
        return Err(e);
    }
    if let Some(backup) = &backup {
        if let Err(e) = fs::remove_dir_all(backup) {
            warn!(path = %backup.display(), error = %e, "could not remove previous assembly");
        }
    }
    Ok(())
}
