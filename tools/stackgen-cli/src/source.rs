use std::path::PathBuf;

use anyhow::Context;
use stackgen_config::{ConfigLoader, StackgenConfig, Validate};
use stackgen_synth::{App, CloudAssembly, DeclaredParameters, SynthOptions};
use tracing::debug;

/// Where the deployment configuration comes from.
#[derive(clap::Args, Clone, Debug)]
pub struct SourceArgs {
    /// Configuration directory [env: STACKGEN_CONFIG_DIR, default: config]
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// Environment overlay, loaded from `<config-dir>/<env>.yaml`
    /// [env: STACKGEN_ENV, default: development]
    #[arg(long)]
    pub env: Option<String>,
    /// Load a single file instead of the layered directory
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,
    /// Base for relative image asset directories [default: current directory]
    #[arg(long)]
    pub asset_root: Option<PathBuf>,
}

impl SourceArgs {
    /// Load and validate configuration.
    pub fn load(&self) -> anyhow::Result<StackgenConfig> {
        let config: StackgenConfig = match &self.file {
            Some(path) => ConfigLoader::load_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let defaults = ConfigLoader::from_env();
                let loader = ConfigLoader::new(
                    self.config_dir
                        .clone()
                        .unwrap_or_else(|| defaults.config_dir().to_path_buf()),
                    self.env
                        .clone()
                        .unwrap_or_else(|| defaults.environment().to_string()),
                );
                debug!(
                    dir = %loader.config_dir().display(),
                    env = loader.environment(),
                    "loading configuration"
                );
                loader.load().with_context(|| {
                    format!("loading configuration from {}", loader.config_dir().display())
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn asset_root(&self) -> PathBuf {
        self.asset_root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration and synthesize every stack in memory.
    pub fn synth(&self) -> anyhow::Result<(StackgenConfig, CloudAssembly)> {
        let config = self.load()?;
        let parameters = DeclaredParameters::new(config.parameters.iter().cloned());
        let assembly = App::new(
            &config.deployment,
            &parameters,
            SynthOptions {
                asset_root: self.asset_root(),
            },
        )
        .synth()?;
        Ok((config, assembly))
    }
}
