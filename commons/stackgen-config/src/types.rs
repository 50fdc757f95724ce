use serde::{Deserialize, Serialize};
use stackgen_models::{DeclaredParameter, DeploymentSpec, TemplateFormat};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Cloud assembly directory.
    pub dir: PathBuf,
    pub format: TemplateFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cdk.out"),
            format: TemplateFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct StackgenConfig {
    pub deployment: DeploymentSpec,
    /// Entries known to exist in the parameter store. Secret references that
    /// are not listed here fail synthesis.
    pub parameters: Vec<DeclaredParameter>,
    pub output: OutputConfig,
}
