use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ValidationError;
use crate::dashboard::DashboardSpec;
use crate::database::DatabaseSpec;
use crate::network::{ClusterSpec, NetworkSpec};
use crate::service::ServiceSpec;
use crate::validation::invalid;

/// Everything needed to synthesize the three stacks of one application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct DeploymentSpec {
    #[validate(custom(function = "validate_app_name"))]
    pub app: String,
    #[validate(nested)]
    pub network: NetworkSpec,
    #[validate(nested)]
    pub cluster: ClusterSpec,
    #[validate(nested)]
    pub database: DatabaseSpec,
    #[validate(nested)]
    pub service: ServiceSpec,
    #[validate(nested)]
    pub dashboard: DashboardSpec,
}

impl Default for DeploymentSpec {
    fn default() -> Self {
        Self {
            app: "springgroot".to_string(),
            network: NetworkSpec::default(),
            cluster: ClusterSpec::default(),
            database: DatabaseSpec::default(),
            service: ServiceSpec::default(),
            dashboard: DashboardSpec::default(),
        }
    }
}

impl DeploymentSpec {
    pub fn base_stack_name(&self) -> String {
        format!("{}-base-infra", self.app)
    }

    pub fn database_stack_name(&self) -> String {
        format!("{}-db", self.app)
    }

    pub fn service_stack_name(&self) -> String {
        format!("{}-fargate-svc", self.app)
    }

    /// Run every field and cross-field check.
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate()?;
        Ok(())
    }
}

/// Stack names allow letters, digits and hyphens, starting with a letter.
fn validate_app_name(app: &str) -> Result<(), validator::ValidationError> {
    let mut chars = app.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_alpha || !app.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(
            "app",
            format!(
                "App name '{}' must start with a letter and contain only letters, digits and hyphens",
                app
            ),
        ));
    }
    if app.len() > 100 {
        return Err(invalid("app", "App name cannot exceed 100 characters"));
    }
    Ok(())
}
