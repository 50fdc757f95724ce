use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::invalid;

/// Pointer to an entry in the external secret parameter store.
///
/// Only the name and version travel through descriptors; the value is
/// resolved by the provisioning engine or the container runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SecretRef {
    #[validate(custom(function = "validate_parameter_name"))]
    pub parameter_name: String,
    #[validate(range(min = 1, message = "Parameter version starts at 1"))]
    pub version: u32,
}

impl SecretRef {
    pub fn new(parameter_name: impl Into<String>, version: u32) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            version,
        }
    }

    /// Dynamic reference resolved by the provisioning engine at deploy time.
    pub fn dynamic_reference(&self) -> String {
        format!(
            "{{{{resolve:ssm-secure:{}:{}}}}}",
            self.parameter_name, self.version
        )
    }

    /// Resource part of the parameter ARN (`parameter/<name>`).
    pub fn arn_resource(&self) -> String {
        format!(
            "parameter/{}",
            self.parameter_name.trim_start_matches('/')
        )
    }
}

impl Default for SecretRef {
    fn default() -> Self {
        Self::new("/mysqlpassword", 1)
    }
}

fn validate_parameter_name(
    name: &str,
) -> Result<(), validator::ValidationError> {
    if name.is_empty() || name == "/" {
        return Err(invalid("parameter_name", "Parameter name cannot be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid(
            "parameter_name",
            format!("Parameter name '{}' contains whitespace", name),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    #[serde(rename = "string")]
    Plain,
    StringList,
    #[default]
    SecureString,
}

/// An entry known to exist in the parameter store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct DeclaredParameter {
    #[validate(custom(function = "validate_parameter_name"))]
    pub name: String,
    /// Latest published version.
    #[validate(range(min = 1, message = "Parameter version starts at 1"))]
    pub version: u32,
    #[serde(default)]
    pub kind: ParameterKind,
}
