use std::collections::BTreeSet;

use crate::loader::ConfigError;
use crate::types::*;

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for OutputConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Output directory cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for StackgenConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.deployment
            .check()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let mut seen = BTreeSet::new();
        for param in &self.parameters {
            validator::Validate::validate(param).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "parameter {}: {}",
                    param.name, e
                ))
            })?;
            if !seen.insert(param.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate parameter declaration: {}",
                    param.name
                )));
            }
        }

        self.output.validate()?;

        Ok(())
    }
}
