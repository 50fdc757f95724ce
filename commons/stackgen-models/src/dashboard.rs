use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::metric::validate_period;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct DashboardSpec {
    #[validate(length(min = 1, max = 255, message = "Dashboard name must be 1-255 characters"))]
    pub name: String,
    /// Markdown shown in the banner row.
    pub title: String,
    #[validate(custom(function = "validate_period"))]
    pub period_secs: u32,
}

impl Default for DashboardSpec {
    fn default() -> Self {
        Self {
            name: "springgroot2-dashboard".to_string(),
            title: "# Springboot on Fargate Dashboard".to_string(),
            period_secs: 60,
        }
    }
}
