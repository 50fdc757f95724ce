use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::cidr::validate_cidr;
use crate::secret::SecretRef;
use crate::validation::invalid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DbEngine {
    /// MySQL 5.6 compatible Aurora.
    #[default]
    Aurora,
    AuroraMysql,
    AuroraPostgresql,
}

impl DbEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbEngine::Aurora => "aurora",
            DbEngine::AuroraMysql => "aurora-mysql",
            DbEngine::AuroraPostgresql => "aurora-postgresql",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DbEngine::Aurora | DbEngine::AuroraMysql => 3306,
            DbEngine::AuroraPostgresql => 5432,
        }
    }

    /// Capacity units accepted by serverless mode for this engine.
    pub fn serverless_capacities(&self) -> &'static [u32] {
        match self {
            DbEngine::Aurora | DbEngine::AuroraMysql => {
                &[1, 2, 4, 8, 16, 32, 64, 128, 256]
            }
            DbEngine::AuroraPostgresql => &[2, 4, 8, 16, 32, 64, 192, 384],
        }
    }
}

/// Who may open connections to the database port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatabaseIngress {
    /// One rule per private subnet of the network, where the service runs.
    #[default]
    ApplicationTier,
    /// An explicit source range.
    Cidr { cidr: String },
    /// Any IPv4 address. Only honoured when spelled out in configuration.
    AnyIpv4,
}

impl DatabaseIngress {
    pub fn is_unrestricted(&self) -> bool {
        match self {
            DatabaseIngress::AnyIpv4 => true,
            DatabaseIngress::Cidr { cidr } => cidr.trim() == "0.0.0.0/0",
            DatabaseIngress::ApplicationTier => false,
        }
    }
}

fn validate_ingress(
    ingress: &DatabaseIngress,
) -> Result<(), validator::ValidationError> {
    match ingress {
        DatabaseIngress::Cidr { cidr } => validate_cidr(cidr),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_scaling_bounds"))]
pub struct ServerlessScaling {
    pub auto_pause: bool,
    pub min_capacity: u32,
    pub max_capacity: u32,
    #[validate(range(
        min = 300,
        max = 86400,
        message = "seconds_until_auto_pause must be between 300 and 86400"
    ))]
    pub seconds_until_auto_pause: u32,
}

impl Default for ServerlessScaling {
    fn default() -> Self {
        Self {
            auto_pause: true,
            min_capacity: 2,
            max_capacity: 8,
            seconds_until_auto_pause: 600,
        }
    }
}

fn validate_scaling_bounds(
    scaling: &ServerlessScaling,
) -> Result<(), validator::ValidationError> {
    if scaling.min_capacity > scaling.max_capacity {
        return Err(invalid(
            "capacity",
            format!(
                "min_capacity ({}) must not exceed max_capacity ({})",
                scaling.min_capacity, scaling.max_capacity
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_engine_capacity"))]
pub struct DatabaseSpec {
    #[validate(length(min = 1, message = "Database cluster name cannot be empty"))]
    pub name: String,
    pub engine: DbEngine,
    #[validate(length(min = 1, max = 64, message = "Database name must be 1-64 characters"))]
    pub database_name: String,
    #[validate(length(min = 1, max = 16, message = "Master username must be 1-16 characters"))]
    pub master_username: String,
    #[validate(nested)]
    pub master_password: SecretRef,
    /// Defaults to the engine's port when absent.
    pub port: Option<u16>,
    #[validate(custom(function = "validate_ingress"))]
    pub ingress: DatabaseIngress,
    #[validate(nested)]
    pub scaling: ServerlessScaling,
}

impl Default for DatabaseSpec {
    fn default() -> Self {
        Self {
            name: "myDBCluster".to_string(),
            engine: DbEngine::Aurora,
            database_name: "notes_app".to_string(),
            master_username: "dbaadmin".to_string(),
            master_password: SecretRef::default(),
            port: None,
            ingress: DatabaseIngress::ApplicationTier,
            scaling: ServerlessScaling::default(),
        }
    }
}

impl DatabaseSpec {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }
}

fn validate_engine_capacity(
    spec: &DatabaseSpec,
) -> Result<(), validator::ValidationError> {
    let allowed = spec.engine.serverless_capacities();
    for (field, value) in [
        ("min_capacity", spec.scaling.min_capacity),
        ("max_capacity", spec.scaling.max_capacity),
    ] {
        if !allowed.contains(&value) {
            return Err(invalid(
                "capacity",
                format!(
                    "{} {} is not a valid {} serverless capacity (allowed: {:?})",
                    field,
                    value,
                    spec.engine.as_str(),
                    allowed
                ),
            ));
        }
    }
    Ok(())
}
