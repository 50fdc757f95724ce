use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::metric::{MetricSpec, Statistic};
use crate::secret::SecretRef;
use crate::validation::invalid;

/// Where the container image comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// A local build context, hashed and published as an image asset.
    Asset {
        directory: PathBuf,
        #[serde(
            default,
            with = "crate::entries",
            skip_serializing_if = "BTreeMap::is_empty"
        )]
        build_args: BTreeMap<String, String>,
    },
    /// A pre-built image already in a registry.
    Registry { uri: String },
}

impl Default for ImageSource {
    fn default() -> Self {
        ImageSource::Asset {
            directory: PathBuf::from("../springgroot-jpa"),
            build_args: BTreeMap::new(),
        }
    }
}

fn validate_image(image: &ImageSource) -> Result<(), validator::ValidationError> {
    match image {
        ImageSource::Asset { directory, .. } if directory.as_os_str().is_empty() => {
            Err(invalid("image", "Image asset directory cannot be empty"))
        }
        ImageSource::Registry { uri } if uri.trim().is_empty() => {
            Err(invalid("image", "Image URI cannot be empty"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// How the service learns about the database.
///
/// The URL is assembled from the database endpoint at synthesis time; the
/// password is injected as a container secret from the database's master
/// password parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct DatabaseBinding {
    #[validate(length(min = 1, message = "URL variable name cannot be empty"))]
    pub url_env: String,
    #[validate(length(min = 1, message = "Username variable name cannot be empty"))]
    pub username_env: String,
    #[validate(length(min = 1, message = "Password variable name cannot be empty"))]
    pub password_env: String,
    #[validate(length(min = 1, message = "Connection scheme cannot be empty"))]
    pub scheme: String,
    pub query: Vec<QueryParam>,
}

impl Default for DatabaseBinding {
    fn default() -> Self {
        Self {
            url_env: "springdatasourceurl".to_string(),
            username_env: "springdatasourceusername".to_string(),
            password_env: "mysqlpassword".to_string(),
            scheme: "jdbc:mysql".to_string(),
            query: vec![
                QueryParam::new("autoReconnect", "true"),
                QueryParam::new("useUnicode", "true"),
                QueryParam::new("characterEncoding", "UTF-8"),
                QueryParam::new("allowMultiQueries", "true"),
            ],
        }
    }
}

impl DatabaseBinding {
    /// `?k=v&k=v`, or empty when there are no parameters.
    pub fn query_string(&self) -> String {
        if self.query.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .query
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_health_timing"))]
pub struct HealthCheckSpec {
    /// `None` probes the port traffic is sent to.
    pub port: Option<u16>,
    #[validate(length(min = 1, message = "Health check path cannot be empty"))]
    pub path: String,
    #[validate(range(min = 5, max = 300))]
    pub interval_secs: u32,
    #[validate(range(min = 2, max = 120))]
    pub timeout_secs: u32,
    #[validate(range(min = 2, max = 10))]
    pub healthy_threshold: u32,
    #[validate(range(min = 2, max = 10))]
    pub unhealthy_threshold: u32,
    #[validate(length(min = 1, message = "Healthy HTTP codes cannot be empty"))]
    pub healthy_http_codes: String,
}

impl Default for HealthCheckSpec {
    fn default() -> Self {
        Self {
            port: None,
            path: "/".to_string(),
            interval_secs: 5,
            timeout_secs: 4,
            healthy_threshold: 2,
            unhealthy_threshold: 2,
            healthy_http_codes: "200,301,302".to_string(),
        }
    }
}

impl HealthCheckSpec {
    pub fn port_value(&self) -> String {
        self.port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "traffic-port".to_string())
    }
}

fn validate_health_timing(
    hc: &HealthCheckSpec,
) -> Result<(), validator::ValidationError> {
    if hc.timeout_secs >= hc.interval_secs {
        return Err(invalid(
            "health_check",
            format!(
                "Health check timeout ({}s) must be shorter than the interval ({}s)",
                hc.timeout_secs, hc.interval_secs
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_autoscaling"))]
pub struct AutoscalingSpec {
    #[validate(range(min = 1, message = "Minimum replicas must be at least 1"))]
    pub min_capacity: u32,
    pub max_capacity: u32,
    #[validate(length(min = 1, message = "Policy name cannot be empty"))]
    pub policy_name: String,
    #[validate(nested)]
    pub metric: MetricSpec,
    pub target_value: f64,
    pub scale_in_cooldown_secs: u32,
    pub scale_out_cooldown_secs: u32,
}

/// Cooldown the platform applies when none is given.
pub const DEFAULT_SCALING_COOLDOWN_SECS: u32 = 300;

impl Default for AutoscalingSpec {
    fn default() -> Self {
        Self {
            min_capacity: 2,
            max_capacity: 20,
            policy_name: "KeepIt150".to_string(),
            metric: MetricSpec::new(
                "CDK/Testing",
                "CDKTestingCustomMetric",
                Statistic::Average,
                60,
            ),
            target_value: 150.0,
            scale_in_cooldown_secs: 60,
            scale_out_cooldown_secs: 60,
        }
    }
}

fn validate_autoscaling(
    spec: &AutoscalingSpec,
) -> Result<(), validator::ValidationError> {
    if spec.min_capacity > spec.max_capacity {
        return Err(invalid(
            "autoscaling",
            format!(
                "Autoscaling min ({}) must not exceed max ({})",
                spec.min_capacity, spec.max_capacity
            ),
        ));
    }
    if spec.metric.statistic.is_percentile() {
        return Err(invalid(
            "autoscaling",
            "Target tracking does not accept percentile statistics",
        ));
    }
    if !(spec.target_value.is_finite() && spec.target_value > 0.0) {
        return Err(invalid(
            "autoscaling",
            "Target value must be a positive number",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_service"))]
pub struct ServiceSpec {
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Container name cannot be empty"))]
    pub container_name: String,
    #[validate(custom(function = "validate_image"))]
    pub image: ImageSource,
    #[validate(range(min = 1, message = "Container port cannot be 0"))]
    pub container_port: u16,
    pub desired_count: u32,
    /// CPU units (1024 = one vCPU).
    pub cpu: u32,
    pub memory_mib: u32,
    #[serde(with = "crate::entries")]
    pub environment: BTreeMap<String, String>,
    #[validate(nested)]
    pub database: DatabaseBinding,
    /// Additional container secrets keyed by variable name.
    #[serde(with = "crate::entries")]
    pub secrets: BTreeMap<String, SecretRef>,
    pub enable_logging: bool,
    pub log_retention_days: Option<u32>,
    #[validate(range(min = 1, message = "Listener port cannot be 0"))]
    pub listener_port: u16,
    pub public_load_balancer: bool,
    #[validate(nested)]
    pub health_check: HealthCheckSpec,
    #[validate(nested)]
    pub autoscaling: AutoscalingSpec,
}

impl Default for ServiceSpec {
    fn default() -> Self {
        Self {
            name: "springgrootsvc".to_string(),
            container_name: "web".to_string(),
            image: ImageSource::default(),
            container_port: 8080,
            desired_count: 2,
            cpu: 512,
            memory_mib: 1024,
            environment: BTreeMap::new(),
            database: DatabaseBinding::default(),
            secrets: BTreeMap::new(),
            enable_logging: true,
            log_retention_days: None,
            listener_port: 80,
            public_load_balancer: true,
            health_check: HealthCheckSpec::default(),
            autoscaling: AutoscalingSpec::default(),
        }
    }
}

/// Memory sizes (MiB) Fargate accepts for a CPU size.
pub fn fargate_memory_options(cpu: u32) -> Option<Vec<u32>> {
    let opts = match cpu {
        256 => vec![512, 1024, 2048],
        512 => (1..=4).map(|g| g * 1024).collect(),
        1024 => (2..=8).map(|g| g * 1024).collect(),
        2048 => (4..=16).map(|g| g * 1024).collect(),
        4096 => (8..=30).map(|g| g * 1024).collect(),
        _ => return None,
    };
    Some(opts)
}

fn validate_service(spec: &ServiceSpec) -> Result<(), validator::ValidationError> {
    match fargate_memory_options(spec.cpu) {
        None => {
            return Err(invalid(
                "cpu",
                format!("{} is not a Fargate CPU size", spec.cpu),
            ));
        }
        Some(opts) if !opts.contains(&spec.memory_mib) => {
            return Err(invalid(
                "memory",
                format!(
                    "{} MiB is not valid with {} CPU units",
                    spec.memory_mib, spec.cpu
                ),
            ));
        }
        Some(_) => {}
    }

    let scaling = &spec.autoscaling;
    if spec.desired_count < scaling.min_capacity
        || spec.desired_count > scaling.max_capacity
    {
        return Err(invalid(
            "desired_count",
            format!(
                "desired_count ({}) must lie within autoscaling bounds [{}, {}]",
                spec.desired_count, scaling.min_capacity, scaling.max_capacity
            ),
        ));
    }

    let reserved = [
        &spec.database.url_env,
        &spec.database.username_env,
        &spec.database.password_env,
    ];
    for name in spec.environment.keys().chain(spec.secrets.keys()) {
        if reserved.contains(&name) {
            return Err(invalid(
                "environment",
                format!("{} is set by the database binding", name),
            ));
        }
    }
    if let Some(name) = spec.environment.keys().find(|k| spec.secrets.contains_key(*k)) {
        return Err(invalid(
            "environment",
            format!("{} is declared both as environment and secret", name),
        ));
    }
    for secret in spec.secrets.values() {
        secret.validate().map_err(|e| invalid("secrets", e.to_string()))?;
    }
    Ok(())
}
