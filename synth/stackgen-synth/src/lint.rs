use std::fmt;

use serde::Serialize;
use stackgen_models::{DEFAULT_SCALING_COOLDOWN_SECS, DeploymentSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A deployment choice worth a second look. Never blocks synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

impl Finding {
    fn new(severity: Severity, code: &'static str, message: String) -> Self {
        Self {
            severity,
            code,
            message,
        }
    }
}

pub fn lint(spec: &DeploymentSpec) -> Vec<Finding> {
    let mut findings = Vec::new();

    if spec.database.ingress.is_unrestricted() {
        findings.push(Finding::new(
            Severity::Warning,
            "open-database-ingress",
            format!(
                "database {} accepts connections on port {} from any IPv4 address",
                spec.database.name,
                spec.database.port()
            ),
        ));
    }

    let network = &spec.network;
    if network.nat_gateways == 1 && network.max_azs > 1 {
        findings.push(Finding::new(
            Severity::Info,
            "single-nat-egress",
            format!(
                "private subnets in {} zones share one NAT gateway; losing its zone cuts egress for all",
                network.max_azs
            ),
        ));
    }

    let scaling = &spec.service.autoscaling;
    for (direction, secs) in [
        ("scale-in", scaling.scale_in_cooldown_secs),
        ("scale-out", scaling.scale_out_cooldown_secs),
    ] {
        if secs < DEFAULT_SCALING_COOLDOWN_SECS {
            findings.push(Finding::new(
                Severity::Info,
                "short-cooldown",
                format!(
                    "{} cooldown of {}s is below the platform default of {}s",
                    direction, secs, DEFAULT_SCALING_COOLDOWN_SECS
                ),
            ));
        }
    }

    if !spec.cluster.container_insights {
        findings.push(Finding::new(
            Severity::Warning,
            "task-count-without-insights",
            format!(
                "cluster {} has container insights disabled; the dashboard task count stays empty",
                spec.cluster.name
            ),
        ));
    }

    findings
}
