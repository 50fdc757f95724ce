use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::cidr::{Ipv4Cidr, MAX_SUBNET_PREFIX, MIN_VPC_PREFIX, validate_cidr};
use crate::validation::invalid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_network"))]
pub struct NetworkSpec {
    #[validate(length(min = 1, message = "Network name cannot be empty"))]
    pub name: String,
    #[validate(custom(function = "validate_cidr"))]
    pub cidr: String,
    /// Number of availability zones to spread subnets across.
    #[validate(range(min = 1, max = 3, message = "max_azs must be between 1 and 3"))]
    pub max_azs: u8,
    #[validate(range(min = 1, message = "At least one NAT gateway is required for private subnets"))]
    pub nat_gateways: u8,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            name: "vpc-springgroot".to_string(),
            cidr: "10.0.0.0/16".to_string(),
            max_azs: 3,
            nat_gateways: 1,
        }
    }
}

fn validate_network(
    spec: &NetworkSpec,
) -> Result<(), validator::ValidationError> {
    // malformed blocks are reported by the field validator
    if let Ok(block) = spec.cidr.parse::<Ipv4Cidr>() {
        if !(MIN_VPC_PREFIX..=MAX_SUBNET_PREFIX).contains(&block.prefix()) {
            return Err(invalid(
                "cidr",
                format!(
                    "VPC block {} must have a prefix between /{} and /{}",
                    block, MIN_VPC_PREFIX, MAX_SUBNET_PREFIX
                ),
            ));
        }
    }
    // NAT gateways live in public subnets, one per zone at most.
    if spec.nat_gateways > spec.max_azs {
        return Err(invalid(
            "nat_gateways",
            format!(
                "nat_gateways ({}) cannot exceed max_azs ({})",
                spec.nat_gateways, spec.max_azs
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct ClusterSpec {
    #[validate(length(min = 1, message = "Cluster name cannot be empty"))]
    pub name: String,
    /// Enables the ContainerInsights metrics namespace, which carries the
    /// running task count shown on the dashboard.
    pub container_insights: bool,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self {
            name: "springgroot-cluster".to_string(),
            container_insights: true,
        }
    }
}
