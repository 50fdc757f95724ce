use serde_json::json;
use stackgen_models::{ClusterSpec, Ipv4Cidr, NetworkSpec, ValidationError};
use tracing::debug;
use validator::Validate;

use super::{StackBuilder, StackDescriptor, Synthesized};
use crate::SynthError;
use crate::naming::logical_id;
use crate::template::{Resource, Token};

/// One subnet as seen by downstream stacks.
#[derive(Debug, Clone, PartialEq)]
pub struct SubnetOutput {
    pub subnet_id: Token,
    pub cidr: Ipv4Cidr,
    pub zone_index: usize,
}

/// What the network stack hands to the database and service stacks.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOutputs {
    pub vpc_id: Token,
    pub vpc_cidr: Ipv4Cidr,
    pub public_subnets: Vec<SubnetOutput>,
    pub private_subnets: Vec<SubnetOutput>,
    pub cluster_name: Token,
    pub cluster_arn: Token,
}

impl NetworkOutputs {
    pub fn public_subnet_ids(&self) -> Vec<Token> {
        self.public_subnets.iter().map(|s| s.subnet_id.clone()).collect()
    }

    pub fn private_subnet_ids(&self) -> Vec<Token> {
        self.private_subnets.iter().map(|s| s.subnet_id.clone()).collect()
    }
}

/// Virtual network spread over `max_azs` zones plus the container cluster.
#[derive(Debug)]
pub struct NetworkDescriptor<'a> {
    stack_name: String,
    network: &'a NetworkSpec,
    cluster: &'a ClusterSpec,
}

impl<'a> NetworkDescriptor<'a> {
    pub fn new(stack_name: &str, network: &'a NetworkSpec, cluster: &'a ClusterSpec) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            network,
            cluster,
        }
    }

    /// Public blocks first, then private, each `2 * max_azs`-th of the range.
    pub fn subnet_plan(&self) -> Result<(Vec<Ipv4Cidr>, Vec<Ipv4Cidr>), SynthError> {
        let vpc: Ipv4Cidr = self.network.cidr.parse()?;
        let zones = usize::from(self.network.max_azs);
        let mut blocks = vpc.split(zones * 2)?;
        let private = blocks.split_off(zones);
        Ok((blocks, private))
    }
}

fn name_tag(name: &str) -> serde_json::Value {
    json!([{ "Key": "Name", "Value": name }])
}

impl StackDescriptor for NetworkDescriptor<'_> {
    type Outputs = NetworkOutputs;

    fn stack_name(&self) -> &str {
        &self.stack_name
    }

    fn synthesize(&self) -> Result<Synthesized<NetworkOutputs>, SynthError> {
        self.network.validate().map_err(ValidationError::from)?;
        let vpc_cidr: Ipv4Cidr = self.network.cidr.parse()?;
        let (public_blocks, private_blocks) = self.subnet_plan()?;
        let nat_count = usize::from(self.network.nat_gateways);
        let mut stack = StackBuilder::new(
            &self.stack_name,
            format!("Network and cluster for {}", self.network.name),
        );

        let vpc_id = logical_id(&[&self.network.name]);
        let tag_prefix = format!("{}/{}", self.stack_name, self.network.name);
        let vpc = stack.add(
            &vpc_id,
            Resource::new(
                "AWS::EC2::VPC",
                json!({
                    "CidrBlock": vpc_cidr.to_string(),
                    "EnableDnsHostnames": true,
                    "EnableDnsSupport": true,
                    "InstanceTenancy": "default",
                    "Tags": name_tag(&tag_prefix),
                }),
            ),
        )?;

        let igw_id = format!("{}IGW", vpc_id);
        let igw = stack.add(
            &igw_id,
            Resource::new(
                "AWS::EC2::InternetGateway",
                json!({ "Tags": name_tag(&tag_prefix) }),
            ),
        )?;
        let attach_id = format!("{}VPCGW", vpc_id);
        stack.add(
            &attach_id,
            Resource::new(
                "AWS::EC2::VPCGatewayAttachment",
                json!({ "VpcId": vpc, "InternetGatewayId": igw }),
            ),
        )?;

        let mut public_subnets = Vec::new();
        let mut nat_gateways = Vec::new();
        for (index, block) in public_blocks.iter().enumerate() {
            let subnet_id = format!("{}PublicSubnet{}", vpc_id, index + 1);
            let subnet = stack.add(
                &subnet_id,
                Resource::new(
                    "AWS::EC2::Subnet",
                    json!({
                        "VpcId": vpc,
                        "CidrBlock": block.to_string(),
                        "AvailabilityZone": Token::select(index, Token::azs()),
                        "MapPublicIpOnLaunch": true,
                        "Tags": name_tag(&format!("{}/PublicSubnet{}", tag_prefix, index + 1)),
                    }),
                ),
            )?;
            let table = stack.add(
                &format!("{}RouteTable", subnet_id),
                Resource::new("AWS::EC2::RouteTable", json!({ "VpcId": vpc })),
            )?;
            stack.add(
                &format!("{}RouteTableAssociation", subnet_id),
                Resource::new(
                    "AWS::EC2::SubnetRouteTableAssociation",
                    json!({ "RouteTableId": table, "SubnetId": subnet }),
                ),
            )?;
            stack.add(
                &format!("{}DefaultRoute", subnet_id),
                Resource::new(
                    "AWS::EC2::Route",
                    json!({
                        "RouteTableId": table,
                        "DestinationCidrBlock": "0.0.0.0/0",
                        "GatewayId": igw,
                    }),
                )
                .depends_on(&attach_id),
            )?;

            if index < nat_count {
                let eip_id = format!("{}EIP", subnet_id);
                stack.add(
                    &eip_id,
                    Resource::new("AWS::EC2::EIP", json!({ "Domain": "vpc" })),
                )?;
                let nat = stack.add(
                    &format!("{}NATGateway", subnet_id),
                    Resource::new(
                        "AWS::EC2::NatGateway",
                        json!({
                            "AllocationId": Token::get_att(&eip_id, "AllocationId"),
                            "SubnetId": subnet,
                        }),
                    ),
                )?;
                nat_gateways.push(nat);
            }

            let exported = stack.export(
                &format!("PublicSubnet{}", index + 1),
                subnet,
                &format!("Public subnet in zone {}", index + 1),
            )?;
            public_subnets.push(SubnetOutput {
                subnet_id: exported,
                cidr: *block,
                zone_index: index,
            });
        }

        let mut private_subnets = Vec::new();
        for (index, block) in private_blocks.iter().enumerate() {
            let subnet_id = format!("{}PrivateSubnet{}", vpc_id, index + 1);
            let subnet = stack.add(
                &subnet_id,
                Resource::new(
                    "AWS::EC2::Subnet",
                    json!({
                        "VpcId": vpc,
                        "CidrBlock": block.to_string(),
                        "AvailabilityZone": Token::select(index, Token::azs()),
                        "MapPublicIpOnLaunch": false,
                        "Tags": name_tag(&format!("{}/PrivateSubnet{}", tag_prefix, index + 1)),
                    }),
                ),
            )?;
            let table = stack.add(
                &format!("{}RouteTable", subnet_id),
                Resource::new("AWS::EC2::RouteTable", json!({ "VpcId": vpc })),
            )?;
            stack.add(
                &format!("{}RouteTableAssociation", subnet_id),
                Resource::new(
                    "AWS::EC2::SubnetRouteTableAssociation",
                    json!({ "RouteTableId": table, "SubnetId": subnet }),
                ),
            )?;
            let nat = &nat_gateways[index % nat_gateways.len()];
            stack.add(
                &format!("{}DefaultRoute", subnet_id),
                Resource::new(
                    "AWS::EC2::Route",
                    json!({
                        "RouteTableId": table,
                        "DestinationCidrBlock": "0.0.0.0/0",
                        "NatGatewayId": nat,
                    }),
                ),
            )?;
            let exported = stack.export(
                &format!("PrivateSubnet{}", index + 1),
                subnet,
                &format!("Private subnet in zone {}", index + 1),
            )?;
            private_subnets.push(SubnetOutput {
                subnet_id: exported,
                cidr: *block,
                zone_index: index,
            });
        }

        let cluster_id = logical_id(&[&self.cluster.name]);
        let insights = if self.cluster.container_insights {
            "enabled"
        } else {
            "disabled"
        };
        let cluster = stack.add(
            &cluster_id,
            Resource::new(
                "AWS::ECS::Cluster",
                json!({
                    "ClusterSettings": [{ "Name": "containerInsights", "Value": insights }],
                }),
            ),
        )?;

        let vpc_import = stack.export("VpcId", vpc, "VPC id")?;
        stack.export(
            "VpcCidr",
            Token::get_att(&vpc_id, "CidrBlock"),
            "VPC address range",
        )?;
        let cluster_name = stack.export("ClusterName", cluster, "ECS cluster name")?;
        let cluster_arn = stack.export(
            "ClusterArn",
            Token::get_att(&cluster_id, "Arn"),
            "ECS cluster ARN",
        )?;

        debug!(
            stack = %self.stack_name,
            zones = self.network.max_azs,
            nat_gateways = nat_count,
            "network stack synthesized"
        );
        Ok(Synthesized {
            template: stack.finish()?,
            outputs: NetworkOutputs {
                vpc_id: vpc_import,
                vpc_cidr,
                public_subnets,
                private_subnets,
                cluster_name,
                cluster_arn,
            },
        })
    }
}
