use serde_json::{Value, json};
use stackgen_models::{DatabaseIngress, DatabaseSpec, SecretRef, ValidationError};
use tracing::{debug, warn};
use validator::Validate;

use super::{NetworkOutputs, StackBuilder, StackDescriptor, Synthesized};
use crate::SynthError;
use crate::naming::logical_id;
use crate::parameters::ResolvedParameter;
use crate::template::{DeletionPolicy, Resource, Token};

/// What the database stack hands to the service stack.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseOutputs {
    pub endpoint_address: Token,
    pub endpoint_port: Token,
    pub port: u16,
    pub database_name: String,
    pub master_username: String,
    pub master_password: SecretRef,
}

/// Serverless database cluster in the private subnets of the network.
#[derive(Debug)]
pub struct DatabaseDescriptor<'a> {
    stack_name: String,
    spec: &'a DatabaseSpec,
    network: &'a NetworkOutputs,
    password: &'a ResolvedParameter,
}

impl<'a> DatabaseDescriptor<'a> {
    pub fn new(
        stack_name: &str,
        spec: &'a DatabaseSpec,
        network: &'a NetworkOutputs,
        password: &'a ResolvedParameter,
    ) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            spec,
            network,
            password,
        }
    }

    fn ingress_rules(&self) -> Vec<Value> {
        let port = self.spec.port();
        let rule = |cidr: String| {
            json!({
                "IpProtocol": "tcp",
                "FromPort": port,
                "ToPort": port,
                "CidrIp": cidr,
                "Description": "Allow inbound to db",
            })
        };
        match &self.spec.ingress {
            DatabaseIngress::ApplicationTier => self
                .network
                .private_subnets
                .iter()
                .map(|s| rule(s.cidr.to_string()))
                .collect(),
            DatabaseIngress::Cidr { cidr } => vec![rule(cidr.trim().to_string())],
            DatabaseIngress::AnyIpv4 => {
                warn!(
                    stack = %self.stack_name,
                    port,
                    "database port is open to any IPv4 address"
                );
                vec![rule("0.0.0.0/0".to_string())]
            }
        }
    }
}

impl StackDescriptor for DatabaseDescriptor<'_> {
    type Outputs = DatabaseOutputs;

    fn stack_name(&self) -> &str {
        &self.stack_name
    }

    fn synthesize(&self) -> Result<Synthesized<DatabaseOutputs>, SynthError> {
        self.spec.validate().map_err(ValidationError::from)?;
        let spec = self.spec;
        let mut stack = StackBuilder::new(
            &self.stack_name,
            format!("Serverless database cluster {}", spec.name),
        );

        let sg_id = "Dbsg";
        stack.add(
            sg_id,
            Resource::new(
                "AWS::EC2::SecurityGroup",
                json!({
                    "GroupDescription": "database security group",
                    "VpcId": self.network.vpc_id,
                    "SecurityGroupIngress": self.ingress_rules(),
                    "SecurityGroupEgress": [{
                        "IpProtocol": "-1",
                        "CidrIp": "0.0.0.0/0",
                        "Description": "Allow all outbound traffic by default",
                    }],
                }),
            ),
        )?;

        let subnet_group = stack.add(
            "Subnet",
            Resource::new(
                "AWS::RDS::DBSubnetGroup",
                json!({
                    "DBSubnetGroupDescription": "Database subnet group",
                    "SubnetIds": self.network.private_subnet_ids(),
                }),
            ),
        )?;

        let mut scaling = json!({
            "AutoPause": spec.scaling.auto_pause,
            "MinCapacity": spec.scaling.min_capacity,
            "MaxCapacity": spec.scaling.max_capacity,
        });
        if spec.scaling.auto_pause {
            scaling["SecondsUntilAutoPause"] = json!(spec.scaling.seconds_until_auto_pause);
        }

        let cluster_id = logical_id(&[&spec.name]);
        stack.add(
            &cluster_id,
            Resource::new(
                "AWS::RDS::DBCluster",
                json!({
                    "Engine": spec.engine.as_str(),
                    "EngineMode": "serverless",
                    "DatabaseName": spec.database_name,
                    "MasterUsername": spec.master_username,
                    "MasterUserPassword": self.password.dynamic_reference(),
                    "DBSubnetGroupName": subnet_group,
                    "VpcSecurityGroupIds": [Token::get_att(sg_id, "GroupId")],
                    "Port": spec.port(),
                    "ScalingConfiguration": scaling,
                }),
            )
            .retain_with(DeletionPolicy::Snapshot),
        )?;

        let endpoint_address = stack.export(
            "EndpointAddress",
            Token::get_att(&cluster_id, "Endpoint.Address"),
            "Database cluster endpoint address",
        )?;
        let endpoint_port = stack.export(
            "EndpointPort",
            Token::get_att(&cluster_id, "Endpoint.Port"),
            "Database cluster endpoint port",
        )?;

        debug!(
            stack = %self.stack_name,
            engine = spec.engine.as_str(),
            min_capacity = spec.scaling.min_capacity,
            max_capacity = spec.scaling.max_capacity,
            "database stack synthesized"
        );
        Ok(Synthesized {
            template: stack.finish()?,
            outputs: DatabaseOutputs {
                endpoint_address,
                endpoint_port,
                port: spec.port(),
                database_name: spec.database_name.clone(),
                master_username: spec.master_username.clone(),
                master_password: self.password.secret.clone(),
            },
        })
    }
}
