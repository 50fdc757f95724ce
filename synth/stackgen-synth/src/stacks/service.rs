use std::collections::BTreeMap;

use serde_json::{Value, json};
use stackgen_models::{DashboardSpec, ServiceSpec, ValidationError};
use tracing::debug;
use validator::Validate;

use super::{
    CLUSTER_NAME_VAR, DatabaseOutputs, LOAD_BALANCER_VAR, NetworkOutputs, SERVICE_NAME_VAR,
    StackBuilder, StackDescriptor, Synthesized, TARGET_GROUP_VAR, service_dashboard,
};
use crate::SynthError;
use crate::assets::{ImageAsset, ResolvedImage};
use crate::naming::logical_id;
use crate::parameters::ResolvedParameter;
use crate::template::{DeletionPolicy, Resource, Token};

const AUTOSCALING_ROLE: &str = "arn:${AWS::Partition}:iam::${AWS::AccountId}:role/aws-service-role/ecs.application-autoscaling.amazonaws.com/AWSServiceRoleForApplicationAutoScaling_ECSService";
const SSM_DEFAULT_KEY: &str = "arn:${AWS::Partition}:kms:${AWS::Region}:${AWS::AccountId}:alias/aws/ssm";

/// Outputs of the service stack. Nothing downstream consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOutputs {
    pub load_balancer_dns: Token,
    pub service_url: Token,
    pub connection_url: Token,
}

/// Everything the service stack needs that is resolved outside of it.
#[derive(Debug)]
pub struct ServiceInputs<'a> {
    pub network: &'a NetworkOutputs,
    pub database: &'a DatabaseOutputs,
    pub image: &'a ResolvedImage,
    pub password: &'a ResolvedParameter,
    /// Extra container secrets, keyed by variable name.
    pub secrets: &'a BTreeMap<String, ResolvedParameter>,
}

/// Load balanced container service with autoscaling and a dashboard.
#[derive(Debug)]
pub struct ServiceDescriptor<'a> {
    stack_name: String,
    app: &'a str,
    spec: &'a ServiceSpec,
    dashboard: &'a DashboardSpec,
    inputs: ServiceInputs<'a>,
}

fn assume_role(principal: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": principal },
        }],
    })
}

fn allow(actions: &[&str], resource: Value) -> Value {
    let action = if actions.len() == 1 {
        json!(actions[0])
    } else {
        json!(actions)
    };
    json!({ "Effect": "Allow", "Action": action, "Resource": resource })
}

fn name_value(name: &str, value: impl serde::Serialize) -> Value {
    json!({ "Name": name, "Value": value })
}

impl<'a> ServiceDescriptor<'a> {
    pub fn new(
        stack_name: &str,
        app: &'a str,
        spec: &'a ServiceSpec,
        dashboard: &'a DashboardSpec,
        inputs: ServiceInputs<'a>,
    ) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            app,
            spec,
            dashboard,
            inputs,
        }
    }

    /// `<scheme>://<endpoint>:<port>/<db>?<params>` around the imported endpoint.
    pub fn connection_url(&self) -> Token {
        let db = self.inputs.database;
        let binding = &self.spec.database;
        Token::join(
            "",
            [
                Token::literal(format!("{}://", binding.scheme)),
                db.endpoint_address.clone(),
                Token::literal(format!(
                    ":{}/{}{}",
                    db.port,
                    db.database_name,
                    binding.query_string()
                )),
            ],
        )
    }

    fn environment(&self) -> Vec<Value> {
        let binding = &self.spec.database;
        let mut env: BTreeMap<&str, Token> = self
            .spec
            .environment
            .iter()
            .map(|(k, v)| (k.as_str(), Token::literal(v.clone())))
            .collect();
        env.insert(&binding.url_env, self.connection_url());
        env.insert(
            &binding.username_env,
            Token::literal(self.inputs.database.master_username.clone()),
        );
        env.iter().map(|(k, v)| name_value(k, v)).collect()
    }

    fn secret_parameters(&self) -> BTreeMap<&str, &ResolvedParameter> {
        let mut secrets: BTreeMap<&str, &ResolvedParameter> = self
            .inputs
            .secrets
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        secrets.insert(&self.spec.database.password_env, self.inputs.password);
        secrets
    }

    fn execution_policy(&self, log_group: Option<&str>) -> Vec<Value> {
        let mut statements = Vec::new();
        if self.inputs.image.asset().is_some() {
            statements.push(allow(
                &[
                    "ecr:BatchCheckLayerAvailability",
                    "ecr:GetDownloadUrlForLayer",
                    "ecr:BatchGetImage",
                ],
                json!(ImageAsset::repository_arn()),
            ));
            statements.push(allow(&["ecr:GetAuthorizationToken"], json!("*")));
        }
        if let Some(log_group) = log_group {
            statements.push(allow(
                &["logs:CreateLogStream", "logs:PutLogEvents"],
                json!(Token::get_att(log_group, "Arn")),
            ));
        }
        statements.push(allow(&["kms:Decrypt"], json!(Token::sub(SSM_DEFAULT_KEY))));
        let mut arns: Vec<Value> = Vec::new();
        for parameter in self.secret_parameters().values() {
            let arn = json!(parameter.arn());
            if !arns.contains(&arn) {
                arns.push(arn);
            }
        }
        statements.push(allow(&["ssm:GetParameters"], Value::Array(arns)));
        statements
    }
}

impl StackDescriptor for ServiceDescriptor<'_> {
    type Outputs = ServiceOutputs;

    fn stack_name(&self) -> &str {
        &self.stack_name
    }

    fn synthesize(&self) -> Result<Synthesized<ServiceOutputs>, SynthError> {
        self.spec.validate().map_err(ValidationError::from)?;
        let spec = self.spec;
        let network = self.inputs.network;
        let prefix = logical_id(&[&spec.name]);
        let id = |suffix: &str| format!("{}{}", prefix, suffix);
        let mut stack = StackBuilder::new(
            &self.stack_name,
            format!("Load balanced service {}", spec.name),
        );

        let log_group_id = id("TaskDefWebLogGroup");
        if spec.enable_logging {
            let mut props = json!({});
            if let Some(days) = spec.log_retention_days {
                props["RetentionInDays"] = json!(days);
            }
            stack.add(
                &log_group_id,
                Resource::new("AWS::Logs::LogGroup", props).retain_with(DeletionPolicy::Retain),
            )?;
        }
        let log_group = spec.enable_logging.then_some(log_group_id.as_str());

        let execution_role_id = id("TaskDefExecutionRole");
        let execution_role = stack.add(
            &execution_role_id,
            Resource::new(
                "AWS::IAM::Role",
                json!({ "AssumeRolePolicyDocument": assume_role("ecs-tasks.amazonaws.com") }),
            ),
        )?;
        let execution_policy_id = id("TaskDefExecutionRoleDefaultPolicy");
        stack.add(
            &execution_policy_id,
            Resource::new(
                "AWS::IAM::Policy",
                json!({
                    "PolicyName": execution_policy_id,
                    "Roles": [execution_role],
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": self.execution_policy(log_group),
                    },
                }),
            ),
        )?;
        let task_role_id = id("TaskDefTaskRole");
        stack.add(
            &task_role_id,
            Resource::new(
                "AWS::IAM::Role",
                json!({ "AssumeRolePolicyDocument": assume_role("ecs-tasks.amazonaws.com") }),
            ),
        )?;

        let secrets: Vec<Value> = self
            .secret_parameters()
            .iter()
            .map(|(name, p)| json!({ "Name": name, "ValueFrom": p.arn() }))
            .collect();
        let mut container = json!({
            "Name": spec.container_name,
            "Image": self.inputs.image.image(),
            "Essential": true,
            "PortMappings": [{ "ContainerPort": spec.container_port, "Protocol": "tcp" }],
            "Environment": self.environment(),
            "Secrets": secrets,
        });
        if let Some(log_group) = log_group {
            container["LogConfiguration"] = json!({
                "LogDriver": "awslogs",
                "Options": {
                    "awslogs-group": Token::reference(log_group),
                    "awslogs-stream-prefix": spec.name,
                    "awslogs-region": Token::reference(crate::template::AWS_REGION),
                },
            });
        }
        let task_def_id = id("TaskDef");
        let task_def = stack.add(
            &task_def_id,
            Resource::new(
                "AWS::ECS::TaskDefinition",
                json!({
                    "Family": logical_id(&[&self.stack_name, &spec.name, "TaskDef"]),
                    "RequiresCompatibilities": ["FARGATE"],
                    "NetworkMode": "awsvpc",
                    "Cpu": spec.cpu.to_string(),
                    "Memory": spec.memory_mib.to_string(),
                    "ExecutionRoleArn": Token::get_att(&execution_role_id, "Arn"),
                    "TaskRoleArn": Token::get_att(&task_role_id, "Arn"),
                    "ContainerDefinitions": [container],
                }),
            ),
        )?;

        let listener_source = if spec.public_load_balancer {
            "0.0.0.0/0".to_string()
        } else {
            network.vpc_cidr.to_string()
        };
        let lb_sg_id = id("LBSecurityGroup");
        stack.add(
            &lb_sg_id,
            Resource::new(
                "AWS::EC2::SecurityGroup",
                json!({
                    "GroupDescription": format!("Load balancer for {}", spec.name),
                    "VpcId": network.vpc_id,
                    "SecurityGroupIngress": [{
                        "IpProtocol": "tcp",
                        "FromPort": spec.listener_port,
                        "ToPort": spec.listener_port,
                        "CidrIp": listener_source,
                        "Description": format!("Allow listener port {}", spec.listener_port),
                    }],
                }),
            ),
        )?;
        let svc_sg_id = id("ServiceSecurityGroup");
        stack.add(
            &svc_sg_id,
            Resource::new(
                "AWS::EC2::SecurityGroup",
                json!({
                    "GroupDescription": format!("Tasks of {}", spec.name),
                    "VpcId": network.vpc_id,
                    "SecurityGroupEgress": [{
                        "IpProtocol": "-1",
                        "CidrIp": "0.0.0.0/0",
                        "Description": "Allow all outbound traffic by default",
                    }],
                }),
            ),
        )?;
        stack.add(
            &id("LBSecurityGroupToServiceEgress"),
            Resource::new(
                "AWS::EC2::SecurityGroupEgress",
                json!({
                    "GroupId": Token::get_att(&lb_sg_id, "GroupId"),
                    "IpProtocol": "tcp",
                    "FromPort": spec.container_port,
                    "ToPort": spec.container_port,
                    "DestinationSecurityGroupId": Token::get_att(&svc_sg_id, "GroupId"),
                    "Description": "Load balancer to target",
                }),
            ),
        )?;
        stack.add(
            &id("ServiceSecurityGroupFromLB"),
            Resource::new(
                "AWS::EC2::SecurityGroupIngress",
                json!({
                    "GroupId": Token::get_att(&svc_sg_id, "GroupId"),
                    "IpProtocol": "tcp",
                    "FromPort": spec.container_port,
                    "ToPort": spec.container_port,
                    "SourceSecurityGroupId": Token::get_att(&lb_sg_id, "GroupId"),
                    "Description": "Load balancer to target",
                }),
            ),
        )?;

        let (scheme, lb_subnets) = if spec.public_load_balancer {
            ("internet-facing", network.public_subnet_ids())
        } else {
            ("internal", network.private_subnet_ids())
        };
        let lb_id = id("LB");
        let lb = stack.add(
            &lb_id,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::LoadBalancer",
                json!({
                    "Type": "application",
                    "Scheme": scheme,
                    "Subnets": lb_subnets,
                    "SecurityGroups": [Token::get_att(&lb_sg_id, "GroupId")],
                    "LoadBalancerAttributes": [{ "Key": "deletion_protection.enabled", "Value": "false" }],
                }),
            ),
        )?;

        let hc = &spec.health_check;
        let tg_id = id("LBPublicListenerECSGroup");
        let target_group = stack.add(
            &tg_id,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::TargetGroup",
                json!({
                    "Port": spec.container_port,
                    "Protocol": "HTTP",
                    "TargetType": "ip",
                    "VpcId": network.vpc_id,
                    "HealthCheckProtocol": "HTTP",
                    "HealthCheckPort": hc.port_value(),
                    "HealthCheckPath": hc.path,
                    "HealthCheckIntervalSeconds": hc.interval_secs,
                    "HealthCheckTimeoutSeconds": hc.timeout_secs,
                    "HealthyThresholdCount": hc.healthy_threshold,
                    "UnhealthyThresholdCount": hc.unhealthy_threshold,
                    "Matcher": { "HttpCode": hc.healthy_http_codes },
                }),
            ),
        )?;
        let listener_id = id("LBPublicListener");
        stack.add(
            &listener_id,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::Listener",
                json!({
                    "LoadBalancerArn": lb,
                    "Port": spec.listener_port,
                    "Protocol": "HTTP",
                    "DefaultActions": [{ "Type": "forward", "TargetGroupArn": target_group }],
                }),
            ),
        )?;

        let service_id = id("Service");
        stack.add(
            &service_id,
            Resource::new(
                "AWS::ECS::Service",
                json!({
                    "Cluster": network.cluster_name,
                    "LaunchType": "FARGATE",
                    "DesiredCount": spec.desired_count,
                    "TaskDefinition": task_def,
                    "HealthCheckGracePeriodSeconds": 60,
                    "DeploymentConfiguration": { "MaximumPercent": 200, "MinimumHealthyPercent": 50 },
                    "LoadBalancers": [{
                        "ContainerName": spec.container_name,
                        "ContainerPort": spec.container_port,
                        "TargetGroupArn": target_group,
                    }],
                    "NetworkConfiguration": {
                        "AwsvpcConfiguration": {
                            "AssignPublicIp": "DISABLED",
                            "SecurityGroups": [Token::get_att(&svc_sg_id, "GroupId")],
                            "Subnets": network.private_subnet_ids(),
                        },
                    },
                }),
            )
            .depends_on(&listener_id)
            .depends_on(&execution_policy_id),
        )?;

        let scaling = &spec.autoscaling;
        let target_id = id("TaskCountTarget");
        let scalable_target = stack.add(
            &target_id,
            Resource::new(
                "AWS::ApplicationAutoScaling::ScalableTarget",
                json!({
                    "MinCapacity": scaling.min_capacity,
                    "MaxCapacity": scaling.max_capacity,
                    "ResourceId": Token::join(
                        "",
                        [
                            Token::literal("service/"),
                            network.cluster_name.clone(),
                            Token::literal("/"),
                            Token::get_att(&service_id, "Name"),
                        ],
                    ),
                    "RoleARN": Token::sub(AUTOSCALING_ROLE),
                    "ScalableDimension": "ecs:service:DesiredCount",
                    "ServiceNamespace": "ecs",
                }),
            ),
        )?;
        let mut metric = json!({
            "Namespace": scaling.metric.namespace,
            "MetricName": scaling.metric.metric_name,
            "Statistic": scaling.metric.statistic.to_string(),
        });
        if !scaling.metric.dimensions.is_empty() {
            let dimensions: Vec<Value> = scaling
                .metric
                .dimensions
                .iter()
                .map(|(k, v)| name_value(k, v))
                .collect();
            metric["Dimensions"] = Value::Array(dimensions);
        }
        stack.add(
            &logical_id(&[&target_id, &scaling.policy_name]),
            Resource::new(
                "AWS::ApplicationAutoScaling::ScalingPolicy",
                json!({
                    "PolicyName": scaling.policy_name,
                    "PolicyType": "TargetTrackingScaling",
                    "ScalingTargetId": scalable_target,
                    "TargetTrackingScalingPolicyConfiguration": {
                        "CustomizedMetricSpecification": metric,
                        "TargetValue": scaling.target_value,
                        "ScaleInCooldown": scaling.scale_in_cooldown_secs,
                        "ScaleOutCooldown": scaling.scale_out_cooldown_secs,
                    },
                }),
            ),
        )?;

        let dashboard = service_dashboard(self.app, self.dashboard, &scaling.metric);
        let vars = BTreeMap::from([
            (SERVICE_NAME_VAR.to_string(), Token::get_att(&service_id, "Name")),
            (CLUSTER_NAME_VAR.to_string(), network.cluster_name.clone()),
            (TARGET_GROUP_VAR.to_string(), Token::get_att(&tg_id, "TargetGroupFullName")),
            (LOAD_BALANCER_VAR.to_string(), Token::get_att(&lb_id, "LoadBalancerFullName")),
        ]);
        stack.add(
            &logical_id(&[&self.dashboard.name]),
            Resource::new(
                "AWS::CloudWatch::Dashboard",
                json!({
                    "DashboardName": self.dashboard.name,
                    "DashboardBody": Token::sub_with(dashboard.body(), vars),
                }),
            ),
        )?;

        let dns = Token::get_att(&lb_id, "DNSName");
        let url = Token::join("", [Token::literal("http://"), dns.clone()]);
        stack.output("LoadBalancerDNS", dns.clone(), "Load balancer DNS name")?;
        stack.output("ServiceURL", url.clone(), "Service URL")?;

        debug!(
            stack = %self.stack_name,
            asset = self.inputs.image.asset().is_some(),
            desired = spec.desired_count,
            "service stack synthesized"
        );
        Ok(Synthesized {
            template: stack.finish()?,
            outputs: ServiceOutputs {
                load_balancer_dns: dns,
                service_url: url,
                connection_url: self.connection_url(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stacks::{DatabaseDescriptor, NetworkDescriptor};
    use stackgen_models::{ClusterSpec, DatabaseSpec, NetworkSpec, ParameterKind, SecretRef};

    struct Fixture {
        network: NetworkOutputs,
        database: DatabaseOutputs,
        password: ResolvedParameter,
        image: ResolvedImage,
        secrets: BTreeMap<String, ResolvedParameter>,
    }

    fn fixture() -> Fixture {
        let network = NetworkDescriptor::new(
            "app-base-infra",
            &NetworkSpec::default(),
            &ClusterSpec::default(),
        )
        .synthesize()
        .unwrap()
        .outputs;
        let password = ResolvedParameter {
            secret: SecretRef::default(),
            kind: ParameterKind::SecureString,
        };
        let database = DatabaseDescriptor::new("app-db", &DatabaseSpec::default(), &network, &password)
            .synthesize()
            .unwrap()
            .outputs;
        Fixture {
            network,
            database,
            password,
            image: ResolvedImage::Registry("nginx:1.27".to_string()),
            secrets: BTreeMap::new(),
        }
    }

    fn synth(f: &Fixture, spec: &ServiceSpec) -> Synthesized<ServiceOutputs> {
        let dashboard = DashboardSpec::default();
        ServiceDescriptor::new(
            "app-fargate-svc",
            "springgroot",
            spec,
            &dashboard,
            ServiceInputs {
                network: &f.network,
                database: &f.database,
                image: &f.image,
                password: &f.password,
                secrets: &f.secrets,
            },
        )
        .synthesize()
        .unwrap()
    }

    fn container(out: &Synthesized<ServiceOutputs>) -> Value {
        out.template.resource("SpringgrootsvcTaskDef").unwrap().properties
            ["ContainerDefinitions"][0]
            .clone()
    }

    #[test]
    fn environment_is_sorted_and_carries_connection_url() {
        let f = fixture();
        let mut spec = ServiceSpec::default();
        spec.environment.insert("APP_MODE".to_string(), "prod".to_string());
        let out = synth(&f, &spec);
        let env = container(&out)["Environment"].clone();
        let names: Vec<&str> = env
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["Name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["APP_MODE", "springdatasourceurl", "springdatasourceusername"]);
        assert_eq!(
            env[1]["Value"],
            json!({"Fn::Join": ["", [
                "jdbc:mysql://",
                {"Fn::ImportValue": "app-db:EndpointAddress"},
                ":3306/notes_app?autoReconnect=true&useUnicode=true&characterEncoding=UTF-8&allowMultiQueries=true"
            ]]})
        );
        assert_eq!(env[2]["Value"], "dbaadmin");
    }

    #[test]
    fn password_is_a_secret_not_an_environment_value() {
        let f = fixture();
        let out = synth(&f, &ServiceSpec::default());
        let container = container(&out);
        assert_eq!(container["Secrets"][0]["Name"], "mysqlpassword");
        assert_eq!(
            container["Secrets"][0]["ValueFrom"]["Fn::Sub"],
            "arn:${AWS::Partition}:ssm:${AWS::Region}:${AWS::AccountId}:parameter/mysqlpassword"
        );
        let rendered = serde_json::to_string(&container["Environment"]).unwrap();
        assert!(!rendered.contains("mysqlpassword"));
    }

    #[test]
    fn execution_policy_is_retrieve_only() {
        let f = fixture();
        let out = synth(&f, &ServiceSpec::default());
        let policy = out
            .template
            .resource("SpringgrootsvcTaskDefExecutionRoleDefaultPolicy")
            .unwrap();
        let statements = policy.properties["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap();
        let actions: Vec<String> = statements.iter().map(|s| s["Action"].to_string()).collect();
        assert!(actions.iter().any(|a| a.contains("kms:Decrypt")));
        assert!(actions.iter().any(|a| a == "\"ssm:GetParameters\""));
        assert!(!actions.iter().any(|a| a.contains("ssm:*") || a.contains("PutParameter")));
        // registry image needs no pull grant
        assert!(!actions.iter().any(|a| a.contains("ecr:")));
    }

    #[test]
    fn health_check_and_scaling_policy() {
        let f = fixture();
        let out = synth(&f, &ServiceSpec::default());
        let tg = out
            .template
            .resource("SpringgrootsvcLBPublicListenerECSGroup")
            .unwrap();
        assert_eq!(tg.properties["HealthCheckPort"], "traffic-port");
        assert_eq!(tg.properties["HealthCheckIntervalSeconds"], 5);
        assert_eq!(tg.properties["HealthCheckTimeoutSeconds"], 4);
        assert_eq!(tg.properties["Matcher"]["HttpCode"], "200,301,302");

        let target = out.template.resource("SpringgrootsvcTaskCountTarget").unwrap();
        assert_eq!(target.properties["MinCapacity"], 2);
        assert_eq!(target.properties["MaxCapacity"], 20);

        let policy = out
            .template
            .resource("SpringgrootsvcTaskCountTargetKeepIt150")
            .unwrap();
        let config = &policy.properties["TargetTrackingScalingPolicyConfiguration"];
        assert_eq!(config["TargetValue"], 150.0);
        assert_eq!(config["ScaleInCooldown"], 60);
        assert_eq!(config["ScaleOutCooldown"], 60);
        assert_eq!(
            config["CustomizedMetricSpecification"]["MetricName"],
            "CDKTestingCustomMetric"
        );
        assert_eq!(config["CustomizedMetricSpecification"]["Statistic"], "Average");
    }

    #[test]
    fn service_runs_in_private_subnets_behind_public_balancer() {
        let f = fixture();
        let out = synth(&f, &ServiceSpec::default());
        let service = out.template.resource("SpringgrootsvcService").unwrap();
        assert_eq!(service.properties["DesiredCount"], 2);
        assert_eq!(
            service.properties["NetworkConfiguration"]["AwsvpcConfiguration"]["Subnets"][0],
            json!({"Fn::ImportValue": "app-base-infra:PrivateSubnet1"})
        );
        assert!(service.depends_on.contains(&"SpringgrootsvcLBPublicListener".to_string()));
        let lb = out.template.resource("SpringgrootsvcLB").unwrap();
        assert_eq!(lb.properties["Scheme"], "internet-facing");
        assert!(out.template.outputs.contains_key("ServiceURL"));
    }

    #[test]
    fn endpoint_change_flows_into_connection_url() {
        let f = fixture();
        let out = synth(&f, &ServiceSpec::default());
        let mut exports = BTreeMap::from([(
            "app-db:EndpointAddress".to_string(),
            "db-a.cluster.local".to_string(),
        )]);
        let url = &out.outputs.connection_url;
        assert!(url.resolve(&exports).unwrap().starts_with("jdbc:mysql://db-a.cluster.local:3306/notes_app?"));
        exports.insert("app-db:EndpointAddress".to_string(), "db-b.cluster.local".to_string());
        assert!(url.resolve(&exports).unwrap().contains("db-b.cluster.local"));
    }
}
