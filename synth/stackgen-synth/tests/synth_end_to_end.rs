use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use stackgen_models::{
    DatabaseIngress, DeclaredParameter, DeploymentSpec, ImageSource, ParameterKind, SecretRef,
    TemplateFormat,
};
use stackgen_synth::template::{Reference, collect_references};
use stackgen_synth::{App, CloudAssembly, DeclaredParameters, SynthError, SynthOptions};

fn parameters() -> DeclaredParameters {
    DeclaredParameters::new([DeclaredParameter {
        name: "/mysqlpassword".to_string(),
        version: 1,
        kind: ParameterKind::SecureString,
    }])
}

fn asset_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let context = root.path().join("springgroot-jpa");
    fs::create_dir_all(context.join("src")).unwrap();
    fs::write(context.join("Dockerfile"), "FROM eclipse-temurin:17-jre\n").unwrap();
    fs::write(context.join("src/Main.java"), "class Main {}\n").unwrap();
    root
}

/// The default image directory is relative to the deployment config dir.
fn spec() -> DeploymentSpec {
    let mut spec = DeploymentSpec::default();
    spec.service.image = ImageSource::Asset {
        directory: "springgroot-jpa".into(),
        build_args: BTreeMap::new(),
    };
    spec
}

fn synth(spec: &DeploymentSpec, root: &Path) -> Result<CloudAssembly, SynthError> {
    let params = parameters();
    App::new(
        spec,
        &params,
        SynthOptions {
            asset_root: root.to_path_buf(),
        },
    )
    .synth()
}

fn exports(assembly: &CloudAssembly) -> BTreeMap<String, String> {
    assembly
        .stacks()
        .iter()
        .flat_map(|s| s.template.exports().into_iter().map(str::to_string).collect::<Vec<_>>())
        .map(|name| {
            let value = format!("resolved-{}", name);
            (name, value)
        })
        .collect()
}

#[test]
fn default_deployment_produces_three_linked_stacks() {
    let root = asset_root();
    let assembly = synth(&spec(), root.path()).unwrap();
    let names: Vec<&str> = assembly.stacks().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["springgroot-base-infra", "springgroot-db", "springgroot-fargate-svc"]
    );
    assert_eq!(
        assembly.stack("springgroot-db").unwrap().dependencies,
        vec!["springgroot-base-infra"]
    );
    assert_eq!(
        assembly.stack("springgroot-fargate-svc").unwrap().dependencies,
        vec!["springgroot-base-infra", "springgroot-db"]
    );
    assert_eq!(assembly.assets().len(), 1);

    let db = &assembly.stack("springgroot-db").unwrap().template;
    let scaling = &db.resource("MyDBCluster").unwrap().properties["ScalingConfiguration"];
    assert_eq!(scaling["MinCapacity"], 2);
    assert_eq!(scaling["MaxCapacity"], 8);

    let svc = &assembly.stack("springgroot-fargate-svc").unwrap().template;
    let service = svc.resource("SpringgrootsvcService").unwrap();
    assert_eq!(service.properties["DesiredCount"], 2);
    let body = svc.resource("Springgroot2Dashboard").unwrap().properties["DashboardBody"]["Fn::Sub"][0]
        .as_str()
        .unwrap()
        .to_string();
    let body: Value = serde_json::from_str(&body).unwrap();
    let ys: std::collections::BTreeSet<u64> = body["widgets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["y"].as_u64().unwrap())
        .collect();
    assert_eq!(ys.len(), 3);
}

#[test]
fn subnet_counts_follow_zone_count() {
    let root = asset_root();
    for zones in 1..=3u8 {
        let mut spec = spec();
        spec.network.max_azs = zones;
        let assembly = synth(&spec, root.path()).unwrap();
        let base = &assembly.stack("springgroot-base-infra").unwrap().template;
        let subnets: Vec<&str> = base
            .resources_of_type("AWS::EC2::Subnet")
            .map(|(id, _)| id.as_str())
            .collect();
        let public = subnets.iter().filter(|id| id.contains("Public")).count();
        let private = subnets.iter().filter(|id| id.contains("Private")).count();
        assert_eq!((public, private), (usize::from(zones), usize::from(zones)));
    }
}

#[test]
fn database_is_not_open_to_the_internet_by_default() {
    let root = asset_root();
    let assembly = synth(&spec(), root.path()).unwrap();
    let db = &assembly.stack("springgroot-db").unwrap().template;
    let rules = db.resource("Dbsg").unwrap().properties["SecurityGroupIngress"]
        .as_array()
        .unwrap()
        .clone();
    assert!(!rules.is_empty());
    assert!(rules.iter().all(|r| r["CidrIp"] != "0.0.0.0/0"));

    let mut open = spec();
    open.database.ingress = DatabaseIngress::AnyIpv4;
    let assembly = synth(&open, root.path()).unwrap();
    let db = &assembly.stack("springgroot-db").unwrap().template;
    assert_eq!(
        db.resource("Dbsg").unwrap().properties["SecurityGroupIngress"][0]["CidrIp"],
        "0.0.0.0/0"
    );
}

#[test]
fn connection_url_tracks_database_endpoint() {
    let root = asset_root();
    let assembly = synth(&spec(), root.path()).unwrap();
    let svc = &assembly.stack("springgroot-fargate-svc").unwrap().template;
    let env = &svc.resource("SpringgrootsvcTaskDef").unwrap().properties["ContainerDefinitions"][0]
        ["Environment"];
    let url_value = env
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["Name"] == "springdatasourceurl")
        .unwrap()["Value"]
        .clone();
    let url: stackgen_synth::Token = serde_json::from_value(url_value).unwrap();

    let mut exports = exports(&assembly);
    exports.insert(
        "springgroot-db:EndpointAddress".to_string(),
        "first.cluster.example".to_string(),
    );
    assert_eq!(
        url.resolve(&exports).unwrap(),
        "jdbc:mysql://first.cluster.example:3306/notes_app?autoReconnect=true&useUnicode=true&characterEncoding=UTF-8&allowMultiQueries=true"
    );
    exports.insert(
        "springgroot-db:EndpointAddress".to_string(),
        "second.cluster.example".to_string(),
    );
    assert!(url.resolve(&exports).unwrap().starts_with("jdbc:mysql://second.cluster.example:3306/"));
}

#[test]
fn every_reference_resolves() {
    let root = asset_root();
    let assembly = synth(&spec(), root.path()).unwrap();
    let exported = exports(&assembly);
    for stack in assembly.stacks() {
        let template = &stack.template;
        template.check_references(&stack.name).unwrap();
        for resource in template.resources.values() {
            let mut refs = Vec::new();
            collect_references(&resource.properties, &mut refs);
            for r in refs {
                match r {
                    Reference::Logical(id) => assert!(template.resources.contains_key(&id)),
                    Reference::Import(name) => assert!(exported.contains_key(&name)),
                }
            }
        }
    }
}

#[test]
fn missing_secret_fails_without_writing() {
    let root = asset_root();
    let out = root.path().join("cdk.out");
    let mut spec = spec();
    spec.database.master_password = SecretRef::new("/otherpassword", 1);
    let result = synth(&spec, root.path())
        .and_then(|assembly| assembly.write_to(&out, TemplateFormat::Json));
    assert!(matches!(result, Err(SynthError::UnresolvedParameter { .. })));
    assert!(!out.exists());
}

#[test]
fn missing_asset_fails_without_writing() {
    let root = asset_root();
    let out = root.path().join("cdk.out");
    let mut spec = spec();
    spec.service.image = ImageSource::Asset {
        directory: "no-such-dir".into(),
        build_args: BTreeMap::new(),
    };
    let result = synth(&spec, root.path())
        .and_then(|assembly| assembly.write_to(&out, TemplateFormat::Json));
    assert!(matches!(result, Err(SynthError::Asset { .. })));
    assert!(!out.exists());
}

#[test]
fn assembly_lands_on_disk() {
    let root = asset_root();
    let out = root.path().join("cdk.out");
    let assembly = synth(&spec(), root.path()).unwrap();
    assembly.write_to(&out, TemplateFormat::Json).unwrap();
    for name in ["springgroot-base-infra", "springgroot-db", "springgroot-fargate-svc"] {
        let text = fs::read_to_string(out.join(format!("{}.template.json", name))).unwrap();
        let template: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    }
    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["assets"][0]["repository"], "stackgen-container-assets");
}
