use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const REGISTRY_CONFIG: &str = r#"
deployment:
  app: springgroot
  service:
    image:
      kind: registry
      uri: public.ecr.aws/docker/library/nginx:1.27
parameters:
  - name: /mysqlpassword
    version: 1
    kind: secure_string
"#;

fn write_config(dir: &Path, default_yaml: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("default.yaml"), default_yaml).unwrap();
}

fn stackgen() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stackgen"));
    cmd.env_remove("STACKGEN_ENV")
        .env_remove("STACKGEN_CONFIG_DIR")
        .env("STACKGEN_LOG", "error");
    cmd
}

#[test]
fn list_prints_stacks_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(&config, REGISTRY_CONFIG);

    let output = stackgen()
        .arg("list")
        .arg("--config-dir")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stacks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = stacks
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["springgroot-base-infra", "springgroot-db", "springgroot-fargate-svc"]
    );
    assert_eq!(stacks[2]["dependencies"].as_array().unwrap().len(), 2);
}

#[test]
fn synth_writes_assembly() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(&config, REGISTRY_CONFIG);
    let out = tmp.path().join("cdk.out");

    stackgen()
        .arg("synth")
        .arg("--config-dir")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .arg("--template-format")
        .arg("yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains("springgroot-db.template.yaml"));

    assert!(out.join("manifest.json").is_file());
    let db = fs::read_to_string(out.join("springgroot-db.template.yaml")).unwrap();
    assert!(db.contains("AWS::RDS::DBCluster"));
    assert!(db.contains("{{resolve:ssm-secure:/mysqlpassword:1}}"));
}

#[test]
fn environment_overlay_is_applied() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(&config, REGISTRY_CONFIG);
    fs::write(
        config.join("staging.yaml"),
        "deployment:\n  app: notes\n",
    )
    .unwrap();

    stackgen()
        .arg("list")
        .arg("--config-dir")
        .arg(&config)
        .arg("--env")
        .arg("staging")
        .arg("-o")
        .arg("table")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes-fargate-svc"));
}

#[test]
fn malformed_log_settings_warn_and_fall_back() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("app.yaml");
    fs::write(&file, REGISTRY_CONFIG).unwrap();

    stackgen()
        .env("STACKGEN_LOG_JSON", "sometimes")
        .arg("list")
        .arg("-f")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("STACKGEN_LOG_JSON"))
        .stderr(predicate::str::contains("using default log settings"))
        .stdout(predicate::str::contains("springgroot-db"));
}

fn show_json(cmd: &mut Command, stack: &str, file: &Path) -> serde_json::Value {
    let output = cmd.arg("show").arg(stack).arg("-f").arg(file).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn count_of_type(template: &serde_json::Value, resource_type: &str) -> usize {
    template["Resources"]
        .as_object()
        .unwrap()
        .values()
        .filter(|r| r["Type"] == resource_type)
        .count()
}

#[test]
fn prefixed_env_vars_override_config() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("app.yaml");
    fs::write(&file, REGISTRY_CONFIG).unwrap();

    let base = show_json(&mut stackgen(), "springgroot-base-infra", &file);
    assert_eq!(count_of_type(&base, "AWS::EC2::Subnet"), 6);

    let base = show_json(
        stackgen().env("STACKGEN_DEPLOYMENT__NETWORK__MAX_AZS", "2"),
        "springgroot-base-infra",
        &file,
    );
    assert_eq!(count_of_type(&base, "AWS::EC2::Subnet"), 4);

    let svc = show_json(
        stackgen().env("STACKGEN_DEPLOYMENT__SERVICE__DESIRED_COUNT", "3"),
        "springgroot-fargate-svc",
        &file,
    );
    assert_eq!(
        svc["Resources"]["SpringgrootsvcService"]["Properties"]["DesiredCount"],
        3
    );
}

#[test]
fn environment_names_keep_their_case() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("app.yaml");
    let body = REGISTRY_CONFIG.replace(
        "      uri: public.ecr.aws/docker/library/nginx:1.27\n",
        "      uri: public.ecr.aws/docker/library/nginx:1.27\n    environment:\n      - name: SPRING_PROFILES_ACTIVE\n        value: prod\n",
    );
    fs::write(&file, body).unwrap();

    let svc = show_json(&mut stackgen(), "springgroot-fargate-svc", &file);
    let env = &svc["Resources"]["SpringgrootsvcTaskDef"]["Properties"]
        ["ContainerDefinitions"][0]["Environment"];
    assert!(
        env.as_array()
            .unwrap()
            .iter()
            .any(|e| e["Name"] == "SPRING_PROFILES_ACTIVE" && e["Value"] == "prod"),
        "{}",
        env
    );
}

#[test]
fn show_prints_one_template() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("app.yaml");
    fs::write(&file, REGISTRY_CONFIG).unwrap();

    stackgen()
        .arg("show")
        .arg("springgroot-fargate-svc")
        .arg("-f")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("AWS::ApplicationAutoScaling::ScalingPolicy"))
        .stdout(predicate::str::contains("AWS::CloudWatch::Dashboard"));

    stackgen()
        .arg("show")
        .arg("nope")
        .arg("-f")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown stack: nope"));
}

#[test]
fn missing_secret_fails_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(
        &config,
        "deployment:\n  service:\n    image:\n      kind: registry\n      uri: nginx:1.27\n",
    );
    let out = tmp.path().join("cdk.out");

    stackgen()
        .arg("synth")
        .arg("--config-dir")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/mysqlpassword"));
    assert!(!out.exists());
}

#[test]
fn missing_asset_fails_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(
        &config,
        "parameters:\n  - name: /mysqlpassword\n    version: 1\n",
    );
    let out = tmp.path().join("cdk.out");

    stackgen()
        .arg("synth")
        .arg("--config-dir")
        .arg(&config)
        .arg("--asset-root")
        .arg(tmp.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("springgroot-jpa"));
    assert!(!out.exists());
}

#[test]
fn validate_reports_findings_and_strict_fails_on_warnings() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(&config, REGISTRY_CONFIG);

    stackgen()
        .arg("validate")
        .arg("--config-dir")
        .arg(&config)
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("short-cooldown"));

    fs::write(
        config.join("development.yaml"),
        "deployment:\n  database:\n    ingress:\n      kind: any_ipv4\n",
    )
    .unwrap();
    stackgen()
        .arg("validate")
        .arg("--config-dir")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("open-database-ingress"));
    stackgen()
        .arg("validate")
        .arg("--config-dir")
        .arg(&config)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));
}

#[test]
fn invalid_deployment_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config");
    write_config(
        &config,
        "deployment:\n  network:\n    max_azs: 2\n    nat_gateways: 3\n",
    );

    stackgen()
        .arg("validate")
        .arg("--config-dir")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nat_gateways"));
}
