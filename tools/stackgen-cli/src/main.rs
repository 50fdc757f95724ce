use std::process;

use clap::Parser;
use envconfig::Envconfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stackgen_cli::{CliEnv, StackgenCli};

fn main() {
    let env = load_env();
    init_log(&env);
    let cli = StackgenCli::parse();
    if let Err(e) = stackgen_cli::run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_env() -> CliEnv {
    CliEnv::init_from_env().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using default log settings", e);
        CliEnv::default()
    })
}

fn init_log(env: &CliEnv) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(&env.log);
    let registry = tracing_subscriber::registry().with(filter);
    // stdout carries command output
    if env.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
