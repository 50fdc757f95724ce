mod commands;
mod output;
mod source;
mod types;

use envconfig::Envconfig;

pub use output::{OutputArgs, print_output};
pub use source::SourceArgs;
pub use types::{OutputFormat, StackgenCli, StackgenCommands};

/// Process environment read once at startup.
#[derive(Envconfig, Clone, Debug)]
pub struct CliEnv {
    /// `EnvFilter` directives, e.g. `info` or `stackgen_synth=debug`.
    #[envconfig(from = "STACKGEN_LOG", default = "warn")]
    pub log: String,
    #[envconfig(from = "STACKGEN_LOG_JSON", default = "false")]
    pub log_json: bool,
}

impl Default for CliEnv {
    fn default() -> Self {
        Self {
            log: "warn".to_string(),
            log_json: false,
        }
    }
}

pub fn run(cli: StackgenCli) -> anyhow::Result<()> {
    match &cli.command {
        StackgenCommands::Synth {
            source,
            out,
            template_format,
            output,
        } => commands::handle_synth(source, out.as_deref(), *template_format, output),
        StackgenCommands::List { source, output } => commands::handle_list(source, output),
        StackgenCommands::Show {
            stack,
            source,
            template_format,
        } => commands::handle_show(source, stack, *template_format),
        StackgenCommands::Validate {
            source,
            strict,
            output,
        } => commands::handle_validate(source, *strict, output),
    }
}
