use std::path::PathBuf;

use stackgen_models::TemplateFormat;

use crate::output::OutputArgs;
use crate::source::SourceArgs;

#[derive(clap::Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct StackgenCli {
    #[command(subcommand)]
    pub command: StackgenCommands,
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum StackgenCommands {
    /// Synthesize every stack into a cloud assembly directory
    #[clap(aliases = &["s"])]
    Synth {
        #[clap(flatten)]
        source: SourceArgs,
        /// Assembly directory, overriding `output.dir`
        #[arg(long)]
        out: Option<PathBuf>,
        /// Template serialization (json or yaml), overriding `output.format`
        #[arg(long)]
        template_format: Option<TemplateFormat>,
        #[clap(flatten)]
        output: OutputArgs,
    },
    /// List stacks in deployment order
    #[clap(aliases = &["ls"])]
    List {
        #[clap(flatten)]
        source: SourceArgs,
        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Print the template of one stack
    Show {
        /// Stack name, e.g. `springgroot-db`
        stack: String,
        #[clap(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "json")]
        template_format: TemplateFormat,
    },
    /// Check configuration and report findings
    Validate {
        #[clap(flatten)]
        source: SourceArgs,
        /// Fail when any finding is a warning
        #[arg(long)]
        strict: bool,
        #[clap(flatten)]
        output: OutputArgs,
    },
}

/// Available output formats
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}
