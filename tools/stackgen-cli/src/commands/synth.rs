use std::path::Path;

use serde_json::{Value, json};
use stackgen_models::TemplateFormat;
use tracing::info;

use crate::output::{OutputArgs, print_output};
use crate::source::SourceArgs;

pub fn handle_synth(
    source: &SourceArgs,
    out: Option<&Path>,
    template_format: Option<TemplateFormat>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let (config, assembly) = source.synth()?;
    let dir = out.unwrap_or(config.output.dir.as_path());
    let format = template_format.unwrap_or(config.output.format);
    assembly.write_to(dir, format)?;
    info!(dir = %dir.display(), %format, "synthesized");

    let stacks: Vec<Value> = assembly
        .stacks()
        .iter()
        .map(|s| {
            json!({
                "stack": s.name,
                "template": dir.join(s.template_file(format)).display().to_string(),
                "dependencies": s.dependencies,
            })
        })
        .collect();
    print_output(&Value::Array(stacks), &output.output)
}
