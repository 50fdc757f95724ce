use serde_json::{Value, json};

use crate::output::{OutputArgs, print_output};
use crate::source::SourceArgs;

pub fn handle_list(source: &SourceArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let (_, assembly) = source.synth()?;
    let stacks: Vec<Value> = assembly
        .stacks()
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "resources": s.template.resources.len(),
                "exports": s.template.exports().len(),
                "dependencies": s.dependencies,
            })
        })
        .collect();
    print_output(&Value::Array(stacks), &output.output)
}
