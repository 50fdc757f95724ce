use stackgen_models::TemplateFormat;

use crate::source::SourceArgs;

pub fn handle_show(
    source: &SourceArgs,
    stack: &str,
    template_format: TemplateFormat,
) -> anyhow::Result<()> {
    let (_, assembly) = source.synth()?;
    let stack = assembly.stack(stack)?;
    let body = assembly.render_template(stack, template_format)?;
    println!("{}", body.trim_end());
    Ok(())
}
