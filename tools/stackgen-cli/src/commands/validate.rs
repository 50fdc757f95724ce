use stackgen_synth::{Severity, lint};
use tracing::warn;

use crate::output::{OutputArgs, print_output};
use crate::source::SourceArgs;

pub fn handle_validate(
    source: &SourceArgs,
    strict: bool,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let config = source.load()?;
    let findings = lint(&config.deployment);
    for finding in findings.iter().filter(|f| f.severity == Severity::Warning) {
        warn!(code = finding.code, "{}", finding.message);
    }
    print_output(&serde_json::to_value(&findings)?, &output.output)?;

    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .count();
    if strict && warnings > 0 {
        anyhow::bail!("{} warning(s) found in strict mode", warnings);
    }
    Ok(())
}

