//! Output of runs and target listings.
//!
//! Per-target verdicts are already emitted as tracing events by the resolver;
//! this module only renders what goes to stdout.

use std::io::{self, Write};

use serde::Serialize;
use uptime::RunSummary;

use crate::database::TargetRecord;

/// Write any serializable value as pretty JSON followed by a newline
pub fn write_json<W: Write>(mut out: W, value: &impl Serialize) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out).map_err(serde_json::Error::io)
}

pub fn print_summary_json(summary: &RunSummary) -> Result<(), serde_json::Error> {
    write_json(io::stdout().lock(), summary)
}

/// One line per target: uuid, state, method, url, policy
pub fn write_targets<W: Write>(mut out: W, targets: &[TargetRecord]) -> io::Result<()> {
    for target in targets {
        let state = if target.enabled { "enabled" } else { "disabled" };
        write!(
            out,
            "{}  {:<8}  {:<6} {}  [{}-{}]",
            target.uuid,
            state,
            target.method,
            target.url,
            target.healthy_min_status,
            target.healthy_max_status
        )?;
        if !target.healthy_content.is_empty() {
            write!(out, "  content={:?}", target.healthy_content)?;
        }
        if target.name != target.url {
            write!(out, "  ({})", target.name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_targets() {
        let mut enabled = TargetRecord::new("https://example.com".into());
        enabled.healthy_content = "ok".into();
        let mut disabled = TargetRecord::new("https://off.example.com".into());
        disabled.enabled = false;
        disabled.name = "off".into();

        let mut out = Vec::new();
        write_targets(&mut out, &[enabled.clone(), disabled.clone()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&enabled.uuid.to_string()));
        assert!(lines[0].contains("enabled"));
        assert!(lines[0].contains("content=\"ok\""));
        assert!(lines[1].contains("disabled"));
        assert!(lines[1].ends_with("(off)"));
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &RunSummary::default()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["outcomes"], serde_json::json!([]));
    }
}
