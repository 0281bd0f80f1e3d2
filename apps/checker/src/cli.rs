use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

/// Quorum-based uptime checks for stored HTTP targets
#[derive(Debug, Parser)]
#[command(name = "uptime-checker", version, about)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/uptime/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Check every enabled target once (default)
    Run,
    /// List stored targets
    List,
    /// Store a new target
    Add(AddArgs),
    /// Delete a stored target
    Remove {
        uuid: Uuid,
    },
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub url: String,

    /// Display name, defaults to the url
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Request header as NAME=VALUE, repeatable
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    #[arg(long, default_value_t = 200)]
    pub min_status: u16,

    #[arg(long, default_value_t = 299)]
    pub max_status: u16,

    /// Substring the flattened JSON body must contain
    #[arg(long)]
    pub content: Option<String>,

    /// Per-probe timeout, the configured default when omitted
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Store the target without checking it
    #[arg(long)]
    pub disabled: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .or_else(|| raw.split_once(':'))
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["uptime-checker"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "uptime-checker",
            "add",
            "--url",
            "https://example.com/health",
            "--method",
            "post",
            "--header",
            "Authorization=Bearer a=b",
            "--header",
            "X-Probe: 1",
            "--content",
            "ok",
            "--max-status",
            "204",
            "--json",
        ])
        .unwrap();

        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert!(cli.json);
        assert_eq!(args.method, "post");
        assert_eq!(
            args.headers,
            vec![
                ("Authorization".to_string(), "Bearer a=b".to_string()),
                ("X-Probe".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(args.min_status, 200);
        assert_eq!(args.max_status, 204);
        assert_eq!(args.content.as_deref(), Some("ok"));
        assert_eq!(args.timeout_ms, None);
    }

    #[test]
    fn test_rejects_malformed_header() {
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn test_parse_remove() {
        let uuid = Uuid::new_v4();
        let raw = uuid.to_string();
        let cli = Cli::try_parse_from(["uptime-checker", "remove", raw.as_str()]).unwrap();
        assert_eq!(cli.command, Some(Command::Remove { uuid }));
    }
}
