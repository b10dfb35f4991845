use crate::types::{Direction, LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dynot")]
#[command(about = "Build tracer drivers from tracing configuration and exercise them", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to $DYNOT_SETTINGS, then the platform config dir)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check a tracing configuration without loading its tracer library")]
    Validate {
        file: PathBuf,

        /// Drop unknown config fields instead of rejecting them
        #[arg(long)]
        permissive: bool,
    },

    #[command(about = "List registered tracer factories and deprecated names")]
    Factories,

    #[command(about = "Create the configured tracer, record one span and print the propagated headers")]
    Span {
        file: PathBuf,

        #[arg(long)]
        operation: String,

        #[arg(long, default_value = "ingress")]
        direction: Direction,

        /// Span tag as key=value (repeatable)
        #[arg(long = "tag", value_parser = parse_key_value)]
        tags: Vec<(String, String)>,

        /// Incoming request header as name=value (repeatable)
        #[arg(long = "header", value_parser = parse_key_value)]
        headers: Vec<(String, String)>,

        /// Mark the request as not selected for tracing
        #[arg(long)]
        unsampled: bool,
    },

    #[command(about = "Show the effective settings")]
    Settings {
        /// Write default settings to the settings path if no file exists
        #[arg(long)]
        init: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("http.method=GET"),
            Ok(("http.method".to_string(), "GET".to_string()))
        );
        assert_eq!(
            parse_key_value("empty="),
            Ok(("empty".to_string(), String::new()))
        );
        assert!(parse_key_value("=value").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_span_arguments() {
        let cli = Cli::try_parse_from([
            "dynot",
            "span",
            "tracing.yaml",
            "--operation",
            "checkout",
            "--tag",
            "a=1",
            "--tag",
            "b=2",
            "--header",
            "x-request-id=abc",
            "--unsampled",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Span {
                operation,
                direction,
                tags,
                headers,
                unsampled,
                ..
            } => {
                assert_eq!(operation, "checkout");
                assert_eq!(direction, Direction::Ingress);
                assert_eq!(tags.len(), 2);
                assert_eq!(headers[0].1, "abc");
                assert!(unsampled);
            }
            _ => panic!("expected span command"),
        }
    }
}
