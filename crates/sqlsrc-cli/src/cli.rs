//! sqlsrc - validate and inspect external SQL source configuration records

mod logging;
mod record;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use serde_json::json;
use sqlsrc_core::{FieldKind, SourceConf};
use sqlsrc_spark::{SparkConf, spark_dialect};

#[derive(Debug, Parser)]
#[command(name = "sqlsrc", version, about = "Inspect Databricks Spark source configurations")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a record and print the derived connection URI and properties
    Check {
        /// Path to a .toml or .json record
        file: PathBuf,

        /// Access token, overriding any token in the record
        #[arg(long, env = "SQLSRC_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,
    },
    /// Print the field schema, with current values when a record is given
    Describe {
        /// Path to a .toml or .json record
        file: Option<PathBuf>,
    },
    /// Print the packaged dialect definition summary
    Dialect,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("Warning: failed to initialise logging: {error:#}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "command failed");
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Check { file, access_token } => {
            let conf = record::load(&file, access_token)?;
            check(&conf, cli.format)
        }
        Command::Describe { file } => {
            let conf = match file {
                Some(path) => record::load(&path, None)?,
                None => SparkConf::default(),
            };
            describe(&conf, cli.format)
        }
        Command::Dialect => dialect(cli.format),
    }
}

fn check(conf: &SparkConf, format: OutputFormat) -> anyhow::Result<()> {
    let uri = conf
        .build_connection_uri()
        .context("Configuration is invalid")?;
    let properties = conf.build_connection_properties();
    tracing::info!(uri = %uri, "configuration is valid");

    match format {
        OutputFormat::Json => {
            let output = json!({
                "valid": true,
                "uri": uri,
                "driver": sqlsrc_spark::DRIVER,
                "username": sqlsrc_spark::TOKEN_USERNAME,
                "properties": properties,
                "fetchSize": conf.fetch_size,
                "maxIdleConns": conf.max_idle_conns,
                "idleTimeSec": conf.idle_time_sec,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("URI:    {uri}");
            println!("Driver: {}", sqlsrc_spark::DRIVER);
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["Property", "Value"]);
            for (key, value) in &properties {
                table.add_row(vec![key.as_str(), value.as_str()]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn describe(conf: &SparkConf, format: OutputFormat) -> anyhow::Result<()> {
    let summaries = conf.describe();

    match format {
        OutputFormat::Json => {
            let fields: Vec<_> = conf
                .fields()
                .iter()
                .zip(&summaries)
                .map(|(field, summary)| {
                    json!({
                        "descriptor": field,
                        "value": summary.value,
                    })
                })
                .collect();
            let output = json!({
                "sourceType": conf.source_type().id,
                "label": conf.source_type().label,
                "fields": fields,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec![
                "Tag", "Field", "Label", "Kind", "Required", "Metadata", "Value",
            ]);
            for (field, summary) in conf.fields().iter().zip(&summaries) {
                table.add_row(vec![
                    field.tag.to_string(),
                    field.name.to_string(),
                    field.label.to_string(),
                    kind_name(field.kind).to_string(),
                    yes_no(field.required).to_string(),
                    yes_no(field.metadata_impacting).to_string(),
                    summary.value.clone(),
                ]);
            }
            println!("{} ({})", conf.source_type().label, conf.source_type().id);
            println!("{table}");
        }
    }
    Ok(())
}

fn dialect(format: OutputFormat) -> anyhow::Result<()> {
    let dialect = spark_dialect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(dialect)?),
        OutputFormat::Table => {
            println!(
                "{} ({}, rules v{})",
                dialect.display_name(),
                dialect.id(),
                dialect.metadata.version
            );
            println!("Identifier quote: {}", dialect.syntax.identifier_quote);
            println!("LIMIT pushdown:   {}", yes_no(dialect.syntax.supports_limit));

            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["Backend type", "Engine type"]);
            for mapping in &dialect.data_types {
                table.add_row(vec![mapping.source.as_str(), mapping.target.as_str()]);
            }
            println!("{table}");
            println!(
                "{} scalar and {} aggregate functions pushed down",
                dialect.functions.scalar.len(),
                dialect.functions.aggregate.len()
            );
        }
    }
    Ok(())
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Number => "number",
        FieldKind::Secret => "secret",
        FieldKind::Boolean => "boolean",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::try_parse_from(["sqlsrc", "check", "source.toml", "--access-token", "t"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Command::Check { file, access_token } => {
                assert_eq!(file, PathBuf::from("source.toml"));
                assert_eq!(access_token.as_deref(), Some("t"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sqlsrc", "describe", "--format", "json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Describe { file: None }));
    }

    #[test]
    fn test_check_requires_file() {
        assert!(Cli::try_parse_from(["sqlsrc", "check"]).is_err());
    }

    #[test]
    fn test_check_rejects_invalid_record() {
        let conf = SparkConf::default();
        let err = check(&conf, OutputFormat::Json).unwrap_err();
        assert!(format!("{err:#}").contains("Missing required field: hostname"));
    }

    #[test]
    fn test_describe_and_dialect_render() {
        assert!(describe(&SparkConf::default(), OutputFormat::Table).is_ok());
        assert!(describe(&SparkConf::default(), OutputFormat::Json).is_ok());
        assert!(dialect(OutputFormat::Json).is_ok());
    }
}
