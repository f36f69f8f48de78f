//! Command-line interface components.

use crate::config::{ResolverConfig, parse_delimiter};
use crate::defaults::default_site_record;
use crate::events::sink_from_config;
use crate::models::{ListField, Record, ResolvedRecord};
use crate::resolver::RecordResolver;
use crate::site::{ContentOrigin, SiteContent, load_site_content};
use crate::source::FileTableSource;
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(about = "Resolve the showreel menu content for a client id")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Client id (site version) to resolve; defaults to "1"
    #[arg(value_name = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// URL of the exported content table
    #[arg(long, conflicts_with = "file")]
    pub source_url: Option<String>,

    /// Read the content table from a local file instead of the network
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// JSON config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Column delimiter of the table
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Total fetch attempts
    #[arg(long)]
    pub attempts: Option<u32>,

    /// Delay before the first retry in milliseconds
    #[arg(long)]
    pub backoff_ms: Option<u64>,

    /// Analytics endpoint for the site_load event
    #[arg(long)]
    pub event_endpoint: Option<String>,

    /// Print the selected row before defaults are merged
    #[arg(long)]
    pub raw: bool,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    pub fn requested_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("showreel_resolver={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load configuration (file -> env) and apply command-line overrides
pub fn load_configuration(args: &Args) -> Result<ResolverConfig> {
    let mut config = ResolverConfig::load_layered(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(url) = &args.source_url {
        config.source_url = url.clone();
    }
    if let Some(delimiter) = &args.delimiter {
        config.delimiter = parse_delimiter(delimiter)?;
    }
    if let Some(attempts) = args.attempts {
        config.max_attempts = attempts;
    }
    if let Some(backoff_ms) = args.backoff_ms {
        config.initial_backoff_ms = backoff_ms;
    }
    if let Some(endpoint) = &args.event_endpoint {
        config.event_endpoint = Some(endpoint.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_resolver(args: &Args, config: &ResolverConfig) -> Result<RecordResolver> {
    match &args.file {
        Some(path) => Ok(RecordResolver::new(
            Arc::new(FileTableSource::new(path.clone())),
            config,
        )),
        None => RecordResolver::from_config(config).context("Failed to create HTTP client"),
    }
}

fn fetch_spinner(args: &Args, source: &str) -> Option<ProgressBar> {
    if args.quiet || args.json {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Fetching {}", source));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Main command: resolve and print the content for one client
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    let config = load_configuration(&args)?;
    let resolver = build_resolver(&args, &config)?;
    let spinner = fetch_spinner(&args, &resolver.source().describe());

    if args.raw {
        let requested = args.requested_id().unwrap_or(config.fallback_row_id.as_str());
        let resolved = resolver.resolve(requested).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        let resolved = resolved.context("Content table could not be fetched")?;
        return print_raw(&args, resolved.as_ref());
    }

    let events = sink_from_config(&config).context("Failed to create event sink")?;
    let defaults = default_site_record();
    let content =
        load_site_content(&resolver, args.requested_id(), &defaults, events.as_ref()).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&content)?);
    } else {
        print_summary(&content);
    }
    Ok(())
}

fn print_raw(args: &Args, resolved: Option<&ResolvedRecord>) -> Result<()> {
    let Some(resolved) = resolved else {
        println!("{}", "The content table has no records.".bright_red());
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved.record)?);
        return Ok(());
    }

    println!("{}", "Selected row (before defaults)".bright_green().bold());
    println!(
        "  {} {:?} after {} attempt(s)",
        "Selection:".bright_cyan(),
        resolved.selection,
        resolved.attempts
    );
    println!(
        "  {} {} rows, {} resolution passes{}",
        "Table:".bright_cyan(),
        resolved.parse_stats.data_rows,
        resolved.resolution_stats.passes,
        if resolved.resolution_stats.converged {
            ""
        } else {
            " (pass bound reached)"
        }
    );
    print_record(&resolved.record);
    Ok(())
}

fn print_summary(content: &SiteContent) {
    println!("{}", "Showreel content".bright_green().bold());
    println!(
        "  {} {}",
        "Site version:".bright_cyan(),
        content.site_version_id.bright_white().bold()
    );
    match content.origin {
        ContentOrigin::Remote {
            selection,
            attempts,
        } => println!(
            "  {} remote table ({:?}, {} attempt(s))",
            "Origin:".bright_cyan(),
            selection,
            attempts
        ),
        ContentOrigin::DefaultsOnly => println!(
            "  {} {}",
            "Origin:".bright_cyan(),
            "built-in defaults only".bright_yellow()
        ),
    }
    print_record(&content.record);
}

fn print_record(record: &Record) {
    println!();
    for (key, value) in record.iter() {
        if ListField::ALL.iter().any(|list| list.field_name() == key.as_str()) {
            continue;
        }
        if let Some(text) = value.as_text().filter(|t| !t.is_empty()) {
            println!("  {} {}", format!("{}:", key).bright_cyan(), text);
        }
    }

    for list in ListField::ALL {
        let entries: Vec<&Record> = record.entries(list).collect();
        if entries.is_empty() {
            continue;
        }
        println!("\n{}", list.field_name().bright_yellow());
        for (i, entry) in entries.iter().enumerate() {
            let label = entry.text(list.defining_field()).unwrap_or("(untitled)");
            let details: Vec<String> = entry
                .iter()
                .filter(|(key, _)| key.as_str() != list.defining_field())
                .filter_map(|(key, value)| {
                    value
                        .as_text()
                        .filter(|t| !t.is_empty())
                        .map(|t| format!("{}={}", key, t))
                })
                .collect();
            println!(
                "  {}. {} {}",
                (i + 1).to_string().bright_yellow().bold(),
                label.bright_white(),
                details.join(" ").bright_black()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "showreel",
            "42",
            "--file",
            "table.csv",
            "--delimiter",
            ";",
            "--raw",
            "-v",
        ]);
        assert_eq!(args.requested_id(), Some("42"));
        assert_eq!(args.file, Some(PathBuf::from("table.csv")));
        assert!(args.raw);
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_source_url_conflicts_with_file() {
        let result = Args::try_parse_from([
            "showreel",
            "--file",
            "table.csv",
            "--source-url",
            "https://example.test/a.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, r#"{{ "maxAttempts": 7, "initialBackoffMs": 50 }}"#).unwrap();
        let config_path = config_file.path().to_string_lossy().to_string();

        let args = Args::parse_from([
            "showreel",
            "--config",
            config_path.as_str(),
            "--attempts",
            "2",
            "--delimiter",
            "|",
        ]);
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.initial_backoff_ms, 50);
        assert_eq!(config.delimiter, '|');
    }

    #[test]
    fn test_bad_delimiter_rejected() {
        let args = Args::parse_from(["showreel", "--delimiter", "::"]);
        assert!(load_configuration(&args).is_err());
    }
}
