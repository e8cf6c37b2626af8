//! CLI entry point for `mailremind`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailremind::config::Config;
use mailremind::diagnostic::Diagnostic;
use mailremind::mailbox::{self, MailboxQuery};
use mailremind::model::{DecodedMessage, Event};
use mailremind::notify::{NotificationFormatter, NotificationView};
use mailremind::pipeline::Pipeline;
use mailremind::rank::dedup_and_rank;
use mailremind::scan::run_scan_observed;

#[derive(Parser)]
#[command(
    name = "mailremind",
    version,
    about = "Find dated action items in email and rank them by urgency"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an MBOX file or a directory of .eml files
    Scan {
        path: PathBuf,
        /// Mailbox query, e.g. `from:boss -subject:newsletter`
        #[arg(short, long)]
        query: Option<String>,
        /// Evaluation time (RFC 3339). Defaults to the current local time.
        #[arg(long, value_name = "RFC3339")]
        now: Option<String>,
        #[arg(long)]
        json: bool,
        /// Print notification text for every event and a digest
        #[arg(long)]
        notify: bool,
    },
    /// Decode a single .eml file and list its events
    Parse {
        file: PathBuf,
        #[arg(long, value_name = "RFC3339")]
        now: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the active configuration and where it lives
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mailremind::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Scan {
            path,
            query,
            now,
            json,
            notify,
        } => cmd_scan(&config, &path, query.as_deref(), now.as_deref(), json, notify),
        Commands::Parse { file, now, json } => cmd_parse(&config, &file, now.as_deref(), json),
        Commands::Config { init } => cmd_config(&config, init),
    }
}

fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailremind::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailremind.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// `--now` if given, else the current local time with its offset.
fn evaluation_time(now: Option<&str>) -> anyhow::Result<DateTime<FixedOffset>> {
    match now {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid --now value '{text}', expected RFC 3339")),
        None => {
            let local = Local::now();
            Ok(local.with_timezone(local.offset()))
        }
    }
}

/// Scan a mailbox and print the ranked events.
fn cmd_scan(
    config: &Config,
    path: &Path,
    query: Option<&str>,
    now: Option<&str>,
    json: bool,
    notify: bool,
) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Mailbox not found: {}", path.display());
    }
    let now = evaluation_time(now)?;
    let query = MailboxQuery::parse(query.unwrap_or(config.general.default_query.as_str()));
    let mailbox = mailbox::open(path)?;
    let pipeline = Pipeline::rule_based(&config.extraction);

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Scanning [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let report = run_scan_observed(
        mailbox.as_ref(),
        &query,
        &pipeline,
        now,
        Some(&mut diagnostics),
        &mut |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        },
    )?;
    pb.finish_and_clear();
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        diagnostics = diagnostics.len(),
        "Scan finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} message(s) processed, {} event(s) found, {} after deduplication",
        report.processed,
        report.found,
        report.events.len()
    );
    if report.failed_fetches > 0 {
        println!("  {} message(s) could not be read", report.failed_fetches);
    }
    print_events_table(&report.events);

    if notify {
        print_notifications(&config.notify.formatter(), &report.events, now);
    }
    Ok(())
}

/// Decode one `.eml` file and print what the pipeline sees in it.
fn cmd_parse(config: &Config, file: &Path, now: Option<&str>, json: bool) -> anyhow::Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let now = evaluation_time(now)?;
    let pipeline = Pipeline::rule_based(&config.extraction);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let message = mailremind::parser::decode_message_observed(&raw, &mut diagnostics);
    let events = pipeline.events_for_message(&message, now, &mut diagnostics);
    let events = dedup_and_rank(events, *now.offset());

    if json {
        let output = serde_json::json!({
            "message": message,
            "events": events,
            "diagnostics": diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_message(&message);
    print_events_table(&events);
    for diagnostic in &diagnostics {
        println!("  note: {diagnostic}");
    }
    Ok(())
}

/// Print config and log locations, optionally writing the default config.
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    let path = mailremind::config::config_file_path();
    if init {
        match &path {
            Some(p) if p.exists() => {
                anyhow::bail!("Config file already exists: {}", p.display())
            }
            _ => mailremind::config::save_config(&Config::default())?,
        }
    }

    match &path {
        Some(p) => println!("Config file: {}", p.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!(
        "Log file:    {}",
        mailremind::config::log_file_path(config).display()
    );
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn print_message(message: &DecodedMessage) {
    println!();
    println!("  Subject: {}", message.subject);
    println!("  From:    {}", message.from);
    println!("  To:      {}", message.to);
    println!();
    for line in message.body_text.lines() {
        println!("  | {line}");
    }
}

/// Print events in a human-readable table.
fn print_events_table(events: &[Event]) {
    println!();
    if events.is_empty() {
        println!("  No dated events found.");
        println!();
        return;
    }

    println!(
        "  {:<4} {:<9} {:>5} {:<23} {:<6} {:<28} {:<30}",
        "#", "Urgency", "Days", "When", "Kind", "Mention", "Subject"
    );
    println!("  {}", "-".repeat(111));

    for (i, event) in events.iter().enumerate() {
        let mention: String = event.original_text.chars().take(27).collect();
        let subject: String = event.source_subject.chars().take(29).collect();
        println!(
            "  {:<4} {:<9} {:>5} {:<23} {:<6} {:<28} {:<30}",
            i + 1,
            event.urgency,
            event.days_until,
            event.resolved_instant.to_string(),
            event.entity_kind.as_label(),
            mention,
            subject
        );
    }
    println!();
}

fn print_notifications(formatter: &NotificationFormatter, events: &[Event], now: DateTime<FixedOffset>) {
    for event in events {
        let (title, body) = formatter.format(&NotificationView::from(event), Some(&event.source_subject));
        println!("── {title}");
        println!("{body}");
        println!();
    }

    if let Some((subject, body)) = formatter.digest(events, now) {
        println!("══ Digest: {subject}");
        println!("{body}");
    }
}
