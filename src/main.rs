//! Grabber - social media downloads through yt-dlp
//!
//! Command line front end: identify a URL, download it, re-encode a file, or
//! run the whole chat flow on a message's worth of links.

use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grabber::cli::{Args, Commands};
use grabber::config::Config;
use grabber::diagnostics::{unsupported_platform_reply, user_message, ChatKind};
use grabber::error::GrabberError;
use grabber::media::FileResult;
use grabber::platform::Platform;
use grabber::workflow::{UrlOutcome, Workflow};

#[derive(Serialize)]
struct UrlReport<'a> {
    url: &'a str,
    platform: Platform,
    files: &'a [FileResult],
    warnings: &'a [String],
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("grabber.toml").exists() {
                info!("Found grabber.toml in current directory, loading...");
                Config::from_file("grabber.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Command line flags win over the file
    if let Some(base_dir) = args.base_dir {
        config.download.base_dir = base_dir;
    }
    if let Some(recode) = args.recode_video {
        config.download.recode_video = recode;
    }
    if let Some(timeout) = args.timeout {
        config.tools.timeout_secs = Some(timeout);
    }

    match args.command {
        Commands::Download { url, name, json } => {
            let platform = Platform::identify(&url);
            if !platform.is_supported() {
                bail!(GrabberError::UnsupportedPlatform(url));
            }

            println!("Detected platform: {}", platform);
            println!("Downloading from: {}", url);

            let name = name.unwrap_or_else(|| format!("download-{}", timestamp()));
            let workflow = Workflow::with_processes(config);

            let spinner = spinner(&format!("Running yt-dlp for {}", platform));
            let result = workflow.downloader().download(&url, &name).await;
            spinner.finish_and_clear();
            let files = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                for file in &files {
                    println!("Successfully downloaded file {}!", file.name);
                    println!("\tPath: {}", file.path.display());
                    println!("\tType: {}", file.kind);
                }
            }
        }
        Commands::Identify { url } => {
            println!("{}", Platform::identify(&url));
        }
        Commands::Reencode { path } => {
            let workflow = Workflow::with_processes(config);

            let spinner = spinner(&format!("Re-encoding {}", path.display()));
            let result = workflow.reencoder().reencode_for_compatibility(&path).await;
            spinner.finish_and_clear();
            result?;

            println!("Re-encoded {}", path.display());
        }
        Commands::Process { text, keep, json } => {
            let workflow = Workflow::with_processes(config);
            let prefix = format!("process-{}", timestamp());

            let spinner = spinner("Fetching media");
            let outcomes = workflow.process_text(&text, &prefix).await;
            spinner.finish_and_clear();

            if outcomes.is_empty() {
                bail!("No URLs found in the message");
            }

            let delivered = outcomes.iter().filter(|o| o.result.is_ok()).count();
            let reports = build_reports(&outcomes);
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report);
                }
            }

            if keep {
                for outcome in outcomes {
                    if let Ok(delivery) = outcome.result {
                        let dir = delivery.dir.persist();
                        println!("Kept {}", dir.display());
                    }
                }
            }

            if delivered == 0 {
                bail!("None of the URLs could be fetched");
            }
        }
        Commands::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".grabber").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "grabber.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so JSON on stdout stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("grabber.log").display());

    Ok(())
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn build_reports(outcomes: &[UrlOutcome]) -> Vec<UrlReport<'_>> {
    outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(delivery) => UrlReport {
                url: &outcome.url,
                platform: delivery.platform,
                files: &delivery.files,
                warnings: &delivery.warnings,
                error: None,
            },
            Err(e) => {
                // Same wording a private chat would get
                let message = match e {
                    GrabberError::UnsupportedPlatform(_) => unsupported_platform_reply(ChatKind::Private)
                        .map(str::to_string)
                        .unwrap_or_default(),
                    other => user_message(other),
                };
                UrlReport {
                    url: &outcome.url,
                    platform: Platform::identify(&outcome.url),
                    files: &[],
                    warnings: &[],
                    error: Some(message),
                }
            }
        })
        .collect()
}

fn print_report(report: &UrlReport<'_>) {
    println!("{} ({})", report.url, report.platform);
    if let Some(error) = &report.error {
        if !error.is_empty() {
            println!("\t{}", error);
        }
        return;
    }
    for file in report.files {
        println!("\t{} [{}] {}", file.name, file.kind, file.path.display());
    }
    for warning in report.warnings {
        println!("\twarning: {}", warning);
    }
}
