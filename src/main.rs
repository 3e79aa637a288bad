//! CLI entry point for the downloader.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use youtube_downloader_lib::downloader::{FfprobeProbe, YtDlpBackend, YtDlpCommand, YtDlpConfig};
use youtube_downloader_lib::{summary_line, Downloader, EnvDefaults};

mod cli;

use cli::Args;

/// Exit status for invalid quality/client configuration
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let env = EnvDefaults::from_env();
    let output_dir = env.resolve_output_dir(args.output_dir.clone());

    let command = YtDlpCommand::detect(env.ytdlp_python.as_deref());
    info!(program = command.program(), "Using yt-dlp");

    let backend = YtDlpBackend::new(
        command,
        YtDlpConfig::default()
            .with_output_dir(&output_dir)
            .with_proxy(env.proxy.clone()),
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let downloader = Downloader::new(Box::new(backend), output_dir)
        .with_probe(Box::new(FfprobeProbe::new()))
        .with_env_defaults(env)
        .with_cancel_flag(Arc::clone(&cancel));

    // Ctrl-C stops the search; an interrupted attempt reports as cancelled
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping the download");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    match downloader.download(&args.to_request()).await {
        Ok(outcome) => {
            if args.json {
                let json = serde_json::to_string_pretty(&outcome)
                    .context("Failed to serialize download outcome")?;
                println!("{}", json);
            } else {
                println!("{}", summary_line(&outcome));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_configuration() => {
            error!(error = %e, "Invalid configuration");
            Ok(ExitCode::from(EXIT_CONFIG))
        }
        Err(e) => {
            error!(error = %e, "Download failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
