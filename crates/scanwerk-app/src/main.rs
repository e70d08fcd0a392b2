// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — document image capture
//
// Entry point. Initialises logging, loads the admission policy, runs one
// capture session against the platform bridge and prints the resulting
// capture as JSON.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use scanwerk_capture::CaptureResult;
use scanwerk_capture::source::ShutterButton;
use scanwerk_core::AppConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::SourceKind;
use tokio::io::{AsyncBufReadExt, BufReader};

use services::data_dir;
use services::pipeline::{Pipeline, build_pipeline};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    LiveCamera,
    NativeCamera,
    Gallery,
    FilePicker,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::LiveCamera => SourceKind::LiveCamera,
            SourceArg::NativeCamera => SourceKind::NativeCamera,
            SourceArg::Gallery => SourceKind::Gallery,
            SourceArg::FilePicker => SourceKind::FilePicker,
        }
    }
}

/// Capture one document image and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "scanwerk", version, about)]
struct Args {
    /// Settings file (defaults to the data directory's config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source to capture from. Defaults to the first one offered.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// List the sources this device offers and exit.
    #[arg(long)]
    list_sources: bool,

    /// Write the effective settings to the config file and exit.
    #[arg(long)]
    write_config: bool,

    /// Leave the base64 encoding out of the printed result.
    #[arg(long)]
    omit_encoding: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Scanwerk starting");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_silent() => {
            tracing::info!("capture cancelled");
            ExitCode::from(130)
        }
        Err(err) => {
            tracing::error!(error = %err, "capture did not complete");
            // Failures inside a session were already reported by the observer.
            if matches!(
                err,
                ScanwerkError::Config(_) | ScanwerkError::Io(_) | ScanwerkError::Serialization(_)
            ) {
                let human = humanize_error(&err);
                eprintln!("{}\n  {}", human.message, human.suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let default_config = data_dir::config_path("scanwerk");
    let config_path = args.config.clone().unwrap_or(default_config);
    let config = AppConfig::load(&config_path)?;
    tracing::info!(
        path = %config_path.display(),
        max_size = config.policy.max_size_bytes(),
        "configuration loaded"
    );

    if args.write_config {
        config.save(&config_path)?;
        println!("{}", config_path.display());
        return Ok(());
    }

    let Pipeline {
        controller,
        shutter,
    } = build_pipeline(&config);

    let offered = controller.open_chooser().await?;
    if args.list_sources {
        for kind in &offered {
            println!("{kind}\t{}", kind.label());
        }
        controller.close_chooser();
        return Ok(());
    }

    let kind = match args.source {
        Some(arg) => SourceKind::from(arg),
        None => match offered.first() {
            Some(kind) => *kind,
            None => {
                controller.close_chooser();
                return Err(ScanwerkError::PlatformUnavailable);
            }
        },
    };
    tracing::info!(source = %kind, "capturing");

    if kind == SourceKind::LiveCamera {
        tokio::spawn(shutter_on_enter(shutter));
    }

    let capture = controller.select_source(kind);
    tokio::pin!(capture);
    let result = tokio::select! {
        out = &mut capture => out,
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            capture.await
        }
    }?;

    print_result(&result, args.omit_encoding)
}

/// Press the shutter when the user hits Enter.
async fn shutter_on_enter(shutter: ShutterButton) {
    eprintln!("Live preview running. Press Enter to capture.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if let Ok(Some(_)) = lines.next_line().await {
        shutter.press();
    }
}

fn print_result(result: &CaptureResult, omit_encoding: bool) -> Result<()> {
    let mut value = serde_json::to_value(result)?;
    if omit_encoding {
        if let Some(fields) = value.as_object_mut() {
            fields.remove("portable_encoding");
            if result.uri().starts_with("data:") {
                fields.remove("uri");
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
