//! airboard-replay - feed recorded hand landmarks through the gesture engine.
//!
//! Reads one s-expression message per line and prints the resulting events
//! and responses.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use airboard_gestures::gesture::GestureConfig;
use airboard_gestures::ipc::{handle_message, ReplaySession};
use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "airboard-replay", about = "Replay hand landmarks through gesture detection")]
struct Cli {
    /// Message file (default: stdin)
    file: Option<PathBuf>,

    /// Threshold preset: default or chalkboard
    #[arg(long, default_value = "default")]
    preset: String,

    /// Pinch threshold, as a fraction of wrist-to-thumb-tip length
    #[arg(long)]
    pinch_threshold: Option<f64>,

    /// Scissors threshold, as a fraction of wrist-to-middle-tip length
    #[arg(long)]
    scissors_threshold: Option<f64>,

    /// Dwell hold time in milliseconds
    #[arg(long)]
    dwell_ms: Option<u64>,

    /// Dwell radius in normalized frame units
    #[arg(long)]
    dwell_radius: Option<f64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

impl Cli {
    fn gesture_config(&self) -> anyhow::Result<GestureConfig> {
        let mut config = match self.preset.as_str() {
            "default" => GestureConfig::default(),
            "chalkboard" => GestureConfig::chalkboard(),
            other => {
                return Err(anyhow!(
                    "unknown preset: {other}. Use: default or chalkboard"
                ))
            }
        };
        if let Some(pinch) = self.pinch_threshold {
            config.pinch_threshold = non_negative("--pinch-threshold", pinch)?;
        }
        if let Some(scissors) = self.scissors_threshold {
            config.scissors_threshold = non_negative("--scissors-threshold", scissors)?;
        }
        if let Some(ms) = self.dwell_ms {
            config.dwell_time = Duration::from_millis(ms);
        }
        if let Some(radius) = self.dwell_radius {
            config.dwell_radius = non_negative("--dwell-radius", radius)?;
        }
        Ok(config)
    }
}

fn non_negative(flag: &str, value: f64) -> anyhow::Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(anyhow!("{flag} must be a non-negative number, got {value}"))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("airboard-replay {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs go to stderr; stdout carries protocol output
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airboard_gestures=info,airboard_replay=info".into()),
        )
        .init();

    info!("airboard-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = cli.gesture_config()?;
    let mut session = ReplaySession::new(config);

    let input: Box<dyn BufRead> = match &cli.file {
        Some(path) => {
            info!("replaying {}", path.display());
            let file = File::open(path)
                .map_err(|e| anyhow!("failed to open {}: {e}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => {
            info!("replaying stdin");
            Box::new(io::stdin().lock())
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut messages = 0u64;
    for (lineno, line) in input.lines().enumerate() {
        let line = line.map_err(|e| anyhow!("read error at line {}: {e}", lineno + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        messages += 1;
        if let Some(response) = handle_message(&mut session, line) {
            writeln!(out, "{response}").map_err(|e| anyhow!("write error: {e}"))?;
        }
    }
    out.flush().map_err(|e| anyhow!("write error: {e}"))?;

    debug!("final status: {}", session.engine().status_sexp());
    info!(
        "replayed {} messages ({} frames)",
        messages,
        session.engine().frames()
    );
    Ok(())
}
