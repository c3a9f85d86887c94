//! Keylog recorder entry point.
//!
//! Captures keystrokes and writes two renderings of each one: an annotated
//! display stream on stdout and an append-only binary log.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ Cli::parse() + load_config()    -- CLI flags override the config file
//!  ├─ tracing_subscriber (stderr)
//!  ├─ platform_source().start()       -- event tap thread ──> mpsc channel
//!  ├─ RecordKeystrokesUseCase::run()  -- blocking task: encode + write sinks
//!  └─ signal task                     -- Ctrl-C / SIGTERM clears `running`
//! ```
//!
//! `--dump FILE` skips capture and prints an existing log as text.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keylog_core::session::SystemClock;
use keylog_recorder::application::dump_log::dump_log_file;
use keylog_recorder::application::record_keystrokes::{RecordKeystrokesUseCase, RecordingOptions};
use keylog_recorder::infrastructure::input_capture::platform_source;
use keylog_recorder::infrastructure::sinks::{FileRecordSink, StdoutDisplaySink};
use keylog_recorder::infrastructure::storage::config::{self, RecorderConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keystroke recorder.
///
/// Prints every key press with its modifiers (⌃⌥⇧⌘) and keycap glyphs, and
/// appends a timestamped binary record per key event to the log file.
#[derive(Debug, Parser)]
#[command(name = "keylog", version)]
struct Cli {
    /// Also print keystrokes to stdout when writing a log file.
    #[arg(short = 's', long)]
    stdout: bool,

    /// Flush the log file after every record.
    #[arg(short = 'f', long)]
    flush: bool,

    /// Log progress at info level.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log at debug level and hex-dump every record.
    #[arg(short = 'd', long)]
    debug: bool,

    /// Binary log file to append to.  Without one, keystrokes go to stdout.
    #[arg(short = 'o', long, value_name = "FILE", env = "KEYLOG_OUTPUT")]
    output: Option<PathBuf>,

    /// Config file to use instead of the platform default.
    #[arg(long, value_name = "FILE", env = "KEYLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Pause in milliseconds after which the display starts a new line.
    #[arg(long, value_name = "MS")]
    idle_gap_ms: Option<i64>,

    /// Print an existing binary log as text and exit.
    #[arg(long, value_name = "FILE", conflicts_with = "output")]
    dump: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid.
    fn resolve_config(&self) -> anyhow::Result<RecorderConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => match config::load_config() {
                Ok(cfg) => cfg,
                Err(config::ConfigError::NoPlatformConfigDir) => RecorderConfig::default(),
                Err(e) => return Err(e).context("loading default config"),
            },
        };

        if let Some(path) = &self.output {
            cfg.output.path = Some(path.clone());
        }
        cfg.output.stdout |= self.stdout;
        cfg.output.flush_every_record |= self.flush;
        if let Some(gap) = self.idle_gap_ms {
            cfg.encoder.idle_gap_ms = gap;
        }
        if self.debug {
            cfg.logging.level = "debug".to_string();
        } else if self.verbose {
            cfg.logging.level = "info".to_string();
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.dump {
        init_logging(if cli.verbose { "info" } else { "warn" });
        let stdout = std::io::stdout();
        let count = dump_log_file(path, &mut stdout.lock())?;
        info!(records = count, "dump complete");
        return Ok(());
    }

    let cfg = cli.resolve_config()?;
    init_logging(&cfg.logging.level);

    // ── Sinks ─────────────────────────────────────────────────────────────────
    let mut use_case = RecordKeystrokesUseCase::new(
        SystemClock,
        cfg.encoder_config(),
        RecordingOptions {
            debug_records: cli.debug,
        },
    );
    if let Some(path) = &cfg.output.path {
        let sink = FileRecordSink::open(path, cfg.output.flush_every_record)?;
        info!("appending records to {}", path.display());
        use_case = use_case.with_record_sink(Box::new(sink));
    }
    if cfg.display_enabled() {
        use_case = use_case.with_display_sink(Box::new(StdoutDisplaySink::new()));
    }

    // ── Capture ───────────────────────────────────────────────────────────────
    let source = platform_source()?;
    let rx = source.start().context("starting key capture")?;
    info!("recording keystrokes; press Ctrl-C to stop");

    // ── Ctrl-C / SIGTERM handler ──────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        running_clone.store(false, Ordering::Relaxed);
    });

    // ── Recording loop ────────────────────────────────────────────────────────
    let loop_running = Arc::clone(&running);
    let stats = tokio::task::spawn_blocking(move || use_case.run(&rx, &loop_running))
        .await
        .context("recording task panicked")?;

    source.stop();
    if stats.write_errors > 0 {
        warn!(errors = stats.write_errors, "some keystrokes were not written");
    }
    info!(events = stats.events, "keylog stopped");
    Ok(())
}

/// Installs the stderr subscriber.  `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
