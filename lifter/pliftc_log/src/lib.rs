//! Logger setup for the lifter tools.
//!
//! A minimal, self-contained `tracing` subscriber so a driver (or a quick
//! standalone experiment against `pliftc_lifter`) can turn on `debug!`
//! output without pulling in the whole driver crate:
//!
//! ```no_run
//! pliftc_log::Logger::init(pliftc_log::LoggerConfig::from_env("PLIFTC")).unwrap();
//! ```
//!
//! Then run with `PLIFTC_FILTER=debug`. The writer is selected by
//! `{PREFIX}_LOG_WRITER` (`stdout`, `stderr`, or a file path) and line
//! numbers by `{PREFIX}_LINE_NUMBERS=1`.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_core::Level;
use tracing_subscriber::{
    fmt::layer, prelude::*, registry::Registry, util::TryInitError, EnvFilter, Layer,
};

/// The logger for the lifter tools.
pub struct Logger;

/// Where log lines go.
pub enum LogWriter {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Subscriber configuration, usually read from environment variables.
pub struct LoggerConfig {
    pub writer: LogWriter,
    /// An `EnvFilter` directive string; `None` falls back to `info`.
    pub filter: Option<String>,
    /// Whether events carry source line numbers.
    pub line_numbers: bool,
}

impl LoggerConfig {
    /// Read `{prefix}_FILTER`, `{prefix}_LOG_WRITER`, and
    /// `{prefix}_LINE_NUMBERS` from the environment.
    pub fn from_env(prefix: &str) -> LoggerConfig {
        let filter = std::env::var(format!("{}_FILTER", prefix)).ok();
        let writer = match std::env::var(format!("{}_LOG_WRITER", prefix)).ok().as_deref() {
            Some("stdout") => LogWriter::Stdout,
            Some("stderr") | None => LogWriter::Stderr,
            Some(path) => LogWriter::File(path.into()),
        };
        let line_numbers = std::env::var(format!("{}_LINE_NUMBERS", prefix))
            .map(|v| v == "1")
            .unwrap_or(false);
        LoggerConfig {
            writer,
            filter,
            line_numbers,
        }
    }
}

/// The error type for logger setup.
#[derive(Debug)]
pub enum LogError {
    /// Wrapping an IO error (log file creation).
    Io(std::io::Error),
    /// A subscriber was already installed.
    Init(TryInitError),
}

impl std::error::Error for LogError {}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::Io(e) => write!(f, "io error: {}", e),
            LogError::Init(e) => write!(f, "init error: {}", e),
        }
    }
}

impl Logger {
    /// Install the configured subscriber globally.
    pub fn init(cfg: LoggerConfig) -> Result<(), LogError> {
        Logger::subscriber(cfg)?.try_init().map_err(LogError::Init)
    }

    /// Build the subscriber without installing it; tests scope it with
    /// `tracing::subscriber::with_default`.
    pub fn subscriber(cfg: LoggerConfig) -> Result<impl Subscriber + Send + Sync, LogError> {
        let filter = match cfg.filter {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::default().add_directive(Level::INFO.into()),
        };
        let layer = Logger::fmt_layer(cfg.writer, cfg.line_numbers)?;
        Ok(Registry::default().with(filter).with(layer))
    }

    fn fmt_layer<S>(
        writer: LogWriter,
        line_numbers: bool,
    ) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>, LogError>
    where
        S: Subscriber,
        for<'a> S: tracing_subscriber::registry::LookupSpan<'a>,
    {
        let base = layer()
            .with_target(true)
            .with_line_number(line_numbers);
        Ok(match writer {
            LogWriter::Stdout => Box::new(base.with_writer(std::io::stdout)),
            LogWriter::Stderr => Box::new(base.with_writer(std::io::stderr)),
            LogWriter::File(path) => {
                let file = File::create(path).map_err(LogError::Io)?;
                Box::new(base.with_ansi(false).with_writer(Mutex::new(file)))
            }
        })
    }
}
