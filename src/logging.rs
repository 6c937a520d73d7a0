//! Logging setup
//!
//! Each invocation builds its own subscriber from [`LogSettings`] and
//! installs it for the current thread only, so repeated runs inside one
//! process never share handler state.

use crate::config::Config;
use chrono::Local;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Lowest level that gets through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Debug,
    #[default]
    Info,
}

impl Verbosity {
    fn level(self) -> LevelFilter {
        match self {
            Verbosity::Debug => LevelFilter::DEBUG,
            Verbosity::Info => LevelFilter::INFO,
        }
    }
}

/// Where log records go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogSink {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

/// Logging context for one invocation
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub verbosity: Verbosity,
    pub sink: LogSink,
    pub json: bool,
}

/// Keeps the subscriber installed and the file writer alive
pub struct LogGuard {
    _subscriber: DefaultGuard,
    _worker: Option<WorkerGuard>,
}

/// `<dir>/<label>_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_path(dir: &Path, label: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.log", label, timestamp))
}

impl LogSettings {
    /// Settings for one run; `label` names the log file when logging to a directory
    pub fn from_config(config: &Config, label: &str) -> Self {
        Self {
            verbosity: if config.verbose {
                Verbosity::Debug
            } else {
                Verbosity::Info
            },
            sink: config
                .log_dir
                .as_deref()
                .map(|dir| LogSink::File(log_file_path(dir, label)))
                .unwrap_or_default(),
            json: config.json_log,
        }
    }

    /// Install the subscriber for the current thread until the guard drops
    pub fn install_scoped(&self) -> std::io::Result<LogGuard> {
        let env_filter = EnvFilter::builder()
            .with_default_directive(self.verbosity.level().into())
            .from_env_lossy();

        let (writer, worker, ansi) = match &self.sink {
            LogSink::Stderr => (BoxMakeWriter::new(std::io::stderr), None, true),
            LogSink::Stdout => (BoxMakeWriter::new(std::io::stdout), None, true),
            LogSink::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard), false)
            }
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let subscriber_guard = if self.json {
            tracing::subscriber::set_default(
                registry.with(fmt::layer().json().with_ansi(false).with_writer(writer)),
            )
        } else {
            tracing::subscriber::set_default(
                registry.with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(ansi)
                        .with_writer(writer),
                ),
            )
        };

        Ok(LogGuard {
            _subscriber: subscriber_guard,
            _worker: worker,
        })
    }
}
