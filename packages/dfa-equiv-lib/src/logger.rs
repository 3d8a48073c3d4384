use std::{
    fmt::Display,
    fs::{self, File},
    path::PathBuf,
    str::FromStr,
    sync::Mutex,
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crate::config::LoggerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "war" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "Debug"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warn => write!(f, "Warn"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

/// Path of the log file for a run of the tool called `name`.
pub fn log_file_path(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "./logs/{}_{}.txt",
        name,
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    ))
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// Events always go to stderr. When `log_file` is set they are additionally
/// written, without colors, to [`log_file_path`]. Does nothing if logging is
/// disabled.
pub fn init_tracing(config: &LoggerConfig, name: &str) -> anyhow::Result<()> {
    if !*config.get_enabled() {
        return Ok(());
    }

    let level = LevelFilter::from_level(config.get_log_level().to_tracing());

    let file_layer = if *config.get_log_file() {
        let path = log_file_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;

        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(level)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()?;

    Ok(())
}

#[test]
fn test_log_level_parsing() {
    assert_eq!("DBG".parse::<LogLevel>(), Ok(LogLevel::Debug));
    assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert!("verbose".parse::<LogLevel>().is_err());
    assert_eq!(LogLevel::Error.to_string(), "Error");
}
