#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

mod tracing;
pub use self::tracing::{LogFormat, init_test_tracing};

/// How often the log file is rolled over.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogRotation {
    /// Roll every minute.
    Minutely,
    /// Roll every hour.
    Hourly,
    /// Roll every day (default).
    #[default]
    Daily,
    /// Never roll.
    Never,
}

/// Configuration of the stdout log layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdoutLogs {
    /// Output format.
    pub format: LogFormat,
}

/// Configuration of the rolling file log layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogs {
    /// Directory the log files are written to.
    pub directory_path: PathBuf,
    /// Output format.
    pub format: LogFormat,
    /// Rotation policy.
    pub rotation: LogRotation,
}

/// Global logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level applied on top of the environment filter.
    pub global_level: LevelFilter,
    /// Stdout layer, disabled when `None`.
    pub stdout_logs: Option<StdoutLogs>,
    /// File layer, disabled when `None`.
    pub file_logs: Option<FileLogs>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global_level: LevelFilter::INFO,
            stdout_logs: Some(StdoutLogs::default()),
            file_logs: None,
        }
    }
}

/// Logging flags for binaries hosting the plugin.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct LogArgs {
    /// Verbosity level (0-5). `0` silences all logs.
    #[arg(short = 'v', long = "verbosity", default_value_t = 3, env = "OFFRAMP_LOG_VERBOSITY")]
    pub verbosity: u8,
    /// Format of the stdout logs.
    #[arg(long = "log.stdout.format", default_value = "full", env = "OFFRAMP_LOG_STDOUT_FORMAT")]
    pub stdout_format: LogFormat,
    /// Directory for rolling log files. File logging is disabled when unset.
    #[arg(long = "log.file.directory", env = "OFFRAMP_LOG_FILE_DIRECTORY")]
    pub file_directory: Option<PathBuf>,
    /// Format of the file logs.
    #[arg(long = "log.file.format", default_value = "json", env = "OFFRAMP_LOG_FILE_FORMAT")]
    pub file_format: LogFormat,
    /// Rotation of the file logs.
    #[arg(long = "log.file.rotation", default_value = "daily", env = "OFFRAMP_LOG_FILE_ROTATION")]
    pub file_rotation: LogRotation,
}

impl From<&LogArgs> for LogConfig {
    fn from(args: &LogArgs) -> Self {
        let global_level = match args.verbosity {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };
        Self {
            global_level,
            stdout_logs: Some(StdoutLogs { format: args.stdout_format }),
            file_logs: args.file_directory.as_ref().map(|directory_path| FileLogs {
                directory_path: directory_path.clone(),
                format: args.file_format,
                rotation: args.file_rotation,
            }),
        }
    }
}
