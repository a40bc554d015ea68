//! [tracing_subscriber] initialisation.

use crate::{LogConfig, LogRotation};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::MakeWriter,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

impl LogFormat {
    fn layer<W>(self, writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = tracing_subscriber::fmt::layer().with_writer(writer);
        match self {
            Self::Full => layer.boxed(),
            Self::Json => layer.json().boxed(),
            Self::Pretty => layer.pretty().boxed(),
            Self::Compact => layer.compact().boxed(),
        }
    }
}

impl LogRotation {
    fn appender(self, directory: &Path) -> RollingFileAppender {
        const FILE_NAME: &str = "offramp.log";
        match self {
            Self::Minutely => tracing_appender::rolling::minutely(directory, FILE_NAME),
            Self::Hourly => tracing_appender::rolling::hourly(directory, FILE_NAME),
            Self::Daily => tracing_appender::rolling::daily(directory, FILE_NAME),
            Self::Never => tracing_appender::rolling::never(directory, FILE_NAME),
        }
    }
}

impl LogConfig {
    /// Installs the global subscriber with the configured stdout and file layers.
    ///
    /// `env_filter` defaults to `RUST_LOG`; [`LogConfig::global_level`] is added on top.
    pub fn init_tracing_subscriber(
        &self,
        env_filter: Option<EnvFilter>,
    ) -> Result<(), TryInitError> {
        let mut layers = Vec::with_capacity(2);
        if let Some(stdout_logs) = &self.stdout_logs {
            layers.push(stdout_logs.format.layer(std::io::stdout));
        }
        if let Some(file_logs) = &self.file_logs {
            let appender = file_logs.rotation.appender(&file_logs.directory_path);
            layers.push(file_logs.format.layer(appender));
        }

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        tracing_subscriber::registry().with(layers).with(env_filter).try_init()
    }
}

/// Best effort subscriber for tests. Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = LogConfig::default().init_tracing_subscriber(None);
}
