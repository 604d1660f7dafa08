//! Provides utilities to initialize logging.
use std::env;

use tracing::*;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    Layer,
};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "IC_PUB_KEY_SVC_LABEL";

/// Prints source file names when set to `1`.
pub const LOG_FILE_ENVVAR: &str = "LOG_FILE";

/// Prints source line numbers when set to `1`.
pub const LOG_LINE_NUM_ENVVAR: &str = "LOG_LINE_NUM";

/// Configuration for the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set.
    pub const fn new(whoami: String) -> Self {
        Self { whoami }
    }

    /// Creates a new instance with the whoami string set to the provided
    /// string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// The whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(ic-pub-key)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// # Panics
///
/// If a global subscriber has already been installed. Use [`try_init`] where that can happen,
/// e.g. in tests.
pub fn init(config: LoggerConfig) {
    tracing_subscriber::registry().with(stdout_layer()).init();
    info!(whoami = %config.whoami, "logging started");
}

/// Like [`init`], but returns an error instead of panicking when a global subscriber is
/// already installed.
pub fn try_init(config: LoggerConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(stdout_layer())
        .try_init()?;
    info!(whoami = %config.whoami, "logging started");
    Ok(())
}

/// Compact stdout logging filtered by `RUST_LOG`.
fn stdout_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let log_file = env::var(LOG_FILE_ENVVAR).is_ok_and(|v| v == "1");
    let log_line_num = env::var(LOG_LINE_NUM_ENVVAR).is_ok_and(|v| v == "1");

    tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(filt)
}

/// Gets the service label from the standard envvar, which should be included
/// in the whoami string.
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Computes a standard whoami string.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
