//! Provides utilities to initialize logging.
use std::env;

use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable name for the service label, which is appended to the
/// whoami string.
pub const SVC_LABEL_ENVVAR: &str = "ARK_TX_SVC_LABEL";

/// Directive used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// The whoami string, which is used to identify the service in logs.
    whoami: String,

    /// Whether to write logs to stderr, leaving stdout to the program's output.
    stderr: bool,
}

impl LoggerConfig {
    /// Creates a new instance with whoami set that logs to stdout.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            stderr: false,
        }
    }

    /// Creates a new instance with the whoami string set to the provided
    /// string.
    pub fn with_base_name(s: &str) -> Self {
        Self::new(get_whoami_string(s))
    }

    /// Sends the logs to stderr.
    pub const fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    /// Gets the whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(ark-tx)")
    }
}

/// Initializes the logging subsystem with the provided config.
///
/// The filter is read from `RUST_LOG`. Setting `LOG_FILE=1` or `LOG_LINE_NUM=1` adds the source
/// location of every event.
pub fn init(config: LoggerConfig) {
    let filt =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let log_file = env::var("LOG_FILE").is_ok_and(|v| v == "1");
    let log_line_num = env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    let format = tracing_subscriber::fmt::format()
        .with_file(log_file)
        .with_line_number(log_line_num);

    let fmt_sub = if config.stderr {
        tracing_subscriber::fmt::layer()
            .compact()
            .event_format(format)
            .with_writer(std::io::stderr)
            .with_filter(filt)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .compact()
            .event_format(format)
            .with_filter(filt)
            .boxed()
    };

    tracing_subscriber::registry().with(fmt_sub).init();

    info!(whoami = %config.whoami, "logging started");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_flag() {
        let config = LoggerConfig::new("ark".to_owned());
        assert!(!config.stderr);
        assert!(config.with_stderr().stderr);
    }

    #[test]
    fn whoami_uses_base_name() {
        let whoami = get_whoami_string("(ark-tx)");

        match get_service_label_from_env() {
            Some(label) => assert_eq!(whoami, format!("(ark-tx)%{label}")),
            None => assert_eq!(whoami, "(ark-tx)"),
        }
    }
}
