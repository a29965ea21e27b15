//! Logging and tracing initialization.

use std::sync::Mutex;

use crate::config::LoggingConfig;
use crate::error::HandweaveResult;

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.file` is
/// set, output is appended to that file instead of stderr; failing to open
/// it is an error and leaves no subscriber installed.
pub fn init_logging(config: &LoggingConfig) -> HandweaveResult<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file = match &config.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    match (config.json, file) {
        (true, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (true, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
    Ok(())
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    // Without a log file there is nothing to open, so this cannot fail.
    let _ = init_logging(&LoggingConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_default_logging();
        init_default_logging();
        tracing::info!("logging initialized twice");
    }

    #[test]
    fn test_file_sink_is_created() {
        let path = std::env::temp_dir().join("handweave_test_logging.log");
        std::fs::remove_file(&path).ok();
        init_logging(&LoggingConfig {
            level: "debug".to_string(),
            json: true,
            file: Some(path.clone()),
        })
        .unwrap();
        assert!(path.exists());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let result = init_logging(&LoggingConfig {
            file: Some("/nonexistent/handweave/handweave.log".into()),
            ..LoggingConfig::default()
        });
        assert!(matches!(result, Err(crate::error::HandweaveError::Io(_))));
    }
}
