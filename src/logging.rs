use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging switches, usually taken from [`Settings`](crate::models::Settings)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOptions {
    /// Use the debug level instead of info
    pub debug_mode: bool,

    /// Also log to the console with ANSI colors
    pub console_output: bool,
}

impl From<&crate::models::Settings> for LoggingOptions {
    fn from(settings: &crate::models::Settings) -> Self {
        Self {
            debug_mode: settings.debug_mode,
            console_output: settings.console_logging,
        }
    }
}

/// Create the log directory if it doesn't exist
pub fn ensure_log_dir(log_dir: &Utf8Path) -> Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

/// Setup logging with a daily rotating file appender and optional console output.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "longcalc")
/// * `options` - Level and console switches
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
///
/// # Errors
/// Fails if the directory cannot be created or a global subscriber is already set.
pub fn setup_logging(
    log_dir: &Utf8Path,
    log_prefix: &str,
    options: LoggingOptions,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    ensure_log_dir(log_dir)?;

    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if options.debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_names(true) // worker vs UI thread is the interesting bit here
        .with_file(true)
        .with_line_number(true);

    let console_layer = options.console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
            .with_thread_names(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        log_dir,
        log_prefix,
        options.debug_mode,
        options.console_output
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    #[allow(unused_variables)]
    fn test_setup_logging() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("logs")).unwrap();

        // May fail if another test already installed a subscriber,
        // but the directory is created first either way
        let result = setup_logging(&log_dir, "test", LoggingOptions::default());

        assert!(log_dir.exists());
    }

    #[test]
    fn test_ensure_log_dir_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("nested").join("logs")).unwrap();

        ensure_log_dir(&log_dir).unwrap();
        ensure_log_dir(&log_dir).unwrap();

        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_options_from_settings() {
        let settings = crate::models::Settings {
            debug_mode: true,
            console_logging: false,
            ..Default::default()
        };

        let options = LoggingOptions::from(&settings);
        assert!(options.debug_mode);
        assert!(!options.console_output);
    }
}
