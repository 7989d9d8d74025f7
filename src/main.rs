//! LongCalc - three ways to run a long computation behind a GUI
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend for LongCalc. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (daily file rotation + optional console output)
//! - Tokio runtime (workers for managed background tasks)
//! - GUI controller ([`GuiController`] - owns the window and its session)
//!
//! The application uses the following threads:
//! - **Main thread**: Runs the Slint event loop and owns all session state
//! - **Worker threads**: One per "worker thread" computation, posting results back
//! - **Tokio workers**: Run "background task" computations on the blocking pool
//!
//! # Execution Flow
//!
//! 1. Load `LongCalc Data/LongCalc Settings.yaml` (written with defaults on first run)
//! 2. Initialize logging -> logs/longcalc.<date>
//! 3. Create tokio runtime with the configured worker count
//! 4. Create GuiController and run the Slint event loop (blocks until window closed)
//! 5. Log metrics and shut the runtime down with a 5s timeout

use anyhow::Result;
use camino::Utf8Path;
use longcalc::logging::{LoggingOptions, setup_logging};
use longcalc::ui::GuiController;
use longcalc::{APP_NAME, ConfigManager, Metrics, VERSION};
use std::sync::Arc;
use std::time::Duration;

/// Main entry point for the LongCalc GUI application
///
/// # Errors
///
/// This function can fail if:
/// - The settings file exists but is not valid YAML
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - Slint UI initialization fails (graphics drivers, display)
fn main() -> Result<()> {
    // Settings decide the log level, so they are loaded before logging starts
    let config_manager = ConfigManager::new("LongCalc Data")?;
    let settings = config_manager.load_or_create_user_config()?.settings;

    let _log_guard = setup_logging(
        Utf8Path::new("logs"),
        "longcalc",
        LoggingOptions::from(&settings),
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Settings loaded from {}", config_manager.user_config_path());

    let worker_threads = settings.effective_worker_threads();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(worker_threads)
        .thread_name("longcalc-runtime")
        .build()?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        worker_threads
    );

    let metrics = Arc::new(Metrics::new());

    let gui_controller =
        GuiController::new(&settings, runtime.handle().clone(), Arc::clone(&metrics))?;

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");
    metrics.log_summary();

    // A background task still running its kernel is abandoned here
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
