use crate::services::MAX_SAFE_INPUT;
use serde::{Deserialize, Serialize};

/// User configuration from LongCalc Settings.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "LongCalc_Settings", default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Largest accepted input; never above [`MAX_SAFE_INPUT`]
    #[serde(rename = "Max Input", default = "default_max_input")]
    pub max_input: u32,

    /// Text placed in the input field on startup
    #[serde(rename = "Default Input", default = "default_input")]
    pub default_input: String,

    #[serde(rename = "Worker Threads", default = "default_worker_threads")]
    pub worker_threads: usize,

    #[serde(rename = "Report Progress", default = "default_true")]
    pub report_progress: bool,

    /// How long a notification stays visible
    #[serde(rename = "Notification Millis", default = "default_notification_ms")]
    pub notification_ms: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Logging", default = "default_true")]
    pub console_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_input: default_max_input(),
            default_input: default_input(),
            worker_threads: default_worker_threads(),
            report_progress: true,
            notification_ms: default_notification_ms(),
            debug_mode: false,
            console_logging: true,
        }
    }
}

impl Settings {
    /// `max_input` clamped to what the result type can hold
    pub fn effective_max_input(&self) -> u32 {
        self.max_input.min(MAX_SAFE_INPUT)
    }

    /// Runtime worker count, at least one
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads.max(1)
    }
}

fn default_max_input() -> u32 {
    2000
}

fn default_input() -> String {
    "500".to_string()
}

fn default_worker_threads() -> usize {
    2
}

fn default_notification_ms() -> u64 {
    3500
}

fn default_true() -> bool {
    true
}
