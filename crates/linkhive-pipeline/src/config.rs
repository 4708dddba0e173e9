//! Configuration for the link worker.

use linkhive_core::defaults;

/// Configuration for one worker instance.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Whether to dispatch processing at all. A disabled worker still
    /// serves ingest and replica queries.
    pub enabled: bool,
    /// Maximum characters of extracted text handed to the summarizer.
    pub summary_input_cap: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            summary_input_cap: defaults::SUMMARY_INPUT_CAP,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LINK_WORKER_ENABLED` | `true` | Enable/disable processing dispatch |
    /// | `SUMMARY_INPUT_CAP` | `4000` | Max summarizer input characters |
    pub fn from_env() -> Self {
        let enabled = std::env::var("LINK_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let summary_input_cap = std::env::var("SUMMARY_INPUT_CAP")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::SUMMARY_INPUT_CAP)
            .max(1);

        Self {
            enabled,
            summary_input_cap,
        }
    }

    /// Enable or disable processing dispatch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the summarizer input cap.
    pub fn with_summary_input_cap(mut self, cap: usize) -> Self {
        self.summary_input_cap = cap;
        self
    }
}
