//! Pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one end-to-end run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Substring that identifies the target announcement title.
    pub keyword: String,

    /// Number of redundant discovery workers.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Backoff between attempts in every poll-until-success loop
    /// (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_worker_count() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl PipelineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            worker_count: default_worker_count(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.worker_count, 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"keyword = "Day1""#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.keyword, "Day1");
        assert_eq!(config.worker_count, 10);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            keyword = "Day2"
            worker_count = 4
            poll_interval_ms = 250
        "#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.keyword, "Day2");
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
    }
}
