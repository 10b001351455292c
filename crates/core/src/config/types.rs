use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pipeline::PipelineConfig;
use crate::redeem::Account;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub schedule: Option<ScheduleConfig>,
}

/// Credentials: one shared discovery token plus one cookie per account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Miniapp authorization token used by the discovery endpoints.
    pub authorization: String,
    /// Web-side cookie strings, one independent account each.
    #[serde(default)]
    pub account_cookies: Vec<String>,
}

impl CredentialsConfig {
    /// Materialize the configured cookies as accounts with 1-based ordinal
    /// ids, in configuration order.
    pub fn accounts(&self) -> Vec<Account> {
        self.account_cookies
            .iter()
            .enumerate()
            .map(|(i, cookie)| Account {
                id: i as u32 + 1,
                session: cookie.clone(),
            })
            .collect()
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-call network timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional forward proxy for web-side requests (captcha, submission).
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
            proxy: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Challenge solving configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub mode: SolverMode,
}

/// How challenge answers are produced.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// Human-in-the-loop prompt.
    #[default]
    Manual,
    /// External OCR integration supplied by the embedding application.
    Ocr,
}

/// Scheduled start configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Wall-clock instant at which the run starts.
    pub start_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_defaults() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout(), Duration::from_secs(5));
        assert!(http.proxy.is_none());
    }

    #[test]
    fn test_proxy_url() {
        let proxy = ProxyConfig {
            host: "u985.kdltps.com".to_string(),
            port: 15818,
        };
        assert_eq!(proxy.url(), "http://u985.kdltps.com:15818");
    }

    #[test]
    fn test_solver_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&SolverMode::Manual).unwrap(),
            "\"manual\""
        );
        assert_eq!(serde_json::to_string(&SolverMode::Ocr).unwrap(), "\"ocr\"");
    }

    #[test]
    fn test_accounts_get_ordinal_ids() {
        let credentials = CredentialsConfig {
            authorization: "token-abc".to_string(),
            account_cookies: vec!["uin=a; skey=1".to_string(), "uin=b; skey=2".to_string()],
        };
        let accounts = credentials.accounts();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, 1);
        assert_eq!(accounts[0].session, "uin=a; skey=1");
        assert_eq!(accounts[1].id, 2);
        assert_eq!(accounts[1].session, "uin=b; skey=2");
    }

    #[test]
    fn test_schedule_deserialization() {
        let toml = r#"start_at = "2026-09-01T09:59:30Z""#;
        let schedule: ScheduleConfig = toml::from_str(toml).unwrap();
        assert!(schedule.start_at.to_rfc3339().starts_with("2026-09-01T09:59:30"));
    }
}
