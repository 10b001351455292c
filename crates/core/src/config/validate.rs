use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Credentials are present and non-empty
/// - Pipeline keyword and concurrency settings are usable
/// - Proxy host, when a proxy is configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Credentials validation
    if config.credentials.authorization.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "credentials.authorization cannot be empty".to_string(),
        ));
    }
    if config.credentials.account_cookies.is_empty() {
        return Err(ConfigError::ValidationError(
            "credentials.account_cookies must contain at least one account".to_string(),
        ));
    }
    if config
        .credentials
        .account_cookies
        .iter()
        .any(|c| c.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "credentials.account_cookies entries cannot be empty".to_string(),
        ));
    }

    // Pipeline validation
    if config.pipeline.keyword.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "pipeline.keyword cannot be empty".to_string(),
        ));
    }
    if config.pipeline.worker_count == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.worker_count must be at least 1".to_string(),
        ));
    }
    if config.pipeline.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    // Proxy validation
    if let Some(proxy) = &config.http.proxy {
        if proxy.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "http.proxy.host cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialsConfig, HttpConfig, ProxyConfig, SolverConfig};
    use crate::pipeline::PipelineConfig;

    fn valid_config() -> Config {
        Config {
            credentials: CredentialsConfig {
                authorization: "token-abc".to_string(),
                account_cookies: vec!["uin=a; skey=1".to_string()],
            },
            pipeline: PipelineConfig {
                keyword: "Day1".to_string(),
                ..PipelineConfig::default()
            },
            http: HttpConfig::default(),
            solver: SolverConfig::default(),
            schedule: None,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_authorization_fails() {
        let mut config = valid_config();
        config.credentials.authorization = "  ".to_string();
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_no_accounts_fails() {
        let mut config = valid_config();
        config.credentials.account_cookies.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_keyword_fails() {
        let mut config = valid_config();
        config.pipeline.keyword = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = valid_config();
        config.pipeline.worker_count = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_proxy_host_fails() {
        let mut config = valid_config();
        config.http.proxy = Some(ProxyConfig {
            host: String::new(),
            port: 15818,
        });
        assert!(validate_config(&config).is_err());
    }
}
