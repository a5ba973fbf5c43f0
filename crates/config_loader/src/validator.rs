//! 配置校验模块
//!
//! 校验规则：
//! - topic 非空，不含空白或逗号
//! - broker 列表每一项均为 host:port
//! - HTTP pattern 以 '/' 开头，且为字面路径
//! - max_body_bytes / shutdown_drain_timeout_ms / schema_registry_timeout_ms > 0
//! - reject 策略的 max_in_flight 在 (0, Semaphore::MAX_PERMITS] 之间
//! - schema_registry_url 与 schema 必须同时出现

use contracts::{BridgeConfig, ContractError, OverloadPolicy};
use tokio::sync::Semaphore;

/// 校验 BridgeConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &BridgeConfig) -> Result<(), ContractError> {
    validate_topic(config)?;
    validate_broker_list(config)?;
    validate_http(config)?;
    validate_schema_settings(config)?;
    validate_timeouts(config)?;
    Ok(())
}

fn validate_topic(config: &BridgeConfig) -> Result<(), ContractError> {
    if config.topic.is_empty() {
        return Err(ContractError::config_validation(
            "topic",
            "topic cannot be empty",
        ));
    }
    if config
        .topic
        .chars()
        .any(|c| c.is_whitespace() || c == ',')
    {
        return Err(ContractError::config_validation(
            "topic",
            format!("topic '{}' contains whitespace or ','", config.topic),
        ));
    }
    Ok(())
}

/// 校验 broker 地址 (host:port)
fn validate_broker_list(config: &BridgeConfig) -> Result<(), ContractError> {
    let addresses = config.broker_addresses();
    if addresses.is_empty() {
        return Err(ContractError::config_validation(
            "broker_list",
            "broker list cannot be empty",
        ));
    }

    for (idx, addr) in addresses.iter().enumerate() {
        let Some((host, port)) = addr.rsplit_once(':') else {
            return Err(ContractError::config_validation(
                format!("broker_list[{idx}]"),
                format!("'{addr}' is not host:port"),
            ));
        };
        if host.is_empty() {
            return Err(ContractError::config_validation(
                format!("broker_list[{idx}]"),
                format!("'{addr}' has an empty host"),
            ));
        }
        if port.parse::<u16>().is_err() {
            return Err(ContractError::config_validation(
                format!("broker_list[{idx}]"),
                format!("'{addr}' has an invalid port"),
            ));
        }
    }
    Ok(())
}

/// 校验 HTTP 入口
fn validate_http(config: &BridgeConfig) -> Result<(), ContractError> {
    let http = &config.http;

    if !http.pattern.starts_with('/') {
        return Err(ContractError::config_validation(
            "http.pattern",
            format!("pattern must start with '/', got '{}'", http.pattern),
        ));
    }

    if http.pattern.contains(['{', '}', '*', ':']) {
        return Err(ContractError::config_validation(
            "http.pattern",
            format!("pattern must be a literal path, got '{}'", http.pattern),
        ));
    }

    if http.max_body_bytes == 0 {
        return Err(ContractError::config_validation(
            "http.max_body_bytes",
            "max_body_bytes must be > 0",
        ));
    }

    if let OverloadPolicy::Reject { max_in_flight: 0 } = http.overload {
        return Err(ContractError::config_validation(
            "http.overload.max_in_flight",
            "max_in_flight must be > 0 for the reject policy",
        ));
    }

    if let OverloadPolicy::Reject { max_in_flight } = http.overload {
        if max_in_flight > Semaphore::MAX_PERMITS {
            return Err(ContractError::config_validation(
                "http.overload.max_in_flight",
                format!(
                    "max_in_flight {max_in_flight} exceeds the limit of {}",
                    Semaphore::MAX_PERMITS
                ),
            ));
        }
    }

    Ok(())
}

/// 校验 schema registry 与 schema 成对出现
fn validate_schema_settings(config: &BridgeConfig) -> Result<(), ContractError> {
    match (&config.schema_registry_url, &config.schema) {
        (Some(url), Some(_)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ContractError::config_validation(
                    "schema_registry_url",
                    format!("'{url}' must use http:// or https://"),
                ));
            }
            Ok(())
        }
        (Some(_), None) => Err(ContractError::config_validation(
            "schema",
            "schema is required when schema_registry_url is set",
        )),
        (None, Some(_)) => Err(ContractError::config_validation(
            "schema_registry_url",
            "schema is set but schema_registry_url is missing",
        )),
        (None, None) => Ok(()),
    }
}

fn validate_timeouts(config: &BridgeConfig) -> Result<(), ContractError> {
    if config.shutdown_drain_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "shutdown_drain_timeout_ms",
            "shutdown_drain_timeout_ms must be > 0",
        ));
    }
    if config.schema_registry_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "schema_registry_timeout_ms",
            "schema_registry_timeout_ms must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> BridgeConfig {
        BridgeConfig::new("events", "localhost:9092")
    }

    fn assert_invalid(config: &BridgeConfig, expected: &str) {
        let result = validate(config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains(expected), "got: {err}");
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_empty_topic() {
        let mut config = minimal_config();
        config.topic = String::new();
        assert_invalid(&config, "cannot be empty");
    }

    #[test]
    fn test_topic_with_comma() {
        let mut config = minimal_config();
        config.topic = "a,b".into();
        assert_invalid(&config, "contains whitespace");
    }

    #[test]
    fn test_broker_without_port() {
        let mut config = minimal_config();
        config.broker_list = "localhost:9092,kafka-2".into();
        assert_invalid(&config, "broker_list[1]");
    }

    #[test]
    fn test_broker_invalid_port() {
        let mut config = minimal_config();
        config.broker_list = "localhost:99999".into();
        assert_invalid(&config, "invalid port");
    }

    #[test]
    fn test_empty_broker_list() {
        let mut config = minimal_config();
        config.broker_list = " , ".into();
        assert_invalid(&config, "broker list cannot be empty");
    }

    #[test]
    fn test_pattern_without_slash() {
        let mut config = minimal_config();
        config.http.pattern = "marathon".into();
        assert_invalid(&config, "must start with '/'");
    }

    #[test]
    fn test_pattern_with_wildcard() {
        let mut config = minimal_config();
        config.http.pattern = "/events/{*rest}".into();
        assert_invalid(&config, "literal path");
    }

    #[test]
    fn test_reject_policy_zero() {
        let mut config = minimal_config();
        config.http.overload = OverloadPolicy::Reject { max_in_flight: 0 };
        assert_invalid(&config, "max_in_flight");
    }

    #[test]
    fn test_reject_policy_above_semaphore_limit() {
        let mut config = minimal_config();
        config.http.overload = OverloadPolicy::Reject {
            max_in_flight: usize::MAX,
        };
        assert_invalid(&config, "exceeds the limit");

        config.http.overload = OverloadPolicy::Reject {
            max_in_flight: Semaphore::MAX_PERMITS,
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_registry_requires_schema() {
        let mut config = minimal_config();
        config.schema_registry_url = Some("http://registry:8081".into());
        assert_invalid(&config, "schema is required");
    }

    #[test]
    fn test_schema_requires_registry() {
        let mut config = minimal_config();
        config.schema = Some(r#"{"type": "string"}"#.into());
        assert_invalid(&config, "schema_registry_url is missing");
    }

    #[test]
    fn test_registry_url_scheme() {
        let mut config = minimal_config();
        config.schema_registry_url = Some("registry:8081".into());
        config.schema = Some(r#"{"type": "string"}"#.into());
        assert_invalid(&config, "http://");
    }

    #[test]
    fn test_zero_registry_timeout() {
        let mut config = minimal_config();
        config.schema_registry_timeout_ms = 0;
        assert_invalid(&config, "schema_registry_timeout_ms");
    }

    #[test]
    fn test_zero_drain_timeout() {
        let mut config = minimal_config();
        config.shutdown_drain_timeout_ms = 0;
        assert_invalid(&config, "shutdown_drain_timeout_ms");
    }
}
