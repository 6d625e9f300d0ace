//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AsaasEnvironment, LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the process configuration: defaults, then the optional file, then
/// environment variables looked up through `env`.
pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ProxyConfig::default(),
    };

    let mut errors = apply_env(&mut config, env);
    if let Err(mut semantic) = validate_config(&config) {
        errors.append(&mut semantic);
    }
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Load configuration using the real process environment.
pub fn load_from_env(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

fn read_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay recognised environment variables onto `config`.
///
/// Empty values are treated as unset. Returns the values that could not be
/// interpreted.
pub fn apply_env<F>(config: &mut ProxyConfig, env: F) -> Vec<ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    let mut errors = Vec::new();

    if let Some(key) = lookup("ASAAS_API_KEY") {
        config.credential.api_key = Some(key);
    }
    if let Some(raw) = lookup("ASAAS_API_KEY_RAW") {
        config.credential.api_key_raw = Some(raw);
    }

    if let Some(value) = lookup("ASAAS_ENV") {
        match AsaasEnvironment::parse(&value) {
            Some(environment) => config.upstream.environment = environment,
            None => errors.push(ValidationError::UnknownEnvironment(value)),
        }
    }
    if let Some(base_url) = lookup("ASAAS_BASE_URL") {
        config.upstream.base_url = Some(base_url);
    }

    if let Some(port) = lookup("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => {
                let host = config
                    .listener
                    .bind_address
                    .rsplit_once(':')
                    .map(|(host, _)| host.to_string())
                    .unwrap_or_else(|| "0.0.0.0".to_string());
                config.listener.bind_address = format!("{}:{}", host, port);
            }
            Err(_) => errors.push(ValidationError::InvalidPort(port)),
        }
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => config.observability.log_format = LogFormat::Json,
            "pretty" => config.observability.log_format = LogFormat::Pretty,
            _ => errors.push(ValidationError::UnknownLogFormat(format)),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SANDBOX_BASE_URL;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overlay() {
        let config = load_with_env(
            None,
            env_of(&[
                ("ASAAS_API_KEY_RAW", "aact_123"),
                ("ASAAS_ENV", "sandbox"),
                ("PORT", "8080"),
                ("LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.credential.api_key_raw.as_deref(), Some("aact_123"));
        assert_eq!(config.credential.api_key, None);
        assert_eq!(config.upstream.effective_base_url(), SANDBOX_BASE_URL);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = load_with_env(None, env_of(&[("ASAAS_API_KEY", "  ")])).unwrap();
        assert_eq!(config.credential.api_key, None);
    }

    #[test]
    fn test_bad_env_values_are_reported_together() {
        let err = load_with_env(
            None,
            env_of(&[("ASAAS_ENV", "staging"), ("PORT", "eighty")]),
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.contains(&ValidationError::UnknownEnvironment("staging".into())));
                assert!(errors.contains(&ValidationError::InvalidPort("eighty".into())));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
