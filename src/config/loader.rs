//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ApiKey, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `upstream.base_url`.
pub const ENV_BASE_URL: &str = "DONGHUA_API_URL";
/// Environment variable overriding `upstream.api_key`.
pub const ENV_API_KEY: &str = "DONGHUA_API_KEY";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "DONGHUA_GATEWAY_BIND";

/// Error type for configuration loading.
#[derive(Debug, Error)]
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

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment values onto a parsed configuration.
///
/// `lookup` is usually `std::env::var(..).ok()`; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.upstream.base_url = Some(base_url);
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.upstream.api_key = Some(ApiKey::new(key));
    }
    if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, process_env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from defaults plus environment only, and validate.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config, process_env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::config::schema::LogFormat;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:3000"

[upstream]
base_url = "https://upstream.example/v1"
api_key = "from-file"
timeout_secs = 8

[route]
prefix = "/api/anime"
allowed_prefixes = ["home", "search"]

[observability]
log_format = "json"
"#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(
            config.upstream.base_url.as_deref(),
            Some("https://upstream.example/v1")
        );
        assert_eq!(config.upstream.api_key.unwrap().expose(), "from-file");
        assert_eq!(config.upstream.timeout_secs, 8);
        // untouched fields keep their defaults
        assert_eq!(config.upstream.api_key_header, "X-API-Key");
        assert_eq!(config.route.prefix, "/api/anime");
        assert_eq!(config.route.allowed_prefixes, vec!["home", "search"]);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[upstream\nbase_url = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides_win_and_blank_is_ignored() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_BASE_URL, "  "),
            (ENV_BIND_ADDRESS, "0.0.0.0:9999"),
        ]
        .into_iter()
        .collect();

        let mut config = parse_config(SAMPLE).unwrap();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.upstream.api_key.unwrap().expose(), "from-env");
        assert_eq!(
            config.upstream.base_url.as_deref(),
            Some("https://upstream.example/v1")
        );
        assert_eq!(config.listener.bind_address, "0.0.0.0:9999");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.route.prefix, "/api/anime");
    }

    #[test]
    fn test_load_config_rejects_missing_key() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[upstream]\nbase_url = \"https://upstream.example\"\n")
            .unwrap();

        // Only meaningful when the key is not provided by the environment.
        if std::env::var(ENV_API_KEY).is_ok() {
            return;
        }
        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.contains(&ValidationError::MissingApiKey));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
