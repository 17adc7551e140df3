//! Configuration module.
//!
//! The library is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [cleanup]
//! target_dir = "${APP_DATA_DIR}/sessions"
//! max_age_days = 7
//! disk_threshold_percent = 70.0
//!
//! [observability.logging]
//! level = "info"
//! format = "compact"
//! ```

mod cleanup;
mod observability;

use std::path::Path;

pub use cleanup::*;
pub use observability::*;
use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// The `[cleanup]` section is mandatory (it names the managed directory);
/// observability falls back to sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustodianConfig {
    /// Session cleanup configuration.
    pub cleanup: CleanupConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl CustodianConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: CustodianConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        self.cleanup.validate()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables appearing after a `#` comment on a line are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            result.push('\n');
        }

        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let whole = cap.get(0).unwrap();

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        result.push('\n');
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = CustodianConfig::from_str(
            r#"
            [cleanup]
            target_dir = "/srv/sessions"
        "#,
        )
        .unwrap();

        assert_eq!(config.cleanup.max_age_days, 7);
        assert_eq!(config.observability.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_missing_cleanup_section_fails() {
        let result = CustodianConfig::from_str("");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_thresholds_rejected_at_load() {
        let result = CustodianConfig::from_str(
            r#"
            [cleanup]
            target_dir = "/srv/sessions"
            disk_threshold_percent = 80.0
            emergency_threshold_percent = 75.0
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("CUSTODIAN_TEST_ROOT", Some("/data/sessions"), || {
            let config = CustodianConfig::from_str(
                r#"
                [cleanup]
                target_dir = "${CUSTODIAN_TEST_ROOT}"
            "#,
            )
            .unwrap();
            assert_eq!(
                config.cleanup.target_dir,
                std::path::PathBuf::from("/data/sessions")
            );
        });
    }

    #[test]
    fn test_missing_env_var_is_error() {
        let result = CustodianConfig::from_str(
            r#"
            [cleanup]
            target_dir = "${CUSTODIAN_DEFINITELY_UNSET_VAR}"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound(_))));
    }

    #[test]
    fn test_env_vars_in_comments_ignored() {
        let expanded = expand_env_vars(
            "# uses ${CUSTODIAN_DEFINITELY_UNSET_VAR} when set\nkey = 1\n",
        )
        .unwrap();
        assert!(expanded.contains("${CUSTODIAN_DEFINITELY_UNSET_VAR}"));
        assert!(expanded.contains("key = 1"));
    }
}
