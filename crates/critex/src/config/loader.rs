use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variables recognised by [`Config::from_env`] and
/// [`apply_env_overrides`]. Names follow the service's conventional
/// deployment variables.
pub const ENV_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
pub const ENV_PROCESSOR: &str = "DOCUMENT_AI_PROCESSOR_ID";
pub const ENV_LOCATION: &str = "DOCUMENT_AI_LOCATION";
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_OUTPUT_DIR: &str = "DEFAULT_OUTPUT_DIR";
pub const ENV_MAX_FILE_SIZE: &str = "MAX_FILE_SIZE";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Builds a config purely from the environment. Required:
/// `GOOGLE_CLOUD_PROJECT`, `DOCUMENT_AI_PROCESSOR_ID`,
/// `GOOGLE_APPLICATION_CREDENTIALS`. Location defaults to "us".
pub fn config_from_env() -> Result<Config, ConfigError> {
    let require = |key: &str| {
        std::env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                key: key.to_string(),
            })
    };

    let mut json = serde_json::json!({
        "version": "1.0",
        "project_id": require(ENV_PROJECT)?,
        "processor_id": require(ENV_PROCESSOR)?,
        "credentials_path": require(ENV_CREDENTIALS)?,
    });

    if let Ok(location) = std::env::var(ENV_LOCATION) {
        json["location"] = location.into();
    }
    if let Ok(output_dir) = std::env::var(ENV_OUTPUT_DIR) {
        json["output_directory"] = output_dir.into();
    }
    if let Ok(size) = std::env::var(ENV_MAX_FILE_SIZE) {
        let parsed: u64 = size.parse().map_err(|_| ConfigError::Validation {
            message: format!("{} must be an integer (megabytes), got '{}'", ENV_MAX_FILE_SIZE, size),
        })?;
        json["max_file_size_mb"] = parsed.into();
    }

    let config: Config = serde_json::from_value(json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Applies environment overrides on top of a file-based config. Set
/// variables win over file values; unset ones leave the file values
/// untouched. Re-validates afterwards.
pub fn apply_env_overrides(mut config: Config) -> Result<Config, ConfigError> {
    let overrides: [(&str, fn(&mut Config, String)); 5] = [
        (ENV_PROJECT, |c, v| c.project_id = v),
        (ENV_PROCESSOR, |c, v| c.processor_id = v),
        (ENV_LOCATION, |c, v| c.location = v),
        (ENV_CREDENTIALS, |c, v| c.credentials_path = v),
        (ENV_OUTPUT_DIR, |c, v| c.output_directory = v),
    ];

    for (key, apply) in overrides {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                apply(&mut config, value);
            }
        }
    }

    if let Ok(size) = std::env::var(ENV_MAX_FILE_SIZE) {
        config.max_file_size_mb = size.parse().map_err(|_| ConfigError::Validation {
            message: format!("{} must be an integer (megabytes), got '{}'", ENV_MAX_FILE_SIZE, size),
        })?;
    }

    validate_config(&config)?;
    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let required = [
        ("project_id", &config.project_id),
        ("processor_id", &config.processor_id),
        ("location", &config.location),
        ("credentials_path", &config.credentials_path),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: key.to_string(),
            });
        }
    }

    let credentials = Path::new(&config.credentials_path);
    if !credentials.exists() {
        return Err(ConfigError::CredentialsNotFound {
            path: credentials.to_path_buf(),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&config.confidence_threshold) {
        return Err(ConfigError::Validation {
            message: format!(
                "confidence_threshold must be within [0, 1], got {}",
                config.confidence_threshold
            ),
        });
    }

    Ok(())
}
