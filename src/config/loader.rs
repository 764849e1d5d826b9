//! Layered configuration loading
//!
//! Values are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. The TOML file, if it exists (`${VAR}` placeholders are substituted)
//! 3. `DOCFLOW_<SECTION>_<KEY>` environment variables

use super::schema::DocflowConfig;
use super::secret::secret_string;
use crate::domain::errors::DocflowError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from an optional TOML file plus environment overrides
///
/// A missing file is not an error: defaults are used instead. An unreadable
/// or malformed file is.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read or parsed
/// - A referenced `${VAR}` is not set
/// - Validation fails after all layers are applied
///
/// # Examples
///
/// ```no_run
/// use docflow::config::loader::load_config;
///
/// let config = load_config("docflow.toml").expect("Failed to load config");
/// println!("listening on {}", config.server.bind_address());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DocflowConfig> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            DocflowError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        parse_config(&contents)?
    } else {
        tracing::debug!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        DocflowConfig::default()
    };

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        DocflowError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Parses TOML contents after environment variable substitution
pub fn parse_config(contents: &str) -> Result<DocflowConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| DocflowError::Configuration(format!("Failed to parse TOML: {}", e)))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DocflowError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DocflowError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Reads and parses one override; unparseable values are logged and skipped
fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

/// Applies environment variable overrides using the DOCFLOW_* prefix
///
/// Environment variables follow the pattern: DOCFLOW_<SECTION>_<KEY>
/// For example: DOCFLOW_SERVER_PORT, DOCFLOW_STORE_BACKEND
fn apply_env_overrides(config: &mut DocflowConfig) {
    // Application overrides
    if let Some(val) = env_override("DOCFLOW_APPLICATION_DEV") {
        config.application.dev = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val.to_lowercase();
    }

    // Server overrides
    if let Ok(val) = std::env::var("DOCFLOW_SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(val) = env_override("DOCFLOW_SERVER_PORT") {
        config.server.port = val;
    }
    if let Some(val) = env_override("DOCFLOW_SERVER_SHUTDOWN_TIMEOUT_SECS") {
        config.server.shutdown_timeout_secs = val;
    }

    // Store overrides
    if let Some(val) = env_override("DOCFLOW_STORE_BACKEND") {
        config.store.backend = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_STORE_CONNECTION_STRING") {
        config.store.connection_string = secret_string(val);
    }
    if let Some(val) = env_override("DOCFLOW_STORE_MAX_CONNECTIONS") {
        config.store.max_connections = val;
    }
    if let Some(val) = env_override("DOCFLOW_STORE_CONNECTION_TIMEOUT_SECONDS") {
        config.store.connection_timeout_seconds = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_STORE_DOCUMENT_COLLECTION") {
        config.store.document_collection = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_STORE_BATCH_COLLECTION") {
        config.store.batch_collection = val;
    }

    // Timeout overrides
    let timeouts = &mut config.store.timeouts;
    for (name, slot) in [
        ("DOCFLOW_STORE_TIMEOUTS_INSERT_MS", &mut timeouts.insert_ms),
        ("DOCFLOW_STORE_TIMEOUTS_FIND_MS", &mut timeouts.find_ms),
        ("DOCFLOW_STORE_TIMEOUTS_UPDATE_MS", &mut timeouts.update_ms),
        ("DOCFLOW_STORE_TIMEOUTS_BULK_MS", &mut timeouts.bulk_ms),
        ("DOCFLOW_STORE_TIMEOUTS_PING_MS", &mut timeouts.ping_ms),
        ("DOCFLOW_STORE_TIMEOUTS_INDEX_MS", &mut timeouts.index_ms),
    ] {
        if let Some(val) = env_override(name) {
            *slot = val;
        }
    }

    // Logging overrides
    if let Some(val) = env_override("DOCFLOW_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("DOCFLOW_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StoreBackend;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("DOCFLOW_LOADER_TEST_VAR", "test_value");
        let input = "connection_string = \"${DOCFLOW_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "connection_string = \"test_value\"\n");
        std::env::remove_var("DOCFLOW_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("DOCFLOW_LOADER_MISSING_VAR");
        let input = "connection_string = \"${DOCFLOW_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("DOCFLOW_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# connection_string = \"${DOCFLOW_LOADER_NEVER_SET}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_parse_config_sections() {
        let config = parse_config(
            r#"
[application]
dev = true

[server]
port = 9090

[store]
backend = "memory"
document_collection = "docs"
batch_collection = "doc_batches"

[store.timeouts]
bulk_ms = 5000
"#,
        )
        .unwrap();

        assert!(config.application.dev);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.document_collection, "docs");
        assert_eq!(config.store.timeouts.bulk_ms, 5000);
        assert_eq!(config.store.timeouts.insert_ms, 2000);
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let err = parse_config("[server\nport = 1").unwrap_err();
        assert!(matches!(err, DocflowError::Configuration(_)));
    }
}
