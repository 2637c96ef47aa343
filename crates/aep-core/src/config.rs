use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Project configuration loaded from `.aep.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AepConfig {
    /// Base address requests are sent to. Falls back to the document's server.
    pub server_url: Option<String>,
    /// Path or URL of the OpenAPI document.
    pub openapi: Option<String>,
    /// Headers applied to every request.
    pub headers: IndexMap<String, String>,
    /// Log every request and response at debug level.
    pub log_http: bool,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".aep.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<AepConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# aep configuration
# openapi: ./openapi.json          # path or http(s) URL of the API description
# server_url: http://localhost:8081

headers: {}
  # x-api-key: change-me

log_http: false
"#
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AepConfig::default();
        assert!(config.server_url.is_none());
        assert!(config.openapi.is_none());
        assert!(config.headers.is_empty());
        assert!(!config.log_http);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
openapi: https://example.com/openapi.json
server_url: http://localhost:8081
headers:
  x-api-key: secret
  x-trace: "1"
log_http: true
"#;
        let config: AepConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            config.openapi.as_deref(),
            Some("https://example.com/openapi.json")
        );
        assert_eq!(config.server_url.as_deref(), Some("http://localhost:8081"));
        assert_eq!(
            config.headers.keys().collect::<Vec<_>>(),
            vec!["x-api-key", "x-trace"]
        );
        assert!(config.log_http);
    }

    #[test]
    fn test_default_content_parses() {
        let config: AepConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config, AepConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "server_url: http://h").unwrap();

        let loaded = load_config(&path).unwrap().unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://h"));
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "headers: [unclosed").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
