use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::transform::{DEFAULT_NAMESPACE, TransformOptions};

/// Top-level project configuration loaded from `.ocg.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcgConfig {
    pub input: String,
    pub output: String,
    /// Root namespace of the generated client.
    pub namespace: String,
    pub php: PhpConfig,
}

impl Default for OcgConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            php: PhpConfig::default(),
        }
    }
}

impl OcgConfig {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            namespace: self.namespace.clone(),
        }
    }
}

/// PHP package options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhpConfig {
    /// Composer package name (defaults to `vendor/<slugified title>`).
    pub package_name: Option<String>,
    /// Minimum PHP version required by the generated code.
    pub php_version: String,
}

impl Default for PhpConfig {
    fn default() -> Self {
        Self {
            package_name: None,
            php_version: "8.1".to_string(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".ocg.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OcgConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OcgConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# ocg configuration
input: openapi.yaml
output: generated
namespace: Api\Client   # root PHP namespace of the generated client

php:
  # package_name: acme/petstore-client   # composer package (defaults to vendor/<title>)
  php_version: "8.1"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OcgConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "generated");
        assert_eq!(config.namespace, "Api\\Client");
        assert!(config.php.package_name.is_none());
        assert_eq!(config.php.php_version, "8.1");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: out
namespace: Acme\Petstore
php:
  package_name: acme/petstore
  php_version: "8.2"
"#;
        let config: OcgConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.output, "out");
        assert_eq!(config.namespace, "Acme\\Petstore");
        assert_eq!(config.php.package_name.as_deref(), Some("acme/petstore"));
        assert_eq!(config.php.php_version, "8.2");
        assert_eq!(config.transform_options().namespace, "Acme\\Petstore");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: OcgConfig = serde_yaml_ng::from_str("input: api.yaml\n").unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.output, "generated");
        assert_eq!(config.php.php_version, "8.1");
    }

    #[test]
    fn test_default_content_parses() {
        let config: OcgConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.namespace, "Api\\Client");
        assert_eq!(config.output, "generated");
    }

    #[test]
    fn test_missing_file_is_none() {
        let missing = Path::new("definitely/not/here/.ocg.yaml");
        assert!(load_config(missing).unwrap().is_none());
    }
}
