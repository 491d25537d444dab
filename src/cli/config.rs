// FILE: src/cli/config.rs

use crate::error::{CompilerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub animation_prefix: Option<String>,
    pub compact_output: Option<bool>,
    pub id_prefix: Option<String>,
    pub output_directory: Option<String>,
    pub include_keyframes: Option<bool>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        CompilerError::FileNotFound {
            path: format!("Config file {}: {}", config_path, e),
        }
    })?;

    let config = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| CompilerError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| CompilerError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })?
    } else {
        return Err(CompilerError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        });
    };

    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modstyle.toml");
        fs::write(&path, "animation_prefix = \"site\"\ncompact_output = true\n").unwrap();

        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.animation_prefix.as_deref(), Some("site"));
        assert_eq!(config.compact_output, Some(true));
        assert!(config.id_prefix.is_none());
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modstyle.json");
        fs::write(&path, r#"{ "id_prefix": "page", "include_keyframes": true }"#).unwrap();

        let config = load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.id_prefix.as_deref(), Some("page"));
        assert_eq!(config.include_keyframes, Some(true));
    }

    #[test]
    fn test_rejects_unknown_extension_and_bad_content() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("modstyle.yaml");
        fs::write(&yaml, "id_prefix: page").unwrap();
        assert!(matches!(load(yaml.to_str().unwrap()), Err(CompilerError::InvalidFormat { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{").unwrap();
        assert!(matches!(load(bad.to_str().unwrap()), Err(CompilerError::InvalidFormat { .. })));

        assert!(matches!(load("/nonexistent/modstyle.toml"), Err(CompilerError::FileNotFound { .. })));
    }
}
