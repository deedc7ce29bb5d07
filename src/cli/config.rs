use crate::error::{Result, TranslateError};
use crate::Target;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    pub target: Option<Target>,
    pub base_kind: Option<String>,
    pub overrides: Option<BTreeMap<String, String>>,
    pub theme: Option<String>,
    pub rule_paths: Option<Vec<String>>,
    pub fail_fast: Option<bool>,
    pub output_directory: Option<String>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| TranslateError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    let config = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| TranslateError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| TranslateError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })
    } else {
        Err(TranslateError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        })
    }?;
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}
