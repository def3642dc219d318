use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::slack::DEFAULT_API_BASE_URL;
use crate::{AppError, Result};

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Messages requested per history/replies page.
    #[serde(default = "default_page_size", rename = "page-size")]
    pub page_size: u32,

    /// Seconds to wait between API calls.
    #[serde(default = "default_delay_seconds", rename = "delay-seconds")]
    pub delay_seconds: u64,

    #[serde(default = "default_api_base_url", rename = "api-base-url")]
    pub api_base_url: String,
}

fn default_page_size() -> u32 {
    100
}

fn default_delay_seconds() -> u64 {
    1
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            delay_seconds: default_delay_seconds(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| AppError::TomlParse(e.to_string()))
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.export.delay_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.export.page_size, 100);
        assert_eq!(settings.export.delay_seconds, 1);
        assert_eq!(settings.export.api_base_url, "https://slack.com/api");
        assert_eq!(settings.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_settings_deserialization() {
        let toml_content = r#"
[export]
page-size = 50
delay-seconds = 2
api-base-url = "http://localhost:8080/api"
"#;

        let settings: Settings = toml::from_str(toml_content).unwrap();

        assert_eq!(settings.export.page_size, 50);
        assert_eq!(settings.export.delay_seconds, 2);
        assert_eq!(settings.export.api_base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_settings_deserialization_empty() {
        let settings: Settings = toml::from_str("").unwrap();

        assert_eq!(settings.export.page_size, 100);
    }

    #[test]
    fn test_settings_deserialization_partial() {
        let toml_content = r#"
[export]
page-size = 25
"#;

        let settings: Settings = toml::from_str(toml_content).unwrap();

        assert_eq!(settings.export.page_size, 25);
        assert_eq!(settings.export.delay_seconds, 1);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        let settings = Settings::load_from(&tmp.path().join("settings.toml")).unwrap();

        assert_eq!(settings.export.page_size, 100);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "[export]\ndelay-seconds = 3\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "not [valid toml").unwrap();

        let err = Settings::load_from(&path).unwrap_err();

        assert!(matches!(err, AppError::TomlParse(_)));
    }
}
