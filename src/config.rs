use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// data.gov.sg resource holding resale transactions from Jan 2017 onwards
const DEFAULT_RESOURCE_ID: &str = "d_8b84c4ee58e3cfc0ece0d773c8ca6abc";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub resource_id: String,
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.gov.sg".to_string(),
            resource_id: DEFAULT_RESOURCE_ID.to_string(),
            page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Static historical extract (2017-2024)
    pub static_csv_path: String,
    pub database_path: String,
    /// Live fetch keeps transactions from this year onward
    pub fetch_since_year: i32,
    pub api: ApiConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            static_csv_path: "resale_flat_2017_2024.csv".to_string(),
            database_path: "resale.db".to_string(),
            fetch_since_year: 2025,
            api: ApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Load configuration from a JSON file, falling back to defaults when
/// the file does not exist.
pub fn load_config(path: &str) -> Result<AppConfig> {
    if !Path::new(path).exists() {
        return Ok(AppConfig::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path))?;
    let config: AppConfig =
        serde_json::from_str(&content).with_context(|| format!("Invalid config: {}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, "resale.db");
        assert_eq!(config.api.page_size, 1000);
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"database_path": "custom.db"}"#).unwrap();

        assert_eq!(config.database_path, "custom.db");
        // Unspecified sections keep their defaults
        assert_eq!(config.static_csv_path, "resale_flat_2017_2024.csv");
        assert_eq!(config.api.base_url, "https://data.gov.sg");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config("no_such_config.json").unwrap();
        assert_eq!(config.fetch_since_year, 2025);
    }
}
