// Configuration loader
// Loads settings from ~/.nodedeck/config.toml, then environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::settings::Config;

/// Load configuration: file if present, defaults otherwise, and the
/// `NODEDECK_API_URL` environment variable on top of either.
pub fn load_config() -> Result<Config> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".nodedeck").join("config.toml");
    let mut config = load_from_path(&path)?;

    if let Ok(url) = std::env::var("NODEDECK_API_URL") {
        if !url.is_empty() {
            config.api_base_url = url;
        }
    }

    Ok(config)
}

fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_from_path(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.poll_interval_secs, 5);
    }

    #[test]
    fn test_file_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "api_base_url = \"http://10.0.0.2:8081/api\"\n").unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.2:8081/api");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "api_base_url = [not toml").unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
