use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Daily calorie goal (kcal)
    pub calorie_goal: i64,
    /// Daily protein goal (grams)
    pub protein_goal: i64,
    /// API key for the nutrition extraction service
    pub api_key: String,
    /// Base URL of the extraction service (OpenAI-compatible)
    pub api_url: String,
    /// Model name sent with each extraction request
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("macrolog");
        Self {
            database_path: data_dir.join("macrolog.db"),
            calorie_goal: 2000,
            protein_goal: 150,
            api_key: String::new(),
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("MACROLOG_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(goal) = std::env::var("MACROLOG_CALORIE_GOAL") {
            if let Ok(goal) = goal.parse() {
                config.calorie_goal = goal;
            }
        }
        if let Ok(goal) = std::env::var("MACROLOG_PROTEIN_GOAL") {
            if let Ok(goal) = goal.parse() {
                config.protein_goal = goal;
            }
        }
        if let Ok(key) = std::env::var("MACROLOG_API_KEY") {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("MACROLOG_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = std::env::var("MACROLOG_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Write the configuration to `path` as YAML, creating parent
    /// directories as needed. Used by `config set`.
    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(path.clone(), e))?;
        }
        let contents = serde_yaml::to_string(self).map_err(ConfigError::SerializeError)?;
        std::fs::write(path, contents).map_err(|e| ConfigError::WriteError(path.clone(), e))
    }

    /// Default config file path (platform config dir + macrolog/config.yaml)
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("macrolog")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    WriteError(PathBuf, std::io::Error),
    SerializeError(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::WriteError(path, e) => {
                write!(f, "Failed to write config file '{}': {}", path.display(), e)
            }
            ConfigError::SerializeError(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config
            .database_path
            .to_string_lossy()
            .contains("macrolog.db"));
        assert_eq!(config.calorie_goal, 2000);
        assert_eq!(config.protein_goal, 150);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.calorie_goal, 2000);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "calorie_goal: 2400").unwrap();
        writeln!(file, "protein_goal: 180").unwrap();
        writeln!(file, "api_key: sk-test").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.calorie_goal, 2400);
        assert_eq!(config.protein_goal, 180);
        assert_eq!(config.api_key, "sk-test");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "protein_goal: 200").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.protein_goal, 200);
        assert_eq!(config.calorie_goal, 2000);
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.calorie_goal = 1800;
        config.api_key = "sk-roundtrip".to_string();
        config.save(&config_path).unwrap();

        let loaded = Config::load(Some(config_path)).unwrap();
        assert_eq!(loaded.calorie_goal, 1800);
        assert_eq!(loaded.api_key, "sk-roundtrip");
    }
}
