use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    /// Enables the following panel when set.
    pub user_id: Option<u64>,
    pub refresh_secs: u64,
    pub timeline: TimelineConfig,
    pub following: FollowingConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub title: String,
    pub position: Position,
    pub max_messages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowingConfig {
    pub title: String,
    pub position: Position,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            user_id: None,
            refresh_secs: 60,
            timeline: TimelineConfig::default(),
            following: FollowingConfig::default(),
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            title: "Home".to_string(),
            position: Position { row: 0, col: 0 },
            max_messages: 50,
        }
    }
}

impl Default for FollowingConfig {
    fn default() -> Self {
        Self {
            title: "Following".to_string(),
            position: Position { row: 0, col: 1 },
        }
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("warbletui").join("config.toml"))
}

pub fn load(path: Option<&Path>) -> Config {
    let path = match path.map(Path::to_path_buf).or_else(default_path) {
        Some(path) => path,
        None => return Config::default(),
    };

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                Config::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:5000");
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.user_id, None);
        assert_eq!(config.timeline.max_messages, 50);
        assert_eq!(config.following.position.col, 1);
    }

    #[test]
    fn loads_values_from_an_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server_url = "https://warble.example.com"
user_id = 7
refresh_secs = 15

[timeline]
title = "Feed"
position = {{ row = 0, col = 0 }}
max_messages = 10

[following]
title = "Follows"
position = {{ row = 1, col = 0 }}
"#
        )
        .unwrap();

        let config = load(Some(file.path()));
        assert_eq!(config.server_url, "https://warble.example.com");
        assert_eq!(config.user_id, Some(7));
        assert_eq!(config.refresh_secs, 15);
        assert_eq!(config.timeline.title, "Feed");
        assert_eq!(config.timeline.max_messages, 10);
        assert_eq!(config.following.position.row, 1);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "server_url = \"http://10.0.0.2:8000\"").unwrap();

        let config = load(Some(file.path()));
        assert_eq!(config.server_url, "http://10.0.0.2:8000");
        assert_eq!(config.refresh_secs, 60);
        assert_eq!(config.timeline.title, "Home");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "server_url = [not toml").unwrap();

        let config = load(Some(file.path()));
        assert_eq!(config.server_url, Config::default().server_url);
    }
}
