use std::path::PathBuf;
use serde::Deserialize;
use anyhow::{Result, Context};

use crate::core::persist::{DataFiles, USERS_FILE, FRIENDS_FILE, POSTS_FILE};

pub const CONFIG_FILE: &str = "socialnet.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_friends_file")]
    pub friends_file: String,
    #[serde(default = "default_posts_file")]
    pub posts_file: String,
}

fn default_users_file() -> String {
    USERS_FILE.to_string()
}

fn default_friends_file() -> String {
    FRIENDS_FILE.to_string()
}

fn default_posts_file() -> String {
    POSTS_FILE.to_string()
}

impl Config {
    /// Load `socialnet.json` from `data_dir` if present, otherwise use the
    /// default file names. `None` means the working directory.
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| PathBuf::from("."));
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;

            if !config_str.trim().is_empty() {
                let mut config: Config = serde_json::from_str(&config_str)
                    .with_context(|| format!("Failed to parse {}", config_path.display()))?;
                config.data_dir = data_dir;
                return Ok(config);
            }
            tracing::warn!(path = %config_path.display(), "Config file is empty, using defaults");
        }

        Ok(Self::default_config(data_dir))
    }

    fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            users_file: default_users_file(),
            friends_file: default_friends_file(),
            posts_file: default_posts_file(),
        }
    }

    pub fn data_files(&self) -> DataFiles {
        DataFiles {
            users: self.data_dir.join(&self.users_file),
            friends: self.data_dir.join(&self.friends_file),
            posts: self.data_dir.join(&self.posts_file),
        }
    }
}
