use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "LASH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub welcome: bool,
    pub log_dir: PathBuf,
    pub log_file: String,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            welcome: true,
            log_dir: env::temp_dir(),
            log_file: String::from("lash.log"),
            log_filter: String::from("info"),
        }
    }
}

impl Config {
    /// `$LASH_CONFIG`, falling back to `~/.config/lash/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("lash")
                .join("config.toml")
        })
    }

    /// A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };

        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
