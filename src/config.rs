use std::{
    env, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "PIPESH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "pipesh.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shown before the working directory name, e.g. `pipesh:src$ `.
    pub prompt: String,
    pub log_dir: PathBuf,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "pipesh".into(),
            log_dir: PathBuf::from("."),
            log_file: "logs".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Reads the file named by `PIPESH_CONFIG`, falling back to `pipesh.toml`
    /// in the working directory. Only an explicitly named file has to exist.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_path(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            prompt = "mini-sh"
            log_dir = "/tmp"
            "#,
        )
        .unwrap();

        assert_eq!(config.prompt, "mini-sh");
        assert_eq!(config.log_dir, PathBuf::from("/tmp"));
        assert_eq!(config.log_file, "logs");
    }

    #[test]
    fn reads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipesh.toml");
        std::fs::write(&path, "log_file = \"pipesh.log\"\n").unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.log_file, "pipesh.log");
    }

    #[test]
    fn reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipesh.toml");

        assert!(matches!(
            Config::from_path(&path),
            Err(ConfigError::Read { .. })
        ));

        std::fs::write(&path, "prompt = [").unwrap();
        assert!(matches!(
            Config::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
