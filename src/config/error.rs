use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::NotFound { path } => {
                format!("Le fichier de configuration {} est introuvable.", path.display())
            }
            ConfigError::Io { path, .. } => {
                format!("Impossible de lire le fichier de configuration {}.", path.display())
            }
            ConfigError::Parse { path, .. } => {
                format!("Le fichier de configuration {} est invalide.", path.display())
            }
        }
    }
}
