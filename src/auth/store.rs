//! Local session token storage

use std::path::PathBuf;

use crate::client::models::SessionTokens;
use crate::config::{Config, write_private};
use crate::error::{ConfigError, Result};

/// Where the signed-in token bundle lives between commands
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionTokens>>;
    fn save(&self, tokens: &SessionTokens) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token bundle kept in a private YAML file next to the config.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store beside the resolved config file
    pub fn beside_config(config_path: Option<&str>) -> Result<Self> {
        let config = Config::resolve_path(config_path)?;
        let dir = config
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(dir.join("session.yaml")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let tokens = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(Some(tokens))
    }

    fn save(&self, tokens: &SessionTokens) -> Result<()> {
        let contents =
            serde_yaml::to_string(tokens).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        write_private(&self.path, &contents)
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: std::sync::Mutex<Option<SessionTokens>>,
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionTokens>> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    fn save(&self, tokens: &SessionTokens) -> Result<()> {
        *self.tokens.lock().unwrap() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.tokens.lock().unwrap() = None;
        Ok(())
    }
}
