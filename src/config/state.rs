// Application state module
// Immutable runtime state shared by every connection

use std::path::PathBuf;

use super::types::Config;
use crate::error::StartupError;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical document root, the boundary every served path is checked against
    pub document_root: PathBuf,
    pub access_log: bool,
}

impl AppState {
    /// Build state from configuration, canonicalizing the document root
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let root = PathBuf::from(&config.site.root);
        let document_root = root
            .canonicalize()
            .map_err(|source| StartupError::DocumentRoot { path: root, source })?;

        if !document_root.is_dir() {
            return Err(StartupError::DocumentRoot {
                path: document_root,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        Ok(Self {
            config: config.clone(),
            document_root,
            access_log: config.logging.access_log,
        })
    }
}
