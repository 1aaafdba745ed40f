use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use art_survey_application::{ApplicationError, AuthSession, SessionStore};
use tracing::warn;

/// Keeps the signed-in session between runs as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self) -> Result<Option<AuthSession>, ApplicationError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(ApplicationError::Io(error.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(%error, path = %self.path.display(), "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &AuthSession) -> Result<(), ApplicationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        fs::write(&self.path, json).map_err(|error| ApplicationError::Io(error.to_string()))
    }

    fn clear(&self) -> Result<(), ApplicationError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ApplicationError::Io(error.to_string())),
        }
    }
}
