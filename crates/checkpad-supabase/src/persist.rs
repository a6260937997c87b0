// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session persistence between runs.

use std::path::{Path, PathBuf};

use checkpad_core::{CheckpadError, Session};
use tracing::{debug, warn};

use crate::types::PersistedSession;

/// A JSON file holding the last session.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session. A missing file is `None`; an unreadable or
    /// corrupt file is logged, discarded and also `None`.
    pub async fn load(&self) -> Option<Session> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read session file");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&content) {
            Ok(persisted) => {
                debug!(path = %self.path.display(), "restored persisted session");
                Some(persisted.into())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                let _ = tokio::fs::remove_file(&self.path).await;
                None
            }
        }
    }

    /// Writes `session`, creating parent directories. The file is readable by
    /// the owner only on Unix.
    pub async fn save(&self, session: &Session) -> Result<(), CheckpadError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create session directory", e))?;
        }

        let json = serde_json::to_vec_pretty(&PersistedSession::from(session))
            .map_err(|e| CheckpadError::Internal(format!("failed to encode session: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| io_error("write session file", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| io_error("restrict session file permissions", e))?;
        }
        Ok(())
    }

    /// Removes the file. Already gone is fine.
    pub async fn clear(&self) -> Result<(), CheckpadError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove session file", e)),
        }
    }
}

fn io_error(action: &str, e: std::io::Error) -> CheckpadError {
    CheckpadError::Auth {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}
