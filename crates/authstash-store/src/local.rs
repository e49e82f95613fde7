use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use authstash_types::{local_file_name, SessionId};
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{StoreError, StoreResult};
use crate::traits::RecordBackend;

/// Record backend storing one JSON file per record under
/// `<root>/<sessionId>/`.
///
/// The session directory is created on first write. Files are replaced
/// through a temp file and a rename, so readers never see a partial record.
#[derive(Clone, Debug)]
pub struct LocalFileBackend {
    dir: PathBuf,
}

impl LocalFileBackend {
    /// Backend for `session` under `root` (usually `<cwd>/sessions`).
    pub fn new(root: impl AsRef<Path>, session: &SessionId) -> Self {
        Self {
            dir: root.as_ref().join(session.as_str()),
        }
    }

    /// The session directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> StoreResult<PathBuf> {
        local_file_name(name)
            .map(|file| self.dir.join(file))
            .ok_or(StoreError::EmptyKey)
    }
}

#[async_trait]
impl RecordBackend for LocalFileBackend {
    fn location(&self, name: &str) -> Option<String> {
        self.path(name).ok().map(|p| p.display().to_string())
    }

    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        let path = self.path(name)?;
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "record file absent");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(path.display(), e)),
        };
        String::from_utf8(body)
            .map(Some)
            .map_err(|_| StoreError::InvalidUtf8 {
                location: path.display().to_string(),
            })
    }

    async fn put(&self, name: &str, text: &str) -> StoreResult<()> {
        let path = self.path(name)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(self.dir.display(), e))?;
        write_atomic(&path, text.as_bytes()).await?;
        debug!(path = %path.display(), bytes = text.len(), "record file written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "record file deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path.display(), e)),
        }
    }
}
