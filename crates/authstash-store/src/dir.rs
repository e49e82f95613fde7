use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectClient;

/// Object client backed by a local directory tree.
///
/// Each object lives at `<root>/<bucket>/<key>`; `/` in keys becomes a
/// directory separator. Useful for working against a mirrored bucket.
#[derive(Clone, Debug)]
pub struct DirObjectClient {
    root: PathBuf,
}

impl DirObjectClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of an object. Rejects keys that would escape the
    /// bucket directory.
    pub fn object_path(&self, bucket: &str, key: &str) -> StoreResult<PathBuf> {
        let mut path = self.root.clone();
        for part in [bucket, key] {
            let relative = Path::new(part);
            if part.is_empty()
                || relative
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(StoreError::InvalidKey(format!("{bucket}/{key}")));
            }
            path.push(relative);
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectClient for DirObjectClient {
    async fn fetch_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path.display(), e)),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StoreResult<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent.display(), e))?;
        }
        write_atomic(&path, &body).await?;
        debug!(path = %path.display(), bytes = body.len(), "object written");
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path.display(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_nested_key() {
        let dir = tempfile::tempdir().unwrap();
        let client = DirObjectClient::new(dir.path());
        client
            .put_object("b", "b/sessions/s-creds.json", b"{}".to_vec())
            .await
            .unwrap();
        assert!(dir.path().join("b/b/sessions/s-creds.json").exists());
        assert_eq!(
            client
                .fetch_object("b", "b/sessions/s-creds.json")
                .await
                .unwrap()
                .as_deref(),
            Some(&b"{}"[..])
        );
    }

    #[tokio::test]
    async fn fetch_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let client = DirObjectClient::new(dir.path());
        assert!(client.fetch_object("b", "nope.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let client = DirObjectClient::new(dir.path());
        client.put_object("b", "k", b"x".to_vec()).await.unwrap();
        client.delete_object("b", "k").await.unwrap();
        client.delete_object("b", "k").await.unwrap();
        assert!(client.fetch_object("b", "k").await.unwrap().is_none());
    }

    #[test]
    fn rejects_escaping_keys() {
        let client = DirObjectClient::new("/tmp/root");
        assert!(client.object_path("b", "../etc/passwd").is_err());
        assert!(client.object_path("b", "/abs").is_err());
        assert!(client.object_path("..", "k").is_err());
        assert!(client.object_path("b", "").is_err());
        assert!(client.object_path("b", "a/b.json").is_ok());
    }
}
