use async_trait::async_trait;
use geoport_core::error::{GeoportError, Result};
use geoport_core::kv::KeyValueStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// File-backed key-value store: one file per key under `base_dir`.
///
/// Writes go to a temporary sibling file which is fsynced and then renamed
/// over the target, so readers see either the old or the new value.
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Maps a key onto a flat file name. Bytes outside `[A-Za-z0-9._-]`
    /// are written as `%XX`, so distinct keys never collide.
    fn file_name(key: &str) -> String {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
                b'.' if !name.is_empty() => name.push('.'),
                other => name.push_str(&format!("%{:02X}", other)),
            }
        }
        name
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(Self::file_name(key))
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> GeoportError {
    GeoportError::persistence(format!(
        "failed to {} {}: {}",
        action,
        path.display(),
        err
    ))
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| io_error("create", &self.base_dir, e))?;

        let path = self.path_for(key);
        let tmp_path = self
            .base_dir
            .join(format!(".{}.{}.tmp", Self::file_name(key), Uuid::new_v4()));

        let write = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&value).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error("write", &path, e));
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &path, e)),
        }
    }
}
