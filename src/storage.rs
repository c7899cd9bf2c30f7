use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AppError;

/// Public path prefix under which stored uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Extension used when the uploaded filename carries none (browser recordings).
pub const DEFAULT_EXTENSION: &str = "webm";

const FILE_TOKEN: &str = "video";
const MAX_EXTENSION_LEN: usize = 16;
const COPY_CHUNK: usize = 64 * 1024;

/// The directory uploaded files are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
    max_file_size: Option<u64>,
}

impl UploadStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_size: None,
        }
    }

    /// Cap on the bytes written for a single file. A file that outgrows it is
    /// abandoned mid-copy.
    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::StorageUnavailable(format!(
                "cannot create upload directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Write `data` to a fresh file called `file_name`.
    ///
    /// Creating the destination and writing to it fail differently: the first
    /// is fatal for a submission, the second only loses this one file.
    pub async fn write(&self, file_name: &str, data: &[u8]) -> Result<u64, WriteError> {
        let path = self.path_for(file_name);
        let mut file = File::create(&path).await.map_err(WriteError::Create)?;

        let copied = async {
            let mut written: u64 = 0;
            for chunk in data.chunks(COPY_CHUNK) {
                written += chunk.len() as u64;
                if self.max_file_size.is_some_and(|limit| written > limit) {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::FileTooLarge,
                        "file exceeds the per-file size limit",
                    ));
                }
                file.write_all(chunk).await?;
            }
            file.flush().await
        }
        .await;

        if let Err(e) = copied {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(WriteError::Copy(e));
        }

        Ok(data.len() as u64)
    }

    /// Best-effort removal. Returns whether a file was actually deleted.
    pub async fn remove(&self, file_name: &str) -> bool {
        match tokio::fs::remove_file(self.path_for(file_name)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to remove upload {file_name}: {e}");
                false
            }
        }
    }

    /// Remove the files a submission recorded as its own uploads.
    pub async fn purge(&self, file_names: &[String]) -> usize {
        let mut removed = 0;
        for name in file_names {
            if !is_plain_name(name) {
                tracing::warn!("Refusing to purge suspicious upload name {name:?}");
                continue;
            }
            if self.remove(name).await {
                removed += 1;
            }
        }
        removed
    }
}

#[derive(Debug)]
pub enum WriteError {
    Create(std::io::Error),
    Copy(std::io::Error),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::Create(e) => write!(f, "create failed: {e}"),
            WriteError::Copy(e) => write!(f, "write failed: {e}"),
        }
    }
}

/// Files written on behalf of one submission that is not committed yet.
pub struct StagedUploads<'a> {
    storage: &'a UploadStorage,
    written: Vec<String>,
}

impl<'a> StagedUploads<'a> {
    pub fn new(storage: &'a UploadStorage) -> Self {
        Self {
            storage,
            written: Vec::new(),
        }
    }

    pub fn record(&mut self, file_name: String) {
        self.written.push(file_name);
    }

    pub fn names(&self) -> &[String] {
        &self.written
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Keep the files. Returns their names.
    pub fn commit(self) -> Vec<String> {
        self.written
    }

    /// Delete everything written so far.
    pub async fn discard(self) {
        for name in &self.written {
            self.storage.remove(name).await;
        }
        if !self.written.is_empty() {
            tracing::warn!("Rolled back {} uploaded file(s)", self.written.len());
        }
    }
}

/// `{unix_seconds}-video-{uuid}.{ext}`. The uuid keeps names from colliding
/// when several files land within the same second.
pub fn stored_file_name(original: Option<&str>, now: DateTime<Utc>) -> String {
    let ext = original
        .and_then(extension_of)
        .unwrap_or(DEFAULT_EXTENSION);
    format!(
        "{}-{FILE_TOKEN}-{}.{ext}",
        now.timestamp(),
        Uuid::now_v7().simple()
    )
}

/// Extension of the last path segment, if it is short and plain ASCII.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (_, ext) = base.rsplit_once('.')?;
    let plain = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plain.then_some(ext)
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
