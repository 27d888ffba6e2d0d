use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result};
use axum::body::Bytes;
use futures_util::{stream, Stream};
use tokio::{fs, io::AsyncReadExt};

pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".docx", ".xlsx"];

const CHUNK_SIZE: usize = 64 * 1024;

/// Lower-cased extension of `file_name` including the dot, or `Err` with
/// whatever extension it had.
pub fn allowed_extension(file_name: &str) -> Result<String, String> {
    let ext = Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ext)
    }
}

pub enum Lookup {
    Found { file: fs::File, size: u64 },
    Missing,
    Expired,
}

/// Flat directory of uploaded and processed files that expire after `ttl`.
pub struct UploadDir {
    root: PathBuf,
    ttl: Duration,
}

impl UploadDir {
    pub async fn open(root: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create upload dir {}", root.display()))?;
        Ok(Self { root, ttl })
    }

    /// Only plain names made of `[A-Za-z0-9._-]` resolve; anything that
    /// could leave the directory does not.
    fn path_of(&self, name: &str) -> Option<PathBuf> {
        let plain = !name.is_empty()
            && name.len() <= 1000
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        plain.then(|| self.root.join(name))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        modified
            .elapsed()
            .map(|age| age >= self.ttl)
            .unwrap_or(false)
    }

    pub async fn store(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self
            .path_of(name)
            .with_context(|| format!("invalid file name {name}"))?;
        fs::write(&path, data)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Produces `to` from `from`. Files are passed through unchanged.
    pub async fn process(&self, from: &str, to: &str) -> Result<()> {
        let from = self
            .path_of(from)
            .with_context(|| format!("invalid file name {from}"))?;
        let to = self
            .path_of(to)
            .with_context(|| format!("invalid file name {to}"))?;
        fs::copy(&from, &to)
            .await
            .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    pub async fn load(&self, name: &str) -> Result<Lookup> {
        let Some(path) = self.path_of(name) else {
            return Ok(Lookup::Missing);
        };
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(Lookup::Missing),
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Lookup::Missing),
            Err(error) => return Err(error).context("failed to stat file"),
        };
        if self.is_expired(metadata.modified()?) {
            self.remove(name).await;
            return Ok(Lookup::Expired);
        }
        let file = fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Lookup::Found {
            file,
            size: metadata.len(),
        })
    }

    pub async fn remove(&self, name: &str) {
        let Some(path) = self.path_of(name) else {
            return;
        };
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => tracing::error!(%error, path = %path.display(), "failed to delete file"),
        }
    }

    /// Deletes every expired file, returning how many were removed.
    pub async fn cleanup(&self) -> Result<usize> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .with_context(|| format!("failed to list {}", self.root.display()))?;
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || !self.is_expired(metadata.modified()?) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(error) => {
                    tracing::error!(%error, path = %entry.path().display(), "failed to delete file")
                }
            }
        }
        Ok(removed)
    }
}

/// Reads `file` lazily, one chunk at a time; the stream ends after the
/// first read error.
pub fn chunks(file: fs::File) -> impl Stream<Item = std::io::Result<Bytes>> {
    stream::unfold(Some(file), |file| async move {
        let mut file = file?;
        let mut buf = vec![0; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(read) => {
                buf.truncate(read);
                Some((Ok(Bytes::from(buf)), Some(file)))
            }
            Err(error) => Some((Err(error), None)),
        }
    })
}
