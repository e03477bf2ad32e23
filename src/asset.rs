//! Asset reference stores: bytes in, opaque durable reference out
use super::error::{ReviewError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid7::uuid7;

pub trait AssetStore: Send + Sync {
    /// Failures come back as `Storage` and are never retried here.
    fn store(&self, bytes: &[u8], content_type: &str) -> Result<String>;
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        _ => "bin",
    }
}

/// Writes each payload to its own file under a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ReviewError::Storage(format!("cannot create {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path behind a reference issued by this store.
    pub fn resolve(&self, asset_ref: &str) -> Option<PathBuf> {
        let name = asset_ref.strip_prefix("file://")?;
        // names are a hex-encoded uuid, so anything else was not issued here
        let (stem, _) = name.split_once('.')?;
        let id = hex::decode(stem).ok()?;
        (id.len() == 16).then(|| self.root.join(name))
    }
}

impl AssetStore for FsAssetStore {
    fn store(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        let name = format!(
            "{}.{}",
            hex::encode(uuid7().as_bytes()),
            extension_for(content_type)
        );
        let path = self.root.join(&name);

        fs::write(&path, bytes)
            .map_err(|e| ReviewError::Storage(format!("cannot write {}: {e}", path.display())))?;
        tracing::debug!(asset = %name, size = bytes.len(), content_type, "asset stored");

        Ok(format!("file://{name}"))
    }
}

/// Content-addressed in-memory store, `mem://<sha256>`.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch(&self, asset_ref: &str) -> Option<(String, Vec<u8>)> {
        let digest = asset_ref.strip_prefix("mem://")?;
        self.blobs.read().ok()?.get(digest).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetStore for MemoryAssetStore {
    fn store(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        let digest = sha256::digest(bytes);
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| ReviewError::Storage("asset store lock poisoned".into()))?;
        blobs
            .entry(digest.clone())
            .or_insert_with(|| (content_type.to_string(), bytes.to_vec()));

        Ok(format!("mem://{digest}"))
    }
}
