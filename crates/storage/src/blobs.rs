use anyhow::Context;
use readmit_core::collab::BlobStore;
use readmit_core::format;
use std::path::PathBuf;
use tracing::debug;

/// Keeps uploads on local disk under `<root>/<owner>/<millis>-<hash>.<ext>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, owner_id: &str, filename: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let owner = owner_segment(owner_id)?;
        let dir = self.root.join(owner);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;

        let path = dir.join(blob_name(filename, bytes));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        let path = tokio::fs::canonicalize(&path).await?;
        debug!(path = %path.display(), size = bytes.len(), "stored upload");

        let norm = path.to_string_lossy().replace('\\', "/");
        Ok(format!("file:///{}", norm.trim_start_matches('/')))
    }
}

fn owner_segment(owner_id: &str) -> anyhow::Result<&str> {
    let owner = owner_id.trim();
    if owner.is_empty() || owner == "." || owner == ".." || owner.contains(['/', '\\']) {
        anyhow::bail!("invalid owner id: {owner_id:?}");
    }
    Ok(owner)
}

fn blob_name(filename: &str, bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes).to_hex().to_string();
    let stamp = chrono::Utc::now().timestamp_millis();
    match format::suffix(filename) {
        Some(ext) if !ext.is_empty() => format!("{stamp}-{}.{ext}", &hash[..16]),
        _ => format!("{stamp}-{}", &hash[..16]),
    }
}
