//! Disk I/O for the data document: tolerant reads and atomic whole-file writes.

use std::path::{Path, PathBuf};

use models::DataDocument;
use serde_json::Value;
use tokio::fs;

use crate::errors::ServiceError;

/// Read and parse the file at `path` as untyped JSON.
///
/// A missing or blank file yields `Ok(None)`; bytes that are not JSON are a
/// [`ServiceError::Corrupted`] and the file is left as it is.
pub async fn read_json(path: &Path) -> Result<Option<Value>, ServiceError> {
    let bytes = match fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ServiceError::Storage(format!("read {}: {e}", path.display()))),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| ServiceError::Corrupted(format!("{}: {e}", path.display())))
}

pub fn encode(doc: &DataDocument, pretty: bool) -> Result<Vec<u8>, ServiceError> {
    let encoded = if pretty { serde_json::to_vec_pretty(doc) } else { serde_json::to_vec(doc) };
    encoded.map_err(|e| ServiceError::Storage(format!("encode document: {e}")))
}

/// Write `bytes` to `<path>.tmp` and rename it over `path`, so a crash never
/// leaves a half-written document behind.
///
/// An existing target marked read-only is refused rather than replaced.
pub async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    if let Ok(meta) = fs::metadata(path).await {
        if meta.permissions().readonly() {
            return Err(ServiceError::StorageWriteFailed(format!("{} is read-only", path.display())));
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ServiceError::StorageWriteFailed(format!("create {}: {e}", parent.display())))?;
    }

    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::StorageWriteFailed(format!("write {}: {e}", tmp.display())));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::StorageWriteFailed(format!("rename onto {}: {e}", path.display())));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
