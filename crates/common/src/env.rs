//! Environment/runtime helpers
//!
//! Sanity checks to ensure the data directory exists at startup.

use std::path::Path;
use tracing::{info, warn};

/// Ensure the directory holding `data_file` exists; note when the file itself
/// is missing (it is created on first load).
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    match tokio::fs::metadata(data_file).await {
        Ok(meta) if meta.permissions().readonly() => {
            warn!(path = %data_file.display(), "data file is read-only; writes will fail");
        }
        Ok(_) => {}
        Err(_) => {
            info!(path = %data_file.display(), "data file not found; an empty document will be created");
        }
    }
    Ok(())
}
