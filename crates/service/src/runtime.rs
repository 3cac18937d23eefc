//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can prepare storage
//! through `service::runtime` alone.

use configs::StorageConfig;

/// Create the data directory if needed and report the state of the data file.
pub async fn ensure_env(storage: &StorageConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&storage.data_file).await
}
