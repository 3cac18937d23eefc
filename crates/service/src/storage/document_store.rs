use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::metrics;
use models::{DataDocument, Metadata, CURRENT_VERSION};
use serde::Serialize;
use tokio::{fs, sync::RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::{migration, persist};
use crate::errors::ServiceError;

/// File-backed store for the whole Bailanysta data document.
///
/// The document is loaded lazily on first access and cached until
/// [`clear_cache`](Self::clear_cache). Every write serializes the complete
/// document; mutations run on a copy that only replaces the cache once the
/// file has been written, so a failed write leaves readers on the last good
/// state.
pub struct DocumentStore {
    data_path: PathBuf,
    backup_path: PathBuf,
    pretty: bool,
    cache: RwLock<Option<DataDocument>>,
    migrations: AtomicU32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub path: String,
    pub bytes: usize,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
}

impl DocumentStore {
    /// Bind to the given data and backup paths. No I/O happens until first use.
    pub fn new<P: Into<PathBuf>, B: Into<PathBuf>>(data_path: P, backup_path: B, pretty: bool) -> Arc<Self> {
        Arc::new(Self {
            data_path: data_path.into(),
            backup_path: backup_path.into(),
            pretty,
            cache: RwLock::new(None),
            migrations: AtomicU32::new(0),
        })
    }

    pub fn from_config(cfg: &configs::StorageConfig) -> Arc<Self> {
        Self::new(cfg.data_file.clone(), cfg.backup_path(), cfg.pretty)
    }

    pub fn data_path(&self) -> &Path { &self.data_path }

    pub fn backup_path(&self) -> &Path { &self.backup_path }

    /// Schema upgrades this instance has applied while loading.
    pub fn migrations_applied(&self) -> u32 { self.migrations.load(Ordering::Relaxed) }

    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.is_some()
    }

    /// Drop the cached document; the next access reloads from disk.
    pub async fn clear_cache(&self) {
        let mut guard = self.cache.write().await;
        if guard.take().is_some() {
            debug!(path = %self.data_path.display(), "document cache cleared");
        }
    }

    /// Warm the cache, surfacing load errors (corruption, unsupported version) early.
    pub async fn load(&self) -> Result<Metadata, ServiceError> {
        self.read(|doc| doc.metadata.clone()).await
    }

    /// Clone of the current document.
    pub async fn snapshot(&self) -> Result<DataDocument, ServiceError> {
        self.read(DataDocument::clone).await
    }

    pub async fn stats(&self) -> Result<Metadata, ServiceError> {
        self.read(|doc| doc.metadata.clone()).await
    }

    /// Run `f` against the cached document, loading it first if needed.
    pub async fn read<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&DataDocument) -> T,
    {
        {
            let guard = self.cache.read().await;
            if let Some(doc) = guard.as_ref() {
                return Ok(f(doc));
            }
        }
        let mut guard = self.cache.write().await;
        let doc = self.ensure_loaded(&mut guard).await?;
        Ok(f(doc))
    }

    /// Apply a mutation that always changes the document.
    pub async fn mutate<T, F>(&self, op: &'static str, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut DataDocument) -> Result<T, ServiceError>,
    {
        self.try_mutate(op, |doc| f(doc).map(Some))
            .await?
            .ok_or_else(|| ServiceError::Storage(format!("{op} produced no change")))
    }

    /// Apply `f` to a copy of the document and persist it.
    ///
    /// `Ok(None)` from `f` means nothing changed: no write happens. Errors from
    /// `f` or from the write discard the copy.
    pub async fn try_mutate<T, F>(&self, op: &'static str, f: F) -> Result<Option<T>, ServiceError>
    where
        F: FnOnce(&mut DataDocument) -> Result<Option<T>, ServiceError>,
    {
        let mut guard = self.cache.write().await;
        let current = self.ensure_loaded(&mut guard).await?;
        let mut draft = current.clone();
        let Some(out) = f(&mut draft)? else {
            return Ok(None);
        };
        draft.refresh_metadata(Utc::now());

        if let Err(e) = self.write_document(&draft).await {
            error!(op, error = %e, path = %self.data_path.display(), "document write failed; cache left unchanged");
            return Err(match e {
                ServiceError::StorageWriteFailed(_) => e,
                other => ServiceError::StorageWriteFailed(other.to_string()),
            });
        }
        *current = draft;
        debug!(op, "document committed");
        Ok(Some(out))
    }

    /// Write the current document to the backup file.
    ///
    /// The document is loaded (and so validated) first: a data file that
    /// cannot be parsed fails here and the previous backup stays untouched.
    #[instrument(skip(self), fields(backup = %self.backup_path.display()))]
    pub async fn backup(&self) -> Result<BackupInfo, ServiceError> {
        let doc = self.snapshot().await?;
        let bytes = persist::encode(&doc, self.pretty)?;
        persist::atomic_write(&self.backup_path, &bytes).await?;
        info!(bytes = bytes.len(), posts = doc.posts.len(), "backup written");
        Ok(BackupInfo {
            path: self.backup_path.display().to_string(),
            bytes: bytes.len(),
            created_at: Utc::now(),
            metadata: doc.metadata,
        })
    }

    /// Manual recovery: replace the data file with the backup and reload.
    ///
    /// An unparseable data file is first copied aside to `<data file>.corrupt`.
    #[instrument(skip(self), fields(backup = %self.backup_path.display()))]
    pub async fn restore_from_backup(&self) -> Result<Metadata, ServiceError> {
        let mut guard = self.cache.write().await;
        let raw = persist::read_json(&self.backup_path)
            .await?
            .ok_or_else(|| ServiceError::not_found("backup"))?;
        let restored = migration::upgrade(raw, Utc::now())?;

        if let Err(ServiceError::Corrupted(reason)) = persist::read_json(&self.data_path).await {
            let aside = sibling(&self.data_path, "corrupt");
            match fs::copy(&self.data_path, &aside).await {
                Ok(_) => warn!(%reason, aside = %aside.display(), "corrupted data file preserved before restore"),
                Err(e) => warn!(%reason, error = %e, "could not preserve corrupted data file"),
            }
        }

        self.write_document(&restored.document).await?;
        let metadata = restored.document.metadata.clone();
        *guard = Some(restored.document);
        warn!(posts = metadata.total_posts, users = metadata.total_users, "data document restored from backup");
        Ok(metadata)
    }

    async fn ensure_loaded<'g>(
        &self,
        slot: &'g mut Option<DataDocument>,
    ) -> Result<&'g mut DataDocument, ServiceError> {
        if slot.is_none() {
            *slot = Some(self.load_from_disk().await?);
        }
        slot.as_mut().ok_or_else(|| ServiceError::Storage("document cache unavailable".into()))
    }

    async fn load_from_disk(&self) -> Result<DataDocument, ServiceError> {
        let now = Utc::now();
        let Some(raw) = persist::read_json(&self.data_path).await? else {
            let doc = DataDocument::empty(now);
            match self.write_document(&doc).await {
                Ok(()) => info!(path = %self.data_path.display(), "created empty data document"),
                Err(e) => warn!(path = %self.data_path.display(), error = %e, "could not create data file; serving an empty document"),
            }
            return Ok(doc);
        };

        let upgrade = migration::upgrade(raw, now)?;
        if let Some(from_version) = upgrade.from_version {
            self.migrations.fetch_add(1, Ordering::Relaxed);
            metrics::STORAGE_MIGRATIONS_TOTAL.inc();
            match self.write_document(&upgrade.document).await {
                Ok(()) => info!(from_version, to_version = CURRENT_VERSION, path = %self.data_path.display(), "data document migrated"),
                Err(e) => warn!(from_version, error = %e, "migrated document not persisted; it will be upgraded again on next load"),
            }
        }
        debug!(
            path = %self.data_path.display(),
            users = upgrade.document.users.len(),
            posts = upgrade.document.posts.len(),
            "data document loaded"
        );
        Ok(upgrade.document)
    }

    async fn write_document(&self, doc: &DataDocument) -> Result<(), ServiceError> {
        let bytes = persist::encode(doc, self.pretty)?;
        match persist::atomic_write(&self.data_path, &bytes).await {
            Ok(()) => {
                metrics::STORAGE_WRITES_TOTAL.inc();
                Ok(())
            }
            Err(e) => {
                metrics::STORAGE_WRITE_FAILURES_TOTAL.inc();
                Err(e)
            }
        }
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, seed_user, temp_store};
    use models::post::NewPost;

    #[tokio::test]
    async fn first_load_creates_empty_current_document() -> Result<(), anyhow::Error> {
        let store = temp_store();
        assert!(!store.is_cached().await);
        let meta = store.load().await?;
        assert_eq!(meta.total_posts, 0);
        assert!(store.is_cached().await);

        let on_disk: serde_json::Value = serde_json::from_slice(&fs::read(store.data_path()).await?)?;
        assert_eq!(on_disk["version"], CURRENT_VERSION);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn writes_persist_and_survive_cache_clear() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Aidos").await?;
        let post = store.create_post(&user.id, NewPost { content: "hello #world".into(), mood: None }).await?;

        store.clear_cache().await;
        assert!(!store.is_cached().await);
        let reloaded = store.get_post(&post.id).await?.expect("post persisted");
        assert_eq!(reloaded.hashtags, vec!["world"]);

        let fresh = DocumentStore::new(store.data_path(), store.backup_path(), false);
        assert_eq!(fresh.stats().await?.total_posts, 1);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_cache_unchanged() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Aidos").await?;
        let before = store.snapshot().await?;

        let mut perms = fs::metadata(store.data_path()).await?.permissions();
        perms.set_readonly(true);
        fs::set_permissions(store.data_path(), perms).await?;

        let err = store
            .create_post(&user.id, NewPost { content: "will not land".into(), mood: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StorageWriteFailed(_)));
        assert_eq!(err.code(), "STORAGE_WRITE_FAILED");
        assert_eq!(store.snapshot().await?, before);

        let mut perms = fs::metadata(store.data_path()).await?.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(store.data_path(), perms).await?;
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn closure_error_discards_draft() -> Result<(), anyhow::Error> {
        let store = temp_store();
        store.load().await?;
        let res: Result<(), _> = store
            .mutate("poison", |doc| {
                doc.posts.clear();
                doc.metadata.total_posts = 99;
                Err(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.stats().await?.total_posts, 0);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn legacy_file_is_upgraded_exactly_once() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let legacy = serde_json::json!({
            "users": {"u1": {"id": "u1", "name": "A", "email": "a@b.kz", "createdAt": "2024-01-01T00:00:00Z"}},
            "posts": {"p1": {"id": "p1", "content": "old #Post", "authorId": "u1", "authorName": "A",
                              "createdAt": "2024-01-01T00:00:00Z"}}
        });
        persist::atomic_write(store.data_path(), &serde_json::to_vec(&legacy)?).await?;

        store.load().await?;
        assert_eq!(store.migrations_applied(), 1);
        let upgraded = fs::read(store.data_path()).await?;
        let value: serde_json::Value = serde_json::from_slice(&upgraded)?;
        assert_eq!(value["version"], CURRENT_VERSION);
        assert_eq!(value["posts"]["p1"]["hashtags"], serde_json::json!(["post"]));

        // a second load of the upgraded file is a no-op: no migration, no write
        let second = DocumentStore::new(store.data_path(), store.backup_path(), true);
        second.load().await?;
        assert_eq!(second.migrations_applied(), 0);
        assert_eq!(fs::read(store.data_path()).await?, upgraded);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupted_file_keeps_last_backup() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Aidos").await?;
        let post = store.create_post(&user.id, NewPost { content: "keep me".into(), mood: None }).await?;
        let info = store.backup().await?;
        assert_eq!(info.metadata.total_posts, 1);
        let backup_bytes = fs::read(store.backup_path()).await?;

        fs::write(store.data_path(), b"{ this is not json").await?;
        store.clear_cache().await;

        assert!(matches!(store.load().await, Err(ServiceError::Corrupted(_))));
        assert!(matches!(store.backup().await, Err(ServiceError::Corrupted(_))));
        assert_eq!(fs::read(store.backup_path()).await?, backup_bytes);

        let restored = store.restore_from_backup().await?;
        assert_eq!(restored.total_posts, 1);
        assert!(store.get_post(&post.id).await?.is_some());
        assert_eq!(fs::read(sibling(store.data_path(), "corrupt")).await?, b"{ this is not json".to_vec());
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn restore_without_backup_is_not_found() -> Result<(), anyhow::Error> {
        let store = temp_store();
        store.load().await?;
        assert!(matches!(store.restore_from_backup().await, Err(ServiceError::NotFound(_))));
        cleanup(&store).await;
        Ok(())
    }
}
