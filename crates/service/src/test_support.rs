use std::sync::Arc;

use models::user::NewUser;
use models::User;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// Store rooted in a fresh directory under the system temp dir.
pub fn temp_store() -> Arc<DocumentStore> {
    let dir = std::env::temp_dir().join(format!("bailanysta_test_{}", Uuid::new_v4()));
    DocumentStore::new(dir.join("data.json"), dir.join("data.json.backup"), true)
}

pub async fn seed_user(store: &DocumentStore, name: &str) -> Result<User, ServiceError> {
    let email = format!("{}_{}@test.kz", name.to_lowercase(), Uuid::new_v4().simple());
    store.create_user(NewUser { id: None, name: name.into(), email, bio: None }).await
}

pub async fn cleanup(store: &DocumentStore) {
    if let Some(dir) = store.data_path().parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
