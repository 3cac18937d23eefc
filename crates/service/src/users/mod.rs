use std::sync::Arc;

use configs::AppSettings;
use models::user::NewUser;
use models::User;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// User directory plus resolution of the acting user. There is no login:
/// callers name themselves with an id, or act as the configured mock user.
#[derive(Clone)]
pub struct UserService {
    store: Arc<DocumentStore>,
    mock_user_id: String,
}

impl UserService {
    pub fn new(store: Arc<DocumentStore>, mock_user_id: impl Into<String>) -> Self {
        Self { store, mock_user_id: mock_user_id.into() }
    }

    pub fn mock_user_id(&self) -> &str { &self.mock_user_id }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewUser) -> Result<User, ServiceError> {
        let user = self.store.create_user(input).await?;
        info!(user_id = %user.id, "user_created");
        Ok(user)
    }

    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        self.store.get_user(id).await?.ok_or_else(|| ServiceError::not_found("user"))
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> { self.store.get_users().await }

    /// Make sure the mock user exists; called once at startup.
    pub async fn ensure_mock_user(&self, settings: &AppSettings) -> Result<User, ServiceError> {
        let (user, created) = self
            .store
            .ensure_user(NewUser {
                id: Some(settings.mock_user_id.clone()),
                name: settings.mock_user_name.clone(),
                email: settings.mock_user_email.clone(),
                bio: None,
            })
            .await?;
        if created {
            info!(user_id = %user.id, "mock user created");
        }
        Ok(user)
    }

    /// Id of the acting user: the supplied header value when non-blank,
    /// otherwise the mock user.
    pub fn resolve_id(&self, header: Option<&str>) -> String {
        header
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.mock_user_id)
            .to_string()
    }

    pub async fn current(&self, header: Option<&str>) -> Result<User, ServiceError> {
        self.get(&self.resolve_id(header)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, temp_store};

    #[tokio::test]
    async fn mock_user_is_created_once_and_resolved_by_default() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let settings = AppSettings::default();
        let svc = UserService::new(store.clone(), settings.mock_user_id.clone());
        svc.ensure_mock_user(&settings).await?;
        svc.ensure_mock_user(&settings).await?;
        assert_eq!(svc.list().await?.len(), 1);

        assert_eq!(svc.current(None).await?.id, settings.mock_user_id);
        assert_eq!(svc.current(Some("  ")).await?.id, settings.mock_user_id);
        assert_eq!(svc.current(Some("someone")).await.unwrap_err().code(), "NOT_FOUND");
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let svc = UserService::new(store.clone(), "mock");
        let err = svc.create(NewUser { id: None, name: "".into(), email: "a@b".into(), bio: None }).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        let err = svc.create(NewUser { id: None, name: "Nurlan".into(), email: "nope".into(), bio: None }).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        cleanup(&store).await;
        Ok(())
    }
}
