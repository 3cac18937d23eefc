use chrono::Utc;
use common::metrics;
use models::user::NewUser;
use models::User;

use super::DocumentStore;
use crate::errors::ServiceError;

impl DocumentStore {
    /// Create a user. Ids and emails (case-insensitive) must be unique.
    pub async fn create_user(&self, input: NewUser) -> Result<User, ServiceError> {
        input.validate()?;
        let user = self
            .mutate("create_user", |doc| {
                let email = input.email.trim().to_lowercase();
                if doc.users.values().any(|u| u.email.to_lowercase() == email) {
                    return Err(ServiceError::Validation("email already registered".into()));
                }
                let id = input.id.map(|id| id.trim().to_string()).unwrap_or_else(models::new_id);
                if doc.users.contains_key(&id) {
                    return Err(ServiceError::Validation(format!("user id {id} already exists")));
                }
                let now = Utc::now();
                let user = User {
                    id,
                    name: input.name.trim().to_string(),
                    email,
                    bio: input.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
                    created_at: now,
                    updated_at: now,
                };
                doc.users.insert(user.id.clone(), user.clone());
                Ok(user)
            })
            .await?;
        metrics::record_mutation("user", "create");
        Ok(user)
    }

    /// Return the user with `input.id`, creating it when absent.
    /// The flag is `true` when a new record was written.
    pub async fn ensure_user(&self, input: NewUser) -> Result<(User, bool), ServiceError> {
        let id = input
            .id
            .clone()
            .ok_or_else(|| ServiceError::Validation("ensure_user requires an id".into()))?;
        if let Some(existing) = self.get_user(&id).await? {
            return Ok((existing, false));
        }
        Ok((self.create_user(input).await?, true))
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, ServiceError> {
        self.read(|doc| doc.users.get(id).cloned()).await
    }

    /// All users, oldest first.
    pub async fn get_users(&self) -> Result<Vec<User>, ServiceError> {
        self.read(|doc| {
            let mut users: Vec<User> = doc.users.values().cloned().collect();
            users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            users
        })
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let email = email.trim().to_lowercase();
        self.read(|doc| doc.users.values().find(|u| u.email.to_lowercase() == email).cloned()).await
    }
}
