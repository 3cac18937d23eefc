use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 160;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user; `id` is generated unless supplied.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(ModelError::Validation(format!("bio exceeds {MAX_BIO_LENGTH} characters")));
            }
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(ModelError::Validation("id must not be blank".into()));
            }
        }
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ModelError::Validation(format!("name exceeds {MAX_NAME_LENGTH} characters")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_local_and_domain() {
        assert!(validate_email("a@b.kz").is_ok());
        assert!(validate_email("@b.kz").is_err());
        assert!(validate_email("ab.kz").is_err());
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("Aigerim").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn user_json_is_camel_case() {
        let now = Utc::now();
        let u = User { id: "u1".into(), name: "N".into(), email: "n@e.kz".into(), bio: None, created_at: now, updated_at: now };
        let v = serde_json::to_value(&u).unwrap();
        assert!(v.get("createdAt").is_some());
        assert!(v.get("bio").is_none());
    }
}
