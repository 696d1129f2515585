use serde::{Deserialize, Serialize};

use crate::store::{to_fields, DynDocumentStore, JsonMap, StoreError};

pub const USERS: &str = "users";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Customer profile. Accounts created through sign-up share their id with
/// the profile; profiles created from the dashboard have no account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cin: String,
    pub address: String,
    pub image_url: String,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl User {
    pub fn new(input: UserInput, now: &str) -> Self {
        Self {
            id: String::new(),
            full_name: input.full_name.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            phone: input.phone.unwrap_or_default(),
            cin: input.cin.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            image_url: input.image_url.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct UserModel {
    store: DynDocumentStore,
}

impl UserModel {
    pub fn new(store: DynDocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: &User) -> Result<User, StoreError> {
        let doc = self.store.add(USERS, to_fields(user)?).await?;
        doc.decode()
    }

    /// Store the profile under a caller-chosen id (the account id at sign-up).
    pub async fn create_with_id(&self, id: &str, user: &User) -> Result<User, StoreError> {
        let doc = self.store.set(USERS, id, to_fields(user)?).await?;
        doc.decode()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.store
            .get(USERS, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Vec<User>, StoreError> {
        self.store
            .find_eq(USERS, "email", email)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.store
            .list(USERS)
            .await?
            .iter()
            .map(|doc| doc.decode())
            .collect()
    }

    pub async fn update(&self, id: &str, fields: JsonMap) -> Result<bool, StoreError> {
        self.store.update(USERS, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(USERS, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_value(UserStatus::Suspended).unwrap(),
            serde_json::json!("suspended")
        );
        let status: UserStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, UserStatus::Inactive);
        assert!(serde_json::from_str::<UserStatus>("\"banned\"").is_err());
    }

    #[test]
    fn new_user_defaults_to_active() {
        let user = User::new(
            UserInput {
                full_name: Some("Amira Ben Salah".into()),
                email: Some("amira@example.tn".into()),
                ..Default::default()
            },
            "2026-01-01T00:00:00+00:00",
        );
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.created_at, user.updated_at);
    }
}
