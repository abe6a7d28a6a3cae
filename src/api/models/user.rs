use mongodb::{
    bson::{oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Root identity entity.
///
/// `random_str` is the session epoch: it is embedded in every issued token
/// and rotated by "logout from all devices" (and password changes), which
/// invalidates all previously issued tokens at their next validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub image: Option<String>,

    pub is_active: bool,
    pub joining_date: DateTime,
    #[serde(default)]
    pub last_login: Option<DateTime>,

    // None is reserved for externally-authenticated accounts.
    #[serde(default)]
    pub password: Option<String>,
    pub random_str: String,

    pub updated_at: DateTime,
}

impl User {
    pub const COLLECTION: &'static str = "user";

    #[must_use]
    pub fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION)
    }

    #[must_use]
    pub fn new(username: String, full_name: String, password_hash: Option<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            username,
            full_name,
            image: None,
            is_active: true,
            joining_date: now,
            last_login: None,
            password: password_hash,
            random_str: Self::new_random_str(),
            updated_at: now,
        }
    }

    /// Fresh session epoch value.
    #[must_use]
    pub fn new_random_str() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_distinct_session_epochs() {
        let first = User::new("alice".to_string(), "Alice".to_string(), None);
        let second = User::new("bob".to_string(), "Bob".to_string(), None);
        assert_ne!(first.random_str, second.random_str);
        assert_ne!(User::new_random_str(), User::new_random_str());
    }

    #[test]
    fn new_user_is_active_without_last_login() {
        let user = User::new("alice".to_string(), "Alice".to_string(), Some("hash".into()));
        assert!(user.is_active);
        assert!(user.last_login.is_none());
        assert_eq!(user.password.as_deref(), Some("hash"));
    }
}
