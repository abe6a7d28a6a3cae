use mongodb::{
    bson::{oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// Reply embedded in its parent comment document.
///
/// Addressed by `id` within the ordered `replies` list; every mutation is a
/// single conditional update against the comment document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyEntry {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub description: String,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ReplyEntry {
    #[must_use]
    pub fn new(user_id: ObjectId, description: String) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            user_id,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Top-level comment on a post, carrying its capped reply list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub post_id: ObjectId,

    pub description: String,
    #[serde(default)]
    pub replies: Vec<ReplyEntry>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Comment {
    pub const COLLECTION: &'static str = "comment";

    #[must_use]
    pub fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION)
    }

    #[must_use]
    pub fn new(user_id: ObjectId, post_id: ObjectId, description: String) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            user_id,
            post_id,
            description,
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_starts_with_empty_replies() {
        let comment = Comment::new(ObjectId::new(), ObjectId::new(), "first".to_string());
        assert!(comment.replies.is_empty());
        assert_eq!(comment.created_at, comment.updated_at);
    }

    #[test]
    fn reply_entries_get_distinct_ids() {
        let author = ObjectId::new();
        let first = ReplyEntry::new(author, "a".to_string());
        let second = ReplyEntry::new(author, "b".to_string());
        assert_ne!(first.id, second.id);
    }
}
