use mongodb::{
    bson::{oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// A blog post.
///
/// `publish_at` in the future (or unset) hides the post from public listings
/// and from everyone but its author. `slug` is unique and derived from the
/// title at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub author_id: ObjectId,

    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub publish_at: Option<DateTime>,

    pub total_comments: i64,
    pub total_reactions: i64,

    #[serde(default)]
    pub topic_ids: Vec<ObjectId>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Post {
    pub const COLLECTION: &'static str = "post";

    #[must_use]
    pub fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION)
    }
}

/// Topic a post can be filed under, created on first reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub user_id: Option<ObjectId>,
    pub name: String,
    pub slug: String,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Topic {
    pub const COLLECTION: &'static str = "topic";

    #[must_use]
    pub fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION)
    }

    #[must_use]
    pub fn new(name: String, slug: String, user_id: Option<ObjectId>) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            user_id,
            name,
            slug,
            created_at: now,
            updated_at: now,
        }
    }
}
