use mongodb::{
    bson::{oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// Per-post reaction document: the set of users who reacted.
///
/// One document per post (unique `post_id` index); membership is maintained
/// with `$addToSet`/`$pull` so a user reacts at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub post_id: ObjectId,
    #[serde(default)]
    pub user_ids: Vec<ObjectId>,

    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Reaction {
    pub const COLLECTION: &'static str = "reaction";

    #[must_use]
    pub fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION)
    }
}
