//! Document types and index bootstrap.
//!
//! One concrete record type per entity; ownership and visibility rules live
//! in [`crate::api::policy`], not on the types themselves.

pub mod comment;
pub mod post;
pub mod reaction;
pub mod user;

pub use comment::{Comment, ReplyEntry};
pub use post::{Post, Topic};
pub use reaction::Reaction;
pub use user::User;

use anyhow::{Context, Result};
use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

fn unique_index(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn index(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

/// Create the indexes the storage layer relies on.
///
/// Uniqueness (username, slugs, one reaction document per post) is enforced
/// here rather than by read-then-write checks in handlers.
///
/// # Errors
///
/// Returns an error if any index cannot be created.
pub async fn ensure_indexes(db: &Database) -> Result<()> {
    User::collection(db)
        .create_index(unique_index(doc! { "username": 1 }))
        .await
        .context("failed to create user indexes")?;

    Post::collection(db)
        .create_indexes(vec![
            unique_index(doc! { "slug": 1 }),
            index(doc! { "author_id": 1 }),
            index(doc! { "topic_ids": 1 }),
        ])
        .await
        .context("failed to create post indexes")?;

    Topic::collection(db)
        .create_indexes(vec![
            unique_index(doc! { "name": 1 }),
            unique_index(doc! { "slug": 1 }),
        ])
        .await
        .context("failed to create topic indexes")?;

    Comment::collection(db)
        .create_index(index(doc! { "post_id": 1 }))
        .await
        .context("failed to create comment indexes")?;

    Reaction::collection(db)
        .create_index(unique_index(doc! { "post_id": 1 }))
        .await
        .context("failed to create reaction indexes")?;

    Ok(())
}
