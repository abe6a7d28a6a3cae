//! Database helpers for posts and topics.

use super::slug::{normalize_slug, with_rand_suffix};
use crate::api::{
    handlers::is_duplicate_key_error,
    models::{Comment, Post, Reaction, Topic},
};
use anyhow::{bail, Context, Result};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    Database,
};

pub(crate) const TOPIC_NAME_MAX_LEN: usize = 127;
const TOPIC_SLUG_MAX_LEN: usize = 127;
const MAX_SLUG_ATTEMPTS: usize = 9;

/// Outcome of inserting a post under a derived slug.
#[derive(Debug)]
pub(super) enum PostInsertOutcome {
    Created(Box<Post>),
    /// Every slug candidate collided.
    SlugExhausted,
}

/// Find a topic by name or create it, attributing creation to `user_id`.
///
/// Returns `None` when the name cannot be turned into a slug. Uniqueness is
/// index-backed: a lost creation race re-reads the winner's document.
pub(crate) async fn get_or_create_topic(
    db: &Database,
    name: &str,
    user_id: ObjectId,
) -> Result<Option<Topic>> {
    let name = name.trim();

    if let Some(topic) = Topic::collection(db)
        .find_one(doc! { "name": name })
        .await
        .context("failed to lookup topic")?
    {
        return Ok(Some(topic));
    }

    let Some(base) = normalize_slug(name, 1, TOPIC_SLUG_MAX_LEN) else {
        return Ok(None);
    };

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = if attempt == 1 {
            base.clone()
        } else {
            with_rand_suffix(&base, attempt)
        };

        let topic = Topic::new(name.to_string(), candidate, Some(user_id));
        match Topic::collection(db).insert_one(&topic).await {
            Ok(_) => return Ok(Some(topic)),
            Err(err) if is_duplicate_key_error(&err) => {
                // Either the name lost a creation race (return the winner) or
                // the slug collided with a different name (retry suffixed).
                if let Some(existing) = Topic::collection(db)
                    .find_one(doc! { "name": name })
                    .await
                    .context("failed to re-read topic after conflict")?
                {
                    return Ok(Some(existing));
                }
            }
            Err(err) => return Err(err).context("failed to insert topic"),
        }
    }

    bail!("could not allocate a unique slug for topic {name:?}")
}

pub(super) async fn list_topics(
    db: &Database,
    q: Option<&str>,
    offset: u64,
    limit: i64,
) -> Result<(u64, Vec<Topic>)> {
    let mut filter = Document::new();
    if let Some(q) = q {
        filter.insert(
            "name",
            doc! { "$regex": regex::escape(q), "$options": "i" },
        );
    }

    let count = Topic::collection(db)
        .count_documents(filter.clone())
        .await
        .context("failed to count topics")?;

    let topics: Vec<Topic> = Topic::collection(db)
        .find(filter)
        .sort(doc! { "_id": 1 })
        .skip(offset)
        .limit(limit)
        .await
        .context("failed to list topics")?
        .try_collect()
        .await
        .context("failed to collect topics")?;

    Ok((count, topics))
}

pub(super) async fn find_topics_by_ids(db: &Database, ids: &[ObjectId]) -> Result<Vec<Topic>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Topic::collection(db)
        .find(doc! { "_id": { "$in": ids } })
        .await
        .context("failed to load topics")?
        .try_collect()
        .await
        .context("failed to collect topics")
}

/// Insert a post, deriving its slug from `slug_base` and retrying with a
/// growing random suffix while the unique index reports collisions.
pub(super) async fn insert_post(
    db: &Database,
    mut post: Post,
    slug_base: &str,
) -> Result<PostInsertOutcome> {
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        post.slug = if attempt == 1 {
            slug_base.to_string()
        } else {
            with_rand_suffix(slug_base, attempt)
        };

        match Post::collection(db).insert_one(&post).await {
            Ok(_) => return Ok(PostInsertOutcome::Created(Box::new(post))),
            Err(err) if is_duplicate_key_error(&err) => {}
            Err(err) => return Err(err).context("failed to insert post"),
        }
    }

    Ok(PostInsertOutcome::SlugExhausted)
}

pub(crate) async fn find_post_by_slug(db: &Database, slug: &str) -> Result<Option<Post>> {
    Post::collection(db)
        .find_one(doc! { "slug": slug })
        .await
        .context("failed to lookup post by slug")
}

pub(crate) async fn find_post_by_id(db: &Database, post_id: ObjectId) -> Result<Option<Post>> {
    Post::collection(db)
        .find_one(doc! { "_id": post_id })
        .await
        .context("failed to lookup post by id")
}

/// Filter matching only posts that are published at `now`.
pub(super) fn published_filter(now: DateTime) -> Document {
    doc! { "publish_at": { "$ne": null, "$lt": now } }
}

pub(super) async fn list_posts(
    db: &Database,
    filter: Document,
    offset: u64,
    limit: i64,
) -> Result<(u64, Vec<Post>)> {
    let count = Post::collection(db)
        .count_documents(filter.clone())
        .await
        .context("failed to count posts")?;

    let posts: Vec<Post> = Post::collection(db)
        .find(filter)
        .sort(doc! { "publish_at": -1 })
        .skip(offset)
        .limit(limit)
        .await
        .context("failed to list posts")?
        .try_collect()
        .await
        .context("failed to collect posts")?;

    Ok((count, posts))
}

pub(super) async fn update_post(db: &Database, post_id: ObjectId, set: Document) -> Result<()> {
    Post::collection(db)
        .update_one(doc! { "_id": post_id }, doc! { "$set": set })
        .await
        .context("failed to update post")?;
    Ok(())
}

/// Delete a post together with its comments and reactions.
pub(super) async fn delete_post_cascade(db: &Database, post_id: ObjectId) -> Result<()> {
    Comment::collection(db)
        .delete_many(doc! { "post_id": post_id })
        .await
        .context("failed to delete post comments")?;
    Reaction::collection(db)
        .delete_many(doc! { "post_id": post_id })
        .await
        .context("failed to delete post reactions")?;
    Post::collection(db)
        .delete_one(doc! { "_id": post_id })
        .await
        .context("failed to delete post")?;
    Ok(())
}

/// Counter maintenance for top-level comments.
pub(crate) async fn inc_total_comments(db: &Database, post_id: ObjectId, delta: i64) -> Result<()> {
    Post::collection(db)
        .update_one(
            doc! { "_id": post_id },
            doc! { "$inc": { "total_comments": delta } },
        )
        .await
        .context("failed to update comment counter")?;
    Ok(())
}

/// Counter maintenance for reactions.
pub(crate) async fn inc_total_reactions(
    db: &Database,
    post_id: ObjectId,
    delta: i64,
) -> Result<()> {
    Post::collection(db)
        .update_one(
            doc! { "_id": post_id },
            doc! { "$inc": { "total_reactions": delta } },
        )
        .await
        .context("failed to update reaction counter")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_filter_shape() {
        let now = DateTime::now();
        let filter = published_filter(now);
        let publish_at = filter.get_document("publish_at").expect("publish_at");
        assert!(publish_at.get("$ne").is_some());
        assert_eq!(publish_at.get_datetime("$lt").copied().ok(), Some(now));
    }
}
