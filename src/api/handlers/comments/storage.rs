//! Database helpers for comments and their embedded replies.
//!
//! Every reply mutation is a single conditional `update_one` against the
//! comment document (append-if-under-cap, set-where-id-and-owner-match,
//! remove-where-id-and-owner-match) so concurrent requests are arbitrated
//! by the store, never by application-level read-modify-write.

use crate::api::models::{Comment, ReplyEntry};
use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, to_document, DateTime},
    Database,
};

pub(super) async fn insert_comment(db: &Database, comment: &Comment) -> Result<()> {
    Comment::collection(db)
        .insert_one(comment)
        .await
        .context("failed to insert comment")?;
    Ok(())
}

pub(super) async fn list_comments(
    db: &Database,
    post_id: ObjectId,
    offset: u64,
    limit: i64,
) -> Result<(u64, Vec<Comment>)> {
    let filter = doc! { "post_id": post_id };

    let count = Comment::collection(db)
        .count_documents(filter.clone())
        .await
        .context("failed to count comments")?;

    let comments: Vec<Comment> = Comment::collection(db)
        .find(filter)
        .sort(doc! { "_id": 1 })
        .skip(offset)
        .limit(limit)
        .await
        .context("failed to list comments")?
        .try_collect()
        .await
        .context("failed to collect comments")?;

    Ok((count, comments))
}

pub(super) async fn find_comment(
    db: &Database,
    comment_id: ObjectId,
    post_id: ObjectId,
) -> Result<Option<Comment>> {
    Comment::collection(db)
        .find_one(doc! { "_id": comment_id, "post_id": post_id })
        .await
        .context("failed to lookup comment")
}

pub(super) async fn set_description(
    db: &Database,
    comment_id: ObjectId,
    description: &str,
) -> Result<()> {
    Comment::collection(db)
        .update_one(
            doc! { "_id": comment_id },
            doc! { "$set": { "description": description, "updated_at": DateTime::now() } },
        )
        .await
        .context("failed to update comment")?;
    Ok(())
}

pub(super) async fn delete_comment(db: &Database, comment_id: ObjectId) -> Result<()> {
    Comment::collection(db)
        .delete_one(doc! { "_id": comment_id })
        .await
        .context("failed to delete comment")?;
    Ok(())
}

/// Append a reply only while the list is below the cap.
///
/// `guard_key` is the `replies.<cap-1>` element that must not exist yet;
/// returns `false` (nothing modified) when the comment is already full.
pub(super) async fn push_reply_below_cap(
    db: &Database,
    comment_id: ObjectId,
    post_id: ObjectId,
    reply: &ReplyEntry,
    guard_key: &str,
) -> Result<bool> {
    let reply_doc = to_document(reply).context("failed to serialize reply")?;

    let result = Comment::collection(db)
        .update_one(
            doc! {
                "_id": comment_id,
                "post_id": post_id,
                guard_key: { "$exists": false },
            },
            doc! { "$push": { "replies": reply_doc } },
        )
        .await
        .context("failed to append reply")?;

    Ok(result.modified_count == 1)
}

/// Rewrite a reply in place, but only when `user_id` owns it.
pub(super) async fn update_owned_reply(
    db: &Database,
    comment_id: ObjectId,
    post_id: ObjectId,
    reply_id: ObjectId,
    user_id: ObjectId,
    description: &str,
) -> Result<bool> {
    let result = Comment::collection(db)
        .update_one(
            doc! {
                "_id": comment_id,
                "post_id": post_id,
                "replies": { "$elemMatch": { "id": reply_id, "user_id": user_id } },
            },
            doc! { "$set": {
                "replies.$.description": description,
                "replies.$.updated_at": DateTime::now(),
            } },
        )
        .await
        .context("failed to update reply")?;

    Ok(result.modified_count == 1)
}

/// Remove a reply, but only when `user_id` owns it.
pub(super) async fn pull_owned_reply(
    db: &Database,
    comment_id: ObjectId,
    post_id: ObjectId,
    reply_id: ObjectId,
    user_id: ObjectId,
) -> Result<bool> {
    let result = Comment::collection(db)
        .update_one(
            doc! {
                "_id": comment_id,
                "post_id": post_id,
                "replies": { "$elemMatch": { "id": reply_id, "user_id": user_id } },
            },
            doc! { "$pull": { "replies": { "id": reply_id, "user_id": user_id } } },
        )
        .await
        .context("failed to remove reply")?;

    Ok(result.modified_count == 1)
}
