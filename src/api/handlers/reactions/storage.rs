//! Database helpers for post reactions.

use crate::api::{handlers::is_duplicate_key_error, models::Reaction};
use anyhow::{Context, Result};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Database,
};

/// Result of a conditional reaction add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReactionAddOutcome {
    Added,
    AlreadyReacted,
    CapReached,
}

/// Add `user_id` to the post's reacting-user set, but only while the set is
/// below the cap.
///
/// One conditional upsert does all the work: `$addToSet` keeps membership
/// unique, the `guard_key` (`user_ids.<cap-1>` must not exist) keeps the set
/// below the cap, and the unique `post_id` index turns the lost-insert race
/// between two concurrent first reactions into a duplicate-key error that is
/// resolved by retrying against the now-existing document.
pub(super) async fn add_reaction(
    db: &Database,
    post_id: ObjectId,
    user_id: ObjectId,
    guard_key: &str,
) -> Result<ReactionAddOutcome> {
    for attempt in 0..2 {
        let now = DateTime::now();
        // No unconditional $set here: modified_count must stay 0 when the
        // user is already a member, so the outcome can be classified.
        let result = Reaction::collection(db)
            .update_one(
                doc! { "post_id": post_id, guard_key: { "$exists": false } },
                doc! {
                    "$addToSet": { "user_ids": user_id },
                    "$setOnInsert": { "created_at": now, "updated_at": now },
                },
            )
            .upsert(true)
            .await;

        match result {
            Ok(outcome) => {
                if outcome.upserted_id.is_some() || outcome.modified_count == 1 {
                    return Ok(ReactionAddOutcome::Added);
                }
                // Matched but unchanged: the user is already a member.
                return Ok(ReactionAddOutcome::AlreadyReacted);
            }
            Err(err) if is_duplicate_key_error(&err) && attempt == 0 => {
                // Lost a concurrent first-reaction insert; the document
                // exists now, retry the conditional update against it.
            }
            Err(err) if is_duplicate_key_error(&err) => {
                // The guard refused to match an existing document: the set
                // is at the cap. Membership decides the outcome.
                let reaction = Reaction::collection(db)
                    .find_one(doc! { "post_id": post_id })
                    .await
                    .context("failed to read reaction after cap conflict")?;
                let already = reaction
                    .is_some_and(|reaction| reaction.user_ids.contains(&user_id));
                return Ok(if already {
                    ReactionAddOutcome::AlreadyReacted
                } else {
                    ReactionAddOutcome::CapReached
                });
            }
            Err(err) => return Err(err).context("failed to add reaction"),
        }
    }

    unreachable!("reaction add retries are bounded")
}

/// Remove `user_id` from the post's reacting-user set.
///
/// Returns `true` when the membership actually changed.
pub(super) async fn remove_reaction(
    db: &Database,
    post_id: ObjectId,
    user_id: ObjectId,
) -> Result<bool> {
    let result = Reaction::collection(db)
        .update_one(
            doc! { "post_id": post_id, "user_ids": user_id },
            doc! { "$pull": { "user_ids": user_id }, "$set": { "updated_at": DateTime::now() } },
        )
        .await
        .context("failed to remove reaction")?;

    Ok(result.modified_count == 1)
}
