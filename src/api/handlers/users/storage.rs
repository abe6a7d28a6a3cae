//! Database helpers for account state.

use crate::api::{
    handlers::is_duplicate_key_error,
    models::User,
};
use anyhow::{Context, Result};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Database,
};
use std::collections::HashMap;

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(super) enum RegistrationOutcome {
    Created(Box<User>),
    UsernameTaken,
}

/// Insert a new user, relying on the unique username index for conflicts.
pub(super) async fn insert_user(
    db: &Database,
    username: &str,
    full_name: &str,
    password_hash: String,
) -> Result<RegistrationOutcome> {
    let user = User::new(
        username.to_string(),
        full_name.to_string(),
        Some(password_hash),
    );

    match User::collection(db).insert_one(&user).await {
        Ok(_) => Ok(RegistrationOutcome::Created(Box::new(user))),
        Err(err) if is_duplicate_key_error(&err) => Ok(RegistrationOutcome::UsernameTaken),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(super) async fn find_by_username(db: &Database, username: &str) -> Result<Option<User>> {
    User::collection(db)
        .find_one(doc! { "username": username })
        .await
        .context("failed to lookup user by username")
}

pub(super) async fn touch_last_login(db: &Database, user_id: ObjectId) -> Result<()> {
    User::collection(db)
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "last_login": DateTime::now() } },
        )
        .await
        .context("failed to record last login")?;
    Ok(())
}

/// Rotate the session epoch, invalidating every previously issued token.
pub(super) async fn rotate_session_epoch(db: &Database, user_id: ObjectId) -> Result<String> {
    let random_str = User::new_random_str();
    User::collection(db)
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "random_str": &random_str, "updated_at": DateTime::now() } },
        )
        .await
        .context("failed to rotate session epoch")?;
    Ok(random_str)
}

/// Apply the provided profile fields and return the updated user.
pub(super) async fn update_profile(
    db: &Database,
    user_id: ObjectId,
    full_name: Option<&str>,
    image: Option<&str>,
) -> Result<Option<User>> {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(full_name) = full_name {
        set.insert("full_name", full_name);
    }
    if let Some(image) = image {
        set.insert("image", image);
    }

    User::collection(db)
        .find_one_and_update(doc! { "_id": user_id }, doc! { "$set": set })
        .return_document(mongodb::options::ReturnDocument::After)
        .await
        .context("failed to update profile")
}

/// Store a new password hash and rotate the session epoch in the same update.
pub(super) async fn set_password(
    db: &Database,
    user_id: ObjectId,
    password_hash: &str,
) -> Result<()> {
    User::collection(db)
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": {
                "password": password_hash,
                "random_str": User::new_random_str(),
                "updated_at": DateTime::now(),
            } },
        )
        .await
        .context("failed to set password")?;
    Ok(())
}

/// Batch-load users by id for embedding author views in list responses.
pub(crate) async fn find_users_by_ids(
    db: &Database,
    ids: &[ObjectId],
) -> Result<HashMap<ObjectId, User>> {
    use futures::TryStreamExt;

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users: Vec<User> = User::collection(db)
        .find(doc! { "_id": { "$in": ids } })
        .await
        .context("failed to load users by ids")?
        .try_collect()
        .await
        .context("failed to collect users by ids")?;

    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}
