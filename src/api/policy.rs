//! Resource ownership and visibility decisions.
//!
//! Pure functions with no side effects, consulted by handlers before any
//! mutation. Capacity limits live here as configuration; their enforcement
//! is expressed as conditional updates in the storage layer so concurrent
//! requests cannot overshoot a cap.

use crate::api::models::{Comment, Post, ReplyEntry, User};
use mongodb::bson::DateTime;

/// Only the author may modify a post.
#[must_use]
pub fn can_modify_post(post: &Post, actor: &User) -> bool {
    post.author_id == actor.id
}

/// Only the comment's author may modify it.
#[must_use]
pub fn can_modify_comment(comment: &Comment, actor: &User) -> bool {
    comment.user_id == actor.id
}

/// Only the reply's author may modify it.
#[must_use]
pub fn can_modify_reply(reply: &ReplyEntry, actor: &User) -> bool {
    reply.user_id == actor.id
}

/// A post is published once `publish_at` is set and in the past.
#[must_use]
pub fn is_published(post: &Post, now: DateTime) -> bool {
    post.publish_at.is_some_and(|publish_at| publish_at <= now)
}

/// Published posts are visible to everyone; unpublished and scheduled posts
/// only to their author.
#[must_use]
pub fn can_view_post(post: &Post, actor: Option<&User>, now: DateTime) -> bool {
    is_published(post, now) || actor.is_some_and(|user| user.id == post.author_id)
}

const DEFAULT_REPLY_CAP: u32 = 100;
const DEFAULT_REACTION_CAP: u32 = 100;

/// Configurable capacity limits for embedded lists.
#[derive(Debug, Clone, Copy)]
pub struct PolicyLimits {
    reply_cap: u32,
    reaction_cap: u32,
}

impl PolicyLimits {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reply_cap: DEFAULT_REPLY_CAP,
            reaction_cap: DEFAULT_REACTION_CAP,
        }
    }

    #[must_use]
    pub const fn with_reply_cap(mut self, cap: u32) -> Self {
        self.reply_cap = cap;
        self
    }

    #[must_use]
    pub const fn with_reaction_cap(mut self, cap: u32) -> Self {
        self.reaction_cap = cap;
        self
    }

    #[must_use]
    pub const fn reply_cap(&self) -> u32 {
        self.reply_cap
    }

    #[must_use]
    pub const fn reaction_cap(&self) -> u32 {
        self.reaction_cap
    }

    /// Filter key that only matches while the reply list is below the cap:
    /// element `cap - 1` must not exist yet.
    #[must_use]
    pub fn reply_guard_key(&self) -> String {
        format!("replies.{}", self.reply_cap - 1)
    }

    /// Filter key that only matches while the reacting-user set is below the cap.
    #[must_use]
    pub fn reaction_guard_key(&self) -> String {
        format!("user_ids.{}", self.reaction_cap - 1)
    }
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn user() -> User {
        User::new("alice".to_string(), "Alice".to_string(), None)
    }

    fn post_by(author: &User, publish_at: Option<DateTime>) -> Post {
        let now = DateTime::now();
        Post {
            id: ObjectId::new(),
            author_id: author.id,
            title: "title".to_string(),
            slug: "title".to_string(),
            short_description: None,
            description: None,
            cover_image: None,
            publish_at,
            total_comments: 0,
            total_reactions: 0,
            topic_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn minutes_from_now(minutes: i64) -> DateTime {
        DateTime::from_millis(DateTime::now().timestamp_millis() + minutes * 60 * 1000)
    }

    #[test]
    fn only_the_author_can_modify_a_post() {
        let author = user();
        let other = user();
        let post = post_by(&author, None);

        assert!(can_modify_post(&post, &author));
        assert!(!can_modify_post(&post, &other));
    }

    #[test]
    fn only_the_author_can_modify_comments_and_replies() {
        let author = user();
        let other = user();

        let comment = Comment::new(author.id, ObjectId::new(), "text".to_string());
        assert!(can_modify_comment(&comment, &author));
        assert!(!can_modify_comment(&comment, &other));

        let reply = ReplyEntry::new(author.id, "text".to_string());
        assert!(can_modify_reply(&reply, &author));
        assert!(!can_modify_reply(&reply, &other));
    }

    #[test]
    fn published_posts_are_visible_to_everyone() {
        let author = user();
        let other = user();
        let post = post_by(&author, Some(minutes_from_now(-5)));
        let now = DateTime::now();

        assert!(can_view_post(&post, None, now));
        assert!(can_view_post(&post, Some(&other), now));
        assert!(can_view_post(&post, Some(&author), now));
    }

    #[test]
    fn scheduled_posts_are_visible_only_to_their_author() {
        let author = user();
        let other = user();
        let post = post_by(&author, Some(minutes_from_now(5)));
        let now = DateTime::now();

        assert!(!is_published(&post, now));
        assert!(!can_view_post(&post, None, now));
        assert!(!can_view_post(&post, Some(&other), now));
        assert!(can_view_post(&post, Some(&author), now));
    }

    #[test]
    fn unscheduled_posts_are_drafts() {
        let author = user();
        let post = post_by(&author, None);
        let now = DateTime::now();

        assert!(!can_view_post(&post, None, now));
        assert!(can_view_post(&post, Some(&author), now));
    }

    #[test]
    fn guard_keys_use_the_last_allowed_index() {
        let limits = PolicyLimits::new();
        assert_eq!(limits.reply_guard_key(), "replies.99");
        assert_eq!(limits.reaction_guard_key(), "user_ids.99");

        let limits = PolicyLimits::new().with_reply_cap(5).with_reaction_cap(2);
        assert_eq!(limits.reply_guard_key(), "replies.4");
        assert_eq!(limits.reaction_guard_key(), "user_ids.1");
    }
}
