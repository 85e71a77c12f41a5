//! Follow Graph Manager - directed "user follows author" edges.

use std::sync::Arc;

use crate::domain::{FollowOutcome, User, UserId};
use crate::error::DomainError;
use crate::ports::{FollowRepository, UserRepository};

/// Creates and removes follow edges.
///
/// Holds no locks: concurrent requests rely on the store's unique
/// (user, author) constraint and insert-if-absent semantics.
#[derive(Clone)]
pub struct FollowGraph {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowGraph {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    /// Make `user` follow `target_username`. Repeating it changes nothing;
    /// following yourself is ignored.
    pub async fn follow(
        &self,
        user: UserId,
        target_username: &str,
    ) -> Result<FollowOutcome, DomainError> {
        let target = self.resolve(target_username).await?;

        if target.id == user {
            tracing::debug!(user_id = user, "Ignoring self-follow");
            return Ok(FollowOutcome::SelfFollow);
        }

        let outcome = if self.follows.insert_if_absent(user, target.id).await? {
            FollowOutcome::Created
        } else {
            FollowOutcome::AlreadyFollowing
        };

        tracing::info!(user_id = user, author_id = target.id, ?outcome, "Follow");
        Ok(outcome)
    }

    /// Remove the edge if it exists. Returns whether anything was removed.
    pub async fn unfollow(&self, user: UserId, target_username: &str) -> Result<bool, DomainError> {
        let target = self.resolve(target_username).await?;
        let removed = self.follows.remove(user, target.id).await?;

        tracing::info!(user_id = user, author_id = target.id, removed, "Unfollow");
        Ok(removed)
    }

    pub async fn is_following(&self, user: UserId, author: UserId) -> Result<bool, DomainError> {
        Ok(self.follows.exists(user, author).await?)
    }

    async fn resolve(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }
}
