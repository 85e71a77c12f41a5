use async_trait::async_trait;

use crate::domain::{
    Comment, CommentEntry, CommentId, Group, GroupId, NewComment, NewGroup, NewPost, NewUser, Post,
    PostEntry, PostId, PostScope, User, UserId,
};
use crate::error::RepoError;

/// Generic repository trait defining the operations every entity store shares.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Dependent rows go with it.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserId> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user. A taken username is a `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, GroupId> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist the mutable fields of a post (text, group, image).
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// A window of the posts selected by `scope`, newest first.
    async fn find_entries(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError>;

    async fn count(&self, scope: PostScope) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, CommentId> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of a post, newest first.
    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentEntry>, RepoError>;
}

/// Storage of directed follow edges.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the edge unless it already exists. Returns whether a row was added.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        author_id: UserId,
    ) -> Result<bool, RepoError>;

    /// Remove the edge if present. Returns whether a row was removed.
    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError>;

    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError>;

    /// How many users follow `author_id`.
    async fn count_followers(&self, author_id: UserId) -> Result<u64, RepoError>;

    /// How many authors `user_id` follows.
    async fn count_following(&self, user_id: UserId) -> Result<u64, RepoError>;
}
