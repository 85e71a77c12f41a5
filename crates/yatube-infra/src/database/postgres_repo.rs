//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Select, Set,
};

use yatube_core::domain::{
    Comment, CommentEntry, Group, GroupSummary, NewComment, NewGroup, NewPost, NewUser, Post,
    PostEntry, PostId, PostScope, User, UserId, UserSummary,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow edge repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

fn summary(model: user::Model) -> UserSummary {
    UserSummary {
        id: model.id,
        username: model.username,
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let model = group::ActiveModel::from(group)
            .insert(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }
}

impl PostgresPostRepository {
    fn scoped(scope: PostScope) -> Select<PostEntity> {
        let query = PostEntity::find();
        match scope {
            PostScope::All => query,
            PostScope::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id)),
            PostScope::Author(author_id) => query.filter(post::Column::AuthorId.eq(author_id)),
            PostScope::FollowedBy(user_id) => query.filter(
                post::Column::AuthorId.in_subquery(
                    FollowEntity::find()
                        .select_only()
                        .column(follow::Column::AuthorId)
                        .filter(follow::Column::UserId.eq(user_id))
                        .into_query(),
                ),
            ),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .update(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn find_entries(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let rows = Self::scoped(scope)
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        let group_ids: Vec<i64> = rows.iter().filter_map(|(p, _)| p.group_id).collect();
        let groups: HashMap<i64, GroupSummary> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(repo_error)?
                .into_iter()
                .map(|g| {
                    let group: Group = g.into();
                    (group.id, group.summary())
                })
                .collect()
        };

        rows.into_iter()
            .map(|(post, author)| {
                let author = author
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostEntry {
                    post: post.into(),
                    author: summary(author),
                    group,
                })
            })
            .collect()
    }

    async fn count(&self, scope: PostScope) -> Result<u64, RepoError> {
        Self::scoped(scope)
            .count(&self.db)
            .await
            .map_err(repo_error)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(comment)
            .insert(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author", comment.id))
                })?;
                Ok(CommentEntry {
                    comment: comment.into(),
                    author: summary(author),
                })
            })
            .collect()
    }
}

impl PostgresFollowRepository {
    fn edge(user_id: UserId, author_id: UserId) -> Select<FollowEntity> {
        FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    /// Relies on the unique `(user_id, author_id)` index, so concurrent
    /// requests for the same pair insert one row.
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        author_id: UserId,
    ) -> Result<bool, RepoError> {
        let edge = follow::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            author_id: Set(author_id),
        };

        let rows = FollowEntity::insert(edge)
            .on_conflict(
                OnConflict::columns([follow::Column::UserId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(rows > 0)
    }

    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError> {
        let found = Self::edge(user_id, author_id)
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(found.is_some())
    }

    async fn count_followers(&self, author_id: UserId) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(repo_error)
    }

    async fn count_following(&self, user_id: UserId) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(repo_error)
    }
}
