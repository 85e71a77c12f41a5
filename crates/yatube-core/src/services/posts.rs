//! Post and comment handling: creation, editing, detail pages.

use std::sync::Arc;

use crate::domain::{
    Comment, CommentEntry, Group, GroupId, NewComment, NewPost, Post, PostId, User, UserId,
};
use crate::error::DomainError;
use crate::forms::{
    CommentForm, FormErrors, INVALID_GROUP, INVALID_IMAGE, PostForm, UPLOAD_AND_CLEAR,
};
use crate::ports::{
    CommentRepository, GroupRepository, MediaError, MediaStore, PostRepository, UserRepository,
};

/// Everything the single post page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub author: User,
    pub post: Post,
    pub group: Option<Group>,
    pub comments: Vec<CommentEntry>,
}

/// Form values that passed validation.
struct CleanPost {
    text: String,
    group_id: Option<GroupId>,
    image: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            comments,
            media,
        }
    }

    /// Choices for the group select box.
    pub async fn post_form_groups(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.list().await?)
    }

    pub async fn create_post(&self, author: UserId, form: PostForm) -> Result<Post, DomainError> {
        let clean = self.clean(form).await?;
        let post = self
            .posts
            .create(NewPost {
                text: clean.text,
                author_id: author,
                group_id: clean.group_id,
                image: clean.image,
            })
            .await?;

        tracing::info!(post_id = post.id, author_id = author, "Post created");
        Ok(post)
    }

    pub async fn post_detail(
        &self,
        username: &str,
        post_id: PostId,
    ) -> Result<PostDetail, DomainError> {
        let author = self.find_author(username).await?;
        let post = self.find_post_of(&author, post_id).await?;

        let group = match post.group_id {
            Some(id) => self.groups.find_by_id(id).await?,
            None => None,
        };
        let comments = self.comments.list_for_post(post.id).await?;

        Ok(PostDetail {
            author,
            post,
            group,
            comments,
        })
    }

    /// The post as the edit form starts from.
    ///
    /// Ownership is checked before the post is looked up, so a non-owner is
    /// sent away even for ids that do not exist.
    pub async fn post_for_edit(
        &self,
        viewer: UserId,
        username: &str,
        post_id: PostId,
    ) -> Result<Post, DomainError> {
        let author = self.find_author(username).await?;
        if author.id != viewer {
            return Err(DomainError::Forbidden);
        }
        self.find_post_of(&author, post_id).await
    }

    pub async fn edit_post(
        &self,
        viewer: UserId,
        username: &str,
        post_id: PostId,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        let mut post = self.post_for_edit(viewer, username, post_id).await?;
        let clear_image = form.clear_image;
        let clean = self.clean(form).await?;

        post.text = clean.text;
        post.group_id = clean.group_id;
        if clean.image.is_some() {
            post.image = clean.image;
        } else if clear_image {
            post.image = None;
        }

        let post = self.posts.update(post).await?;
        tracing::info!(post_id = post.id, "Post edited");
        Ok(post)
    }

    /// Add a comment under `username`'s post. Blank comments are dropped.
    pub async fn add_comment(
        &self,
        viewer: UserId,
        username: &str,
        post_id: PostId,
        form: CommentForm,
    ) -> Result<Option<Comment>, DomainError> {
        let author = self.find_author(username).await?;
        let post = self.find_post_of(&author, post_id).await?;

        if !form.check().is_empty() {
            tracing::debug!(post_id, "Ignoring invalid comment");
            return Ok(None);
        }

        let comment = self
            .comments
            .create(NewComment {
                post_id: post.id,
                author_id: viewer,
                text: form.text,
            })
            .await?;

        tracing::info!(comment_id = comment.id, post_id, "Comment added");
        Ok(Some(comment))
    }

    /// Validate every field, and store the image only when the whole form is
    /// valid.
    async fn clean(&self, form: PostForm) -> Result<CleanPost, DomainError> {
        let mut errors: FormErrors = form.check();

        let group_id = match form.group.as_deref() {
            None => None,
            Some(raw) => match self.resolve_group(raw).await? {
                Some(id) => Some(id),
                None => {
                    errors.add("group", INVALID_GROUP);
                    None
                }
            },
        };

        if let Some(upload) = &form.image {
            if form.clear_image {
                errors.add("image", UPLOAD_AND_CLEAR);
            } else if let Err(e) = self.media.check_image(&upload.bytes) {
                tracing::debug!(filename = %upload.filename, error = %e, "Rejected upload");
                errors.add("image", INVALID_IMAGE);
            }
        }

        errors.into_result().map_err(DomainError::Validation)?;

        let image = match &form.image {
            Some(upload) => Some(self.media.save(upload).await.map_err(|e| match e {
                MediaError::InvalidImage(_) => {
                    let mut errors = FormErrors::default();
                    errors.add("image", INVALID_IMAGE);
                    DomainError::Validation(errors)
                }
                MediaError::Io(msg) => DomainError::Internal(msg),
            })?),
            None => None,
        };

        Ok(CleanPost {
            text: form.text,
            group_id,
            image,
        })
    }

    async fn resolve_group(&self, raw: &str) -> Result<Option<GroupId>, DomainError> {
        let Ok(id) = raw.trim().parse::<GroupId>() else {
            return Ok(None);
        };
        Ok(self.groups.find_by_id(id).await?.map(|group| group.id))
    }

    async fn find_author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    async fn find_post_of(&self, author: &User, post_id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .filter(|post| post.author_id == author.id)
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }
}
