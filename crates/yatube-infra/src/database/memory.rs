//! In-memory content store - used by tests and by `minimal` builds.
//!
//! Mirrors the relational schema: unique usernames, slugs and follow pairs,
//! and the same delete cascades the migration declares as foreign keys.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use yatube_core::domain::{
    Comment, CommentEntry, CommentId, Follow, Group, GroupId, NewComment, NewGroup, NewPost,
    NewUser, Post, PostEntry, PostId, PostScope, User, UserId,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, Group>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    follows: BTreeMap<i64, Follow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn in_scope(&self, post: &Post, scope: PostScope) -> bool {
        match scope {
            PostScope::All => true,
            PostScope::Group(group_id) => post.group_id == Some(group_id),
            PostScope::Author(author_id) => post.author_id == author_id,
            PostScope::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn remove_posts_where(&mut self, pred: impl Fn(&Post) -> bool) {
        let doomed: Vec<PostId> = self
            .posts
            .values()
            .filter(|post| pred(post))
            .map(|post| post.id)
            .collect();
        for id in doomed {
            self.remove_post(id);
        }
    }

    fn remove_post(&mut self, id: PostId) -> bool {
        let removed = self.posts.remove(&id).is_some();
        self.comments.retain(|_, c| c.post_id != id);
        removed
    }
}

/// Every repository port over one shared set of tables.
///
/// Ids come from a single counter, so they are unique across tables and
/// grow with insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, UserId> for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.remove_posts_where(|post| post.author_id == id);
        tables.comments.retain(|_, c| c.author_id != id);
        tables
            .follows
            .retain(|_, f| f.user_id != id && f.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                user.username
            )));
        }

        let user = User {
            id: tables.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Group, GroupId> for InMemoryStore {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn delete(&self, id: GroupId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.remove_posts_where(|post| post.group_id == Some(id));
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups: Vec<Group> = self.tables.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug {} already exists",
                group.slug
            )));
        }

        let group = Group {
            id: tables.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        if self.tables.write().await.remove_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("unknown author".to_string()));
        }
        if post.group_id.is_some_and(|id| !tables.groups.contains_key(&id)) {
            return Err(RepoError::Constraint("unknown group".to_string()));
        }

        let post = Post {
            id: tables.next_id(),
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        stored.text = post.text;
        stored.group_id = post.group_id;
        stored.image = post.image;
        Ok(stored.clone())
    }

    async fn find_entries(
        &self,
        scope: PostScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| tables.in_scope(post, scope))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let groups: HashMap<GroupId, &Group> = tables.groups.iter().map(|(k, v)| (*k, v)).collect();

        posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|post| {
                let author = tables
                    .users
                    .get(&post.author_id)
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
                Ok(PostEntry {
                    post: post.clone(),
                    author: author.summary(),
                    group: post
                        .group_id
                        .and_then(|id| groups.get(&id))
                        .map(|g| g.summary()),
                })
            })
            .collect()
    }

    async fn count(&self, scope: PostScope) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|post| tables.in_scope(post, scope))
            .count() as u64)
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentId> for InMemoryStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn delete(&self, id: CommentId) -> Result<(), RepoError> {
        match self.tables.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("unknown post".to_string()));
        }
        if !tables.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("unknown author".to_string()));
        }

        let comment = Comment {
            id: tables.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

        comments
            .into_iter()
            .map(|comment| {
                let author = tables.users.get(&comment.author_id).ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author", comment.id))
                })?;
                Ok(CommentEntry {
                    comment: comment.clone(),
                    author: author.summary(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert_if_absent(
        &self,
        user_id: UserId,
        author_id: UserId,
    ) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) || !tables.users.contains_key(&author_id) {
            return Err(RepoError::Constraint("unknown user".to_string()));
        }
        if user_id == author_id {
            return Err(RepoError::Constraint("self follow".to_string()));
        }
        if tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let id = tables.next_id();
        tables.follows.insert(
            id,
            Follow {
                id,
                user_id,
                author_id,
            },
        );
        Ok(true)
    }

    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }

    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_followers(&self, author_id: UserId) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.author_id == author_id)
            .count() as u64)
    }

    async fn count_following(&self, user_id: UserId) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.user_id == user_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use yatube_core::error::DomainError;
    use yatube_core::forms::{
        CommentForm, INVALID_GROUP, INVALID_IMAGE, INVALID_LOGIN, NON_FIELD, PostForm,
        SignupForm, UPLOAD_AND_CLEAR, USERNAME_TAKEN,
    };
    use yatube_core::ports::{AuthError, PasswordService, Upload};
    use yatube_core::services::{AccountService, FeedBuilder, FollowGraph, PostService};
    use yatube_core::domain::FollowOutcome;

    use super::*;
    use crate::cache::InMemoryCache;
    use crate::media::{LocalMediaStore, png_bytes};

    struct PlainPasswords;

    impl PasswordService for PlainPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("plain${password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == format!("plain${password}"))
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        feeds: FeedBuilder,
        graph: FollowGraph,
        posts: PostService,
        accounts: AccountService,
        media_root: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let media_root = tempfile::tempdir().unwrap();
        let media = Arc::new(LocalMediaStore::new(media_root.path()));

        Fixture {
            feeds: FeedBuilder::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                Arc::new(InMemoryCache::new()),
            ),
            graph: FollowGraph::new(store.clone(), store.clone()),
            posts: PostService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                media,
            ),
            accounts: AccountService::new(store.clone(), Arc::new(PlainPasswords)),
            store,
            media_root,
        }
    }

    async fn user(store: &InMemoryStore, username: &str) -> User {
        UserRepository::create(
            store,
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: String::new(),
            },
        )
        .await
        .unwrap()
    }

    async fn group(store: &InMemoryStore, slug: &str) -> Group {
        GroupRepository::create(
            store,
            NewGroup {
                title: format!("Group {slug}"),
                slug: slug.to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap()
    }

    async fn post(store: &InMemoryStore, author: &User, group: Option<&Group>, text: &str) -> Post {
        PostRepository::create(
            store,
            NewPost {
                text: text.to_string(),
                author_id: author.id,
                group_id: group.map(|g| g.id),
                image: None,
            },
        )
        .await
        .unwrap()
    }

    fn form_errors(err: DomainError) -> yatube_core::forms::FormErrors {
        match err {
            DomainError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_pages_newest_first() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        for i in 0..13 {
            post(&fx.store, &author, None, &format!("post {i}")).await;
        }

        let first = fx.feeds.index("index_page:/", None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.items[0].post.text, "post 12");
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next());

        let second = fx.feeds.index("index_page:/?page=2", Some("2")).await.unwrap();
        assert_eq!(second.items.len(), 3);
        assert_eq!(second.items[2].post.text, "post 0");
        assert!(second.has_previous());
    }

    #[tokio::test]
    async fn test_out_of_range_pages() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        for i in 0..13 {
            post(&fx.store, &author, None, &format!("post {i}")).await;
        }

        let page = fx.feeds.follow(author.id, Some("abc")).await.unwrap();
        assert_eq!(page.number, 1);

        let page = fx.feeds.profile("leo", None, Some("99")).await.unwrap().page;
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 3);

        let page = fx.feeds.profile("leo", None, Some("0")).await.unwrap().page;
        assert_eq!(page.number, 2);
    }

    #[tokio::test]
    async fn test_index_served_from_cache() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        post(&fx.store, &author, None, "first").await;

        let before = fx.feeds.index("index_page:/", None).await.unwrap();
        post(&fx.store, &author, None, "second").await;
        let cached = fx.feeds.index("index_page:/", None).await.unwrap();
        assert_eq!(cached, before);

        let fresh = fx.feeds.index("index_page:/?page=1", Some("1")).await.unwrap();
        assert_eq!(fresh.count, 2);
    }

    #[tokio::test]
    async fn test_group_feed_only_lists_group_posts() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        let cats = group(&fx.store, "cats").await;
        post(&fx.store, &author, Some(&cats), "meow").await;
        post(&fx.store, &author, None, "plain").await;

        let feed = fx.feeds.group("cats", None).await.unwrap();
        assert_eq!(feed.group.slug, "cats");
        assert_eq!(feed.page.count, 1);
        let entry = &feed.page.items[0];
        assert_eq!(entry.post.text, "meow");
        assert_eq!(entry.group.as_ref().map(|g| g.slug.as_str()), Some("cats"));

        let missing = fx.feeds.group("dogs", None).await.unwrap_err();
        assert!(matches!(missing, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_follow_feed_lists_followed_authors() {
        let fx = fixture();
        let reader = user(&fx.store, "reader").await;
        let followed = user(&fx.store, "followed").await;
        let other = user(&fx.store, "other").await;
        post(&fx.store, &followed, None, "visible").await;
        post(&fx.store, &other, None, "hidden").await;

        let empty = fx.feeds.follow(reader.id, None).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.num_pages, 1);

        fx.graph.follow(reader.id, "followed").await.unwrap();
        let feed = fx.feeds.follow(reader.id, None).await.unwrap();
        assert_eq!(feed.count, 1);
        assert_eq!(feed.items[0].post.text, "visible");
        assert_eq!(feed.items[0].author.username, "followed");
    }

    #[tokio::test]
    async fn test_follow_feed_merges_authors_newest_first() {
        let fx = fixture();
        let reader = user(&fx.store, "reader").await;
        let anna = user(&fx.store, "anna").await;
        let boris = user(&fx.store, "boris").await;
        let stranger = user(&fx.store, "stranger").await;
        fx.graph.follow(reader.id, "anna").await.unwrap();
        fx.graph.follow(reader.id, "boris").await.unwrap();

        post(&fx.store, &anna, None, "anna 1").await;
        post(&fx.store, &stranger, None, "stranger 1").await;
        post(&fx.store, &boris, None, "boris 1").await;
        post(&fx.store, &anna, None, "anna 2").await;
        post(&fx.store, &stranger, None, "stranger 2").await;
        post(&fx.store, &boris, None, "boris 2").await;
        post(&fx.store, &anna, None, "anna 3").await;

        let feed = fx.feeds.follow(reader.id, None).await.unwrap();
        let texts: Vec<&str> = feed.items.iter().map(|e| e.post.text.as_str()).collect();
        assert_eq!(texts, ["anna 3", "boris 2", "anna 2", "boris 1", "anna 1"]);
        assert_eq!(feed.count, 5);
    }

    #[tokio::test]
    async fn test_rows_must_reference_existing_users() {
        let fx = fixture();
        let leo = user(&fx.store, "leo").await;
        let hello = post(&fx.store, &leo, None, "hello").await;

        let ghost: UserId = 9_999;
        let err = CommentRepository::create(
            fx.store.as_ref(),
            NewComment {
                post_id: hello.id,
                author_id: ghost,
                text: "boo".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert!(fx.store.list_for_post(hello.id).await.unwrap().is_empty());

        let err = fx.store.insert_if_absent(ghost, leo.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        let err = fx.store.insert_if_absent(leo.id, ghost).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        let err = fx.store.insert_if_absent(leo.id, leo.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(fx.store.count_following(leo.id).await.unwrap(), 0);
        assert_eq!(fx.store.count_followers(leo.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let fx = fixture();
        let reader = user(&fx.store, "reader").await;
        let author = user(&fx.store, "author").await;

        assert_eq!(
            fx.graph.follow(reader.id, "author").await.unwrap(),
            FollowOutcome::Created
        );
        assert_eq!(
            fx.graph.follow(reader.id, "author").await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );
        assert_eq!(fx.store.count_followers(author.id).await.unwrap(), 1);
        assert!(fx.graph.is_following(reader.id, author.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_creates_nothing() {
        let fx = fixture();
        let leo = user(&fx.store, "leo").await;

        assert_eq!(
            fx.graph.follow(leo.id, "leo").await.unwrap(),
            FollowOutcome::SelfFollow
        );
        assert_eq!(fx.store.count_following(leo.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unfollow() {
        let fx = fixture();
        let reader = user(&fx.store, "reader").await;
        let author = user(&fx.store, "author").await;

        assert!(!fx.graph.unfollow(reader.id, "author").await.unwrap());

        fx.graph.follow(reader.id, "author").await.unwrap();
        assert!(fx.graph.unfollow(reader.id, "author").await.unwrap());
        assert!(!fx.store.exists(reader.id, author.id).await.unwrap());

        let missing = fx.graph.follow(reader.id, "nobody").await.unwrap_err();
        assert!(matches!(missing, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_profile_reports_follow_state() {
        let fx = fixture();
        let reader = user(&fx.store, "reader").await;
        let author = user(&fx.store, "author").await;
        post(&fx.store, &author, None, "hello").await;
        fx.graph.follow(reader.id, "author").await.unwrap();

        let profile = fx
            .feeds
            .profile("author", Some(reader.id), None)
            .await
            .unwrap();
        assert!(profile.following);
        assert_eq!(profile.followers_count, 1);
        assert_eq!(profile.following_count, 0);
        assert_eq!(profile.page.count, 1);

        let anonymous = fx.feeds.profile("author", None, None).await.unwrap();
        assert!(!anonymous.following);
    }

    #[tokio::test]
    async fn test_create_post_with_image() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        let cats = group(&fx.store, "cats").await;

        let form = PostForm::new(
            "  with picture ",
            Some(cats.id.to_string()),
            Some(Upload {
                filename: "small.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: png_bytes(),
            }),
            false,
        );
        let created = fx.posts.create_post(author.id, form).await.unwrap();

        assert_eq!(created.text, "with picture");
        assert_eq!(created.group_id, Some(cats.id));
        let image = created.image.unwrap();
        assert!(image.starts_with("posts/"));
        assert!(fx.media_root.path().join(&image).exists());
    }

    #[tokio::test]
    async fn test_invalid_image_stores_nothing() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;

        let form = PostForm::new(
            "text",
            None,
            Some(Upload {
                filename: "fake.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: b"not an image".to_vec(),
            }),
            false,
        );
        let errors = form_errors(fx.posts.create_post(author.id, form).await.unwrap_err());

        assert_eq!(errors.get("image"), [INVALID_IMAGE.to_string()]);
        assert_eq!(fx.store.count(PostScope::All).await.unwrap(), 0);
        assert!(!fx.media_root.path().join("posts").exists());
    }

    #[tokio::test]
    async fn test_unknown_group_is_rejected() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;

        let form = PostForm::new("text", Some("999".to_string()), None, false);
        let errors = form_errors(fx.posts.create_post(author.id, form).await.unwrap_err());

        assert_eq!(errors.get("group"), [INVALID_GROUP.to_string()]);
    }

    #[tokio::test]
    async fn test_edit_post() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        let stranger = user(&fx.store, "stranger").await;
        let original = post(&fx.store, &author, None, "draft").await;

        let denied = fx
            .posts
            .post_for_edit(stranger.id, "leo", original.id)
            .await
            .unwrap_err();
        assert!(matches!(denied, DomainError::Forbidden));

        let edited = fx
            .posts
            .edit_post(
                author.id,
                "leo",
                original.id,
                PostForm::new("final", None, None, false),
            )
            .await
            .unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.text, "final");
        assert_eq!(edited.pub_date, original.pub_date);
        assert_eq!(edited.author_id, author.id);
        assert_eq!(fx.store.count(PostScope::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_edit_rejects_upload_with_clear() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        let original = post(&fx.store, &author, None, "draft").await;

        let form = PostForm::new(
            "changed",
            None,
            Some(Upload {
                filename: "small.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: png_bytes(),
            }),
            true,
        );
        let errors = form_errors(
            fx.posts
                .edit_post(author.id, "leo", original.id, form)
                .await
                .unwrap_err(),
        );

        assert_eq!(errors.get("image"), [UPLOAD_AND_CLEAR.to_string()]);
        let stored: Post = BaseRepository::<Post, PostId>::find_by_id(fx.store.as_ref(), original.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.text, "draft");
        assert!(!fx.media_root.path().join("posts").exists());
    }

    #[tokio::test]
    async fn test_post_detail_requires_matching_author() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        user(&fx.store, "other").await;
        let p = post(&fx.store, &author, None, "mine").await;

        assert!(fx.posts.post_detail("leo", p.id).await.is_ok());
        let wrong = fx.posts.post_detail("other", p.id).await.unwrap_err();
        assert!(matches!(wrong, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_comments_newest_first() {
        let fx = fixture();
        let author = user(&fx.store, "leo").await;
        let reader = user(&fx.store, "reader").await;
        let p = post(&fx.store, &author, None, "discuss").await;

        for text in ["first", "second"] {
            let comment = fx
                .posts
                .add_comment(reader.id, "leo", p.id, CommentForm::new(text))
                .await
                .unwrap();
            assert!(comment.is_some());
        }
        let blank = fx
            .posts
            .add_comment(reader.id, "leo", p.id, CommentForm::new("   "))
            .await
            .unwrap();
        assert!(blank.is_none());

        let detail = fx.posts.post_detail("leo", p.id).await.unwrap();
        let texts: Vec<&str> = detail
            .comments
            .iter()
            .map(|c| c.comment.text.as_str())
            .collect();
        assert_eq!(texts, ["second", "first"]);
        assert_eq!(detail.comments[0].author.username, "reader");
    }

    #[tokio::test]
    async fn test_signup_and_login() {
        let fx = fixture();

        let created = fx
            .accounts
            .signup(SignupForm::new("leo", "", "s3cret-pass", "s3cret-pass"))
            .await
            .unwrap();
        assert_eq!(created.username, "leo");

        let taken = fx
            .accounts
            .signup(SignupForm::new("leo", "", "s3cret-pass", "s3cret-pass"))
            .await
            .unwrap_err();
        assert_eq!(form_errors(taken).get("username"), [USERNAME_TAKEN.to_string()]);

        let user = fx.accounts.authenticate("leo", "s3cret-pass").await.unwrap();
        assert_eq!(user.id, created.id);

        let wrong = fx
            .accounts
            .authenticate("leo", "wrong-pass")
            .await
            .unwrap_err();
        assert_eq!(form_errors(wrong).get(NON_FIELD), [INVALID_LOGIN.to_string()]);
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let fx = fixture();
        let author = user(&fx.store, "author").await;
        let reader = user(&fx.store, "reader").await;
        let p = post(&fx.store, &author, None, "soon gone").await;
        let reply = CommentRepository::create(
            fx.store.as_ref(),
            NewComment {
                post_id: p.id,
                author_id: reader.id,
                text: "bye".to_string(),
            },
        )
        .await
        .unwrap();
        fx.store.insert_if_absent(reader.id, author.id).await.unwrap();
        fx.store.insert_if_absent(author.id, reader.id).await.unwrap();

        BaseRepository::<User, UserId>::delete(fx.store.as_ref(), author.id)
            .await
            .unwrap();

        assert_eq!(fx.store.count(PostScope::All).await.unwrap(), 0);
        let comment: Option<Comment> = BaseRepository::<Comment, CommentId>::find_by_id(
            fx.store.as_ref(),
            reply.id,
        )
        .await
        .unwrap();
        assert!(comment.is_none());
        assert_eq!(fx.store.count_following(reader.id).await.unwrap(), 0);
        assert_eq!(fx.store.count_followers(reader.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleting_group_cascades_to_posts() {
        let fx = fixture();
        let author = user(&fx.store, "author").await;
        let cats = group(&fx.store, "cats").await;
        post(&fx.store, &author, Some(&cats), "in group").await;
        post(&fx.store, &author, None, "outside").await;

        BaseRepository::<Group, GroupId>::delete(fx.store.as_ref(), cats.id)
            .await
            .unwrap();

        assert_eq!(fx.store.count(PostScope::All).await.unwrap(), 1);
    }
}
