//! Feed Builder - paginated post lists for every feed scope.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Group, PostEntry, PostScope, User, UserId};
use crate::error::DomainError;
use crate::pagination::{FeedPage, PAGE_SIZE, Paginator};
use crate::ports::{
    Cache, FollowRepository, GroupRepository, PostRepository, UserRepository, get_or_compute,
};

/// How long a rendered index page may be served from cache.
pub const INDEX_CACHE_TTL: Duration = Duration::from_secs(20);

/// Prefix of index page cache keys; the request path follows it.
pub const INDEX_CACHE_PREFIX: &str = "index_page";

/// A group together with one page of its posts.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: FeedPage<PostEntry>,
}

/// An author's page: their posts and where the viewer stands.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub page: FeedPage<PostEntry>,
    pub following: bool,
    pub followers_count: u64,
    pub following_count: u64,
}

/// Builds feeds. Read-only apart from filling the index page cache.
#[derive(Clone)]
pub struct FeedBuilder {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
    cache: Arc<dyn Cache>,
    index_ttl: Duration,
}

impl FeedBuilder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            follows,
            cache,
            index_ttl: INDEX_CACHE_TTL,
        }
    }

    pub fn with_index_ttl(mut self, ttl: Duration) -> Self {
        self.index_ttl = ttl;
        self
    }

    /// Cache key of the index page served at `path_and_query`.
    pub fn index_cache_key(path_and_query: &str) -> String {
        format!("{INDEX_CACHE_PREFIX}:{path_and_query}")
    }

    /// All posts. Served from the page cache; new posts show up once the
    /// cached page expires.
    pub async fn index(
        &self,
        cache_key: &str,
        page: Option<&str>,
    ) -> Result<FeedPage<PostEntry>, DomainError> {
        get_or_compute(self.cache.as_ref(), cache_key, self.index_ttl, || {
            self.paginate(PostScope::All, page)
        })
        .await
    }

    /// Posts of the group with `slug`.
    pub async fn group(&self, slug: &str, page: Option<&str>) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        let page = self.paginate(PostScope::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    /// Posts of every author `viewer` follows. An empty follow set is an
    /// empty feed.
    pub async fn follow(
        &self,
        viewer: UserId,
        page: Option<&str>,
    ) -> Result<FeedPage<PostEntry>, DomainError> {
        self.paginate(PostScope::FollowedBy(viewer), page).await
    }

    /// Posts of `username`, with the viewer's follow state.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<UserId>,
        page: Option<&str>,
    ) -> Result<ProfileFeed, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let following = match viewer {
            Some(viewer) => self.follows.exists(viewer, author.id).await?,
            None => false,
        };
        let page = self.paginate(PostScope::Author(author.id), page).await?;

        Ok(ProfileFeed {
            followers_count: self.follows.count_followers(author.id).await?,
            following_count: self.follows.count_following(author.id).await?,
            author,
            page,
            following,
        })
    }

    async fn paginate(
        &self,
        scope: PostScope,
        page: Option<&str>,
    ) -> Result<FeedPage<PostEntry>, DomainError> {
        let count = self.posts.count(scope).await?;
        let paginator = Paginator::new(count, PAGE_SIZE);
        let number = paginator.resolve(page);

        let items = self
            .posts
            .find_entries(scope, paginator.offset(number), PAGE_SIZE)
            .await?;

        tracing::debug!(?scope, page = number, count, "Feed page built");

        Ok(FeedPage {
            items,
            number,
            num_pages: paginator.num_pages(),
            count,
        })
    }
}
