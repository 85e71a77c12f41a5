//! Feed pages: index, group, follow and profile.

use askama::Template;

use yatube_core::FeedPage;
use yatube_core::domain::{Group, PostEntry, User};
use yatube_core::services::{GroupFeed, ProfileFeed};

use super::filters;
use crate::middleware::auth::Identity;

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub page: &'a FeedPage<PostEntry>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub group: &'a Group,
    pub page: &'a FeedPage<PostEntry>,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub page: &'a FeedPage<PostEntry>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfilePage<'a> {
    pub viewer: Option<&'a Identity>,
    pub author: &'a User,
    pub page: &'a FeedPage<PostEntry>,
    pub following: bool,
    pub followers_count: u64,
    pub following_count: u64,
    /// Logged in and not looking at their own profile.
    pub can_follow: bool,
}

pub fn index_page<'a>(viewer: Option<&'a Identity>, page: &'a FeedPage<PostEntry>) -> IndexPage<'a> {
    IndexPage { viewer, page }
}

pub fn group_page<'a>(viewer: Option<&'a Identity>, feed: &'a GroupFeed) -> GroupPage<'a> {
    GroupPage {
        viewer,
        group: &feed.group,
        page: &feed.page,
    }
}

pub fn follow_page<'a>(viewer: &'a Identity, page: &'a FeedPage<PostEntry>) -> FollowPage<'a> {
    FollowPage {
        viewer: Some(viewer),
        page,
    }
}

pub fn profile_page<'a>(viewer: Option<&'a Identity>, profile: &'a ProfileFeed) -> ProfilePage<'a> {
    ProfilePage {
        viewer,
        author: &profile.author,
        page: &profile.page,
        following: profile.following,
        followers_count: profile.followers_count,
        following_count: profile.following_count,
        can_follow: viewer.is_some_and(|v| v.user_id != profile.author.id),
    }
}
