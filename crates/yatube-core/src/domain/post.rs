use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, GroupSummary, PostId, UserId, UserSummary};

/// Post entity - a single publication.
///
/// `author_id` and `pub_date` are fixed at creation; updates only touch
/// `text`, `group_id` and `image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
    /// Path of the image relative to the media root, e.g. `posts/abc.png`.
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

/// A post joined with its author and group, as listed in feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: UserSummary,
    pub group: Option<GroupSummary>,
}

/// Which posts a feed query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Every post.
    All,
    /// Posts of one group.
    Group(GroupId),
    /// Posts written by one author.
    Author(UserId),
    /// Posts whose author is followed by the given user.
    FollowedBy(UserId),
}
