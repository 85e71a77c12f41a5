//! Application services composed from the ports.

mod accounts;
mod feed;
mod follow;
mod posts;

pub use accounts::AccountService;
pub use feed::{FeedBuilder, GroupFeed, INDEX_CACHE_PREFIX, INDEX_CACHE_TTL, ProfileFeed};
pub use follow::FollowGraph;
pub use posts::{PostDetail, PostService};
