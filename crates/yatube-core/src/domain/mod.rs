//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentEntry, NewComment};
pub use follow::{Follow, FollowOutcome};
pub use group::{Group, GroupSummary, NewGroup};
pub use post::{NewPost, Post, PostEntry, PostScope};
pub use user::{NewUser, User, UserSummary};

pub type UserId = i64;
pub type GroupId = i64;
pub type PostId = i64;
pub type CommentId = i64;
