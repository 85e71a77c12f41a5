//! SeaORM entities of the content store.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;
