//! Storage of uploaded post images.

mod local;

pub use local::{LocalMediaStore, POSTS_DIR};

#[cfg(test)]
pub(crate) use local::png_bytes;
