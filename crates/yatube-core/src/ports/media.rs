//! Media storage port - where uploaded post images go.

use async_trait::async_trait;

/// A file received from a form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Storage for uploaded images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Check that the bytes decode as a raster image.
    fn check_image(&self, bytes: &[u8]) -> Result<(), MediaError>;

    /// Store an already checked upload and return its path relative to the
    /// media root.
    async fn save(&self, upload: &Upload) -> Result<String, MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Not a valid image: {0}")]
    InvalidImage(String),

    #[error("Storage failed: {0}")]
    Io(String),
}
