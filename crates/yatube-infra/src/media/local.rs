//! Images kept on the local filesystem under a media root.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use uuid::Uuid;

use yatube_core::ports::{MediaError, MediaStore, Upload};

/// Sub-directory of the media root that post images are written to.
pub const POSTS_DIR: &str = "posts";

/// Writes uploads to `<root>/posts/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a stored relative path back to a file under the root.
    ///
    /// Returns `None` for anything that could escape the root.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (safe && !relative.as_os_str().is_empty()).then(|| self.root.join(relative))
    }

    /// MIME type to serve a stored file with.
    pub fn content_type(path: &Path) -> &'static str {
        ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn check_image(&self, bytes: &[u8]) -> Result<(), MediaError> {
        image::load_from_memory(bytes)
            .map(|_| ())
            .map_err(|e| MediaError::InvalidImage(e.to_string()))
    }

    async fn save(&self, upload: &Upload) -> Result<String, MediaError> {
        let format = image::guess_format(&upload.bytes)
            .map_err(|e| MediaError::InvalidImage(e.to_string()))?;
        let extension = format.extensions_str().first().copied().unwrap_or("img");

        let relative = format!("{POSTS_DIR}/{}.{extension}", Uuid::new_v4().simple());
        let target = self.root.join(&relative);

        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        tokio::fs::write(&target, &upload.bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::info!(path = %relative, original = %upload.filename, size = upload.bytes.len(), "Stored upload");
        Ok(relative)
    }
}

#[cfg(test)]
pub(crate) fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(4, 4)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: Vec<u8>) -> Upload {
        Upload {
            filename: "pic.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes,
        }
    }

    #[test]
    fn test_check_image() {
        let store = LocalMediaStore::new("unused");

        assert!(store.check_image(&png_bytes()).is_ok());
        assert!(matches!(
            store.check_image(b"not an image"),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[tokio::test]
    async fn test_save_writes_under_posts() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let relative = store.save(&upload(png_bytes())).await.unwrap();

        assert!(relative.starts_with("posts/"));
        assert!(relative.ends_with(".png"));
        let written = tokio::fs::read(dir.path().join(&relative)).await.unwrap();
        assert_eq!(written, png_bytes());
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = LocalMediaStore::new("/srv/media");

        assert_eq!(
            store.resolve("posts/a.png"),
            Some(PathBuf::from("/srv/media/posts/a.png"))
        );
        assert_eq!(store.resolve("../etc/passwd"), None);
        assert_eq!(store.resolve("/etc/passwd"), None);
        assert_eq!(store.resolve(""), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            LocalMediaStore::content_type(Path::new("posts/a.png")),
            "image/png"
        );
        assert_eq!(
            LocalMediaStore::content_type(Path::new("posts/a.unknown")),
            "application/octet-stream"
        );
    }
}
