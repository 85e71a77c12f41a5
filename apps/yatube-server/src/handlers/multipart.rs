//! Reading the multipart post form.

use actix_multipart::Multipart;
use actix_web::http::header::{self, ContentDisposition};
use futures_util::StreamExt;

use yatube_core::forms::PostForm;
use yatube_core::ports::Upload;

use crate::middleware::error::AppError;

/// Largest accepted image upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Collect the `text`, `group`, `image` and `image-clear` fields.
pub async fn read_post_form(mut payload: Multipart) -> Result<PostForm, AppError> {
    let mut text = String::new();
    let mut group = None;
    let mut image = None;
    let mut clear_image = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;

        let disposition = field
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| ContentDisposition::from_raw(value).ok());
        let name = disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let filename = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::BadRequest("Upload too large".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "text" => text = String::from_utf8_lossy(&bytes).into_owned(),
            "group" => group = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "image" => {
                image = Some(Upload {
                    filename: filename.unwrap_or_default(),
                    content_type,
                    bytes,
                })
            }
            "image-clear" => clear_image = true,
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(PostForm::new(&text, group, image, clear_image))
}
