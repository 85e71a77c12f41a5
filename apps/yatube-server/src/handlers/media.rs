//! Uploaded images.

use actix_web::{HttpResponse, web};

use yatube_infra::LocalMediaStore;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{path}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let file = state
        .media
        .resolve(&path)
        .ok_or_else(|| AppError::NotFound(path.to_string()))?;

    let bytes = tokio::fs::read(&file).await.map_err(|e| {
        tracing::debug!(path = %file.display(), error = %e, "Media file not readable");
        AppError::NotFound(path.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type(LocalMediaStore::content_type(&file))
        .body(bytes))
}
