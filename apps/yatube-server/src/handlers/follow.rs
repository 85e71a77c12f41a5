//! Follow and unfollow.

use actix_web::{HttpResponse, web};

use super::{profile_url, redirect};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /{username}/follow/
pub async fn profile_follow(
    identity: Identity,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.graph.follow(identity.user_id, &username).await?;
    Ok(redirect(profile_url(&username)))
}

/// GET /{username}/unfollow/
pub async fn profile_unfollow(
    identity: Identity,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.graph.unfollow(identity.user_id, &username).await?;
    Ok(redirect(profile_url(&username)))
}
