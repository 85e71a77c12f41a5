//! Feed pages.

use actix_web::{HttpRequest, HttpResponse, web};

use yatube_core::services::FeedBuilder;
use yatube_shared::dto::PageQuery;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

/// GET / - every post, served from the page cache.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let key = FeedBuilder::index_cache_key(path_and_query);

    let page = state.feeds.index(&key, query.page.as_deref()).await?;
    views::render(views::feed::index_page(viewer.0.as_ref(), &page))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let feed = state.feeds.group(&slug, query.page.as_deref()).await?;
    views::render(views::feed::group_page(viewer.0.as_ref(), &feed))
}

/// GET /follow/ - posts of the authors the viewer follows.
pub async fn follow_index(
    identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .feeds
        .follow(identity.user_id, query.page.as_deref())
        .await?;
    views::render(views::feed::follow_page(&identity, &page))
}

/// GET /{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let profile = state
        .feeds
        .profile(&username, viewer.user_id(), query.page.as_deref())
        .await?;
    views::render(views::feed::profile_page(viewer.0.as_ref(), &profile))
}
