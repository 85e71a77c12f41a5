//! HTTP handlers and route configuration.

mod auth;
mod feed;
mod follow;
mod health;
mod media;
mod multipart;
mod posts;


use actix_web::http::header;
use actix_web::{HttpResponse, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
///
/// Fixed paths are registered before the `/{username}/...` patterns so
/// they win the match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .route("/logout/", web::get().to(auth::logout)),
        )
        .route("/media/{path:.*}", web::get().to(media::serve))
        .route("/", web::get().to(feed::index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .service(
            web::resource("/new/")
                .route(web::get().to(posts::new_post_form))
                .route(web::post().to(posts::new_post)),
        )
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/{username}/", web::get().to(feed::profile))
        .route("/{username}/follow/", web::get().to(follow::profile_follow))
        .route("/{username}/unfollow/", web::get().to(follow::profile_unfollow))
        .route("/{username}/{post_id}/", web::get().to(posts::post_view))
        .service(
            web::resource("/{username}/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/{username}/{post_id}/comment")
                .route(web::post().to(posts::add_comment)),
        );
}

/// Fallback for unmatched paths.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("No route".to_string()))
}

/// 302 to `location`.
fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn profile_url(username: &str) -> String {
    format!("/{username}/")
}

fn post_url(username: &str, post_id: i64) -> String {
    format!("/{username}/{post_id}/")
}
