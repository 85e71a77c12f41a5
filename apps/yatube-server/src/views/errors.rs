//! Static fallback error pages.

use askama::Template;

use crate::middleware::auth::Identity;

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub path: &'a str,
}

#[derive(Template)]
#[template(path = "core/500.html")]
pub struct ServerErrorPage<'a> {
    pub viewer: Option<&'a Identity>,
}

pub fn not_found(path: &str) -> NotFoundPage<'_> {
    NotFoundPage { viewer: None, path }
}

pub fn server_error() -> ServerErrorPage<'static> {
    ServerErrorPage { viewer: None }
}
