//! Server-rendered HTML pages.
//!
//! Each page is an askama template under `templates/`; the structs here carry
//! what the template reads. Template output is HTML-escaped unless a filter
//! marks it safe.

pub mod auth;
pub mod errors;
pub mod feed;
pub mod forms;
pub mod post;

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use askama::Template;

use crate::middleware::error::{AppError, AppResult};

/// 200 response with the rendered page.
pub fn render(page: impl Template) -> AppResult<HttpResponse> {
    let body = page
        .render()
        .map_err(|e| AppError::Internal(format!("Template rendering failed: {e}")))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

/// Custom template filters.
pub mod filters {
    use std::fmt::Display;

    use askama_escape::{Html, escape};

    /// Escaped text with line breaks kept as `<br>`. Pair with `safe`.
    pub fn multiline<T: Display>(text: T) -> askama::Result<String> {
        let text = text.to_string();
        Ok(escape(&text, Html)
            .to_string()
            .replace("\r\n", "\n")
            .replace('\n', "<br>\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Identity;

    #[test]
    fn test_multiline_escapes_markup() {
        assert_eq!(
            filters::multiline("a\r\n<b>\"x\"").unwrap(),
            "a<br>\n&lt;b&gt;&quot;x&quot;"
        );
    }

    #[test]
    fn test_base_nav_depends_on_viewer() {
        let viewer = Identity {
            user_id: 1,
            username: "leo".to_string(),
        };
        let page = errors::ServerErrorPage {
            viewer: Some(&viewer),
        }
        .render()
        .unwrap();
        assert!(page.contains(r#"<a href="/leo/">leo</a>"#));
        assert!(page.contains("/auth/logout/"));

        let anonymous = errors::server_error().render().unwrap();
        assert!(anonymous.contains("/auth/login/"));
        assert!(!anonymous.contains("/new/"));
    }
}
