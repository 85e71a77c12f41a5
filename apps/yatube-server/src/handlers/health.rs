//! Health check endpoint.

use actix_web::{HttpResponse, web};

use yatube_shared::{ApiResponse, HealthStatus};

use crate::state::AppState;

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = |status: &str| HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: state.store_kind.to_string(),
    };

    #[cfg(feature = "postgres")]
    if let Some(db) = &state.db {
        if let Err(e) = db.ping().await {
            tracing::warn!(error = %e, "Database ping failed");
            return HttpResponse::ServiceUnavailable().json(ApiResponse::ok_with_message(
                status("degraded"),
                "database unreachable",
            ));
        }
    }

    HttpResponse::Ok().json(ApiResponse::ok(status("ok")))
}
