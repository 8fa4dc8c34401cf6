mod health;
mod visits;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::app_state::AppState;
use crate::config::CorsConfig;

pub fn router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/check-visits", get(visits::check_visits))
        .route("/register-visit", post(visits::register_visit))
        .route("/visits/:phone", get(visits::customer_visits))
        .layer(cors_layer(cors))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("unsafe-url"),
        ))
        .with_state(state)
}

/// Requests without an `Origin` header are unaffected; browsers only see CORS headers
/// for origins on the allow-list.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
