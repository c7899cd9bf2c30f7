pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod storage;
pub mod db;
pub mod models;
pub mod routes;
pub mod views;
pub mod submission;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::{AppState, SharedState};
use crate::storage::UploadStorage;
use crate::store::FormStore;

pub fn build_app(store: Arc<dyn FormStore>, config: Config) -> Router {
    let uploads =
        UploadStorage::new(config.upload_dir.clone()).with_max_file_size(config.max_file_size);
    let cors = cors_layer(&config.cors_origins);

    let state: SharedState = Arc::new(AppState {
        store,
        uploads: uploads.clone(),
        config,
    });

    Router::new()
        .merge(routes::api_routes())
        .merge(routes::intake_routes())
        .merge(views::view_routes())
        .nest_service("/uploads", ServeDir::new(uploads.dir()))
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

async fn health() -> &'static str {
    "ok"
}
