//! Route configuration and setup.

mod health;

use crate::api_doc::ApiDoc;
use crate::error::ErrorResponse;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use filedrop_core::Config;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let file_routes = Router::new()
        .route(
            "/upload-url",
            get(handlers::upload_url::issue_upload_url).options(preflight),
        )
        .route(
            "/files",
            get(handlers::files::list_files).options(preflight),
        )
        .route(
            "/files/{fileId}",
            get(handlers::files::get_download_url)
                .delete(handlers::files::delete_file)
                .options(preflight),
        )
        .route(
            "/files/{fileId}/thumbnail",
            get(handlers::files::get_thumbnail_url).options(preflight),
        );

    let router = Router::new()
        .merge(file_routes)
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(openapi_json))
        .fallback(fallback)
        .with_state(state)
        .layer(axum::middleware::from_fn(
            filedrop_infra::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGINS entry: {}", e))?;
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Empty 200 for `OPTIONS` on known routes; CORS headers come from the layer.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found", "NOT_FOUND")),
    )
        .into_response()
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
