//! Route registration: collects all module routes + system endpoints.

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::info;

use polyglot_core::Module;

/// Build the complete router: system endpoints plus every module's routes.
pub fn build_router(modules: &[&dyn Module]) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    // Module routes are absolute and already carry their state.
    for module in modules {
        info!("Mounting {} routes", module.name());
        app = app.merge(module.routes());
    }
    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "polyglotd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
