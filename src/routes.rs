//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod action_plan;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Base path every action plan route is mounted under
pub const ACTION_PLANS_BASE: &str = "/api/actionPlans";

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest(ACTION_PLANS_BASE, action_plan_routes())
        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

fn action_plan_routes() -> Router<SharedState> {
    Router::new()
        .route("/listar", get(action_plan::list_action_plans))
        .route("/listarDetalles/{id}", get(action_plan::get_action_plan_details))
        .route("/buscar/{id}", get(action_plan::get_action_plan))
        .route("/agregar", post(action_plan::add_action_plan))
        .route("/agregarConDetalle", post(action_plan::add_action_plan_with_detail))
        .route("/editar", post(action_plan::edit_action_plan))
        .route("/eliminar/{id}", delete(action_plan::delete_action_plan))
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;
    use crate::db::service::ActionPlanStore;
    use crate::error::AppError;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Store that must never be reached by these tests
    struct UnreachableStore;

    #[async_trait]
    impl ActionPlanStore for UnreachableStore {
        async fn list(&self) -> Result<Value, AppError> {
            unreachable!()
        }
        async fn find(&self, _id: i32) -> Result<Value, AppError> {
            unreachable!()
        }
        async fn details(&self, _id: i32) -> Result<String, AppError> {
            unreachable!()
        }
        async fn insert(&self, _plan: &Value) -> Result<(), AppError> {
            unreachable!()
        }
        async fn insert_with_detail(&self, _plan: &Value) -> Result<(), AppError> {
            unreachable!()
        }
        async fn update(&self, _plan: &Value) -> Result<(), AppError> {
            unreachable!()
        }
        async fn delete(&self, _id: i32) -> Result<Value, AppError> {
            unreachable!()
        }
    }

    fn router(settings: &Settings) -> Router {
        let state = Arc::new(AppState::new(Arc::new(UnreachableStore)));
        create_router(state, settings)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = router(&Settings::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = router(&Settings::default())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/actionPlans/listar")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_cors_without_origins_allows_any() {
        let settings = Settings {
            cors: CorsConfig {
                allowed_origins: vec![],
            },
            ..Settings::default()
        };

        let response = router(&settings)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://elsewhere.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
