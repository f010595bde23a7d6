use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cutstock_core::{CuttingStockError, CuttingStockRequest, CuttingStockResult, Optimizer};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cutting stock API");

    let addr = std::env::var("CUTSTOCK_API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("API server listening on http://{}", addr);
    info!("Try: curl http://localhost:3000/api/health");

    axum::serve(listener, app()).await.context("Server error")?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/solve", post(solve))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "cutstock-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn solve(
    Json(request): Json<CuttingStockRequest>,
) -> Result<Json<CuttingStockResult>, AppError> {
    info!(
        "Received cutting stock request: bar length {}, {} item types",
        request.bar_length,
        request.items.len()
    );

    // column generation blocks on the LP engine
    let result = tokio::task::spawn_blocking(move || {
        let optimizer = Optimizer::new(request)?;
        optimizer.optimize()
    })
    .await
    .context("Solver task panicked")??;

    info!(
        "Solve complete: {} bars over {} phases, total waste {}",
        result.summary.bars_used,
        result.phases.len(),
        result.summary.total_waste
    );

    Ok(Json(result))
}

/// Application error type
struct AppError(anyhow::Error);

impl From<CuttingStockError> for AppError {
    fn from(err: CuttingStockError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<CuttingStockError>() {
            Some(CuttingStockError::InvalidInput(_) | CuttingStockError::ItemExceedsBar { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Some(_) => StatusCode::UNPROCESSABLE_ENTITY,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {:#}", self.0);

        let status = self.status();
        (
            status,
            Json(json!({
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cutstock_core::{EngineError, SolveStage};
    use tower::ServiceExt;

    async fn post_solve(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::post("/api/solve")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_solve_two_items() {
        let (status, body) = post_solve(json!({
            "bar_length": 100,
            "items": [
                { "demand": 5, "length": 30 },
                { "demand": 3, "length": 45 }
            ]
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["summary"]["bars_used"].as_u64().unwrap() >= 3);
        assert_eq!(body["summary"]["pieces"][0].as_f64().unwrap(), 5.0);
        assert!(!body["phases"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_item_is_bad_request() {
        let (status, body) = post_solve(json!({
            "bar_length": 100,
            "items": [{ "demand": 1, "length": 150 }]
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("does not fit"));
    }

    #[tokio::test]
    async fn test_empty_items_is_bad_request() {
        let (status, _) = post_solve(json!({ "bar_length": 100, "items": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_solver_failures_are_unprocessable() {
        let err = AppError::from(CuttingStockError::Engine {
            stage: SolveStage::Master,
            source: EngineError::Infeasible,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from(CuttingStockError::IterationLimit(3));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from(anyhow::anyhow!("join failure"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
