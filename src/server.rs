use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use std::sync::Arc;

use crate::data::{SchedulingInput, SchedulingOutput};
use crate::solver::{self, SolverConfig};

async fn solve_handler(
    State(config): State<Arc<SolverConfig>>,
    Json(input): Json<SchedulingInput>,
) -> Result<Json<SchedulingOutput>, (StatusCode, String)> {
    // the solver is CPU bound and may block for its whole time budget
    let result = tokio::task::spawn_blocking(move || solver::solve(&input, &config))
        .await
        .map_err(|e| {
            error!("Solver task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("solver task failed: {e}"))
        })?;

    match result {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(config: SolverConfig) -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(config))
}

pub async fn run_server(addr: &str, config: SolverConfig) -> std::io::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
