use crate::errors::AppError;
use crate::loader::load_datasets;
use crate::models::{ChartSeries, Dashboard, Summary};
use crate::state::AppState;
use crate::stats::build_dashboard;
use crate::ui::render_index;
use axum::{Json, extract::State, response::Html};
use tracing::error;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dashboard = current_dashboard(&state).await?;
    Ok(Html(render_index(&dashboard.summary)))
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<Summary>, AppError> {
    let dashboard = current_dashboard(&state).await?;
    Ok(Json(dashboard.summary))
}

pub async fn get_series(State(state): State<AppState>) -> Result<Json<ChartSeries>, AppError> {
    let dashboard = current_dashboard(&state).await?;
    Ok(Json(dashboard.series))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Reloads every source and rebuilds the dashboard for this request.
async fn current_dashboard(state: &AppState) -> Result<Dashboard, AppError> {
    let datasets = load_datasets(&state.client, &state.config.sources)
        .await
        .map_err(|err| {
            error!(resource = %err.resource(), "failed to load datasets: {err}");
            AppError::from(err)
        })?;
    Ok(build_dashboard(&datasets))
}
