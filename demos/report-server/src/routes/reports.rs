use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use epichart::models::{RawParams, ReportId, ReportRequest};
use epichart::ChartReport;
use tracing::warn;

use crate::error::{status_for, AppError};
use crate::html;
use crate::state::AppState;

fn report_id(id: &str) -> Result<ReportId, AppError> {
    id.parse()
        .map_err(|_| AppError::not_found(format!("No report named {id:?}")))
}

/// GET /reports/:id (also /grafico1 .. /grafico4)
///
/// Shows the input form, or the chart directly for reports without input.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = report_id(&id)?;
    render(&state, ReportRequest::form(id)).await
}

/// POST /reports/:id
///
/// Renders the chart from the submitted form. Rejected input redisplays the
/// form with the message and a 400 status.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let id = report_id(&id)?;
    let raw: RawParams = pairs.into_iter().collect();
    render(&state, ReportRequest::new(id, raw)).await
}

/// GET /api/reports/:id?locations[]=Africa&date=2022-10-30
///
/// The rendered report as JSON, with the chart as base64 PNG.
pub async fn report_json(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ChartReport>, AppError> {
    let id = report_id(&id)?;
    let raw: RawParams = pairs.into_iter().collect();
    match state.engine.render_report(ReportRequest::new(id, raw)).await? {
        Some(report) => Ok(Json(report)),
        None => Err(AppError::bad_request(format!(
            "Report {} needs parameters: {}",
            id,
            id.fields().join(", ")
        ))),
    }
}

async fn render(state: &AppState, request: ReportRequest) -> Result<Response, AppError> {
    let id = request.report_id;
    let raw = request.raw_params.clone();
    let locations = &state.engine.engine().config().locations;

    match state.engine.render_report(request).await {
        Ok(Some(report)) => Ok(Html(html::chart(&report)).into_response()),
        Ok(None) => Ok(Html(html::form(id, locations, &raw, None)).into_response()),
        Err(e) if e.is_rejection() => Ok((
            StatusCode::BAD_REQUEST,
            Html(html::form(id, locations, &raw, Some(&e.to_string()))),
        )
            .into_response()),
        Err(e) => {
            warn!(report = %id, error = %e, "report failed");
            Ok((status_for(&e), Html(html::page(html::title(id), &e.to_string()))).into_response())
        }
    }
}
