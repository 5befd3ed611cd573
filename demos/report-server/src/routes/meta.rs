use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, Json};
use epichart::models::ReportId;
use serde_json::{json, Value};

use crate::html;
use crate::state::AppState;

/// GET /
pub async fn index() -> Html<String> {
    Html(html::index())
}

/// GET /api/reports
///
/// Lists the reports, the fields each one reads, and the locations a ranking
/// may choose from.
pub async fn list_reports(State(state): State<Arc<AppState>>) -> Json<Value> {
    let reports: Vec<Value> = ReportId::ALL
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "title": html::title(*id),
                "fields": id.fields(),
                "takes_input": id.takes_input(),
            })
        })
        .collect();

    Json(json!({
        "data": reports,
        "locations": state.engine.engine().config().locations,
    }))
}
