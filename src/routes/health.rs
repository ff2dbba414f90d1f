use axum::Json;
use serde_json::{json, Value};

/// Liveness endpoint
///
/// Answers 200 with a small JSON body once the router is serving. Database
/// reachability is deliberately not checked: a hub that loses its store
/// should keep answering health checks while it reconnects, not get
/// restarted.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up"),
    ),
    tag = "health"
)]
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
