use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::AppState;

pub const SERVICE_NAME: &str = "OTT API";

/// Maximum number of collection names reported by the diagnostic
const MAX_REPORTED_COLLECTIONS: usize = 10;

/// Liveness probe
pub async fn root() -> Json<Value> {
    Json(json!({ "service": SERVICE_NAME, "status": "ok" }))
}

/// Store connectivity report. Diagnostic output only, not a stable contract.
#[derive(Debug, Serialize)]
pub struct DatabaseDiagnostic {
    pub backend: &'static str,
    pub database: String,
    pub store: Option<&'static str>,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
}

pub async fn test_database(State(state): State<AppState>) -> Json<DatabaseDiagnostic> {
    let mut report = DatabaseDiagnostic {
        backend: "running",
        database: "not configured".to_string(),
        store: None,
        connection_status: "Not Connected",
        collections: Vec::new(),
    };

    if let Some(store) = state.optional_store() {
        report.store = Some(store.backend());
        match store.list_collections().await {
            Ok(mut collections) => {
                collections.truncate(MAX_REPORTED_COLLECTIONS);
                report.collections = collections;
                report.connection_status = "Connected";
                report.database = "connected".to_string();
            }
            Err(e) => {
                let message: String = e.to_string().chars().take(80).collect();
                report.database = format!("connected but error: {}", message);
            }
        }
    }

    Json(report)
}
