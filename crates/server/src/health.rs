use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::api::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogCheck {
    pub products: usize,
    pub categories: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub catalog: CatalogCheck,
    pub rules: usize,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// The runtime is immutable once loaded, so the service is ready whenever it answers.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.runtime.catalog();

    Json(HealthResponse {
        status: "ready",
        service: "pricebook-server",
        catalog: CatalogCheck {
            products: catalog.len(),
            categories: catalog.categories().len(),
        },
        rules: state.runtime.rules().len(),
        checked_at: Utc::now().to_rfc3339(),
    })
}
