pub mod api;
pub mod bootstrap;
pub mod health;

use axum::Router;

pub use api::AppState;

/// Full HTTP surface: health probe plus the versioned JSON API.
pub fn app(state: AppState) -> Router {
    Router::new().merge(health::router(state.clone())).merge(api::router(state))
}
