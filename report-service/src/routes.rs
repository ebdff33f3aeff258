//! Route table for the report service.

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/dados", get(handlers::get_report))
}
