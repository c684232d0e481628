pub mod error;
pub mod extract;
pub mod routes;

use axum::Router;

use crate::dedup::service::WorkoutService;
use std::sync::Arc;

pub fn router() -> Router<Arc<WorkoutService>> {
    routes::build_router()
}
