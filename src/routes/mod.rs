pub mod forms;
pub mod submissions;
pub mod submit;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Forms
        .route("/forms", get(forms::list).post(forms::create))
        .route("/forms/{id}", get(forms::get).delete(forms::delete))
        // Submissions
        .route("/forms/{id}/submissions", get(submissions::list))
        .route("/submissions/{id}", delete(submissions::delete))
}

pub fn intake_routes() -> Router<SharedState> {
    Router::new().route("/forms/{id}/submit", post(submit::submit))
}
