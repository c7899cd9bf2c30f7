pub mod forms;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/forms/{id}/view", get(forms::show))
        // Share link handed out by the builder
        .route("/public/forms/{id}", get(forms::show))
}
