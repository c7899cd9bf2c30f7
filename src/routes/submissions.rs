use axum::extract::{Path, State};
use axum::Json;

use crate::error::{parse_id, AppError};
use crate::models::Submission;
use crate::state::SharedState;

pub async fn list(
    State(state): State<SharedState>,
    Path(form_id): Path<String>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let form_id = parse_id(&form_id, "ID")?;
    let submissions = state.store.list_submissions(form_id).await?;
    Ok(Json(submissions))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id, "ID")?;
    let submission = state
        .store
        .delete_submission(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    if state.config.purge_uploads {
        let purged = state.uploads.purge(&submission.uploads).await;
        tracing::info!("Deleted submission {id} ({purged} upload(s) purged)");
    }

    Ok(Json(serde_json::json!({ "message": "Submission deleted" })))
}
