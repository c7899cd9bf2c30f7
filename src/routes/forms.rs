use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{parse_id, AppError};
use crate::models::{Form, FormElement};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateForm {
    pub name: String,
    /// JSON-encoded list of elements, kept verbatim.
    pub elements: String,
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Form>>, AppError> {
    let forms = state.store.list_forms().await?;
    Ok(Json(forms))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateForm>,
) -> Result<Json<Form>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("Form name is required".to_string()));
    }
    FormElement::decode_list(&req.elements)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid elements: {e}")))?;

    let form = state.store.create_form(name, &req.elements).await?;
    tracing::info!("Created form {} ({})", form.id, form.name);
    Ok(Json(form))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Form>, AppError> {
    let id = parse_id(&id, "ID")?;
    let form = state
        .store
        .get_form(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(form))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id, "ID")?;

    // Submissions cascade with the form, so collect them first if their
    // files are to be purged too.
    let orphaned = if state.config.purge_uploads {
        state.store.list_submissions(id).await?
    } else {
        Vec::new()
    };

    if !state.store.delete_form(id).await? {
        return Err(AppError::NotFound("Form not found".to_string()));
    }

    let mut purged = 0;
    for submission in &orphaned {
        purged += state.uploads.purge(&submission.uploads).await;
    }
    tracing::info!("Deleted form {id} ({purged} upload(s) purged)");

    Ok(Json(serde_json::json!({ "message": "Form deleted" })))
}
