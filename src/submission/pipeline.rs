use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::{parse_id, AppError};
use crate::models::Submission;
use crate::state::SharedState;
use crate::storage::{self, StagedUploads, WriteError};

use super::origin::PublicOrigin;
use super::parser::SubmissionParts;

pub struct IntakeOutcome {
    pub submission: Submission,
    pub files_saved: usize,
    pub files_skipped: usize,
}

/// Store the files of a parsed submission and persist its answers.
///
/// Each stored file replaces the answer under its field key with the file's
/// public URL. If anything fails after the first file is written, the files
/// written so far are removed again.
pub async fn run(
    state: &SharedState,
    path_form_id: i64,
    origin: &PublicOrigin,
    parts: SubmissionParts,
) -> Result<IntakeOutcome, AppError> {
    let form_id = parts
        .form_schema_id
        .as_deref()
        .ok_or_else(|| AppError::InvalidArgument("Invalid Form ID".to_string()))
        .and_then(|raw| parse_id(raw, "Form ID"))?;
    if form_id != path_form_id {
        return Err(AppError::InvalidArgument(
            "form_schema_id does not match the form being submitted".to_string(),
        ));
    }

    let mut answers = parse_answers(parts.data.as_deref())?;

    state.uploads.ensure_dir().await?;

    let disk_started = Instant::now();
    let mut staged = StagedUploads::new(&state.uploads);
    let mut skipped = 0;

    for file in parts.files {
        let Some(field) = file.field.filter(|f| !f.is_empty()) else {
            tracing::debug!("Skipping file part without a field name");
            skipped += 1;
            continue;
        };
        if file.file_name.as_deref().is_none_or(str::is_empty) {
            tracing::debug!("Skipping empty file input for {field}");
            skipped += 1;
            continue;
        }

        let started = Instant::now();
        let file_name = storage::stored_file_name(file.file_name.as_deref(), Utc::now());

        match state.uploads.write(&file_name, &file.data).await {
            Ok(written) => {
                tracing::info!(
                    "Saved {file_name} for {field} | {} | {:.2} MiB | {:?}",
                    file.content_type.as_deref().unwrap_or("unknown type"),
                    written as f64 / (1024.0 * 1024.0),
                    started.elapsed()
                );
            }
            Err(WriteError::Create(e)) => {
                staged.discard().await;
                return Err(AppError::StorageUnavailable(format!(
                    "cannot create {file_name}: {e}"
                )));
            }
            Err(e @ WriteError::Copy(_)) => {
                tracing::warn!("Dropping upload for {field}: {e}");
                skipped += 1;
                continue;
            }
        }

        staged.record(file_name.clone());
        answers.insert(field, Value::String(origin.upload_url(&file_name)));
    }

    tracing::info!(
        "Disk write: {} saved, {skipped} skipped in {:?}",
        staged.len(),
        disk_started.elapsed()
    );

    let db_started = Instant::now();
    let answers = Value::Object(answers);
    let created = state
        .store
        .create_submission(form_id, &answers, staged.names())
        .await;
    match created {
        Ok(submission) => {
            tracing::info!("Database save took {:?}", db_started.elapsed());
            let saved = staged.commit();
            Ok(IntakeOutcome {
                submission,
                files_saved: saved.len(),
                files_skipped: skipped,
            })
        }
        Err(e) => {
            staged.discard().await;
            Err(e)
        }
    }
}

/// The `data` field must hold a JSON object of answers.
pub fn parse_answers(raw: Option<&str>) -> Result<Map<String, Value>, AppError> {
    let raw = raw.ok_or_else(|| AppError::InvalidArgument("Missing data field".to_string()))?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::InvalidArgument(
            "data must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::InvalidArgument(format!("Invalid JSON data: {e}"))),
    }
}
