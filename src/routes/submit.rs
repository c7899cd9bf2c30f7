use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::{parse_id, AppError};
use crate::state::SharedState;
use crate::submission::{origin, parser, pipeline};

/// `POST /forms/{id}/submit`: multipart answers plus uploaded files.
pub async fn submit(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let started = Instant::now();
    let form_id = parse_id(&id, "Form ID")?;
    tracing::info!("New submission request for form {form_id}");

    let (parts, body) = request.into_parts();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let public_origin = origin::resolve(
        &parts.headers,
        parts.uri.authority().map(|a| a.as_str()),
        peer,
        &state.config.trusted_proxies,
    );

    let form = parser::parse_multipart(
        &parts.headers,
        body.into_data_stream(),
        state.config.max_upload_size,
    )
    .await?;
    tracing::info!("Upload & parse took {:?}", started.elapsed());

    let outcome = pipeline::run(&state, form_id, &public_origin, form).await?;
    tracing::info!(
        "Stored submission {} for form {form_id} in {:?}",
        outcome.submission.id,
        started.elapsed()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Submission saved successfully",
            "submission_id": outcome.submission.id,
            "files_saved": outcome.files_saved,
            "files_skipped": outcome.files_skipped,
        })),
    )
        .into_response())
}
