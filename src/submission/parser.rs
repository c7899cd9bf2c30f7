use axum::http::HeaderMap;
use bytes::Bytes;
use futures_util::Stream;
use multer::{Constraints, Multipart, SizeLimit};

use crate::error::AppError;

pub const FORM_ID_FIELD: &str = "form_schema_id";
pub const DATA_FIELD: &str = "data";

/// A multipart submission read fully into memory.
#[derive(Debug, Default)]
pub struct SubmissionParts {
    pub form_schema_id: Option<String>,
    pub data: Option<String>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    /// Answer key this file belongs to.
    pub field: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Parse a `multipart/form-data` body of at most `limit` bytes.
///
/// Everything is read before returning, so callers can validate the text
/// fields before any file touches the disk.
pub async fn parse_multipart<S, O, E>(
    headers: &HeaderMap,
    body: S,
    limit: usize,
) -> Result<SubmissionParts, AppError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let declared = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit as u64) {
        return Err(too_large(limit));
    }

    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| AppError::InvalidArgument("Missing multipart boundary".to_string()))?;

    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(limit as u64));
    let mut multipart = Multipart::with_constraints(body, boundary, constraints);

    let mut parts = SubmissionParts::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);

        if file_name.is_some() {
            let content_type = field.content_type().map(|m| m.to_string());
            let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
            parts.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
        match name.as_deref() {
            Some(FORM_ID_FIELD) if parts.form_schema_id.is_none() => {
                parts.form_schema_id = Some(value)
            }
            Some(DATA_FIELD) if parts.data.is_none() => parts.data = Some(value),
            other => tracing::debug!("Ignoring multipart text field {other:?}"),
        }
    }

    Ok(parts)
}

fn multipart_error(err: multer::Error, limit: usize) -> AppError {
    match err {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
            too_large(limit)
        }
        other => AppError::InvalidArgument(format!("Invalid multipart body: {other}")),
    }
}

fn too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!("Request body exceeds {limit} bytes"))
}
