use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};

use crate::error::{parse_id, AppError};
use crate::models::FormElement;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "view_form.html")]
struct ViewFormTemplate {
    id: i64,
    name: String,
    fields: Vec<FieldView>,
}

struct FieldView {
    id: String,
    label: String,
    required: bool,
    placeholder: String,
    /// One of the widgets the template knows how to draw.
    input: &'static str,
}

impl From<FormElement> for FieldView {
    fn from(el: FormElement) -> Self {
        let input = match el.kind.as_str() {
            "textarea" | "long_text" | "paragraph" => "textarea",
            "email" => "email",
            "number" => "number",
            "date" => "date",
            "phone" | "tel" => "tel",
            "checkbox" => "checkbox",
            "video" => "video",
            "file" => "file",
            _ => "text",
        };
        FieldView {
            id: el.id,
            label: el.label,
            required: el.required,
            placeholder: el.placeholder,
            input,
        }
    }
}

pub async fn show(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "ID")?;
    let form = state
        .store
        .get_form(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    let elements = form
        .decode_elements()
        .map_err(|e| AppError::Internal(format!("Failed to parse form {id} elements: {e}")))?;

    let template = ViewFormTemplate {
        id: form.id,
        name: form.name,
        fields: elements.into_iter().map(FieldView::from).collect(),
    };
    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("Template error: {e}")))?;
    Ok(Html(html))
}
