use sqlx::PgPool;

use crate::models::Submission;

pub async fn create(
    pool: &PgPool,
    form_id: i64,
    answers: &serde_json::Value,
    uploads: &[String],
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "INSERT INTO submissions (form_id, answers, uploads) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(form_id)
    .bind(answers)
    .bind(uploads)
    .fetch_one(pool)
    .await
}

pub async fn list_by_form(pool: &PgPool, form_id: i64) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE form_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>("DELETE FROM submissions WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
