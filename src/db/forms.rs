use sqlx::PgPool;

use crate::models::Form;

pub async fn create(pool: &PgPool, name: &str, elements: &str) -> Result<Form, sqlx::Error> {
    sqlx::query_as::<_, Form>("INSERT INTO forms (name, elements) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(elements)
        .fetch_one(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>("SELECT * FROM forms ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Form>, sqlx::Error> {
    sqlx::query_as::<_, Form>("SELECT * FROM forms WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns false when no form had this id. Submissions go with it (cascade).
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM forms WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
