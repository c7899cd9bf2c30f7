use async_trait::async_trait;
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::{Form, Submission};

/// Persistence for forms and their submissions.
///
/// Handlers only ever go through this trait, so the HTTP layer can run
/// against Postgres in production and an in-memory store in tests.
#[async_trait]
pub trait FormStore: Send + Sync {
    async fn create_form(&self, name: &str, elements: &str) -> Result<Form, AppError>;
    async fn get_form(&self, id: i64) -> Result<Option<Form>, AppError>;
    async fn list_forms(&self) -> Result<Vec<Form>, AppError>;
    /// Returns false when the form did not exist.
    async fn delete_form(&self, id: i64) -> Result<bool, AppError>;

    /// Fails with `NotFound` when `form_id` names no form. `uploads` lists the
    /// stored file names the submission owns.
    async fn create_submission(
        &self,
        form_id: i64,
        answers: &serde_json::Value,
        uploads: &[String],
    ) -> Result<Submission, AppError>;
    async fn list_submissions(&self, form_id: i64) -> Result<Vec<Submission>, AppError>;
    /// Returns the deleted row, or `None` when nothing had this id.
    async fn delete_submission(&self, id: i64) -> Result<Option<Submission>, AppError>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FormStore for PgStore {
    async fn create_form(&self, name: &str, elements: &str) -> Result<Form, AppError> {
        Ok(db::forms::create(&self.pool, name, elements).await?)
    }

    async fn get_form(&self, id: i64) -> Result<Option<Form>, AppError> {
        Ok(db::forms::find_by_id(&self.pool, id).await?)
    }

    async fn list_forms(&self) -> Result<Vec<Form>, AppError> {
        Ok(db::forms::list(&self.pool).await?)
    }

    async fn delete_form(&self, id: i64) -> Result<bool, AppError> {
        Ok(db::forms::delete(&self.pool, id).await?)
    }

    async fn create_submission(
        &self,
        form_id: i64,
        answers: &serde_json::Value,
        uploads: &[String],
    ) -> Result<Submission, AppError> {
        db::submissions::create(&self.pool, form_id, answers, uploads)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::NotFound("Form not found".to_string())
                }
                _ => AppError::Database(e),
            })
    }

    async fn list_submissions(&self, form_id: i64) -> Result<Vec<Submission>, AppError> {
        Ok(db::submissions::list_by_form(&self.pool, form_id).await?)
    }

    async fn delete_submission(&self, id: i64) -> Result<Option<Submission>, AppError> {
        Ok(db::submissions::delete(&self.pool, id).await?)
    }
}
