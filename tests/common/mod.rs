use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use formcast::config::{Config, DEFAULT_MAX_UPLOAD_SIZE};
use formcast::error::AppError;
use formcast::models::{Form, Submission};
use formcast::store::FormStore;

/// In-memory stand-in for Postgres with the same observable behaviour.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// When set, `create_submission` fails like a lost database would.
    pub fail_submissions: AtomicBool,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    forms: BTreeMap<i64, Form>,
    submissions: BTreeMap<i64, Submission>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn submissions(&self) -> Vec<Submission> {
        self.inner.lock().unwrap().submissions.values().cloned().collect()
    }

    /// Insert a form without going through validation.
    pub fn insert_raw_form(&self, name: &str, elements: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.forms.insert(
            id,
            Form {
                id,
                name: name.to_string(),
                elements: elements.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn create_form(&self, name: &str, elements: &str) -> Result<Form, AppError> {
        let id = self.insert_raw_form(name, elements);
        Ok(self.inner.lock().unwrap().forms[&id].clone())
    }

    async fn get_form(&self, id: i64) -> Result<Option<Form>, AppError> {
        Ok(self.inner.lock().unwrap().forms.get(&id).cloned())
    }

    async fn list_forms(&self) -> Result<Vec<Form>, AppError> {
        Ok(self.inner.lock().unwrap().forms.values().rev().cloned().collect())
    }

    async fn delete_form(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let existed = inner.forms.remove(&id).is_some();
        inner.submissions.retain(|_, s| s.form_id != id);
        Ok(existed)
    }

    async fn create_submission(
        &self,
        form_id: i64,
        answers: &Value,
        uploads: &[String],
    ) -> Result<Submission, AppError> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(AppError::StorageUnavailable("database is down".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        if !inner.forms.contains_key(&form_id) {
            return Err(AppError::NotFound("Form not found".to_string()));
        }
        let id = inner.next_id();
        let submission = Submission {
            id,
            form_id,
            answers: answers.clone(),
            uploads: uploads.to_vec(),
            created_at: Utc::now(),
        };
        inner.submissions.insert(id, submission.clone());
        Ok(submission)
    }

    async fn list_submissions(&self, form_id: i64) -> Result<Vec<Submission>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .submissions
            .values()
            .rev()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect())
    }

    async fn delete_submission(&self, id: i64) -> Result<Option<Submission>, AppError> {
        Ok(self.inner.lock().unwrap().submissions.remove(&id))
    }
}

/// A running server backed by a [`MemoryStore`] and a scratch upload dir.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub upload_dir: PathBuf,
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a form through the API, return its id.
    pub async fn create_form(&self, name: &str, elements: &Value) -> i64 {
        let resp = self
            .client
            .post(self.url("/forms"))
            .json(&json!({ "name": name, "elements": elements.to_string() }))
            .send()
            .await
            .expect("create form failed");
        assert_eq!(resp.status(), StatusCode::OK, "create form non-200");
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    /// POST a multipart submission, return (body, status).
    pub async fn submit(&self, form_id: i64, form: multipart::Form) -> (Value, StatusCode) {
        self.submit_with(form_id, form, &[]).await
    }

    pub async fn submit_with(
        &self,
        form_id: i64,
        form: multipart::Form,
        headers: &[(&str, &str)],
    ) -> (Value, StatusCode) {
        let mut req = self
            .client
            .post(self.url(&format!("/forms/{form_id}/submit")))
            .multipart(form);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = req.send().await.expect("submit failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Names of files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.upload_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Multipart body with the two text fields every submission carries.
#[allow(dead_code)]
pub fn submission_form(form_id: i64, data: &Value) -> multipart::Form {
    multipart::Form::new()
        .text("form_schema_id", form_id.to_string())
        .text("data", data.to_string())
}

#[allow(dead_code)]
pub fn file_part(bytes: &[u8], file_name: &str) -> multipart::Part {
    multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string())
}

pub fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        upload_dir,
        max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        max_file_size: None,
        trusted_proxies: vec![],
        cors_origins: vec![],
        purge_uploads: false,
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a test app, letting the caller adjust the config first.
pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let upload_dir = std::env::temp_dir().join(format!("formcast_test_{}", Uuid::now_v7().simple()));
    let mut config = test_config(upload_dir.clone());
    tweak(&mut config);

    let store = Arc::new(MemoryStore::default());
    let app = formcast::build_app(store.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        upload_dir,
    }
}

/// Remove the scratch upload directory.
pub async fn cleanup(app: TestApp) {
    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;
}
