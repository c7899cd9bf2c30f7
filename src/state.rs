use std::sync::Arc;

use crate::config::Config;
use crate::storage::UploadStorage;
use crate::store::FormStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn FormStore>,
    pub uploads: UploadStorage,
    pub config: Config,
}
