// Application state module
// Shared per-process state handed to every connection

use std::path::PathBuf;

use super::types::Config;
use crate::questionnaire::QuestionnaireStore;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Absolute root directory for static assets and questionnaires
    pub root_dir: PathBuf,
    pub store: QuestionnaireStore,
}

impl AppState {
    /// Create `AppState` rooted at an already-resolved directory
    pub fn new(config: &Config, root_dir: PathBuf) -> Self {
        Self {
            config: config.clone(),
            store: QuestionnaireStore::new(root_dir.clone()),
            root_dir,
        }
    }
}
