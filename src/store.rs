//! Preference persistence: identity, credential, history, and theme.
//!
//! ## Why a trait?
//!
//! The controller only touches storage at session boundaries (startup load,
//! write-through on change), so the surface is four typed keys. Putting
//! that behind [`PreferenceStore`] lets the session tests run against
//! [`InMemoryStore`] while the binary uses the JSON file store.
//!
//! Reads are forgiving: a missing or unparseable file degrades to defaults
//! with a warning, because losing a corrupt history file should never lock
//! someone out of the app. Writes are atomic (temp file plus rename) so a
//! crash mid-write cannot leave a half-written file behind.

use crate::error::Doc2QuizError;
use crate::model::{QuizResult, Theme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the app remembers between runs, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedPreferences {
    pub user: Option<String>,
    pub api_key: Option<String>,
    /// Finished quizzes, most recent first.
    pub history: Vec<QuizResult>,
    pub theme: Theme,
}

/// Typed access to the four persisted keys.
///
/// Getters read an in-memory snapshot and cannot fail; setters write
/// through to the backing medium.
pub trait PreferenceStore {
    fn user(&self) -> Option<String>;
    fn set_user(&mut self, user: Option<String>) -> Result<(), Doc2QuizError>;

    fn api_key(&self) -> Option<String>;
    fn set_api_key(&mut self, key: Option<String>) -> Result<(), Doc2QuizError>;

    fn history(&self) -> Vec<QuizResult>;
    fn set_history(&mut self, history: Vec<QuizResult>) -> Result<(), Doc2QuizError>;

    fn theme(&self) -> Theme;
    fn set_theme(&mut self, theme: Theme) -> Result<(), Doc2QuizError>;
}

// ── JSON file store ─────────────────────────────────────────────────────

/// File-backed store holding one JSON document at a fixed path.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    prefs: PersistedPreferences,
}

impl JsonPreferenceStore {
    /// Load preferences from `path`, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = load_or_default(&path);
        Self { path, prefs }
    }

    /// Where the store lives by default: the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("doc2quiz").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), Doc2QuizError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Doc2QuizError::StoreWriteFailed {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.prefs)
            .map_err(|e| Doc2QuizError::Internal(format!("Preference serialisation failed: {e}")))?;

        // Write to a sibling temp file first, then rename into place.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Doc2QuizError::StoreWriteFailed {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| Doc2QuizError::StoreWriteFailed {
            path: self.path.clone(),
            source: e,
        })?;

        debug!("Preferences saved: {}", self.path.display());
        Ok(())
    }
}

fn load_or_default(path: &Path) -> PersistedPreferences {
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(
                    "Preference file at {} is unparseable ({e}); starting fresh",
                    path.display()
                );
                PersistedPreferences::default()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No preference file at {}; starting fresh", path.display());
            PersistedPreferences::default()
        }
        Err(e) => {
            warn!(
                "Preference file at {} is unreadable ({e}); starting fresh",
                path.display()
            );
            PersistedPreferences::default()
        }
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn user(&self) -> Option<String> {
        self.prefs.user.clone()
    }

    fn set_user(&mut self, user: Option<String>) -> Result<(), Doc2QuizError> {
        self.prefs.user = user;
        self.save()
    }

    fn api_key(&self) -> Option<String> {
        self.prefs.api_key.clone()
    }

    fn set_api_key(&mut self, key: Option<String>) -> Result<(), Doc2QuizError> {
        self.prefs.api_key = key;
        self.save()
    }

    fn history(&self) -> Vec<QuizResult> {
        self.prefs.history.clone()
    }

    fn set_history(&mut self, history: Vec<QuizResult>) -> Result<(), Doc2QuizError> {
        self.prefs.history = history;
        self.save()
    }

    fn theme(&self) -> Theme {
        self.prefs.theme
    }

    fn set_theme(&mut self, theme: Theme) -> Result<(), Doc2QuizError> {
        self.prefs.theme = theme;
        self.save()
    }
}

// ── In-memory store ─────────────────────────────────────────────────────

/// Store that forgets everything at drop. Used by tests and `--ephemeral`
/// style runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    prefs: PersistedPreferences,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryStore {
    fn user(&self) -> Option<String> {
        self.prefs.user.clone()
    }

    fn set_user(&mut self, user: Option<String>) -> Result<(), Doc2QuizError> {
        self.prefs.user = user;
        Ok(())
    }

    fn api_key(&self) -> Option<String> {
        self.prefs.api_key.clone()
    }

    fn set_api_key(&mut self, key: Option<String>) -> Result<(), Doc2QuizError> {
        self.prefs.api_key = key;
        Ok(())
    }

    fn history(&self) -> Vec<QuizResult> {
        self.prefs.history.clone()
    }

    fn set_history(&mut self, history: Vec<QuizResult>) -> Result<(), Doc2QuizError> {
        self.prefs.history = history;
        Ok(())
    }

    fn theme(&self) -> Theme {
        self.prefs.theme
    }

    fn set_theme(&mut self, theme: Theme) -> Result<(), Doc2QuizError> {
        self.prefs.theme = theme;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn sample_result() -> QuizResult {
        QuizResult {
            id: "2024-05-01T10:00:00Z".to_string(),
            score: 1,
            total_questions: 1,
            date: "5/1/2024".to_string(),
            questions: vec![Question {
                question_text: "What is 2 + 2?".to_string(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_answer_index: 1,
                reason: "Basic arithmetic.".to_string(),
            }],
            user_answers: std::iter::once((0, 1)).collect(),
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::open(dir.path().join("preferences.json"));
        assert!(store.user().is_none());
        assert!(store.api_key().is_none());
        assert!(store.history().is_empty());
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn values_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut store = JsonPreferenceStore::open(&path);
        store.set_user(Some("sam".to_string())).unwrap();
        store.set_api_key(Some("key-123".to_string())).unwrap();
        store.set_history(vec![sample_result()]).unwrap();
        store.set_theme(Theme::Rose).unwrap();

        let store = JsonPreferenceStore::open(&path);
        assert_eq!(store.user().as_deref(), Some("sam"));
        assert_eq!(store.api_key().as_deref(), Some("key-123"));
        assert_eq!(store.history(), vec![sample_result()]);
        assert_eq!(store.theme(), Theme::Rose);
    }

    #[test]
    fn corrupt_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = JsonPreferenceStore::open(&path);
        assert!(store.user().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let mut store = JsonPreferenceStore::open(&path);
        store.set_theme(Theme::Light).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn in_memory_store_round_trips_without_io() {
        let mut store = InMemoryStore::new();
        store.set_user(Some("sam".to_string())).unwrap();
        store.set_history(vec![sample_result()]).unwrap();
        assert_eq!(store.user().as_deref(), Some("sam"));
        assert_eq!(store.history().len(), 1);
    }
}
