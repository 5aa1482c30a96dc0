use crate::model::{QuizResult, Theme};
use std::path::PathBuf;

/// Side effects `update` asks the driver to perform. The reducer itself
/// never touches storage or the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist (or clear) the user identity.
    SaveUser(Option<String>),
    /// Persist (or clear) the API credential.
    SaveApiKey(Option<String>),
    /// Persist the theme choice.
    SaveTheme(Theme),
    /// Persist the full history, newest first.
    SaveHistory(Vec<QuizResult>),
    /// Run extraction and generation for the chosen document. At most one
    /// pipeline runs at a time; the reducer only emits this from the
    /// upload screen.
    StartPipeline(PathBuf),
}
