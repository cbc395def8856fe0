use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::AgentProgress;
use super::Message;

/// Everything needed to restore the chat view. Persisted and restored as one
/// unit under `SESSION_KEY`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub agent_progress: Vec<AgentProgress>,
    pub preview_html: String,
    pub current_prompt: String,
}

/// A successfully generated app, as listed in the history sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub prompt: String,
    /// Unix epoch in milliseconds.
    pub timestamp: i64,
}
