#[cfg(test)]
#[path = "session_state_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::AgentName;
use crate::domain::models::AgentProgress;
use crate::domain::models::AgentStatus;
use crate::domain::models::Author;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationUpdate;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Project;
use crate::domain::models::ProjectHistory;
use crate::domain::models::SessionSnapshot;
use crate::domain::models::StoreBox;
use crate::domain::models::PROJECTS_KEY;
use crate::domain::models::SESSION_KEY;

pub const GREETING_ID: &str = "initial-greeting";

const GREETING: &str = "Hi! I'm Crewforge, your AI application builder.\n\nDescribe the app you want to build, and my team of AI agents will create it for you.";
const SUCCESS: &str = "✅ Application Generated Successfully!\n\nUse /copy to copy the code, /code to view it, or /preview to find the preview file. What would you like to build next?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating { request_id: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

fn greeting() -> Message {
    return Message::new(Author::Assistant, GREETING).with_id(GREETING_ID);
}

/// Owns the conversation and everything rendered around it. Only the UI task
/// mutates it, generation events arrive through `apply`.
pub struct SessionState {
    pub messages: Vec<Message>,
    pub agent_progress: Vec<AgentProgress>,
    pub artifact: String,
    pub current_prompt: String,
    pub history: ProjectHistory,
    pub config_error: Option<String>,
    pub phase: Phase,
    pub last_outcome: Option<Outcome>,
    store: StoreBox,
}

impl SessionState {
    pub fn new(store: StoreBox) -> SessionState {
        return SessionState {
            messages: vec![greeting()],
            agent_progress: vec![],
            artifact: "".to_string(),
            current_prompt: "".to_string(),
            history: ProjectHistory::default(),
            config_error: None,
            phase: Phase::Idle,
            last_outcome: None,
            store,
        };
    }

    /// Restores the last session and the project history. Anything unreadable
    /// is logged and replaced with its default.
    pub async fn load(store: StoreBox) -> SessionState {
        let snapshot = match store.get(SESSION_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<SessionSnapshot>(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    tracing::error!(error = ?err, "failed to parse saved session");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::error!(error = ?err, "failed to load saved session");
                None
            }
        };

        let history = match store.get(PROJECTS_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Project>>(&json) {
                Ok(projects) => ProjectHistory::from_projects(projects),
                Err(err) => {
                    tracing::error!(error = ?err, "failed to parse project history");
                    ProjectHistory::default()
                }
            },
            Ok(None) => ProjectHistory::default(),
            Err(err) => {
                tracing::error!(error = ?err, "failed to load project history");
                ProjectHistory::default()
            }
        };

        let mut state = SessionState::new(store);
        state.history = history;

        if let Some(snapshot) = snapshot {
            if !snapshot.messages.is_empty() {
                state.messages = snapshot.messages;
            }
            state.agent_progress = snapshot.agent_progress;
            state.artifact = snapshot.preview_html;
            state.current_prompt = snapshot.current_prompt;
        }

        return state;
    }

    /// Blocks submissions and shows `message` until the process restarts.
    pub fn set_config_error(&mut self, message: &str) {
        self.config_error = Some(message.to_string());
    }

    pub fn is_generating(&self) -> bool {
        return matches!(self.phase, Phase::Generating { .. });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        return SessionSnapshot {
            messages: self.messages.clone(),
            agent_progress: self.agent_progress.clone(),
            preview_html: self.artifact.clone(),
            current_prompt: self.current_prompt.clone(),
        };
    }

    /// Progress for every agent in reporting order, pending when unreported.
    pub fn tracker(&self) -> Vec<AgentProgress> {
        return AgentName::crew()
            .into_iter()
            .map(|name| {
                return self
                    .progress_for(name)
                    .cloned()
                    .unwrap_or_else(|| return AgentProgress::pending(name));
            })
            .collect();
    }

    pub fn progress_for(&self, name: AgentName) -> Option<&AgentProgress> {
        return self
            .agent_progress
            .iter()
            .find(|progress| return progress.agent_name == name);
    }

    pub async fn submit(&mut self, prompt: &str) -> Result<GenerationRequest> {
        if self.is_generating() {
            bail!("A generation is already in progress");
        }
        if prompt.trim().is_empty() {
            bail!("Prompt is empty");
        }
        if let Some(config_error) = &self.config_error {
            bail!("{config_error}");
        }

        let request = GenerationRequest::new(prompt);
        self.messages.push(Message::new(Author::User, prompt));
        self.messages.push(Message::new(
            Author::Assistant,
            &format!("Roger that! Orchestrating my crew to build: \"{prompt}\". Stand by..."),
        ));
        self.agent_progress.clear();
        self.artifact.clear();
        self.current_prompt = prompt.to_string();
        self.phase = Phase::Generating {
            request_id: request.request_id.to_string(),
        };

        self.persist().await;
        return Ok(request);
    }

    /// Returns false when the update belongs to a request that is no longer
    /// current.
    pub async fn apply(&mut self, request_id: &str, update: GenerationUpdate) -> bool {
        match &self.phase {
            Phase::Generating { request_id: current } if current == request_id => (),
            _ => {
                tracing::debug!(request_id, "discarding stale generation update");
                return false;
            }
        }

        match update {
            GenerationUpdate::Status(progress) => {
                self.upsert_progress(progress);
            }
            GenerationUpdate::Code(code) => {
                self.artifact.push_str(&code);
            }
            GenerationUpdate::Failed(message) => {
                for progress in self.agent_progress.iter_mut() {
                    if progress.status == AgentStatus::Working {
                        progress.status = AgentStatus::Error;
                        progress.message = "Failed".to_string();
                    }
                }
                self.messages.push(Message::new_with_type(
                    Author::Assistant,
                    MessageType::Error,
                    &format!("❌ Error: {message}"),
                ));
                self.phase = Phase::Idle;
                self.last_outcome = Some(Outcome::Failed);
            }
            GenerationUpdate::Finished => {
                self.messages.push(Message::new(Author::Assistant, SUCCESS));
                let prompt = self.current_prompt.to_string();
                self.history.record(&prompt);
                self.persist_history().await;
                self.phase = Phase::Idle;
                self.last_outcome = Some(Outcome::Completed);
            }
        }

        self.persist().await;
        return true;
    }

    /// Starts over with only the greeting. History is kept.
    pub async fn reset_conversation(&mut self) -> Result<()> {
        if self.is_generating() {
            bail!("Wait for the current generation to finish before starting a new chat");
        }

        if let Err(err) = self.store.remove(SESSION_KEY).await {
            tracing::error!(error = ?err, "failed to remove saved session");
        }

        self.messages = vec![greeting()];
        self.agent_progress.clear();
        self.artifact.clear();
        self.current_prompt.clear();
        self.last_outcome = None;

        return Ok(());
    }

    /// Wipes the saved project history.
    pub async fn clear_history(&mut self) {
        self.history = ProjectHistory::default();
        self.persist_history().await;
    }

    /// Adds a local notice to the transcript without touching the phase.
    pub async fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.persist().await;
    }

    fn upsert_progress(&mut self, progress: AgentProgress) {
        let existing = self
            .agent_progress
            .iter_mut()
            .find(|existing| return existing.agent_name == progress.agent_name);

        match existing {
            Some(existing) => *existing = progress,
            None => self.agent_progress.push(progress),
        }
    }

    fn is_default(&self) -> bool {
        return self.messages.len() <= 1 && self.current_prompt.is_empty();
    }

    async fn persist(&self) {
        if self.is_default() {
            return;
        }

        let json = match serde_json::to_string(&self.snapshot()) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = ?err, "failed to serialize session");
                return;
            }
        };

        if let Err(err) = self.store.set(SESSION_KEY, &json).await {
            tracing::error!(error = ?err, "failed to save session");
        }
    }

    async fn persist_history(&self) {
        let json = match serde_json::to_string(&self.history) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = ?err, "failed to serialize project history");
                return;
            }
        };

        if let Err(err) = self.store.set(PROJECTS_KEY, &json).await {
            tracing::error!(error = ?err, "failed to save project history");
        }
    }
}
