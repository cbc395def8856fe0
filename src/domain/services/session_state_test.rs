use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use test_utils::todo_app_fragments;

use super::Outcome;
use super::Phase;
use super::SessionState;
use super::GREETING_ID;
use crate::domain::models::AgentName;
use crate::domain::models::AgentProgress;
use crate::domain::models::AgentStatus;
use crate::domain::models::Author;
use crate::domain::models::GenerationUpdate;
use crate::domain::models::MessageType;
use crate::domain::models::Project;
use crate::domain::models::SessionSnapshot;
use crate::domain::models::Store;
use crate::domain::models::HISTORY_LIMIT;
use crate::domain::models::PROJECTS_KEY;
use crate::domain::models::SESSION_KEY;
use crate::domain::services::StreamDemuxer;
use crate::infrastructure::stores::MemoryStore;

struct FailingStore {}

#[async_trait]
impl Store for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        bail!("disk on fire")
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        bail!("disk on fire")
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        bail!("disk on fire")
    }
}

fn working(name: AgentName, message: &str) -> GenerationUpdate {
    return GenerationUpdate::Status(AgentProgress::new(name, AgentStatus::Working, message));
}

fn complete(name: AgentName, message: &str) -> GenerationUpdate {
    return GenerationUpdate::Status(AgentProgress::new(name, AgentStatus::Complete, message));
}

fn request_id(state: &SessionState) -> String {
    match &state.phase {
        Phase::Generating { request_id } => return request_id.to_string(),
        Phase::Idle => return "".to_string(),
    }
}

mod new {
    use super::*;

    #[test]
    fn it_starts_with_the_greeting() {
        let state = SessionState::new(Box::<MemoryStore>::default());

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id, GREETING_ID);
        assert_eq!(state.messages[0].author, Author::Assistant);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.last_outcome, None);
    }

    #[test]
    fn it_tracks_every_agent_as_pending() {
        let state = SessionState::new(Box::<MemoryStore>::default());
        let tracker = state.tracker();

        assert_eq!(tracker.len(), 4);
        assert!(tracker
            .iter()
            .all(|progress| return progress.status == AgentStatus::Pending));
        assert_eq!(tracker[0].agent_name, AgentName::UiUx);
        assert_eq!(tracker[3].agent_name, AgentName::Testing);
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn it_starts_a_generation() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.artifact = "<p>old</p>".to_string();
        state.agent_progress = vec![AgentProgress::pending(AgentName::Backend)];

        let request = state.submit("todo app").await?;

        assert_eq!(request.prompt, "todo app");
        assert_eq!(
            state.phase,
            Phase::Generating {
                request_id: request.request_id.to_string()
            }
        );
        assert_eq!(state.current_prompt, "todo app");
        assert_eq!(state.artifact, "");
        assert!(state.agent_progress.is_empty());
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[1].author, Author::User);
        assert_eq!(state.messages[1].text, "todo app");
        assert_eq!(
            state.messages[2].text,
            "Roger that! Orchestrating my crew to build: \"todo app\". Stand by..."
        );

        return Ok(());
    }

    #[tokio::test]
    async fn it_rejects_blank_prompts() {
        let mut state = SessionState::new(Box::<MemoryStore>::default());

        assert!(state.submit("   \n").await.is_err());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn it_rejects_while_generating() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;

        assert!(state.submit("weather app").await.is_err());
        assert_eq!(state.current_prompt, "todo app");
        assert_eq!(state.messages.len(), 3);

        return Ok(());
    }

    #[tokio::test]
    async fn it_rejects_with_a_config_error() {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.set_config_error("missing token");

        let res = state.submit("todo app").await;

        assert_eq!(
            res.map_err(|err| return err.to_string()).err(),
            Some("missing token".to_string())
        );
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn it_persists_the_session() -> Result<()> {
        let store = MemoryStore::default();
        let mut state = SessionState::new(Box::new(store.clone()));
        state.submit("todo app").await?;

        let json = store.value(SESSION_KEY).unwrap();
        let snapshot: SessionSnapshot = serde_json::from_str(&json)?;
        assert_eq!(snapshot.current_prompt, "todo app");
        assert_eq!(snapshot.messages.len(), 3);

        return Ok(());
    }
}

mod apply {
    use super::*;

    #[tokio::test]
    async fn it_upserts_progress_by_agent() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;
        let id = request_id(&state);

        assert!(state.apply(&id, working(AgentName::UiUx, "designing")).await);
        assert!(state.apply(&id, working(AgentName::Frontend, "coding")).await);
        assert!(state.apply(&id, complete(AgentName::UiUx, "done")).await);

        assert_eq!(
            state.agent_progress,
            vec![
                AgentProgress::new(AgentName::UiUx, AgentStatus::Complete, "done"),
                AgentProgress::new(AgentName::Frontend, AgentStatus::Working, "coding"),
            ]
        );

        return Ok(());
    }

    #[tokio::test]
    async fn it_appends_code_in_order() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;
        let id = request_id(&state);

        state
            .apply(&id, GenerationUpdate::Code("<html>".to_string()))
            .await;
        state
            .apply(&id, GenerationUpdate::Code("</html>".to_string()))
            .await;

        assert_eq!(state.artifact, "<html></html>");

        return Ok(());
    }

    #[tokio::test]
    async fn it_discards_stale_updates() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;

        let applied = state
            .apply("someone-else", GenerationUpdate::Code("<p>".to_string()))
            .await;

        assert!(!applied);
        assert_eq!(state.artifact, "");
        assert!(state.is_generating());

        return Ok(());
    }

    #[tokio::test]
    async fn it_discards_updates_while_idle() {
        let mut state = SessionState::new(Box::<MemoryStore>::default());

        let applied = state.apply("", GenerationUpdate::Finished).await;

        assert!(!applied);
        assert_eq!(state.messages.len(), 1);
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn it_marks_working_agents_as_failed() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;
        let id = request_id(&state);

        state.apply(&id, complete(AgentName::UiUx, "done")).await;
        state.apply(&id, working(AgentName::Frontend, "coding")).await;
        state
            .apply(&id, GenerationUpdate::Failed("boom".to_string()))
            .await;

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.last_outcome, Some(Outcome::Failed));
        assert_eq!(
            state.progress_for(AgentName::UiUx).unwrap().status,
            AgentStatus::Complete
        );
        assert_eq!(
            state.progress_for(AgentName::Frontend),
            Some(&AgentProgress::new(
                AgentName::Frontend,
                AgentStatus::Error,
                "Failed"
            ))
        );

        let last = state.messages.last().unwrap();
        assert_eq!(last.text, "❌ Error: boom");
        assert_eq!(last.message_type(), MessageType::Error);
        assert!(state.history.is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_records_history_on_completion() -> Result<()> {
        let store = MemoryStore::default();
        let mut state = SessionState::new(Box::new(store.clone()));
        state.submit("todo app").await?;
        let id = request_id(&state);

        state.apply(&id, GenerationUpdate::Finished).await;

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.last_outcome, Some(Outcome::Completed));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.projects()[0].prompt, "todo app");

        let projects: Vec<Project> = serde_json::from_str(&store.value(PROJECTS_KEY).unwrap())?;
        assert_eq!(projects, state.history.projects());

        return Ok(());
    }

    #[tokio::test]
    async fn it_caps_history() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());

        for idx in 0..HISTORY_LIMIT + 2 {
            state.submit(&format!("app {idx}")).await?;
            let id = request_id(&state);
            state.apply(&id, GenerationUpdate::Finished).await;
        }

        assert_eq!(state.history.len(), HISTORY_LIMIT);
        assert_eq!(
            state.history.projects()[0].prompt,
            format!("app {}", HISTORY_LIMIT + 1)
        );

        return Ok(());
    }

    #[tokio::test]
    async fn it_keeps_working_when_the_store_fails() -> Result<()> {
        let mut state = SessionState::new(Box::new(FailingStore {}));
        state.submit("todo app").await?;
        let id = request_id(&state);

        assert!(state.apply(&id, GenerationUpdate::Finished).await);
        assert_eq!(state.history.len(), 1);
        assert!(state.reset_conversation().await.is_ok());

        return Ok(());
    }
}

mod reset_conversation {
    use super::*;

    #[tokio::test]
    async fn it_starts_over_and_keeps_history() -> Result<()> {
        let store = MemoryStore::default();
        let mut state = SessionState::new(Box::new(store.clone()));
        state.submit("todo app").await?;
        let id = request_id(&state);
        state.apply(&id, working(AgentName::UiUx, "designing")).await;
        state
            .apply(&id, GenerationUpdate::Code("<html></html>".to_string()))
            .await;
        state.apply(&id, GenerationUpdate::Finished).await;
        assert!(store.value(SESSION_KEY).is_some());

        state.reset_conversation().await?;

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id, GREETING_ID);
        assert!(state.agent_progress.is_empty());
        assert_eq!(state.artifact, "");
        assert_eq!(state.current_prompt, "");
        assert_eq!(state.history.len(), 1);
        assert_eq!(store.value(SESSION_KEY), None);
        assert!(store.value(PROJECTS_KEY).is_some());

        return Ok(());
    }

    #[tokio::test]
    async fn it_refuses_while_generating() -> Result<()> {
        let mut state = SessionState::new(Box::<MemoryStore>::default());
        state.submit("todo app").await?;

        assert!(state.reset_conversation().await.is_err());
        assert_eq!(state.current_prompt, "todo app");

        return Ok(());
    }
}

mod load {
    use super::*;

    #[tokio::test]
    async fn it_restores_a_saved_session() -> Result<()> {
        let store = MemoryStore::default();
        let mut state = SessionState::new(Box::new(store.clone()));
        state.submit("todo app").await?;
        let id = request_id(&state);
        state
            .apply(&id, GenerationUpdate::Code("<html></html>".to_string()))
            .await;
        state.apply(&id, GenerationUpdate::Finished).await;

        let restored = SessionState::load(Box::new(store.clone())).await;

        assert_eq!(restored.snapshot(), state.snapshot());
        assert_eq!(restored.history, state.history);
        assert_eq!(restored.phase, Phase::Idle);

        return Ok(());
    }

    #[tokio::test]
    async fn it_falls_back_to_the_greeting_on_corrupt_data() -> Result<()> {
        let store = MemoryStore::default();
        store.set(SESSION_KEY, "{not json").await?;
        store
            .set(
                PROJECTS_KEY,
                r#"[{"id":"proj-1","prompt":"todo app","timestamp":1}]"#,
            )
            .await?;

        let state = SessionState::load(Box::new(store)).await;

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].id, GREETING_ID);
        assert_eq!(state.history.len(), 1);

        return Ok(());
    }

    #[tokio::test]
    async fn it_falls_back_to_defaults_when_the_store_fails() {
        let state = SessionState::load(Box::new(FailingStore {})).await;

        assert_eq!(state.messages.len(), 1);
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn it_does_not_persist_the_untouched_default() -> Result<()> {
        let store = MemoryStore::default();
        let mut state = SessionState::new(Box::new(store.clone()));

        state.clear_history().await;

        assert_eq!(store.value(SESSION_KEY), None);

        return Ok(());
    }
}

#[tokio::test]
async fn it_builds_the_todo_app() -> Result<()> {
    let store = MemoryStore::default();
    let mut state = SessionState::new(Box::new(store.clone()));
    let request = state.submit("todo app").await?;

    let mut demuxer = StreamDemuxer::default();
    let mut events = vec![];
    for fragment in todo_app_fragments() {
        events.extend(demuxer.feed(fragment));
    }
    events.extend(demuxer.finish());

    for event in events {
        assert!(state.apply(&request.request_id, event.into()).await);
    }
    assert!(
        state
            .apply(&request.request_id, GenerationUpdate::Finished)
            .await
    );

    assert_eq!(
        state.agent_progress,
        vec![AgentProgress::new(
            AgentName::UiUx,
            AgentStatus::Complete,
            "done"
        )]
    );
    assert_eq!(state.artifact, "<html></html>");
    assert_eq!(state.last_outcome, Some(Outcome::Completed));
    assert_eq!(state.messages.len(), 4);
    assert_eq!(state.history.len(), 1);

    let snapshot: SessionSnapshot = serde_json::from_str(&store.value(SESSION_KEY).unwrap())?;
    assert_eq!(snapshot.preview_html, "<html></html>");

    return Ok(());
}
