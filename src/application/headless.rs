#[cfg(test)]
#[path = "headless_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::domain::models::AgentProgress;
use crate::domain::models::AgentStatus;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::GenerationUpdate;
use crate::domain::services::GenerationOrchestrator;
use crate::domain::services::Outcome;
use crate::domain::services::SessionState;
use crate::infrastructure::backends::gemini::Gemini;
use crate::infrastructure::stores::FileStore;

fn format_progress(progress: &AgentProgress) -> String {
    let status = match progress.status {
        AgentStatus::Pending => Paint::fixed(8, "[pending]"),
        AgentStatus::Working => Paint::yellow("[working]"),
        AgentStatus::Complete => Paint::green("[complete]"),
        AgentStatus::Error => Paint::red("[error]"),
    };

    return format!("{status} {}: {}", progress.agent_name, progress.message);
}

/// Drives one generation to its end, printing agent progress to stderr.
/// Returns the final session so callers can inspect the outcome.
pub async fn run(
    backend: BackendBox,
    mut session: SessionState,
    prompt: &str,
) -> Result<SessionState> {
    if let Err(err) = backend.health_check().await {
        bail!(err.user_message());
    }

    let request = session.submit(prompt).await?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let orchestrator = GenerationOrchestrator::new(backend);
    let worker = tokio::spawn(async move {
        return orchestrator.start_generation(request, &tx).await;
    });

    while let Some(event) = rx.recv().await {
        if let Event::Generation { request_id, update } = event {
            if let GenerationUpdate::Status(progress) = &update {
                eprintln!("{}", format_progress(progress));
            }

            let is_terminal = matches!(
                update,
                GenerationUpdate::Finished | GenerationUpdate::Failed(_)
            );
            session.apply(&request_id, update).await;
            if is_terminal {
                break;
            }
        }
    }

    worker.await??;
    return Ok(session);
}

pub async fn generate(prompt: &str, output: Option<String>) -> Result<()> {
    let store = FileStore::from_config();
    let preview_store = FileStore::from_config();
    let gemini = Gemini::from_config();
    let session = SessionState::load(Box::new(store)).await;
    let session = run(Box::new(gemini), session, prompt).await?;

    match session.last_outcome {
        Some(Outcome::Completed) => (),
        Some(Outcome::Failed) => {
            let message = session
                .messages
                .last()
                .map(|message| return message.text.to_string())
                .unwrap_or_default();
            bail!(message);
        }
        None => bail!("The generation ended without a result"),
    }

    match preview_store.write_preview(&session.artifact).await {
        Ok(path) => eprintln!("Preview written to {}", path.to_string_lossy()),
        Err(err) => tracing::error!(error = ?err, "Failed to write preview"),
    }

    if let Some(output_path) = output {
        fs::write(&output_path, session.artifact.as_bytes()).await?;
        eprintln!("Saved the generated app to {output_path}");
    } else {
        println!("{}", session.artifact);
    }

    return Ok(());
}
