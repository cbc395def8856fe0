#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::clipboard::ClipboardService;
use super::GenerationOrchestrator;
use crate::domain::models::Action;
use crate::domain::models::Event;

fn copy_artifact(code: &str, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    if code.is_empty() {
        tx.send(Event::Notice("There is no generated code to copy yet.".to_string()))?;
        return Ok(());
    }

    match ClipboardService::copy(code) {
        Ok(()) => {
            tx.send(Event::Notice(
                "Copied the generated code to your clipboard.".to_string(),
            ))?;
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Unable to copy generated code");
            tx.send(Event::Notice(format!(
                "Unable to copy the generated code: {err}"
            )))?;
        }
    }

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until every action sender is dropped. Generations run on their
    /// own tasks so the loop keeps serving copies while one is streaming.
    pub async fn start(
        orchestrator: GenerationOrchestrator,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let orchestrator = Arc::new(orchestrator);

        while let Some(action) = rx.recv().await {
            match action {
                Action::CopyArtifact(code) => {
                    copy_artifact(&code, &tx)?;
                }
                Action::GenerationRequest(request) => {
                    let orchestrator = orchestrator.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        let request_id = request.request_id.to_string();
                        if let Err(err) = orchestrator.start_generation(request, &worker_tx).await {
                            tracing::debug!(
                                error = ?err,
                                request_id = %request_id,
                                "Nobody is listening for generation updates"
                            );
                        }
                    });
                }
            }
        }

        return Ok(());
    }
}
