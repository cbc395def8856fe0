#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;

use super::StreamDemuxer;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Event;
use crate::domain::models::FragmentStream;
use crate::domain::models::GenerationError;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationUpdate;

fn publish(
    tx: &mpsc::UnboundedSender<Event>,
    request: &GenerationRequest,
    update: GenerationUpdate,
) -> Result<()> {
    tx.send(Event::Generation {
        request_id: request.request_id.to_string(),
        update,
    })?;

    return Ok(());
}

/// Runs one generation at a time against the injected backend. Single flight
/// is the caller's job: a second call simply runs a second, independent
/// generation.
pub struct GenerationOrchestrator {
    backend: BackendBox,
}

impl GenerationOrchestrator {
    pub fn new(backend: BackendBox) -> GenerationOrchestrator {
        return GenerationOrchestrator { backend };
    }

    /// Streams the decoded events for `request` into `tx`, ending with exactly
    /// one `Finished` or `Failed`. Only a closed channel is returned as an
    /// error.
    pub async fn start_generation(
        &self,
        request: GenerationRequest,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        tracing::debug!(request_id = %request.request_id, "generation started");

        let mut fragments = match self.open(&request).await {
            Ok(fragments) => fragments,
            Err(err) => return self.fail(&request, err, tx),
        };

        let mut demuxer = StreamDemuxer::default();
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(text) => {
                    for event in demuxer.feed(&text) {
                        publish(tx, &request, event.into())?;
                    }
                }
                Err(err) => {
                    return self.fail(&request, err, tx);
                }
            }
        }

        for event in demuxer.finish() {
            publish(tx, &request, event.into())?;
        }

        tracing::debug!(request_id = %request.request_id, "generation finished");
        publish(tx, &request, GenerationUpdate::Finished)?;

        return Ok(());
    }

    async fn open(&self, request: &GenerationRequest) -> Result<FragmentStream, GenerationError> {
        // The credential check never touches the network.
        self.backend.health_check().await?;

        return self
            .backend
            .stream_completion(BackendPrompt::new(&request.prompt))
            .await;
    }

    fn fail(
        &self,
        request: &GenerationRequest,
        err: GenerationError,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        tracing::error!(
            request_id = %request.request_id,
            error = %err,
            "generation failed"
        );

        return publish(tx, request, GenerationUpdate::Failed(err.user_message()));
    }
}
