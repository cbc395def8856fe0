use uuid::Uuid;

use super::AgentProgress;

/// Short random identifier, two uuid groups long.
pub fn create_id() -> String {
    return Uuid::new_v4()
        .to_string()
        .split('-')
        .take(2)
        .collect::<Vec<&str>>()
        .join("-");
}

/// A decoded unit of the model's output stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Status(AgentProgress),
    Code(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub request_id: String,
}

impl GenerationRequest {
    pub fn new(prompt: &str) -> GenerationRequest {
        return GenerationRequest {
            prompt: prompt.to_string(),
            request_id: create_id(),
        };
    }
}

/// What the orchestrator publishes for a request. `Failed` and `Finished` are
/// terminal and exactly one of them is sent per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationUpdate {
    Status(AgentProgress),
    Code(String),
    Failed(String),
    Finished,
}

impl From<StreamEvent> for GenerationUpdate {
    fn from(event: StreamEvent) -> GenerationUpdate {
        match event {
            StreamEvent::Status(progress) => return GenerationUpdate::Status(progress),
            StreamEvent::Code(code) => return GenerationUpdate::Code(code),
        }
    }
}
