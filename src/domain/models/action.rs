use super::GenerationRequest;

pub enum Action {
    CopyArtifact(String),
    GenerationRequest(GenerationRequest),
}
