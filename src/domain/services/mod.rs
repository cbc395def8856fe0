pub mod actions;
pub mod clipboard;
mod demuxer;
pub mod events;
mod orchestrator;
mod session_state;
mod transcript;

pub use demuxer::*;
pub use orchestrator::*;
pub use session_state::*;
pub use transcript::*;
