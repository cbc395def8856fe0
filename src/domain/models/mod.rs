mod action;
mod agent;
mod author;
mod backend;
mod error;
mod event;
mod generation;
mod history;
mod loading;
mod message;
mod session;
mod slash_commands;
mod store;
mod textarea;

pub use action::*;
pub use agent::*;
pub use author::*;
pub use backend::*;
pub use error::*;
pub use event::*;
pub use generation::*;
pub use history::*;
pub use loading::*;
pub use message::*;
pub use session::*;
pub use slash_commands::*;
pub use store::*;
pub use textarea::*;
