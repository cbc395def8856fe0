use anyhow::Result;
use async_trait::async_trait;

/// Key holding the serialized `SessionSnapshot`.
pub const SESSION_KEY: &str = "session";
/// Key holding the serialized `ProjectHistory`.
pub const PROJECTS_KEY: &str = "projects";

/// Minimal key-value persistence. Values are JSON documents.
#[async_trait]
pub trait Store {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub type StoreBox = Box<dyn Store + Send + Sync>;
