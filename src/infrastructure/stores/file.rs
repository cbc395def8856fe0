#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Store;

/// Keeps each key as `<dir>/<key>.json`.
pub struct FileStore {
    pub dir: path::PathBuf,
}

impl FileStore {
    pub fn new(dir: path::PathBuf) -> FileStore {
        return FileStore { dir };
    }

    pub fn from_config() -> FileStore {
        return FileStore::new(path::PathBuf::from(Config::get(ConfigKey::DataDir)));
    }

    pub fn preview_path(&self) -> path::PathBuf {
        return self.dir.join("preview.html");
    }

    /// Writes the generated app so it can be opened in a browser.
    pub async fn write_preview(&self, html: &str) -> Result<path::PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
        }

        let file_path = self.preview_path();
        let mut file = fs::File::create(&file_path).await?;
        file.write_all(html.as_bytes()).await?;

        return Ok(file_path);
    }

    pub fn path_for(&self, key: &str) -> Result<path::PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            bail!(format!("Invalid store key {key}"));
        }

        return Ok(self.dir.join(format!("{key}.json")));
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.path_for(key)?;
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).await?;
        return Ok(Some(payload));
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.path_for(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).await?;
        }

        let mut file = fs::File::create(file_path).await?;
        file.write_all(value.as_bytes()).await?;

        return Ok(());
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.path_for(key)?;
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }
}
