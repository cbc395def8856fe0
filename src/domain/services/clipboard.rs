use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

static SENDER: OnceCell<mpsc::UnboundedSender<String>> = OnceCell::new();

/// Holds the clipboard handle for the life of the process. Some platforms
/// clear the copied text as soon as the handle is dropped.
pub struct ClipboardService {}

impl ClipboardService {
    pub async fn start() -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        SENDER
            .set(tx)
            .map_err(|_| return anyhow!("Clipboard service is already running."))?;

        while let Some(text) = rx.recv().await {
            if let Err(err) = clipboard.set_text(text) {
                tracing::error!(error = ?err, "Failed to write to the clipboard");
            }
        }

        return Ok(());
    }

    pub fn healthcheck() -> Result<()> {
        if SENDER.get().is_some() {
            return Ok(());
        }

        arboard::Clipboard::new()?;
        return Ok(());
    }

    pub fn copy(text: &str) -> Result<()> {
        if let Some(tx) = SENDER.get() {
            tx.send(text.to_string())?;
            return Ok(());
        }

        return Err(anyhow!("Clipboard service is not initialized."));
    }
}
