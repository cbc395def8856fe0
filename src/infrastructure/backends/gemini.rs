#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use async_trait::async_trait;
use futures::stream;
use futures::stream::TryStreamExt;
use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::FragmentStream;
use crate::domain::models::GenerationError;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

/// Extracts the text carried by one line of a server-sent event stream.
/// Anything that isn't a `data:` line with text yields `None`.
fn parse_sse_line(line: &str) -> Result<Option<String>, GenerationError> {
    let payload = match line.trim().strip_prefix("data:") {
        Some(payload) => payload.trim(),
        None => return Ok(None),
    };
    if payload.is_empty() || payload == "[DONE]" {
        return Ok(None);
    }

    let chunk = serde_json::from_str::<StreamChunk>(payload).map_err(|err| {
        tracing::error!(error = ?err, "Gemini sent an unreadable stream chunk");
        return GenerationError::Transport(format!("invalid stream chunk: {err}"));
    })?;

    if let Some(err) = chunk.error {
        tracing::error!(
            code = err.code,
            status = %err.status,
            reason = %err.message,
            "Gemini reported an error mid stream"
        );
        return Err(GenerationError::from_status(
            err.code,
            &format!("{} {}", err.status, err.message),
        ));
    }

    let text = match chunk.candidates.first() {
        Some(candidate) => candidate
            .content
            .parts
            .iter()
            .map(|part| return part.text.as_str())
            .collect::<String>(),
        None => "".to_string(),
    };

    if text.is_empty() {
        return Ok(None);
    }

    return Ok(Some(text));
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
}

impl Gemini {
    pub fn new(url: &str, token: &str, model: &str) -> Gemini {
        return Gemini {
            url: url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            model: model.trim_start_matches("models/").to_string(),
        };
    }

    /// Reads the connection settings once. Later config changes are not
    /// picked up.
    pub fn from_config() -> Gemini {
        return Gemini::new(
            &Config::get(ConfigKey::GeminiURL),
            &Config::get(ConfigKey::GeminiToken),
            &Config::get(ConfigKey::Model),
        );
    }

    fn completion_url(&self) -> String {
        return format!(
            "{url}/v1beta/models/{model}:streamGenerateContent?alt=sse&key={key}",
            url = self.url,
            model = self.model,
            key = self.token,
        );
    }
}

#[async_trait]
impl Backend for Gemini {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<(), GenerationError> {
        if self.token.is_empty() {
            return Err(GenerationError::MissingCredential);
        }
        if self.url.is_empty() {
            return Err(GenerationError::Transport(
                "Gemini URL is not defined".to_string(),
            ));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn stream_completion(
        &self,
        prompt: BackendPrompt,
    ) -> Result<FragmentStream, GenerationError> {
        self.health_check().await?;

        let req = CompletionRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart { text: prompt.text }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![ContentPart {
                    text: prompt.system_instruction,
                }],
            },
        };

        let res = reqwest::Client::new()
            .post(self.completion_url())
            .json(&req)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "Gemini is not reachable");
                return GenerationError::Transport(err.to_string());
            })?;

        let status = res.status().as_u16();
        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(
                status = status,
                "Failed to make completion request to Gemini"
            );
            return Err(GenerationError::from_status(status, &body));
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let lines_reader = StreamReader::new(stream).lines();

        let fragments = stream::unfold(Some(lines_reader), |state| async move {
            let mut lines_reader = match state {
                Some(lines_reader) => lines_reader,
                None => return None,
            };
            loop {
                match lines_reader.next_line().await {
                    Ok(Some(line)) => match parse_sse_line(&line) {
                        Ok(Some(text)) => return Some((Ok(text), Some(lines_reader))),
                        Ok(None) => continue,
                        Err(err) => return Some((Err(err), None)),
                    },
                    Ok(None) => return None,
                    Err(err) => {
                        tracing::error!(error = ?err, "Gemini stream was interrupted");
                        return Some((Err(GenerationError::Transport(err.to_string())), None));
                    }
                }
            }
        });

        return Ok(Box::pin(fragments));
    }
}
