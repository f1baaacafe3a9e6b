#[cfg(test)]
#[path = "claude_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::Role;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Model {
    id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    data: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<MessageRequest>,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionDeltaResponse {
    #[serde(rename = "type")]
    _type: String,
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(rename = "type")]
    _type: String,
    delta: CompletionDeltaResponse,
}

pub struct Claude {
    url: String,
    token: String,
    timeout: String,
}

impl Default for Claude {
    fn default() -> Claude {
        return Claude {
            url: "https://api.anthropic.com".to_string(),
            token: Config::get(ConfigKey::ClaudeToken),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

fn to_wire_role(role: &Role) -> String {
    match role {
        Role::User => return "user".to_string(),
        Role::Assistant => return "assistant".to_string(),
    }
}

#[async_trait]
impl Backend for Claude {
    fn name(&self) -> BackendName {
        return BackendName::Claude;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Claude URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Claude token is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/v1/models", url = self.url))
            .header("x-api-key", &self.token)
            .header("anthropic-version", "2023-06-01")
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Claude is not reachable");
            bail!("Claude is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Claude health check failed");
            bail!("Claude health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = reqwest::Client::new()
            .get(format!("{url}/v1/models", url = self.url))
            .header("x-api-key", &self.token)
            .header("anthropic-version", "2023-06-01")
            .send()
            .await?
            .json::<ModelListResponse>()
            .await?;

        let models = res.data.into_iter().map(|model| return model.id).collect();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<BackendResponse>,
    ) -> Result<()> {
        let messages = prompt
            .messages
            .iter()
            .map(|message| {
                return MessageRequest {
                    role: to_wire_role(&message.role),
                    content: message.content.to_string(),
                };
            })
            .collect::<Vec<MessageRequest>>();

        let req = CompletionRequest {
            model: Config::get(ConfigKey::Model),
            max_tokens: 1024,
            system: prompt.system,
            messages,
            stream: true,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/messages", url = self.url))
            .header("x-api-key", &self.token)
            .header("content-type", "application/json")
            .header("anthropic-version", "2023-06-01")
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request to Claude"
            );
            bail!("Failed to make completion request to Claude");
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        // A transport error mid-stream fails the completion rather than
        // passing a truncated transcript off as finished.
        while let Some(line) = lines_reader.next_line().await? {
            let mut cleaned_line = line.trim().to_string();
            if cleaned_line.starts_with("data:") {
                cleaned_line = cleaned_line.split_off(5).trim().to_string();
            }
            if cleaned_line.is_empty() || cleaned_line.contains("event:") {
                continue;
            }

            if cleaned_line.contains("content_block_stop") {
                break;
            }
            if !cleaned_line.contains("content_block_delta") {
                continue;
            }

            let ores: CompletionResponse = serde_json::from_str(&cleaned_line)?;
            tracing::debug!(body = ?ores, "Completion response");

            let text = ores.delta.text.to_string();
            if text.is_empty() {
                continue;
            }

            tx.send(BackendResponse { text, done: false })?;
        }

        tx.send(BackendResponse {
            text: "".to_string(),
            done: true,
        })?;

        return Ok(());
    }
}
