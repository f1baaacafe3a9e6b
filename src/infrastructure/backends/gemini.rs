#[cfg(test)]
#[path = "gemini_test.rs"]
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
    name: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    models: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

pub struct Gemini {
    url: String,
    token: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            url: "https://generativelanguage.googleapis.com".to_string(),
            token: Config::get(ConfigKey::GeminiToken),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

fn to_wire_role(role: &Role) -> String {
    match role {
        Role::User => return "user".to_string(),
        Role::Assistant => return "model".to_string(),
    }
}

/// Pulls the string out of a `"text": "..."` line of a streamed chunk. The
/// chunks arrive as pretty-printed JSON objects in an array, one field per
/// line, so only the text lines matter here.
fn parse_text_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if !trimmed.starts_with("\"text\":") {
        return None;
    }

    let value = trimmed["\"text\":".len()..].trim().trim_end_matches(',');
    return serde_json::from_str::<String>(value).ok();
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini token is not defined");
        }

        let res = reqwest::Client::new()
            .get(format!("{url}/v1beta/models", url = self.url))
            .header("x-goog-api-key", &self.token)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Gemini is not reachable");
            bail!("Gemini is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = reqwest::Client::new()
            .get(format!("{url}/v1beta/models", url = self.url))
            .header("x-goog-api-key", &self.token)
            .send()
            .await?
            .json::<ModelListResponse>()
            .await?;

        let models = res
            .models
            .into_iter()
            .map(|model| return model.name)
            .collect();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<BackendResponse>,
    ) -> Result<()> {
        let contents = prompt
            .messages
            .iter()
            .map(|message| {
                return Content {
                    role: to_wire_role(&message.role),
                    parts: vec![Part {
                        text: message.content.to_string(),
                    }],
                };
            })
            .collect::<Vec<Content>>();

        let req = CompletionRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: prompt.system,
                }],
            },
            contents,
            // Thinking disabled to keep the first token fast.
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/{model}:streamGenerateContent",
                url = self.url,
                model = Config::get(ConfigKey::Model)
            ))
            .header("x-goog-api-key", &self.token)
            .header("content-type", "application/json")
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to make completion request to Gemini"
            );
            bail!("Failed to make completion request to Gemini");
        }

        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();

        // A transport error mid-stream fails the completion rather than
        // passing a truncated transcript off as finished.
        while let Some(line) = lines_reader.next_line().await? {
            let Some(text) = parse_text_line(&line) else {
                continue;
            };
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
