use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use strum::EnumVariantNames;
use tokio::sync::mpsc;

use super::Message;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Claude,
    Gemini,
}

impl BackendName {
    pub fn parse(text: String) -> Result<BackendName> {
        match text.as_str() {
            "claude" => return Ok(BackendName::Claude),
            "gemini" => return Ok(BackendName::Gemini),
            _ => bail!(format!("{text} is not a valid backend")),
        }
    }
}

/// A role-play completion request: a persona-conditioned system prompt plus
/// the full role-tagged conversation history, last entry being the user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPrompt {
    pub system: String,
    pub messages: Vec<Message>,
}

impl BackendPrompt {
    pub fn new(system: String, messages: Vec<Message>) -> BackendPrompt {
        return BackendPrompt { system, messages };
    }
}

/// One streamed chunk from a backend. `text` is a delta, not the accumulated
/// transcript; accumulation happens downstream in the orchestrator.
pub struct BackendResponse {
    pub text: String,
    pub done: bool,
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify all configuration is available to work with
    /// the backend. Missing credentials fail here, not mid-request.
    async fn health_check(&self) -> Result<()>;

    /// Lists all models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Requests a streamed completion from the backend. Each delta is passed
    /// through the channel, followed by a final message with `done` set.
    /// Extended "thinking" computation is not requested, for latency.
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<BackendResponse>,
    ) -> Result<()>;
}
