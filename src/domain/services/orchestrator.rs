#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::prompts;
use super::rate_limiter::RateLimiter;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::DualResponseOutcome;
use crate::domain::models::DualStreams;
use crate::domain::models::Message;
use crate::domain::models::PaneStatus;
use crate::domain::models::PaneStream;
use crate::domain::models::Persona;
use crate::domain::models::Role;

/// Issues two concurrent role-play completions per user turn, the persona at
/// baseline and the persona after misinformation exposure, and exposes each
/// as an independently-progressing pane stream.
pub struct ChatOrchestrator {
    backend: Arc<BackendBox>,
    limiter: RateLimiter,
}

/// Drives one backend completion into a pane: deltas are accumulated and the
/// full transcript so far is published on every emission, then the status
/// flips to a terminal state once the stream is drained.
fn spawn_pane(backend: Arc<BackendBox>, prompt: BackendPrompt) -> PaneStream {
    let (transcript_tx, transcript_rx) = watch::channel(String::new());
    let (status_tx, status_rx) = watch::channel(PaneStatus::Generating);
    let (tx, mut rx) = mpsc::unbounded_channel::<BackendResponse>();

    let completion = tokio::spawn(async move {
        return backend.get_completion(prompt, &tx).await;
    });

    tokio::spawn(async move {
        let mut transcript = String::new();
        while let Some(res) = rx.recv().await {
            if res.done {
                break;
            }

            transcript += &res.text;
            // Cumulative payload: receivers replace their copy, never append.
            if transcript_tx.send(transcript.to_string()).is_err() {
                break;
            }
        }

        // A failure terminates only this pane; the sibling keeps streaming
        // and whatever text arrived before the failure stays visible.
        let status = match completion.await {
            Ok(Ok(())) => PaneStatus::Complete,
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "backend completion failed");
                PaneStatus::Failed(err.to_string())
            }
            Err(err) => {
                tracing::error!(error = ?err, "backend completion task panicked");
                PaneStatus::Failed(err.to_string())
            }
        };
        let _ = status_tx.send(status);
    });

    return PaneStream {
        transcript: transcript_rx,
        status: status_rx,
    };
}

impl ChatOrchestrator {
    pub fn new(backend: Arc<BackendBox>, limiter: RateLimiter) -> ChatOrchestrator {
        return ChatOrchestrator { backend, limiter };
    }

    /// Submits one user turn. The rate limit is checked before anything else;
    /// a rejected caller never reaches the model backend. On admission, both
    /// completions run concurrently and independently: total latency is
    /// bounded by the slower of the two, and a stalled or failed pane never
    /// blocks the other's delivery.
    pub fn dual_response(
        &self,
        client_key: &str,
        messages: &[Message],
        persona: &Persona,
    ) -> Result<DualResponseOutcome> {
        let Some(last) = messages.last() else {
            bail!("conversation history is empty");
        };
        if last.role != Role::User {
            bail!("the last entry of the conversation history must be the user's message");
        }

        let decision = self.limiter.check(client_key);
        if !decision.admitted {
            return Ok(DualResponseOutcome::RateLimited(decision));
        }

        let baseline = spawn_pane(
            self.backend.clone(),
            BackendPrompt::new(prompts::baseline(persona), messages.to_vec()),
        );
        let exposed = spawn_pane(
            self.backend.clone(),
            BackendPrompt::new(prompts::exposed(persona), messages.to_vec()),
        );

        tracing::debug!(
            persona = persona.name,
            history_len = messages.len(),
            remaining = decision.remaining,
            "dual response dispatched"
        );

        return Ok(DualResponseOutcome::Streams(DualStreams {
            baseline,
            exposed,
            remaining: decision.remaining,
            reset: decision.reset,
        }));
    }
}
