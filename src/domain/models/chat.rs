use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::sync::watch;

use super::Message;
use super::RateLimitDecision;

/// Body of a chat submission: the full client-side conversation history,
/// whose last entry must be the user's new message.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

/// Terminal and in-flight states of one response pane. A failure is isolated
/// to its own pane: the sibling keeps streaming and the partial transcript is
/// retained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaneStatus {
    Generating,
    Complete,
    Failed(String),
}

/// Live handles onto one streamed response. The transcript channel carries
/// the full accumulated text on every emission, so consumers replace their
/// copy rather than appending.
#[derive(Debug)]
pub struct PaneStream {
    pub transcript: watch::Receiver<String>,
    pub status: watch::Receiver<PaneStatus>,
}

/// The two concurrently-generated responses to one user turn: the persona at
/// baseline, and the same persona after sustained exposure to fabricated
/// negative coverage.
#[derive(Debug)]
pub struct DualStreams {
    pub baseline: PaneStream,
    pub exposed: PaneStream,
    pub remaining: u32,
    pub reset: u64,
}

#[derive(Debug)]
pub enum DualResponseOutcome {
    RateLimited(RateLimitDecision),
    Streams(DualStreams),
}

/// Wire shape of a rejected chat submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RateLimitErrorBody {
    pub error: bool,
    pub message: String,
    pub limit: u32,
    pub remaining: u32,
    pub reset: u64,
}

impl RateLimitErrorBody {
    pub fn from_decision(decision: &RateLimitDecision) -> RateLimitErrorBody {
        return RateLimitErrorBody {
            error: true,
            message: "Rate limit exceeded. Please try again later.".to_string(),
            limit: decision.limit,
            remaining: decision.remaining,
            reset: decision.reset,
        };
    }
}
