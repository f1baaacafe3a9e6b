use serde_derive::Serialize;

/// Outcome of a single admission check against the per-key request window.
/// `reset` is the unix timestamp at which the current window reopens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset: u64,
}
