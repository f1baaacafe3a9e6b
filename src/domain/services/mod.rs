pub mod charts;
pub mod datasets;
pub mod orchestrator;
pub mod prompts;
pub mod rate_limiter;
