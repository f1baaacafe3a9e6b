#[cfg(test)]
#[path = "rating_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// One observation of a persona's attitude at a given iteration of news
/// exposure. Iterations are 1-based and unique per persona; a persona's
/// "current" record is the one with the maximum iteration.
///
/// Every field defaults when missing so a partially-malformed source record
/// coerces instead of rejecting the whole dataset. The loader logs a warning
/// when a record falls back entirely.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub persona_id: u32,
    #[serde(default)]
    pub persona_name: String,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default)]
    pub current_rating: f64,
    #[serde(default)]
    pub normalized_current_rating: f64,
    #[serde(default)]
    pub recommended_rating: Option<f64>,
    #[serde(default)]
    pub normalized_recommended_rating: Option<f64>,
    #[serde(default)]
    pub reaction: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub is_fact: bool,
    #[serde(default)]
    pub is_real: bool,
}

/// Pre-exposure survey snapshot of a persona's baseline vaccine attitude.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresurveyRecord {
    #[serde(default)]
    pub persona_name: String,
    #[serde(default)]
    pub normalized_vaccine_rating: f64,
}
