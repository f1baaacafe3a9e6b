#[cfg(test)]
#[path = "datasets_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::models::Persona;
use crate::domain::models::PresurveyRecord;
use crate::domain::models::RatingRecord;

#[derive(RustEmbed)]
#[folder = "data/"]
struct EmbeddedData;

/// Which news diet a set of rating records came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewsCondition {
    Mixed,
    Fake,
    Real,
    All,
}

impl NewsCondition {
    pub fn parse(text: &str) -> Result<NewsCondition> {
        match text {
            "mixed" => return Ok(NewsCondition::Mixed),
            "fake" => return Ok(NewsCondition::Fake),
            "real" => return Ok(NewsCondition::Real),
            "all" => return Ok(NewsCondition::All),
            _ => bail!(format!("{text} is not a valid news condition")),
        }
    }
}

/// All simulation output, loaded once at startup from embedded JSON. The
/// collections are append-only exports and never mutate at runtime, so the
/// store is plain shared data with no locking.
pub struct DatasetStore {
    mixed: Vec<RatingRecord>,
    fake: Vec<RatingRecord>,
    real: Vec<RatingRecord>,
    merged: Vec<RatingRecord>,
    presurvey: Vec<PresurveyRecord>,
    personas: Vec<Persona>,
}

fn read_embedded(name: &str) -> Result<String> {
    let file =
        EmbeddedData::get(name).ok_or_else(|| return anyhow!("missing embedded dataset {name}"))?;
    return Ok(String::from_utf8(file.data.to_vec())?);
}

fn parse_collection<T: DeserializeOwned>(name: &str) -> Result<Vec<T>> {
    return parse_records(name, &read_embedded(name)?);
}

/// Parses a JSON array record by record. A record that fails to deserialize
/// is skipped with a warning rather than failing the whole collection, since
/// a single malformed export line should not take the service down.
fn parse_records<T: DeserializeOwned>(name: &str, raw: &str) -> Result<Vec<T>> {
    let raw: Vec<Value> = serde_json::from_str(raw)?;

    let mut records = Vec::with_capacity(raw.len());
    for (idx, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(dataset = name, index = idx, error = %err, "skipping malformed record");
            }
        }
    }

    return Ok(records);
}

impl DatasetStore {
    pub fn load() -> Result<DatasetStore> {
        let mixed: Vec<RatingRecord> = parse_collection("mixed-news.json")?;
        let fake: Vec<RatingRecord> = parse_collection("fake-news.json")?;
        let real: Vec<RatingRecord> = parse_collection("real-news.json")?;

        let mut merged = Vec::with_capacity(mixed.len() + fake.len() + real.len());
        merged.extend(mixed.iter().cloned());
        merged.extend(fake.iter().cloned());
        merged.extend(real.iter().cloned());

        let store = DatasetStore {
            mixed,
            fake,
            real,
            merged,
            presurvey: parse_collection("pre-survey.json")?,
            personas: parse_collection("personas.json")?,
        };

        tracing::info!(
            personas = store.personas.len(),
            mixed = store.mixed.len(),
            fake = store.fake.len(),
            real = store.real.len(),
            presurvey = store.presurvey.len(),
            "datasets loaded"
        );

        return Ok(store);
    }

    pub fn records(&self, condition: NewsCondition) -> &[RatingRecord] {
        match condition {
            NewsCondition::Mixed => return &self.mixed,
            NewsCondition::Fake => return &self.fake,
            NewsCondition::Real => return &self.real,
            NewsCondition::All => return &self.merged,
        }
    }

    pub fn presurvey(&self) -> &[PresurveyRecord] {
        return &self.presurvey;
    }

    pub fn personas(&self) -> &[Persona] {
        return &self.personas;
    }

    pub fn persona(&self, persona_id: u32) -> Option<&Persona> {
        return self
            .personas
            .iter()
            .find(|persona| return persona.persona_id == persona_id);
    }

    pub fn persona_records(&self, persona_id: u32, condition: NewsCondition) -> Vec<RatingRecord> {
        return self
            .records(condition)
            .iter()
            .filter(|record| return record.persona_id == persona_id)
            .cloned()
            .collect();
    }
}
