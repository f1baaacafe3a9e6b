use anyhow::Result;

use super::parse_records;
use super::DatasetStore;
use super::NewsCondition;
use crate::domain::models::RatingRecord;

#[test]
fn it_parses_news_conditions() -> Result<()> {
    assert_eq!(NewsCondition::parse("mixed")?, NewsCondition::Mixed);
    assert_eq!(NewsCondition::parse("fake")?, NewsCondition::Fake);
    assert_eq!(NewsCondition::parse("real")?, NewsCondition::Real);
    assert_eq!(NewsCondition::parse("all")?, NewsCondition::All);
    assert!(NewsCondition::parse("tabloid").is_err());
    return Ok(());
}

#[test]
fn it_loads_every_embedded_collection() -> Result<()> {
    let store = DatasetStore::load()?;

    assert_eq!(store.personas().len(), 6);
    assert_eq!(store.presurvey().len(), 6);
    assert!(!store.records(NewsCondition::Mixed).is_empty());
    assert!(!store.records(NewsCondition::Fake).is_empty());
    assert!(!store.records(NewsCondition::Real).is_empty());
    return Ok(());
}

#[test]
fn it_merges_all_conditions() -> Result<()> {
    let store = DatasetStore::load()?;

    let merged = store.records(NewsCondition::All).len();
    let parts = store.records(NewsCondition::Mixed).len()
        + store.records(NewsCondition::Fake).len()
        + store.records(NewsCondition::Real).len();
    assert_eq!(merged, parts);
    return Ok(());
}

#[test]
fn it_looks_up_personas_by_id() -> Result<()> {
    let store = DatasetStore::load()?;

    let david = store.persona(107).unwrap();
    assert_eq!(david.name, "David");
    assert!(store.persona(9999).is_none());
    return Ok(());
}

#[test]
fn it_filters_records_by_persona_and_condition() -> Result<()> {
    let store = DatasetStore::load()?;

    let fake = store.persona_records(107, NewsCondition::Fake);
    assert!(!fake.is_empty());
    assert!(fake
        .iter()
        .all(|record| return record.persona_id == 107 && !record.is_real));

    let all = store.persona_records(107, NewsCondition::All);
    assert!(all.len() > fake.len());
    return Ok(());
}

#[test]
fn it_skips_malformed_records_instead_of_failing() -> Result<()> {
    let raw = r#"[
        {"persona_id": 1, "persona_name": "Sarah", "iteration": 1, "normalized_current_rating": 0.5},
        "not an object",
        {"persona_id": "not a number"},
        {"persona_id": 1, "persona_name": "Sarah", "iteration": 2, "normalized_current_rating": 0.7}
    ]"#;

    let records: Vec<RatingRecord> = parse_records("inline", raw)?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].iteration, 2);
    return Ok(());
}

#[test]
fn it_rejects_a_collection_that_is_not_an_array() {
    let res: Result<Vec<RatingRecord>> = parse_records("inline", r#"{"records": []}"#);
    assert!(res.is_err());
}
