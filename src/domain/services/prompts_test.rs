use anyhow::Result;

use super::baseline;
use super::exposed;
use crate::domain::models::Persona;

fn persona() -> Result<Persona> {
    let persona: Persona = serde_json::from_str(test_utils::persona_fixture())?;
    return Ok(persona);
}

#[test]
fn it_interpolates_the_persona_profile_into_both_variants() -> Result<()> {
    let persona = persona()?;
    let profile = persona.prompt_profile();

    for prompt in [baseline(&persona), exposed(&persona)] {
        assert!(prompt.contains(&persona.name));
        assert!(prompt.contains(&profile));
    }
    return Ok(());
}

#[test]
fn it_enforces_persona_consistency_in_both_variants() -> Result<()> {
    let persona = persona()?;

    for prompt in [baseline(&persona), exposed(&persona)] {
        assert!(prompt.contains("Never mention that you are an AI"));
        assert!(prompt.contains("first person"));
    }
    return Ok(());
}

#[test]
fn it_diverges_on_stance() -> Result<()> {
    let persona = persona()?;
    let baseline_prompt = baseline(&persona);
    let exposed_prompt = exposed(&persona);

    assert!(baseline_prompt.contains("cautiously neutral"));
    assert!(!baseline_prompt.contains("fabricated negative coverage"));

    assert!(exposed_prompt.contains("fabricated negative coverage"));
    assert!(exposed_prompt.contains("firmly negative"));
    return Ok(());
}
