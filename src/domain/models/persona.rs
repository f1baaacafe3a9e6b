#[cfg(test)]
#[path = "persona_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    pub gender: String,
    pub location: String,
    pub occupation: String,
    pub education: String,
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub archetype: String,
    pub notes: String,
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefsAndAttitudes {
    pub initial_stance: String,
    pub stance_description: String,
    pub key_motivator: String,
    pub concerns: Vec<String>,
}

/// A fixed synthetic individual used to condition the model's role-play
/// responses. Loaded once from the embedded roster and never mutated.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub persona_id: u32,
    pub name: String,
    pub description: String,
    pub demographics: Demographics,
    pub personality: Personality,
    pub beliefs_and_attitudes: BeliefsAndAttitudes,
    pub vaccinated: bool,
}

/// Roster card shape for list views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonaSummary {
    pub persona_id: u32,
    pub name: String,
    pub age: u32,
    pub location: String,
    pub archetype: String,
    pub description: String,
}

impl Persona {
    pub fn summary(&self) -> PersonaSummary {
        return PersonaSummary {
            persona_id: self.persona_id,
            name: self.name.to_string(),
            age: self.demographics.age,
            location: self.demographics.location.to_string(),
            archetype: self.personality.archetype.to_string(),
            description: self.description.to_string(),
        };
    }

    /// Flat attribute sheet interpolated into role-play system prompts.
    pub fn prompt_profile(&self) -> String {
        let concerns = self.beliefs_and_attitudes.concerns.join("; ");

        return format!(
            "Name: {name}\nAge: {age}\nGender: {gender}\nLocation: {location}\nOccupation: {occupation}\nEducation: {education}\nPersonality: {archetype}. {notes}\nInitial stance on vaccines: {stance}. {stance_description}\nKey motivator: {motivator}\nConcerns: {concerns}",
            name = self.name,
            age = self.demographics.age,
            gender = self.demographics.gender,
            location = self.demographics.location,
            occupation = self.demographics.occupation,
            education = self.demographics.education,
            archetype = self.personality.archetype,
            notes = self.personality.notes,
            stance = self.beliefs_and_attitudes.initial_stance,
            stance_description = self.beliefs_and_attitudes.stance_description,
            motivator = self.beliefs_and_attitudes.key_motivator,
            concerns = concerns,
        );
    }
}
