pub fn persona_fixture() -> &'static str {
    return r#"
{
  "persona_id": 107,
  "name": "David",
  "description": "Steel plant supervisor who weighs every decision against his family's security.",
  "demographics": {
    "age": 45,
    "gender": "Male",
    "location": "Pittsburgh, Pennsylvania",
    "occupation": "Steel plant supervisor",
    "education": "High school diploma"
  },
  "personality": {
    "archetype": "Guarded Provider",
    "notes": "Reserved and deliberate, answers briefly, wary of being talked into anything."
  },
  "beliefs_and_attitudes": {
    "initial_stance": "lean-negative",
    "stance_description": "Suspects the downsides are underreported and prefers to wait and see.",
    "key_motivator": "Staying healthy enough to keep providing for his family",
    "concerns": [
      "Missing shifts to side effects",
      "Conflicting stories in the news"
    ]
  },
  "vaccinated": false
}
"#
    .trim();
}

pub fn rating_records_fixture() -> &'static str {
    return r#"
[
  {
    "id": "rec-001",
    "session_id": "mixed-01",
    "persona_id": 101,
    "persona_name": "Sarah",
    "iteration": 1,
    "current_rating": 5.5,
    "normalized_current_rating": 0.55,
    "recommended_rating": 6.0,
    "normalized_recommended_rating": 0.6,
    "reaction": "cautiously encouraged",
    "reason": "The article addressed her worry about trial speed.",
    "article": "Regulators publish full trial dataset for independent review",
    "is_fact": true,
    "is_real": true
  },
  {
    "id": "rec-002",
    "session_id": "mixed-01",
    "persona_id": 101,
    "persona_name": "Sarah",
    "iteration": 2,
    "current_rating": 4.8,
    "normalized_current_rating": 0.48,
    "recommended_rating": 5.0,
    "normalized_recommended_rating": 0.5,
    "reaction": "unsettled",
    "reason": "The claimed side effects sounded close to home.",
    "article": "Local clinic overwhelmed by undisclosed side effects, staff claim",
    "is_fact": false,
    "is_real": false
  },
  {
    "id": "rec-003",
    "session_id": "mixed-01",
    "persona_id": 101,
    "persona_name": "Sarah",
    "iteration": 3,
    "current_rating": 7.2,
    "normalized_current_rating": 0.72,
    "recommended_rating": 7.5,
    "normalized_recommended_rating": 0.75,
    "reaction": "reassured",
    "reason": "Follow-up data matched what her doctor told her.",
    "article": "Side effects remain mild and short-lived, year-long monitoring shows",
    "is_fact": true,
    "is_real": true
  },
  {
    "id": "rec-004",
    "session_id": "mixed-01",
    "persona_id": 102,
    "persona_name": "Raymond",
    "iteration": 1,
    "current_rating": 2.5,
    "normalized_current_rating": 0.25,
    "recommended_rating": 2.5,
    "normalized_recommended_rating": 0.25,
    "reaction": "dismissive",
    "reason": "He figures the numbers are massaged either way.",
    "article": "Hospital admissions fall sharply in highly vaccinated counties",
    "is_fact": true,
    "is_real": true
  },
  {
    "id": "rec-005",
    "session_id": "mixed-01",
    "persona_id": 102,
    "persona_name": "Raymond",
    "iteration": 2,
    "current_rating": 1.2,
    "normalized_current_rating": 0.12,
    "recommended_rating": 1.0,
    "normalized_recommended_rating": 0.1,
    "reaction": "suspicious",
    "reason": "The leaked memo story confirmed what he already suspected.",
    "article": "Leaked memo shows regulators hid vaccine injury data",
    "is_fact": false,
    "is_real": false
  },
  {
    "id": "rec-006",
    "session_id": "mixed-01",
    "persona_id": 107,
    "persona_name": "David",
    "iteration": 1,
    "current_rating": 4.0,
    "normalized_current_rating": 0.4,
    "recommended_rating": 4.0,
    "normalized_recommended_rating": 0.4,
    "reaction": "guarded",
    "reason": "He wants to see how coworkers fare first.",
    "article": "Large follow-up study finds no elevated long-term risk after vaccination",
    "is_fact": true,
    "is_real": true
  },
  {
    "id": "rec-007",
    "session_id": "mixed-01",
    "persona_id": 107,
    "persona_name": "David",
    "iteration": 4,
    "current_rating": 8.5,
    "normalized_current_rating": 0.85,
    "recommended_rating": 8.5,
    "normalized_recommended_rating": 0.85,
    "reaction": "convinced",
    "reason": "Enough people at the plant got it without trouble.",
    "article": "Side effects remain mild and short-lived, year-long monitoring shows",
    "is_fact": true,
    "is_real": true
  }
]
"#
    .trim();
}
