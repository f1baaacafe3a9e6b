#[cfg(test)]
#[path = "charts_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde_derive::Serialize;

use crate::domain::models::PresurveyRecord;
use crate::domain::models::RatingRecord;

/// The progression chart renders a fixed grid of iterations regardless of how
/// far any persona actually got.
pub const MAX_CHART_ITERATIONS: u32 = 7;

/// Normalized rating at or above which a persona is treated as willing to
/// take the vaccine.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.8;

/// Rating scaled to a display percentage, rounded to one decimal place.
pub fn percent(value: f64) -> f64 {
    return (value * 1000.0).round() / 10.0;
}

/// Records grouped by persona name, each group sorted by iteration.
fn by_persona(records: &[RatingRecord]) -> BTreeMap<String, Vec<&RatingRecord>> {
    let mut groups: BTreeMap<String, Vec<&RatingRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.persona_name.to_string())
            .or_default()
            .push(record);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|record| return record.iteration);
    }

    return groups;
}

/// For each persona present, the record with the maximum iteration. Ordered
/// by persona name; iterations are unique per persona so no tie-break is
/// needed.
pub fn latest_per_persona(records: &[RatingRecord]) -> Vec<RatingRecord> {
    return by_persona(records)
        .values()
        .filter_map(|group| return group.last().map(|record| return (*record).clone()))
        .collect();
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalRating {
    pub name: String,
    pub rating: f64,
    pub percent: f64,
    pub above_threshold: bool,
}

/// "Final rating" bar chart rows, sorted from highest to lowest rating.
pub fn final_ratings(records: &[RatingRecord]) -> Vec<FinalRating> {
    let mut rows = latest_per_persona(records)
        .iter()
        .map(|record| {
            let rating = record.normalized_current_rating;
            return FinalRating {
                name: record.persona_name.to_string(),
                rating,
                percent: percent(rating),
                above_threshold: rating >= ACCEPTANCE_THRESHOLD,
            };
        })
        .collect::<Vec<FinalRating>>();

    rows.sort_by(|a, b| {
        return b
            .rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal);
    });

    return rows;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressionRow {
    pub iteration: u32,
    pub ratings: BTreeMap<String, f64>,
}

/// Per-iteration rating table capped at [`MAX_CHART_ITERATIONS`]. Implemented
/// as a fold carrying each persona's last observed rating forward: a persona
/// appears starting at its first observation and keeps its last-known value
/// through later iterations with no new record. Never back-filled.
pub fn rating_progression(records: &[RatingRecord]) -> Vec<ProgressionRow> {
    let groups = by_persona(records);

    let mut carried: BTreeMap<String, f64> = BTreeMap::new();
    let mut rows: Vec<ProgressionRow> = vec![];
    for iteration in 1..=MAX_CHART_ITERATIONS {
        for (name, group) in &groups {
            if let Some(record) = group.iter().find(|record| return record.iteration == iteration) {
                carried.insert(name.to_string(), record.normalized_current_rating);
            }
        }

        rows.push(ProgressionRow {
            iteration,
            ratings: carried.clone(),
        });
    }

    return rows;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory {
    pub name: String,
    pub start_rating: f64,
    pub end_rating: f64,
    pub change: f64,
    pub absolute_change: f64,
    pub final_iteration: u32,
    pub change_per_iteration: f64,
    pub direction: Direction,
}

/// End-to-start attitude change per persona, sorted by magnitude descending.
pub fn trajectories(records: &[RatingRecord]) -> Vec<Trajectory> {
    let mut rows = by_persona(records)
        .iter()
        .filter_map(|(name, group)| {
            let first = group.first()?;
            let last = group.last()?;

            let change = last.normalized_current_rating - first.normalized_current_rating;
            let final_iteration = last.iteration;
            let change_per_iteration = if final_iteration == 0 {
                0.0
            } else {
                change / f64::from(final_iteration)
            };

            let direction = if change >= 0.0 {
                Direction::Positive
            } else {
                Direction::Negative
            };

            return Some(Trajectory {
                name: name.to_string(),
                start_rating: first.normalized_current_rating,
                end_rating: last.normalized_current_rating,
                change,
                absolute_change: change.abs(),
                final_iteration,
                change_per_iteration,
                direction,
            });
        })
        .collect::<Vec<Trajectory>>();

    rows.sort_by(|a, b| {
        return b
            .absolute_change
            .partial_cmp(&a.absolute_change)
            .unwrap_or(std::cmp::Ordering::Equal);
    });

    return rows;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StanceBucket {
    pub count: usize,
    pub personas: Vec<String>,
}

/// Disjoint, exhaustive partition of the presurvey snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StanceBreakdown {
    pub unsupportive: StanceBucket,
    pub neutral: StanceBucket,
    pub supportive: StanceBucket,
}

/// Buckets the presurvey snapshot into unsupportive (< 0.5), neutral (== 0.5)
/// and supportive (> 0.5) stances.
pub fn stance_buckets(presurvey: &[PresurveyRecord]) -> StanceBreakdown {
    let mut breakdown = StanceBreakdown::default();
    for record in presurvey {
        let bucket = if record.normalized_vaccine_rating < 0.5 {
            &mut breakdown.unsupportive
        } else if record.normalized_vaccine_rating > 0.5 {
            &mut breakdown.supportive
        } else {
            &mut breakdown.neutral
        };

        bucket.count += 1;
        bucket.personas.push(record.persona_name.to_string());
    }

    return breakdown;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationAverage {
    pub iteration: u32,
    pub avg_rating: f64,
    pub count: usize,
    pub cumulative_change: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewsImpact {
    pub total_exposure_count: usize,
    pub average_change_per_iteration: f64,
    pub ratings_by_iteration: Vec<IterationAverage>,
}

/// Cross-persona summary: total exposures, average end-to-start change over
/// personas with at least two observations, and per-iteration average rating
/// with a running cumulative-change series. Empty input yields zeros rather
/// than NaN.
pub fn news_impact(records: &[RatingRecord]) -> NewsImpact {
    let groups = by_persona(records);

    let mut total_change = 0.0;
    let mut persona_count = 0u32;
    for group in groups.values() {
        if group.len() < 2 {
            continue;
        }
        if let (Some(first), Some(last)) = (group.first(), group.last()) {
            total_change += last.normalized_current_rating - first.normalized_current_rating;
            persona_count += 1;
        }
    }

    let average_change_per_iteration = if persona_count == 0 {
        0.0
    } else {
        total_change / f64::from(persona_count)
    };

    let max_iteration = records
        .iter()
        .map(|record| return record.iteration)
        .max()
        .unwrap_or(0);

    let mut ratings_by_iteration: Vec<IterationAverage> = vec![];
    for iteration in 1..=max_iteration {
        let ratings = records
            .iter()
            .filter(|record| return record.iteration == iteration)
            .map(|record| return record.normalized_current_rating)
            .collect::<Vec<f64>>();

        let count = ratings.len();
        let avg_rating = if count == 0 {
            0.0
        } else {
            ratings.iter().sum::<f64>() / count as f64
        };

        let cumulative_change = match ratings_by_iteration.last() {
            None => avg_rating,
            Some(prev) => {
                if count == 0 {
                    prev.cumulative_change
                } else {
                    prev.cumulative_change + (avg_rating - prev.avg_rating)
                }
            }
        };

        ratings_by_iteration.push(IterationAverage {
            iteration,
            avg_rating,
            count,
            cumulative_change,
        });
    }

    return NewsImpact {
        total_exposure_count: records.len(),
        average_change_per_iteration,
        ratings_by_iteration,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonaDelta {
    pub name: String,
    pub improvement_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insights {
    pub most_improved: Option<PersonaDelta>,
    pub most_resistant: Option<PersonaDelta>,
    pub conversion_rate_percent: f64,
}

/// Headline numbers for the dashboard: biggest positive mover, smallest
/// mover, and the share of personas finishing at or above the acceptance
/// threshold.
pub fn insights(records: &[RatingRecord]) -> Insights {
    let groups = by_persona(records);

    let mut improvements: Vec<(String, f64)> = vec![];
    for (name, group) in &groups {
        if let (Some(first), Some(last)) = (group.first(), group.last()) {
            improvements.push((
                name.to_string(),
                last.normalized_current_rating - first.normalized_current_rating,
            ));
        }
    }

    let most_improved = improvements
        .iter()
        .filter(|(_, improvement)| return *improvement > 0.0)
        .max_by(|a, b| return a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, improvement)| {
            return PersonaDelta {
                name: name.to_string(),
                improvement_percent: percent(*improvement),
            };
        });

    let most_resistant = improvements
        .iter()
        .min_by(|a, b| return a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, improvement)| {
            return PersonaDelta {
                name: name.to_string(),
                improvement_percent: percent(*improvement),
            };
        });

    let conversion_rate_percent = if groups.is_empty() {
        0.0
    } else {
        let converted = latest_per_persona(records)
            .iter()
            .filter(|record| return record.normalized_current_rating >= ACCEPTANCE_THRESHOLD)
            .count();
        (converted as f64 / groups.len() as f64 * 100.0).round()
    };

    return Insights {
        most_improved,
        most_resistant,
        conversion_rate_percent,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingTableRow {
    pub persona: String,
    pub iteration: u32,
    pub rating: f64,
    pub formatted_rating: String,
    pub change: Option<f64>,
    pub change_text: String,
}

/// Per-record table rows with the change versus the persona's previous
/// iteration, ordered by persona name then iteration.
pub fn rating_table(records: &[RatingRecord]) -> Vec<RatingTableRow> {
    let mut rows: Vec<RatingTableRow> = vec![];
    for (name, group) in by_persona(records) {
        let mut previous: Option<f64> = None;
        for record in group {
            let rating = record.normalized_current_rating;
            let change = previous.map(|prev| return rating - prev);
            let change_text = match change {
                None => "Initial".to_string(),
                Some(delta) if delta > 0.0 => format!("+{:.1}%", percent(delta)),
                Some(delta) if delta < 0.0 => format!("-{:.1}%", percent(delta.abs())),
                Some(_) => "No change".to_string(),
            };

            rows.push(RatingTableRow {
                persona: name.to_string(),
                iteration: record.iteration,
                rating,
                formatted_rating: format!("{:.1}%", percent(rating)),
                change,
                change_text,
            });
            previous = Some(rating);
        }
    }

    return rows;
}
