//! Recommendation Generator — turns skill gaps and score thresholds into guidance.
//!
//! Every recommendation carries an explicit `Priority`. The message also contains the
//! marker phrase the front-end uses to bucket it, and never another bucket's marker:
//!
//! | priority | markers                         |
//! |----------|---------------------------------|
//! | High     | "Consider adding", "Focus on"   |
//! | Medium   | "Include", "Highlight"          |
//! | Low      | "Good", "Excellent"             |

use serde::ser::{Serialize, Serializer};

use crate::analysis::classifier::ClassifiedSkills;
use crate::analysis::scorer::Scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

/// On the wire a recommendation is just its message.
impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationPolicy {
    /// Missing skills named per "Consider adding" message.
    pub max_named_skills: usize,
    pub max_recommendations: usize,
    /// Composite at or above this earns the "Excellent match" affirmation.
    pub strong_match_threshold: u32,
    /// Composite below this triggers the tailoring warning.
    pub weak_match_threshold: u32,
    /// Composite below this (but not weak) triggers the "Highlight" nudge.
    pub moderate_match_threshold: u32,
    /// Skill match below this triggers the skill-development warning.
    pub low_skill_threshold: u32,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            max_named_skills: 3,
            max_recommendations: 8,
            strong_match_threshold: 70,
            weak_match_threshold: 30,
            moderate_match_threshold: 50,
            low_skill_threshold: 40,
        }
    }
}

pub fn generate(
    skills: &ClassifiedSkills,
    scores: &Scores,
    policy: &RecommendationPolicy,
) -> Vec<Recommendation> {
    let mut high = Vec::new();
    let mut medium = Vec::new();
    let mut low = Vec::new();

    for (category, required) in skills.job_skills.iter() {
        let label = category.label();
        let matched = skills.matching_skills.get(category).unwrap_or(&[]);
        let missing = skills.missing_skills.get(category).unwrap_or(&[]);

        if !missing.is_empty() {
            high.push(format!(
                "Consider adding {label}: {}",
                name_some(missing, policy.max_named_skills)
            ));
        }
        if !matched.is_empty() && !missing.is_empty() {
            medium.push(format!(
                "Highlight your {label} experience with {} more prominently",
                name_some(matched, policy.max_named_skills)
            ));
        }
        if missing.is_empty() {
            low.push(format!(
                "Good coverage of {label}: all {} required skills found",
                required.len()
            ));
        }
    }

    let requirements_present = !skills.job_skills.is_empty();
    if scores.composite < policy.weak_match_threshold {
        high.push(format!(
            "Focus on tailoring your resume to this role; overall alignment is {}%.",
            scores.composite
        ));
    } else if scores.composite < policy.moderate_match_threshold {
        medium.push(format!(
            "Highlight relevant experience and skills more prominently; overall alignment is {}%.",
            scores.composite
        ));
    }
    if requirements_present && scores.skill_match < policy.low_skill_threshold {
        high.push(
            "Focus on developing the key technical skills named in the job description."
                .to_string(),
        );
    }
    if scores.composite >= policy.strong_match_threshold {
        low.push(format!(
            "Excellent match! Your resume aligns well with this role ({}%).",
            scores.composite
        ));
    }

    let buckets = [
        (Priority::High, high),
        (Priority::Medium, medium),
        (Priority::Low, low),
    ];
    buckets
        .into_iter()
        .flat_map(|(priority, messages)| {
            messages
                .into_iter()
                .map(move |message| Recommendation { priority, message })
        })
        .take(policy.max_recommendations.max(1))
        .collect()
}

/// "a, b, c" or "a, b, c (and 2 more)".
fn name_some(skills: &[String], limit: usize) -> String {
    let limit = limit.max(1);
    let shown = skills
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if skills.len() > limit {
        format!("{shown} (and {} more)", skills.len() - limit)
    } else {
        shown
    }
}
