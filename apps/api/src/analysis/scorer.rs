//! Scorer — content similarity, skill-match rate and the weighted composite.
//!
//! similarity  = TF-IDF cosine over the two token sequences (smoothed IDF, n = 2)
//! skill_match = round(100 × matched / required), 0 when nothing is required
//! composite   = round(w_sim × similarity + w_skill × skill_match), w_sim + w_skill = 1

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::ClassifiedSkills;
use crate::analysis::extractor::Document;
use crate::analysis::AnalyzeError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub skill_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.4,
            skill_match: 0.6,
        }
    }
}

impl ScoringWeights {
    /// Skill match receives the remainder, so the weights always sum to 1.
    pub fn from_similarity_weight(similarity: f64) -> Self {
        let similarity = similarity.clamp(0.0, 1.0);
        Self {
            similarity,
            skill_match: 1.0 - similarity,
        }
    }
}

/// The three integer percentages, each within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub similarity: u32,
    pub skill_match: u32,
    pub composite: u32,
}

pub fn score(
    resume: &Document,
    job: &Document,
    skills: &ClassifiedSkills,
    weights: &ScoringWeights,
) -> Result<Scores, AnalyzeError> {
    let similarity = to_percent(content_similarity(&resume.tokens, &job.tokens))?;
    let skill_match = skill_match_score(skills);
    let composite = composite_score(similarity, skill_match, weights)?;

    Ok(Scores {
        similarity,
        skill_match,
        composite,
    })
}

/// Cosine similarity between TF-IDF vectors of the two documents, in [0, 1].
pub fn content_similarity(resume_tokens: &[String], job_tokens: &[String]) -> f64 {
    if resume_tokens.is_empty() || job_tokens.is_empty() {
        return 0.0;
    }

    let resume_tf = term_frequencies(resume_tokens);
    let job_tf = term_frequencies(job_tokens);
    let vocabulary: BTreeSet<&str> = resume_tf.keys().chain(job_tf.keys()).copied().collect();

    let mut dot = 0.0;
    let mut resume_norm = 0.0;
    let mut job_norm = 0.0;
    for term in vocabulary {
        let in_resume = resume_tf.get(term).copied().unwrap_or(0.0);
        let in_job = job_tf.get(term).copied().unwrap_or(0.0);
        let document_frequency = (in_resume > 0.0) as u8 + (in_job > 0.0) as u8;
        let idf = smoothed_idf(document_frequency);

        let r = in_resume * idf;
        let j = in_job * idf;
        dot += r * j;
        resume_norm += r * r;
        job_norm += j * j;
    }

    if resume_norm == 0.0 || job_norm == 0.0 {
        return 0.0;
    }
    (dot / (resume_norm.sqrt() * job_norm.sqrt())).clamp(0.0, 1.0)
}

fn term_frequencies(tokens: &[String]) -> BTreeMap<&str, f64> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// idf = ln((1 + n) / (1 + df)) + 1 over the two-document corpus.
fn smoothed_idf(document_frequency: u8) -> f64 {
    const CORPUS_SIZE: f64 = 2.0;
    ((1.0 + CORPUS_SIZE) / (1.0 + document_frequency as f64)).ln() + 1.0
}

pub fn skill_match_score(skills: &ClassifiedSkills) -> u32 {
    let required = skills.job_skills.total();
    if required == 0 {
        return 0;
    }
    let matched = skills.matching_skills.total();
    ((100.0 * matched as f64 / required as f64).round() as u32).min(100)
}

/// Weighted average of two integer percentages. The result always lies between them.
pub fn composite_score(
    similarity: u32,
    skill_match: u32,
    weights: &ScoringWeights,
) -> Result<u32, AnalyzeError> {
    let total_weight = weights.similarity + weights.skill_match;
    if !(total_weight > 0.0) {
        return Err(AnalyzeError::InternalScoring(format!(
            "composite weights must be positive, got {weights:?}"
        )));
    }
    let blended = (weights.similarity * similarity as f64
        + weights.skill_match * skill_match as f64)
        / total_weight;
    let low = similarity.min(skill_match);
    let high = similarity.max(skill_match);
    Ok(to_percent(blended / 100.0)?.clamp(low, high))
}

fn to_percent(fraction: f64) -> Result<u32, AnalyzeError> {
    if !fraction.is_finite() {
        return Err(AnalyzeError::InternalScoring(format!(
            "non-finite score {fraction}"
        )));
    }
    Ok((fraction * 100.0).round().clamp(0.0, 100.0) as u32)
}
