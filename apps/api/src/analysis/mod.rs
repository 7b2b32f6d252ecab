//! Match Analyzer: Extractor → Classifier → Scorer → Recommendation Generator.
//!
//! Each stage is a pure function of its inputs and the shared taxonomy.

pub mod classifier;
pub mod extractor;
pub mod handlers;
pub mod recommendations;
pub mod scorer;
pub mod text;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::analysis::classifier::{ClassifiedSkills, SkillSet};
use crate::analysis::extractor::ResumeUpload;
use crate::analysis::recommendations::{Recommendation, RecommendationPolicy};
use crate::analysis::scorer::{Scores, ScoringWeights};
use crate::taxonomy::Taxonomy;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    EmptyInput(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text from '{file}'. The file may be corrupt or password protected.")]
    ExtractionFailed { file: String },

    #[error("Resume file exceeds the {limit}-byte upload limit")]
    FileTooLarge { limit: usize },

    #[error("Internal scoring error: {0}")]
    InternalScoring(String),
}

/// Everything the front-end renders for one resume / job-description pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub similarity_score: u32,
    pub skill_match_score: u32,
    pub composite_score: u32,
    pub job_skills: SkillSet,
    pub matching_skills: SkillSet,
    pub missing_skills: SkillSet,
    pub matching_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisResult {
    fn assemble(
        skills: ClassifiedSkills,
        scores: Scores,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        let matching_keywords = skills.matching_skills.flatten();
        let missing_keywords = skills.missing_skills.flatten();
        Self {
            similarity_score: scores.similarity,
            skill_match_score: scores.skill_match,
            composite_score: scores.composite,
            job_skills: skills.job_skills,
            matching_skills: skills.matching_skills,
            missing_skills: skills.missing_skills,
            matching_keywords,
            missing_keywords,
            recommendations,
        }
    }
}

/// Tunables for one analyzer instance; fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub max_resume_bytes: usize,
    pub weights: ScoringWeights,
    pub recommendations: RecommendationPolicy,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            max_resume_bytes: 16 * 1024 * 1024,
            weights: ScoringWeights::default(),
            recommendations: RecommendationPolicy::default(),
        }
    }
}

/// Analyzer seam. `AppState` carries an `Arc<dyn MatchAnalyzer>` so the handler
/// never depends on a concrete pipeline.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        resume: ResumeUpload,
        job_description: String,
    ) -> Result<AnalysisResult, AnalyzeError>;
}

/// The default analyzer: runs the four stages on a blocking worker thread.
#[derive(Debug, Clone)]
pub struct PipelineAnalyzer {
    taxonomy: Arc<Taxonomy>,
    settings: AnalyzerSettings,
}

impl PipelineAnalyzer {
    pub fn new(taxonomy: Arc<Taxonomy>, settings: AnalyzerSettings) -> Self {
        Self { taxonomy, settings }
    }

    /// Runs the full pipeline synchronously.
    pub fn run(
        &self,
        resume: &ResumeUpload,
        job_description: &str,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let documents =
            extractor::extract(resume, job_description, self.settings.max_resume_bytes)?;
        let skills = classifier::classify(
            &self.taxonomy,
            &documents.job.tokens,
            &documents.resume.tokens,
        );
        let scores = scorer::score(
            &documents.resume,
            &documents.job,
            &skills,
            &self.settings.weights,
        )?;
        let recommendations =
            recommendations::generate(&skills, &scores, &self.settings.recommendations);

        info!(
            format = documents.format.as_str(),
            similarity = scores.similarity,
            skill_match = scores.skill_match,
            composite = scores.composite,
            "Analysis complete"
        );

        Ok(AnalysisResult::assemble(skills, scores, recommendations))
    }
}

#[async_trait]
impl MatchAnalyzer for PipelineAnalyzer {
    async fn analyze(
        &self,
        resume: ResumeUpload,
        job_description: String,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let analyzer = self.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            analyzer.run(&resume, &job_description)
        })
        .await
        .map_err(|e| {
            error!("Analysis worker failed: {e}");
            AnalyzeError::InternalScoring("analysis worker terminated unexpectedly".to_string())
        })?
    }
}
