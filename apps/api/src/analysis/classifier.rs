//! Skill Classifier — buckets job-description and resume tokens into taxonomy categories.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::taxonomy::{SkillCategory, Taxonomy};

/// Category → skill names, both in first-insertion order.
///
/// A category only exists once it holds at least one skill, so an empty list is
/// never emitted. Skill names are deduplicated case-insensitively per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    entries: Vec<(SkillCategory, Vec<String>)>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &SkillCategory, skill: &str) {
        let position = match self.entries.iter().position(|(key, _)| key == category) {
            Some(position) => position,
            None => {
                self.entries.push((category.clone(), Vec::new()));
                self.entries.len() - 1
            }
        };
        let skills = &mut self.entries[position].1;
        let lowered = skill.to_lowercase();
        if !skills.iter().any(|s| s.to_lowercase() == lowered) {
            skills.push(skill.to_string());
        }
    }

    pub fn get(&self, category: &SkillCategory) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == category)
            .map(|(_, skills)| skills.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SkillCategory, &[String])> {
        self.entries
            .iter()
            .map(|(key, skills)| (key, skills.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of skills across all categories.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, skills)| skills.len()).sum()
    }

    /// All skills flattened in category order, deduplicated case-insensitively.
    pub fn flatten(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|(_, skills)| skills.iter())
            .filter(|skill| seen.insert(skill.to_lowercase()))
            .cloned()
            .collect()
    }
}

impl Serialize for SkillSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, skills) in &self.entries {
            map.serialize_entry(key.as_str(), skills)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedSkills {
    pub job_skills: SkillSet,
    pub matching_skills: SkillSet,
    pub missing_skills: SkillSet,
}

/// Finds every taxonomy term required by the job description and splits them into
/// matched and missing according to the resume.
///
/// Every category is visited in declaration order and terms in their declared order.
pub fn classify(
    taxonomy: &Taxonomy,
    job_tokens: &[String],
    resume_tokens: &[String],
) -> ClassifiedSkills {
    let mut classified = ClassifiedSkills::default();

    let roles: Vec<&str> = taxonomy
        .matching_roles(job_tokens)
        .into_iter()
        .map(|role| role.title.as_str())
        .collect();
    if !roles.is_empty() {
        debug!(?roles, "Job description names known roles");
    }

    for category in taxonomy.categories() {
        for term in &category.terms {
            if !term.appears_in(job_tokens) {
                continue;
            }
            classified.job_skills.insert(&category.key, &term.name);
            if term.appears_in(resume_tokens) {
                classified.matching_skills.insert(&category.key, &term.name);
            } else {
                classified.missing_skills.insert(&category.key, &term.name);
            }
        }
    }

    debug!(
        required = classified.job_skills.total(),
        matched = classified.matching_skills.total(),
        missing = classified.missing_skills.total(),
        "Skills classified"
    );

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::text::tokenize;

    const SCENARIO_TAXONOMY: &str = r#"
        [[categories]]
        key = "programming_languages"
        terms = ["Python", "Java", "SQL"]

        [[categories]]
        key = "soft_skills"
        terms = ["communication", "leadership"]
    "#;

    fn category(key: &str) -> SkillCategory {
        SkillCategory::new(key)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scenario() -> ClassifiedSkills {
        let taxonomy = Taxonomy::from_toml_str(SCENARIO_TAXONOMY).unwrap();
        classify(
            &taxonomy,
            &tokenize("Requires Python, Java, SQL, leadership"),
            &tokenize("Python, SQL, communication"),
        )
    }

    #[test]
    fn test_scenario_job_skills() {
        let skills = scenario();
        assert_eq!(
            skills.job_skills.get(&category("programming_languages")).unwrap(),
            strings(&["Python", "Java", "SQL"]).as_slice()
        );
        assert_eq!(
            skills.job_skills.get(&category("soft_skills")).unwrap(),
            strings(&["leadership"]).as_slice()
        );
    }

    #[test]
    fn test_scenario_matching_and_missing() {
        let skills = scenario();
        assert_eq!(
            skills.matching_skills.get(&category("programming_languages")).unwrap(),
            strings(&["Python", "SQL"]).as_slice()
        );
        assert!(skills.matching_skills.get(&category("soft_skills")).is_none());
        assert_eq!(
            skills.missing_skills.get(&category("programming_languages")).unwrap(),
            strings(&["Java"]).as_slice()
        );
        assert_eq!(
            skills.missing_skills.get(&category("soft_skills")).unwrap(),
            strings(&["leadership"]).as_slice()
        );
    }

    #[test]
    fn test_matching_and_missing_partition_job_skills() {
        let skills = scenario();
        for (key, required) in skills.job_skills.iter() {
            let matched = skills.matching_skills.get(key).unwrap_or(&[]);
            let missing = skills.missing_skills.get(key).unwrap_or(&[]);
            assert!(matched.iter().all(|s| required.contains(s)));
            let expected: Vec<&String> = required.iter().filter(|s| !matched.contains(s)).collect();
            assert_eq!(missing.iter().collect::<Vec<_>>(), expected);
        }
        for (key, _) in skills.matching_skills.iter().chain(skills.missing_skills.iter()) {
            assert!(skills.job_skills.get(key).is_some());
        }
    }

    #[test]
    fn test_no_requirements_yields_no_categories() {
        let taxonomy = Taxonomy::from_toml_str(SCENARIO_TAXONOMY).unwrap();
        let skills = classify(
            &taxonomy,
            &tokenize("Friendly office, great coffee"),
            &tokenize("Python"),
        );
        assert!(skills.job_skills.is_empty());
        assert!(skills.matching_skills.is_empty());
        assert!(skills.missing_skills.is_empty());
    }

    #[test]
    fn test_role_title_in_job_description_keeps_every_category() {
        let taxonomy = crate::taxonomy::defaults::default_taxonomy().unwrap();
        let skills = classify(
            &taxonomy,
            &tokenize("Senior Software Engineer. Requires Python, AWS, Docker and strong leadership."),
            &tokenize("Python developer"),
        );

        assert_eq!(
            skills.job_skills.get(&category("cloud_platforms")).unwrap(),
            strings(&["AWS", "Docker"]).as_slice()
        );
        assert_eq!(
            skills.job_skills.get(&category("soft_skills")).unwrap(),
            strings(&["Leadership"]).as_slice()
        );
        assert_eq!(
            skills.matching_skills.flatten(),
            strings(&["Python"])
        );
        assert_eq!(
            skills.missing_skills.flatten(),
            strings(&["AWS", "Docker", "Leadership"])
        );
        assert_eq!(crate::analysis::scorer::skill_match_score(&skills), 25);
    }

    #[test]
    fn test_flatten_dedups_across_categories() {
        let mut set = SkillSet::new();
        set.insert(&category("languages"), "Swift");
        set.insert(&category("mobile"), "swift");
        set.insert(&category("mobile"), "iOS");
        assert_eq!(set.flatten(), strings(&["Swift", "iOS"]));
        assert_eq!(set.total(), 3);
    }

    #[test]
    fn test_insert_dedups_within_category() {
        let mut set = SkillSet::new();
        set.insert(&category("languages"), "Python");
        set.insert(&category("languages"), "PYTHON");
        assert_eq!(set.get(&category("languages")).unwrap().len(), 1);
    }

    #[test]
    fn test_serializes_as_object_in_insertion_order() {
        let mut set = SkillSet::new();
        set.insert(&category("soft_skills"), "leadership");
        set.insert(&category("databases"), "MySQL");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"soft_skills":["leadership"],"databases":["MySQL"]}"#);
    }
}
