//! Skill taxonomy — categories of canonical skill terms (with synonyms) and optional
//! role profiles naming the categories typical for a job title.
//!
//! Loaded once at start-up (built-in default or a TOML file) and shared read-only
//! through `Arc<Taxonomy>`. Never mutated after construction.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::text::{contains_sequence, tokenize};

pub mod defaults;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse taxonomy: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Taxonomy declares no categories")]
    Empty,

    #[error("Category key must not be blank")]
    BlankCategory,

    #[error("Duplicate category '{0}'")]
    DuplicateCategory(String),

    #[error("Category '{0}' declares no terms")]
    EmptyCategory(String),

    #[error("Term '{term}' in category '{category}' has no matchable tokens")]
    UnmatchableTerm { category: String, term: String },

    #[error("Role '{0}' has no matchable tokens")]
    UnmatchableRole(String),

    #[error("Role '{role}' references unknown category '{category}'")]
    UnknownRoleCategory { role: String, category: String },
}

/// Taxonomy key such as `programming_languages`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillCategory(String);

impl SkillCategory {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form used in recommendation text: `soft_skills` → `soft skills`.
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Definition format (TOML file or built-in tables)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomySpec {
    pub categories: Vec<CategorySpec>,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySpec {
    pub key: String,
    pub terms: Vec<TermSpec>,
}

/// A term is either a bare name or a table with synonyms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Name(String),
    WithSynonyms {
        name: String,
        #[serde(default)]
        synonyms: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleSpec {
    pub title: String,
    pub categories: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validated taxonomy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SkillTerm {
    pub name: String,
    pub synonyms: Vec<String>,
    /// Token sequences for the name followed by each synonym. Never empty.
    #[serde(skip)]
    patterns: Vec<Vec<String>>,
}

impl SkillTerm {
    /// True when the name or any synonym appears as a contiguous token run.
    pub fn appears_in(&self, tokens: &[String]) -> bool {
        self.patterns
            .iter()
            .any(|pattern| contains_sequence(tokens, pattern))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDef {
    pub key: SkillCategory,
    pub terms: Vec<SkillTerm>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleProfile {
    pub title: String,
    pub categories: Vec<SkillCategory>,
    #[serde(skip)]
    pattern: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Taxonomy {
    categories: Vec<CategoryDef>,
    roles: Vec<RoleProfile>,
}

impl Taxonomy {
    /// Reads and validates a TOML taxonomy file.
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, TaxonomyError> {
        let spec: TaxonomySpec = toml::from_str(raw)?;
        Self::from_spec(spec)
    }

    /// Validates a definition. Terms duplicated within a category (case-insensitive)
    /// keep their first declaration; synonyms are deduplicated the same way.
    pub fn from_spec(spec: TaxonomySpec) -> Result<Self, TaxonomyError> {
        if spec.categories.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut seen_keys = HashSet::new();
        let mut categories = Vec::with_capacity(spec.categories.len());

        for category in spec.categories {
            let key = category.key.trim().to_string();
            if key.is_empty() {
                return Err(TaxonomyError::BlankCategory);
            }
            if !seen_keys.insert(key.clone()) {
                return Err(TaxonomyError::DuplicateCategory(key));
            }

            let mut seen_terms = HashSet::new();
            let mut terms = Vec::with_capacity(category.terms.len());
            for term in category.terms {
                let (name, synonyms) = match term {
                    TermSpec::Name(name) => (name, Vec::new()),
                    TermSpec::WithSynonyms { name, synonyms } => (name, synonyms),
                };
                let name = name.trim().to_string();
                if !seen_terms.insert(name.to_lowercase()) {
                    continue;
                }
                terms.push(build_term(&key, name, synonyms)?);
            }

            if terms.is_empty() {
                return Err(TaxonomyError::EmptyCategory(key));
            }
            categories.push(CategoryDef {
                key: SkillCategory::new(key),
                terms,
            });
        }

        let mut roles = Vec::with_capacity(spec.roles.len());
        for role in spec.roles {
            let title = role.title.trim().to_string();
            let pattern = tokenize(&title);
            if pattern.is_empty() {
                return Err(TaxonomyError::UnmatchableRole(title));
            }
            let mut role_categories = Vec::with_capacity(role.categories.len());
            for category in role.categories {
                if !seen_keys.contains(category.as_str()) {
                    return Err(TaxonomyError::UnknownRoleCategory {
                        role: title,
                        category,
                    });
                }
                role_categories.push(SkillCategory::new(category));
            }
            roles.push(RoleProfile {
                title,
                categories: role_categories,
                pattern,
            });
        }

        Ok(Self { categories, roles })
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn roles(&self) -> &[RoleProfile] {
        &self.roles
    }

    /// Role profiles whose title appears in the job description, in declaration order.
    ///
    /// Informational only: classification always covers every category.
    pub fn matching_roles(&self, job_tokens: &[String]) -> Vec<&RoleProfile> {
        self.roles
            .iter()
            .filter(|role| contains_sequence(job_tokens, &role.pattern))
            .collect()
    }
}

fn build_term(
    category: &str,
    name: String,
    synonyms: Vec<String>,
) -> Result<SkillTerm, TaxonomyError> {
    let name_pattern = tokenize(&name);
    if name_pattern.is_empty() {
        return Err(TaxonomyError::UnmatchableTerm {
            category: category.to_string(),
            term: name,
        });
    }

    let mut seen = HashSet::from([name.to_lowercase()]);
    let mut kept_synonyms = Vec::new();
    let mut patterns = vec![name_pattern];
    for synonym in synonyms {
        let synonym = synonym.trim().to_string();
        if !seen.insert(synonym.to_lowercase()) {
            continue;
        }
        let pattern = tokenize(&synonym);
        if pattern.is_empty() {
            return Err(TaxonomyError::UnmatchableTerm {
                category: category.to_string(),
                term: synonym,
            });
        }
        patterns.push(pattern);
        kept_synonyms.push(synonym);
    }

    Ok(SkillTerm {
        name,
        synonyms: kept_synonyms,
        patterns,
    })
}
