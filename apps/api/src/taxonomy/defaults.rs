//! Built-in taxonomy used when `TAXONOMY_PATH` is not set.

use super::{CategorySpec, RoleSpec, Taxonomy, TaxonomyError, TaxonomySpec, TermSpec};

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "Python", "Java", "JavaScript", "C++", "C#", "PHP", "Ruby", "Go", "Rust", "Swift",
            "Kotlin", "TypeScript", "Scala", "R", "MATLAB", "Perl", "SQL", "Shell", "Bash",
            "PowerShell", "Objective-C", "Dart", "Elixir", "Haskell", "Clojure", "F#", "VB.NET",
            "COBOL", "Fortran",
        ],
    ),
    (
        "web_technologies",
        &[
            "HTML", "CSS", "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask",
            "Spring", "Bootstrap", "jQuery", "Sass", "Webpack", "Babel", "Next.js", "Nuxt.js",
            "Svelte", "Ember.js", "Gatsby", "FastAPI", "Laravel", "Symfony", "Rails",
        ],
    ),
    (
        "databases",
        &[
            "MySQL", "PostgreSQL", "MongoDB", "Redis", "SQLite", "Oracle", "SQL Server",
            "Cassandra", "Elasticsearch", "DynamoDB", "CouchDB", "Neo4j", "InfluxDB", "MariaDB",
            "Firestore", "Cosmos DB", "Aurora", "BigQuery", "Snowflake",
        ],
    ),
    (
        "cloud_platforms",
        &[
            "AWS", "Azure", "Google Cloud", "Docker", "Kubernetes", "Terraform", "Jenkins",
            "GitLab CI", "GitHub Actions", "CircleCI", "Travis CI", "Ansible", "Puppet", "Chef",
            "Vagrant", "Helm", "Istio", "Prometheus", "Grafana", "CloudFormation", "Pulumi",
            "Serverless", "Lambda",
        ],
    ),
    (
        "data_science",
        &[
            "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Pandas", "NumPy",
            "scikit-learn", "Tableau", "Power BI", "Jupyter", "Spark", "Hadoop", "Kafka",
            "Airflow", "MLflow", "Kubeflow", "Dask", "Plotly", "Seaborn", "Matplotlib", "OpenCV",
            "NLTK", "spaCy", "Transformers", "BERT", "GPT",
        ],
    ),
    (
        "mobile_development",
        &[
            "iOS", "Android", "React Native", "Flutter", "Xamarin", "Ionic", "Cordova", "Swift",
            "Kotlin", "Objective-C", "Dart", "Unity", "Unreal Engine",
        ],
    ),
    (
        "testing",
        &[
            "Unit Testing", "Integration Testing", "Selenium", "Cypress", "Jest", "Mocha",
            "pytest", "JUnit", "TestNG", "Cucumber", "Postman", "k6", "JMeter", "Appium",
        ],
    ),
    (
        "version_control",
        &[
            "Git", "GitHub", "GitLab", "Bitbucket", "SVN", "Mercurial", "Perforce",
            "Pull Request", "Code Review",
        ],
    ),
    (
        "soft_skills",
        &[
            "Leadership", "Communication", "Teamwork", "Problem Solving", "Project Management",
            "Mentoring", "Collaboration", "Analytical Thinking", "Creativity", "Adaptability",
            "Time Management", "Critical Thinking", "Innovation",
        ],
    ),
    (
        "methodologies",
        &[
            "Agile", "Scrum", "Kanban", "Waterfall", "Lean", "DevOps", "CI/CD", "TDD", "BDD",
            "DDD", "Microservices", "Event-Driven", "REST", "GraphQL", "SOAP", "gRPC", "OAuth",
            "JWT", "SAML",
        ],
    ),
    (
        "security",
        &[
            "Cybersecurity", "Penetration Testing", "Vulnerability Assessment", "OWASP", "SSL",
            "TLS", "Encryption", "Authentication", "Authorization", "Firewall", "VPN", "SIEM",
            "Compliance", "GDPR", "HIPAA", "SOX",
        ],
    ),
];

const SYNONYMS: &[(&str, &[&str])] = &[
    ("JavaScript", &["js", "ecmascript"]),
    ("TypeScript", &["ts"]),
    ("Go", &["golang"]),
    ("C#", &["csharp"]),
    ("Node.js", &["nodejs", "node"]),
    ("Vue", &["vue.js", "vuejs"]),
    ("React", &["react.js", "reactjs"]),
    ("PostgreSQL", &["postgres"]),
    ("MongoDB", &["mongo"]),
    ("Google Cloud", &["gcp", "google cloud platform"]),
    ("AWS", &["amazon web services"]),
    ("Kubernetes", &["k8s"]),
    ("Machine Learning", &["ml"]),
    ("scikit-learn", &["sklearn"]),
    ("CI/CD", &["continuous integration", "continuous delivery"]),
    ("Teamwork", &["team player"]),
    ("Microservices", &["microservice"]),
];

const ROLES: &[(&str, &[&str])] = &[
    (
        "software engineer",
        &["programming_languages", "web_technologies", "databases", "version_control", "testing"],
    ),
    (
        "backend developer",
        &["programming_languages", "web_technologies", "databases", "version_control", "testing"],
    ),
    (
        "full stack developer",
        &["web_technologies", "programming_languages", "databases", "version_control"],
    ),
    (
        "frontend developer",
        &["web_technologies", "programming_languages", "databases", "version_control"],
    ),
    (
        "data scientist",
        &["data_science", "programming_languages", "databases", "cloud_platforms"],
    ),
    (
        "data analyst",
        &["data_science", "programming_languages", "databases", "cloud_platforms"],
    ),
    (
        "machine learning engineer",
        &["data_science", "programming_languages", "databases", "cloud_platforms"],
    ),
    (
        "devops engineer",
        &["cloud_platforms", "version_control", "methodologies", "security"],
    ),
    (
        "cloud engineer",
        &["cloud_platforms", "version_control", "methodologies", "security"],
    ),
    (
        "mobile developer",
        &["mobile_development", "programming_languages", "version_control"],
    ),
    (
        "ios developer",
        &["mobile_development", "programming_languages", "version_control"],
    ),
    (
        "android developer",
        &["mobile_development", "programming_languages", "version_control"],
    ),
    (
        "security engineer",
        &["security", "programming_languages", "cloud_platforms", "methodologies"],
    ),
];

/// Builds the built-in taxonomy: eleven categories plus role profiles for common titles.
pub fn default_taxonomy() -> Result<Taxonomy, TaxonomyError> {
    Taxonomy::from_spec(default_spec())
}

fn default_spec() -> TaxonomySpec {
    let categories = CATEGORIES
        .iter()
        .map(|(key, terms)| CategorySpec {
            key: key.to_string(),
            terms: terms.iter().map(|name| term_spec(name)).collect(),
        })
        .collect();

    let roles = ROLES
        .iter()
        .map(|(title, categories)| RoleSpec {
            title: title.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        })
        .collect();

    TaxonomySpec { categories, roles }
}

fn term_spec(name: &str) -> TermSpec {
    match SYNONYMS.iter().find(|(canonical, _)| *canonical == name) {
        Some((_, synonyms)) => TermSpec::WithSynonyms {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        },
        None => TermSpec::Name(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::text::tokenize;

    #[test]
    fn test_default_taxonomy_is_valid() {
        let taxonomy = default_taxonomy().unwrap();
        assert_eq!(taxonomy.categories().len(), 11);
        assert_eq!(taxonomy.roles().len(), ROLES.len());
        assert_eq!(taxonomy.categories()[0].key.as_str(), "programming_languages");
    }

    #[test]
    fn test_every_synonym_names_a_declared_term() {
        for (canonical, _) in SYNONYMS {
            let declared = CATEGORIES
                .iter()
                .any(|(_, terms)| terms.contains(canonical));
            assert!(declared, "synonym target '{canonical}' is not a declared term");
        }
    }

    #[test]
    fn test_punctuated_terms_match() {
        let taxonomy = default_taxonomy().unwrap();
        let languages = &taxonomy.categories()[0];
        let text = tokenize("Expert in C++ and C#, some F#.");
        let found: Vec<&str> = languages
            .terms
            .iter()
            .filter(|t| t.appears_in(&text))
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(found, vec!["C++", "C#", "F#"]);
    }

    #[test]
    fn test_devops_role_is_detected() {
        let taxonomy = default_taxonomy().unwrap();
        let roles = taxonomy.matching_roles(&tokenize("Senior DevOps Engineer (remote)"));
        let titles: Vec<&str> = roles.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["devops engineer"]);
        let keys: Vec<&str> = roles[0].categories.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            keys,
            vec!["cloud_platforms", "version_control", "methodologies", "security"]
        );
    }
}
