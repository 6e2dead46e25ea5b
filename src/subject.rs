//! Subject identity — the `(type, namespace, id)` triple a query is about

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of thing a `Subject` identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Agent,
    Skill,
    Interaction,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Agent => write!(f, "agent"),
            SubjectType::Skill => write!(f, "skill"),
            SubjectType::Interaction => write!(f, "interaction"),
        }
    }
}

/// An ecosystem tag (`github`, `twitter`, `erc8004`, `clawhub`, `moltbook`,
/// `wallet`, `ens`, `did`, …). Deliberately open-ended — not a closed enum —
/// since new providers introduce new namespaces without a core release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Construct a namespace, lower-casing it per spec.md §3 ("namespace is
    /// a lowercase ecosystem tag").
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Namespace::new(s)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Namespace::new(s)
    }
}

/// The triple `(type, namespace, id)` a query is about.
///
/// `id` is opaque and in-namespace; it may contain `/`, `:`, `#` — its
/// interpretation is entirely up to the provider that claims the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub kind: SubjectType,
    pub namespace: Namespace,
    pub id: String,
}

impl Subject {
    pub fn new(kind: SubjectType, namespace: impl Into<Namespace>, id: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// The canonical string `"<namespace>:<id>"`. Keys are case-preserving
    /// but compared case-sensitively per spec.md §3.
    pub fn key(&self) -> SubjectKey {
        SubjectKey(format!("{}:{}", self.namespace, self.id))
    }

    /// Produce a new subject with the same `id`/`namespace` but a different
    /// type — used when expanding a cohort: linked subjects inherit the
    /// original query's type (spec.md §4.5 step 5).
    pub fn with_type(&self, kind: SubjectType) -> Self {
        Self {
            kind,
            namespace: self.namespace.clone(),
            id: self.id.clone(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The canonical string key for a subject: `"<namespace>:<id>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectKey(String);

impl SubjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity type inferred from `(namespace, id)` — used only to pick a
/// human-readable label, never to change scoring semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Agent,
    Repo,
    Skill,
    Developer,
    Unknown,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Agent => write!(f, "agent"),
            EntityType::Repo => write!(f, "repo"),
            EntityType::Skill => write!(f, "skill"),
            EntityType::Developer => write!(f, "developer"),
            EntityType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detect the entity type of a subject from its `(namespace, id)` alone,
/// per spec.md §4.4 "Entity-type detection".
pub fn detect_entity_type(namespace: &Namespace, id: &str) -> EntityType {
    match namespace.as_str() {
        "erc8004" | "twitter" | "moltbook" | "wallet" | "ens" | "did" => EntityType::Agent,
        "github" => {
            if id.contains('/') {
                EntityType::Repo
            } else {
                EntityType::Developer
            }
        }
        "clawhub" => {
            if id.starts_with("skill/") || id.contains('/') {
                EntityType::Skill
            } else {
                EntityType::Developer
            }
        }
        _ => EntityType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_key_is_namespace_colon_id() {
        let s = Subject::new(SubjectType::Agent, "GitHub", "octocat/hello-world");
        // namespace is lower-cased on construction
        assert_eq!(s.key().as_str(), "github:octocat/hello-world");
    }

    #[test]
    fn entity_type_github_repo_vs_developer() {
        let ns = Namespace::new("github");
        assert_eq!(detect_entity_type(&ns, "octocat/hello-world"), EntityType::Repo);
        assert_eq!(detect_entity_type(&ns, "octocat"), EntityType::Developer);
    }

    #[test]
    fn entity_type_clawhub_skill_vs_developer() {
        let ns = Namespace::new("clawhub");
        assert_eq!(detect_entity_type(&ns, "skill/pdf-export"), EntityType::Skill);
        assert_eq!(detect_entity_type(&ns, "author/jane"), EntityType::Skill);
        assert_eq!(detect_entity_type(&ns, "jane"), EntityType::Developer);
    }

    #[test]
    fn entity_type_agent_namespaces() {
        for ns in ["erc8004", "twitter", "moltbook", "wallet", "ens", "did"] {
            assert_eq!(detect_entity_type(&Namespace::new(ns), "x"), EntityType::Agent);
        }
    }

    #[test]
    fn entity_type_unknown_namespace() {
        assert_eq!(
            detect_entity_type(&Namespace::new("mystery-net"), "x"),
            EntityType::Unknown
        );
    }
}
