//! Signals — the typed observations signal providers emit about a subject

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The signal types offered by the default provider set (spec.md §4.1
/// table). `Other` covers any additional provider's custom signal type
/// without requiring a core release — providers are independent and an
/// implementation may register any subset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    AuthorReputation,
    RepoHealth,
    SocialPresence,
    IdentityOnChain,
    ServiceDiversity,
    SkillAdoption,
    AuthorPortfolio,
    CommunityReputation,
    Other(String),
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::AuthorReputation => write!(f, "author_reputation"),
            SignalType::RepoHealth => write!(f, "repo_health"),
            SignalType::SocialPresence => write!(f, "social_presence"),
            SignalType::IdentityOnChain => write!(f, "identity_on_chain"),
            SignalType::ServiceDiversity => write!(f, "service_diversity"),
            SignalType::SkillAdoption => write!(f, "skill_adoption"),
            SignalType::AuthorPortfolio => write!(f, "author_portfolio"),
            SignalType::CommunityReputation => write!(f, "community_reputation"),
            SignalType::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Opaque evidence map. `BTreeMap` keeps iteration (and therefore logging
/// and test assertions) deterministic.
pub type Evidence = BTreeMap<String, serde_json::Value>;

/// Recommended signal TTLs (spec.md §4.1): on-chain signals cache longest,
/// off-chain signals shorter, and error-fallback signals shortest of all so
/// a transient soft error does not poison the result cache for long.
pub const ON_CHAIN_TTL_SECS: u64 = 3600;
pub const OFF_CHAIN_TTL_SECS: u64 = 1800;
pub const ERROR_FALLBACK_TTL_SECS: u64 = 120;

/// A single scored, confidence-annotated observation a provider makes about
/// a subject. `score = 0` means "untrustworthy with the reported
/// confidence", not "no data" — absence of data is signalled by a provider
/// returning no signals at all (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub provider_name: String,
    pub signal_type: SignalType,
    pub score: f64,
    pub confidence: f64,
    pub evidence: Evidence,
    pub produced_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl Signal {
    /// Construct a signal, clamping `score` and `confidence` to `[0, 1]` as
    /// every provider and the Provider HTTP Helper must (spec.md §4.1).
    pub fn new(
        provider_name: impl Into<String>,
        signal_type: SignalType,
        score: f64,
        confidence: f64,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            signal_type,
            score: score.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Evidence::new(),
            produced_at: Utc::now(),
            ttl_seconds,
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_evidence_entry(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }

    /// A fraud-shaped low-confidence signal a provider should return instead
    /// of raising on a soft error (spec.md §4.1): `score = 0`,
    /// `confidence ≈ 0.3`, with the failure reason recorded in evidence.
    pub fn soft_error(provider_name: impl Into<String>, signal_type: SignalType, reason: impl Into<String>) -> Self {
        Signal::new(provider_name, signal_type, 0.0, 0.3, ERROR_FALLBACK_TTL_SECS)
            .with_evidence_entry("error", serde_json::Value::String(reason.into()))
    }
}
