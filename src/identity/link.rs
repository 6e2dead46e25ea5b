//! Identity links — verified equivalence edges between subjects

use crate::signal::Evidence;
use crate::subject::SubjectKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an identity link was established (spec.md §3). The mapping to
/// confidence is fixed and does not vary per link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMethod {
    WalletSigned,
    Manual,
    TextChallenge,
    RegistryDeclared,
}

impl LinkMethod {
    /// The fixed method-to-confidence mapping (spec.md §3).
    pub fn confidence(self) -> f64 {
        match self {
            LinkMethod::WalletSigned => 0.95,
            LinkMethod::Manual => 0.90,
            LinkMethod::TextChallenge => 0.80,
            LinkMethod::RegistryDeclared => 0.70,
        }
    }
}

impl fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkMethod::WalletSigned => write!(f, "wallet-signed"),
            LinkMethod::Manual => write!(f, "manual"),
            LinkMethod::TextChallenge => write!(f, "text-challenge"),
            LinkMethod::RegistryDeclared => write!(f, "registry-declared"),
        }
    }
}

/// A symmetric edge between two subject keys (spec.md §3). `endpoint_a`
/// and `endpoint_b` are stored in canonical (lexicographically sorted)
/// order so `(a, b)` and `(b, a)` produce the same link key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityLink {
    pub endpoint_a: SubjectKey,
    pub endpoint_b: SubjectKey,
    pub method: LinkMethod,
    pub confidence: f64,
    pub evidence: Evidence,
    pub verified_at: DateTime<Utc>,
    pub attestation_ref: Option<String>,
}

impl IdentityLink {
    pub fn new(
        a: SubjectKey,
        b: SubjectKey,
        method: LinkMethod,
        evidence: Evidence,
        attestation_ref: Option<String>,
    ) -> Self {
        let (endpoint_a, endpoint_b) = canonical_pair(a, b);
        Self {
            endpoint_a,
            endpoint_b,
            method,
            confidence: method.confidence(),
            evidence,
            verified_at: Utc::now(),
            attestation_ref,
        }
    }

    /// The order-independent key identifying this edge regardless of which
    /// endpoint was passed first (spec.md §4.2).
    pub fn link_key(&self) -> String {
        format!("{}|{}", self.endpoint_a, self.endpoint_b)
    }

    /// Whether this is the canonical "subject has been proven" self-loop
    /// (spec.md §3).
    pub fn is_self_loop(&self) -> bool {
        self.endpoint_a == self.endpoint_b
    }
}

/// Order subjects lexicographically so the link key is independent of
/// call order (spec.md §4.2).
pub fn canonical_pair(a: SubjectKey, b: SubjectKey) -> (SubjectKey, SubjectKey) {
    if a.as_str() <= b.as_str() {
        (a, b)
    } else {
        (b, a)
    }
}

/// The key under which a link between `a` and `b` is stored, without
/// constructing a full `IdentityLink`.
pub fn link_key_for(a: &SubjectKey, b: &SubjectKey) -> String {
    let (lo, hi) = if a.as_str() <= b.as_str() {
        (a.as_str(), b.as_str())
    } else {
        (b.as_str(), a.as_str())
    };
    format!("{lo}|{hi}")
}
