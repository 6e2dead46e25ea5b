//! Identity Resolver — expands a subject to its transitive-closure cohort

use crate::identity::graph::IdentityGraph;
use crate::identity::link::LinkMethod;
use crate::subject::{Subject, SubjectKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A single `(subject-key, subject-key)` pair declared by an on-chain
/// registry, as returned by a provider's opportunistic link extraction
/// helper (spec.md §4.3, §6 "On-chain registration format").
#[derive(Debug, Clone)]
pub struct DeclaredLink {
    pub other: SubjectKey,
    pub evidence: crate::signal::Evidence,
}

/// The narrow capability the resolver needs from an ERC-8004-shaped
/// provider: given a subject's in-namespace id, look up any identifiers
/// it declares elsewhere. Kept separate from `SignalProvider` so the
/// resolver does not depend on the full provider trait or registry.
#[async_trait::async_trait]
pub trait LinkedIdentifierSource: Send + Sync {
    async fn linked_identifiers(&self, id: &str) -> crate::error::Result<Vec<DeclaredLink>>;
}

/// The cohort returned by `resolve` (spec.md §4.3): the original subject,
/// everything reachable from it in the identity graph, and the
/// concatenation of both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cohort {
    pub canonical: Subject,
    pub linked: Vec<SubjectKey>,
    pub all: Vec<Subject>,
}

/// Expands a subject to its transitive-closure cohort, opportunistically
/// materialising registry-declared links along the way (spec.md §4.3).
/// Carries no cache of its own — the identity graph is its cache.
pub struct IdentityResolver {
    graph: Arc<IdentityGraph>,
    erc8004: Option<Arc<dyn LinkedIdentifierSource>>,
}

impl IdentityResolver {
    pub fn new(graph: Arc<IdentityGraph>, erc8004: Option<Arc<dyn LinkedIdentifierSource>>) -> Self {
        Self { graph, erc8004 }
    }

    /// `resolve(subject) → {canonical, linked[], all[]}` (spec.md §4.3).
    pub async fn resolve(&self, subject: &Subject) -> Cohort {
        let key = subject.key();

        if subject.namespace.as_str() == "erc8004" && !self.graph.has_neighbours(&key) {
            self.extract_registry_links(subject, &key).await;
        }

        let linked = self.graph.reachable_default(&key);
        let mut all = vec![subject.clone()];
        all.extend(linked.iter().map(|k| subject_from_key(k, subject)));

        Cohort {
            canonical: subject.clone(),
            linked,
            all,
        }
    }

    /// Step 1 of resolve: query the on-chain registry for declared links
    /// and insert them as `registry-declared` edges. Failures are
    /// swallowed — this is best-effort memoisation, not load-bearing for
    /// correctness (spec.md §4.3, §9).
    async fn extract_registry_links(&self, subject: &Subject, key: &SubjectKey) {
        let Some(provider) = &self.erc8004 else {
            return;
        };

        match provider.linked_identifiers(&subject.id).await {
            Ok(declared) => {
                for link in declared {
                    self.graph.add_link(
                        key.clone(),
                        link.other,
                        LinkMethod::RegistryDeclared,
                        link.evidence,
                        None,
                    );
                }
            }
            Err(err) => {
                warn!(subject = %key, error = %err, "registry link extraction failed, continuing without it");
            }
        }
        debug!(subject = %key, "registry link extraction attempted");
    }
}

/// Reconstruct a `Subject` from a bare key, inheriting the original
/// query's type (spec.md §4.5 step 5: "for each cohort member, inheriting
/// the original type").
fn subject_from_key(key: &SubjectKey, original: &Subject) -> Subject {
    let raw = key.as_str();
    let (namespace, id) = raw.split_once(':').unwrap_or(("", raw));
    Subject::new(original.kind, namespace, id)
}
