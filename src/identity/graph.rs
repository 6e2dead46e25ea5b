//! Identity Graph — symmetric weighted graph of verified equivalence links
//!
//! Reads vastly outnumber writes (writes only happen at startup hydration,
//! opportunistic registry extraction, and external challenge callbacks), so
//! the adjacency map sits behind a reader-preferring lock rather than an
//! async-gated one (spec.md §5 "Shared resources").

use crate::identity::link::{link_key_for, IdentityLink, LinkMethod};
use crate::signal::Evidence;
use crate::subject::SubjectKey;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};

const DEFAULT_MAX_HOPS: u32 = 3;

/// Undirected multigraph of identity links, indexed by subject-key for
/// O(1) adjacency lookup (spec.md §4.2).
pub struct IdentityGraph {
    /// Canonical link key -> link.
    links: RwLock<HashMap<String, IdentityLink>>,
    /// Subject key -> set of canonical link keys touching it.
    adjacency: RwLock<HashMap<SubjectKey, HashSet<String>>>,
}

impl Default for IdentityGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGraph {
    pub fn new() -> Self {
        Self {
            links: RwLock::new(HashMap::new()),
            adjacency: RwLock::new(HashMap::new()),
        }
    }

    /// Bulk-load links at startup (spec.md §3 "hydrated at startup").
    /// Equivalent to calling `add_link` once per link, in order.
    pub fn hydrate(&self, links: Vec<IdentityLink>) {
        for link in links {
            self.insert_link(link);
        }
    }

    /// Add (or idempotently update) a link between `a` and `b`
    /// (spec.md §4.2). Adding the same pair twice updates
    /// `method`/`confidence`/`evidence`/`verified-at` in place rather than
    /// creating a duplicate edge.
    pub fn add_link(
        &self,
        a: SubjectKey,
        b: SubjectKey,
        method: LinkMethod,
        evidence: Evidence,
        attestation_ref: Option<String>,
    ) -> IdentityLink {
        let link = IdentityLink::new(a, b, method, evidence, attestation_ref);
        self.insert_link(link.clone());
        link
    }

    fn insert_link(&self, link: IdentityLink) {
        let key = link.link_key();
        {
            let mut adjacency = self.adjacency.write();
            adjacency
                .entry(link.endpoint_a.clone())
                .or_default()
                .insert(key.clone());
            adjacency
                .entry(link.endpoint_b.clone())
                .or_default()
                .insert(key.clone());
        }
        self.links.write().insert(key, link);
    }

    /// All links touching `subject` (spec.md §4.2).
    pub fn links_of(&self, subject: &SubjectKey) -> Vec<IdentityLink> {
        let adjacency = self.adjacency.read();
        let Some(keys) = adjacency.get(subject) else {
            return Vec::new();
        };
        let links = self.links.read();
        let mut out: Vec<IdentityLink> = keys.iter().filter_map(|k| links.get(k).cloned()).collect();
        out.sort_by(|a, b| a.link_key().cmp(&b.link_key()));
        out
    }

    /// Whether `a` and `b` are directly linked (spec.md §4.2).
    pub fn linked(&self, a: &SubjectKey, b: &SubjectKey) -> bool {
        self.links.read().contains_key(&link_key_for(a, b))
    }

    /// Whether `subject` has at least one link at all — used by the
    /// resolver's "already has neighbours" idempotency guard
    /// (spec.md §4.3, §9).
    pub fn has_neighbours(&self, subject: &SubjectKey) -> bool {
        self.adjacency
            .read()
            .get(subject)
            .map(|keys| !keys.is_empty())
            .unwrap_or(false)
    }

    /// Bounded BFS from `subject`, excluding `subject` itself
    /// (spec.md §4.2, §9: a self-loop with no other edges yields an empty
    /// `linked` set). Deterministic iteration order: neighbours are
    /// visited in sorted link-key order at each hop.
    pub fn reachable(&self, subject: &SubjectKey, max_hops: u32) -> Vec<SubjectKey> {
        let mut visited: HashSet<SubjectKey> = HashSet::new();
        visited.insert(subject.clone());

        let mut frontier: VecDeque<(SubjectKey, u32)> = VecDeque::new();
        frontier.push_back((subject.clone(), 0));

        let mut order: Vec<SubjectKey> = Vec::new();

        while let Some((current, hops)) = frontier.pop_front() {
            if hops >= max_hops {
                continue;
            }
            for link in self.links_of(&current) {
                let other = if link.endpoint_a == current {
                    link.endpoint_b.clone()
                } else {
                    link.endpoint_a.clone()
                };
                if other == current {
                    // self-loop, not a traversal edge
                    continue;
                }
                if visited.insert(other.clone()) {
                    order.push(other.clone());
                    frontier.push_back((other, hops + 1));
                }
            }
        }

        order
    }

    /// `reachable` with the spec's default hop cap of 3.
    pub fn reachable_default(&self, subject: &SubjectKey) -> Vec<SubjectKey> {
        self.reachable(subject, DEFAULT_MAX_HOPS)
    }

    pub fn size(&self) -> usize {
        self.links.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SubjectKey {
        SubjectKey::from_raw(s)
    }

    #[test]
    fn add_link_is_idempotent_and_order_independent() {
        let graph = IdentityGraph::new();
        graph.add_link(
            key("github:alice"),
            key("twitter:alice"),
            LinkMethod::TextChallenge,
            Evidence::new(),
            None,
        );
        graph.add_link(
            key("twitter:alice"),
            key("github:alice"),
            LinkMethod::WalletSigned,
            Evidence::new(),
            None,
        );
        assert_eq!(graph.size(), 1);
        assert!(graph.linked(&key("github:alice"), &key("twitter:alice")));

        let links = graph.links_of(&key("github:alice"));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].method, LinkMethod::WalletSigned);
    }

    #[test]
    fn reachable_excludes_self_but_includes_neighbours() {
        let graph = IdentityGraph::new();
        graph.add_link(
            key("github:alice"),
            key("twitter:alice"),
            LinkMethod::TextChallenge,
            Evidence::new(),
            None,
        );
        let reachable = graph.reachable_default(&key("github:alice"));
        assert_eq!(reachable, vec![key("twitter:alice")]);
    }

    #[test]
    fn self_loop_with_no_other_edges_is_empty() {
        let graph = IdentityGraph::new();
        let a = key("erc8004:42");
        graph.add_link(a.clone(), a.clone(), LinkMethod::Manual, Evidence::new(), None);
        assert!(graph.reachable_default(&a).is_empty());
    }

    #[test]
    fn bfs_respects_hop_cap() {
        let graph = IdentityGraph::new();
        // chain: a - b - c - d (3 hops from a to d)
        graph.add_link(key("a"), key("b"), LinkMethod::Manual, Evidence::new(), None);
        graph.add_link(key("b"), key("c"), LinkMethod::Manual, Evidence::new(), None);
        graph.add_link(key("c"), key("d"), LinkMethod::Manual, Evidence::new(), None);

        let within_cap = graph.reachable(&key("a"), 3);
        assert!(within_cap.contains(&key("d")));

        let below_cap = graph.reachable(&key("a"), 2);
        assert!(!below_cap.contains(&key("d")));
    }

    #[test]
    fn bfs_handles_cycles() {
        let graph = IdentityGraph::new();
        graph.add_link(key("a"), key("b"), LinkMethod::Manual, Evidence::new(), None);
        graph.add_link(key("b"), key("c"), LinkMethod::Manual, Evidence::new(), None);
        graph.add_link(key("c"), key("a"), LinkMethod::Manual, Evidence::new(), None);

        let reachable = graph.reachable(&key("a"), 3);
        assert_eq!(reachable.len(), 2);
    }
}
