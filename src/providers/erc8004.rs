//! ERC-8004 signal provider — `identity_on_chain`, `service_diversity`
//!
//! Decodes a registration blob addressed by integer id in an on-chain
//! registry (spec.md §4.1, §6 "On-chain registration format").

use super::http::ProviderHttp;
use super::{EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider};
use crate::error::Result;
use crate::identity::resolver::{DeclaredLink, LinkedIdentifierSource};
use crate::signal::{Evidence, Signal, SignalType, ON_CHAIN_TTL_SECS};
use crate::subject::{Subject, SubjectKey, SubjectType};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Service names recognised for link extraction (spec.md §6).
const RECOGNISED_SERVICES: &[&str] = &["ens", "did", "github", "twitter", "x"];

pub struct Erc8004Provider {
    http: ProviderHttp,
    registry_base_url: String,
}

impl Erc8004Provider {
    pub fn new(registry_base_url: String, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(timeout),
            registry_base_url,
        }
    }

    async fn fetch_registration(&self, id: &str) -> Result<Erc8004Registration> {
        let url = format!("{}/registrations/{}", self.registry_base_url, id);
        self.http.get_json(&url).await
    }
}

#[async_trait]
impl SignalProvider for Erc8004Provider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "erc8004".to_string(),
            version: "1.0.0".to_string(),
            description: "On-chain identity registration completeness and declared service diversity".to_string(),
            supported_subject_types: vec![SubjectType::Agent],
            supported_namespaces: vec!["erc8004".to_string()],
            signal_types_offered: vec![SignalType::IdentityOnChain, SignalType::ServiceDiversity],
            soft_rate_limit: None,
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == "erc8004"
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>> {
        let registration = match self.fetch_registration(&request.subject.id).await {
            Ok(r) => r,
            Err(err) => {
                return Ok(vec![Signal::soft_error(
                    "erc8004",
                    SignalType::IdentityOnChain,
                    err.to_string(),
                )])
            }
        };

        let mut signals = Vec::with_capacity(2);

        let has_description = !registration.description.clone().unwrap_or_default().is_empty();
        let is_active = registration.active.unwrap_or(false);
        let completeness = [has_description, is_active, !registration.name.is_empty()]
            .iter()
            .filter(|present| **present)
            .count() as f64
            / 3.0;

        let identity_signal = Signal::new(
            "erc8004",
            SignalType::IdentityOnChain,
            completeness,
            0.5,
            ON_CHAIN_TTL_SECS,
        )
        .with_evidence_entry("active", is_active)
        .with_evidence_entry("has_description", has_description);
        signals.push(identity_signal);

        let services = registration.services.clone().unwrap_or_default();
        let distinct_kinds: std::collections::HashSet<&str> =
            services.iter().map(|s| s.name.as_str()).collect();
        let diversity_score = (distinct_kinds.len() as f64 / 6.0).min(1.0);
        let diversity_confidence = if services.is_empty() { 0.2 } else { 0.45 };

        let diversity_signal = Signal::new(
            "erc8004",
            SignalType::ServiceDiversity,
            diversity_score,
            diversity_confidence,
            ON_CHAIN_TTL_SECS,
        )
        .with_evidence_entry("service_count", services.len() as u64);
        signals.push(diversity_signal);

        Ok(signals)
    }

    async fn health(&self) -> ProviderHealth {
        ProviderHealth {
            status: HealthStatus::Healthy,
            ..ProviderHealth::unknown()
        }
    }

    fn as_linked_identifier_source(&self) -> Option<&dyn LinkedIdentifierSource> {
        Some(self)
    }
}

/// The resolver-facing capability: decode a registration's declared
/// services into identity links (spec.md §4.3 step 1, §6). The service
/// endpoint parser is permissive (strips URL prefixes) but idempotent.
#[async_trait]
impl LinkedIdentifierSource for Erc8004Provider {
    async fn linked_identifiers(&self, id: &str) -> Result<Vec<DeclaredLink>> {
        let registration = self.fetch_registration(id).await?;
        let services = registration.services.unwrap_or_default();

        let links = services
            .iter()
            .filter(|s| RECOGNISED_SERVICES.contains(&s.name.as_str()))
            .map(|s| {
                let namespace = normalize_service_name(&s.name);
                let other_id = strip_url_prefix(&s.endpoint);
                let mut evidence = Evidence::new();
                evidence.insert("service".to_string(), serde_json::Value::String(s.name.clone()));
                DeclaredLink {
                    other: SubjectKey::from_raw(format!("{namespace}:{other_id}")),
                    evidence,
                }
            })
            .collect();

        Ok(links)
    }
}

fn normalize_service_name(name: &str) -> &'static str {
    match name {
        "x" | "twitter" => "twitter",
        "github" => "github",
        "ens" => "ens",
        "did" => "did",
        _ => "unknown",
    }
}

/// Strip a leading URL scheme/host so `https://github.com/alice` and
/// `alice` both resolve to the same id. Idempotent: already-stripped
/// input passes through unchanged (spec.md §6).
fn strip_url_prefix(endpoint: &str) -> String {
    let without_scheme = endpoint
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let without_host = without_scheme.split_once('/').map(|(_, rest)| rest).unwrap_or(without_scheme);
    without_host.trim_matches('/').to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct Erc8004Registration {
    name: String,
    description: Option<String>,
    active: Option<bool>,
    services: Option<Vec<Erc8004Service>>,
    #[allow(dead_code)]
    #[serde(rename = "supportedTrust")]
    supported_trust: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Erc8004Service {
    name: String,
    endpoint: String,
    #[allow(dead_code)]
    version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_url_prefix_is_idempotent() {
        let stripped_once = strip_url_prefix("https://github.com/alice");
        let stripped_twice = strip_url_prefix(&stripped_once);
        assert_eq!(stripped_once, stripped_twice);
        assert_eq!(stripped_once, "alice");
    }

    #[test]
    fn strip_url_prefix_passes_through_bare_id() {
        assert_eq!(strip_url_prefix("alice"), "alice");
    }

    #[test]
    fn normalize_service_name_maps_x_to_twitter() {
        assert_eq!(normalize_service_name("x"), "twitter");
        assert_eq!(normalize_service_name("twitter"), "twitter");
    }

    #[test]
    fn supports_only_erc8004_namespace() {
        let provider = Erc8004Provider::new("https://registry.example".to_string(), Duration::from_secs(10));
        let subject = Subject::new(SubjectType::Agent, "erc8004", "42");
        let other = Subject::new(SubjectType::Agent, "github", "42");
        assert!(provider.supports(&subject));
        assert!(!provider.supports(&other));
    }
}
