//! MoltBook signal provider — `community_reputation`
//!
//! Graceful no-op without credentials (spec.md §4.1), mirroring the
//! twitter provider's registration pattern.

use super::http::ProviderHttp;
use super::{EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider};
use crate::error::Result;
use crate::signal::{Signal, SignalType, OFF_CHAIN_TTL_SECS};
use crate::subject::{Subject, SubjectType};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.moltbook.example/v1";

pub struct MoltbookProvider {
    http: ProviderHttp,
}

impl MoltbookProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(timeout).with_bearer_token(api_key),
        }
    }
}

#[async_trait]
impl SignalProvider for MoltbookProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "moltbook".to_string(),
            version: "1.0.0".to_string(),
            description: "Community reputation via MoltBook karma and activity".to_string(),
            supported_subject_types: vec![SubjectType::Agent],
            supported_namespaces: vec!["moltbook".to_string()],
            signal_types_offered: vec![SignalType::CommunityReputation],
            soft_rate_limit: Some(200),
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == "moltbook"
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>> {
        let url = format!("{BASE_URL}/members/{}", request.subject.id);
        let member: MoltbookMember = match self.http.get_json(&url).await {
            Ok(m) => m,
            Err(err) => {
                return Ok(vec![Signal::soft_error(
                    "moltbook",
                    SignalType::CommunityReputation,
                    err.to_string(),
                )])
            }
        };

        let karma_component = (member.karma as f64 / 2000.0).min(1.0) * 0.45;
        let followers_component = (member.followers as f64 / 500.0).min(1.0) * 0.2;
        let age_component = (member.account_age_days as f64 / 365.0).min(1.0) * 0.15;
        let claimed_component = if member.claimed { 0.1 } else { 0.0 };
        let active_component = if member.active { 0.1 } else { 0.0 };

        let score = (karma_component + followers_component + age_component + claimed_component + active_component)
            .clamp(0.0, 1.0);
        let confidence = (0.25 + (member.karma as f64 / 10000.0).min(0.25)).min(0.5);

        let signal = Signal::new("moltbook", SignalType::CommunityReputation, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("karma", member.karma)
            .with_evidence_entry("claimed", member.claimed)
            .with_evidence_entry("active", member.active);

        Ok(vec![signal])
    }

    async fn health(&self) -> ProviderHealth {
        ProviderHealth {
            status: HealthStatus::Healthy,
            ..ProviderHealth::unknown()
        }
    }
}

#[derive(Debug, Deserialize)]
struct MoltbookMember {
    karma: u64,
    followers: u64,
    claimed: bool,
    active: bool,
    account_age_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_only_moltbook_namespace() {
        let provider = MoltbookProvider::new("key".to_string(), Duration::from_secs(10));
        let subject = Subject::new(SubjectType::Agent, "moltbook", "alice");
        let other = Subject::new(SubjectType::Agent, "twitter", "alice");
        assert!(provider.supports(&subject));
        assert!(!provider.supports(&other));
    }
}
