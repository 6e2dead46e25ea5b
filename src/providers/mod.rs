//! Signal Provider trait and default provider registry (spec.md §4.1)

pub mod clawhub;
pub mod erc8004;
pub mod github;
pub mod http;
pub mod moltbook;
pub mod twitter;

use crate::error::Result;
use crate::signal::Signal;
use crate::subject::Subject;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health status of a provider (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A provider's self-reported health snapshot (spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub rolling_avg_latency_ms: f64,
    pub rolling_error_rate_1h: f64,
    pub dependency_map: Vec<String>,
}

impl ProviderHealth {
    /// The health snapshot a provider with no call history yet reports.
    pub fn unknown() -> Self {
        Self {
            status: HealthStatus::Healthy,
            last_check: Utc::now(),
            rolling_avg_latency_ms: 0.0,
            rolling_error_rate_1h: 0.0,
            dependency_map: Vec::new(),
        }
    }
}

/// Static, descriptive metadata about a provider (spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub supported_subject_types: Vec<crate::subject::SubjectType>,
    pub supported_namespaces: Vec<String>,
    pub signal_types_offered: Vec<crate::signal::SignalType>,
    pub soft_rate_limit: Option<u32>,
}

/// A request for a provider to evaluate a subject, carrying the caller's
/// deadline (spec.md §4.1).
#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub subject: Subject,
    pub deadline: Duration,
}

/// The capability trait every signal provider implements (spec.md §4.1).
/// Object-safe so the registry can hold a heterogeneous
/// `Vec<Arc<dyn SignalProvider>>`.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    fn metadata(&self) -> ProviderMetadata;

    /// Pure, O(1): inspects the subject's namespace only.
    fn supports(&self, subject: &Subject) -> bool;

    /// Produce zero or more signals about `request.subject`. MUST NOT
    /// raise for "subject not found" (return `Ok(vec![])` instead); MAY
    /// raise for transport/auth errors, though SHOULD prefer
    /// `Signal::soft_error` for those (spec.md §4.1).
    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>>;

    async fn health(&self) -> ProviderHealth;

    /// Narrow downcast for the resolver's opportunistic registry-link
    /// extraction (spec.md §4.3 step 1). Only the ERC-8004 provider
    /// overrides this; every other provider keeps the default `None`.
    fn as_linked_identifier_source(&self) -> Option<&dyn crate::identity::resolver::LinkedIdentifierSource> {
        None
    }
}

/// Build the default provider set from ambient credential availability
/// (spec.md §6 "Provider registration"). At minimum the GitHub, ERC-8004,
/// and marketplace (clawhub) providers are always registered; twitter and
/// moltbook register only when their respective credentials are present,
/// otherwise they would be pure no-ops anyway (spec.md §4.1).
pub fn default_providers(
    config: &crate::config::ProvidersConfig,
) -> Vec<std::sync::Arc<dyn SignalProvider>> {
    let mut providers: Vec<std::sync::Arc<dyn SignalProvider>> = Vec::new();

    providers.push(std::sync::Arc::new(github::GitHubProvider::new(
        config.github_token.clone(),
        config.provider_timeout(),
    )));

    providers.push(std::sync::Arc::new(erc8004::Erc8004Provider::new(
        config.erc8004_rpc_url.clone(),
        config.provider_timeout(),
    )));

    providers.push(std::sync::Arc::new(clawhub::ClawhubProvider::new(
        config.clawhub_base_url.clone(),
        config.provider_timeout(),
    )));

    if let Some(token) = &config.twitter_bearer_token {
        providers.push(std::sync::Arc::new(twitter::TwitterProvider::new(
            token.clone(),
            config.provider_timeout(),
        )));
    }

    if let Some(token) = &config.moltbook_api_key {
        providers.push(std::sync::Arc::new(moltbook::MoltbookProvider::new(
            token.clone(),
            config.provider_timeout(),
        )));
    }

    providers
}
