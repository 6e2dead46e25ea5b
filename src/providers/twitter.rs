//! Twitter/X signal provider — `social_presence`
//!
//! Graceful no-op without credentials: `Pipeline::construct` simply does
//! not register this provider when no bearer token is configured
//! (spec.md §4.1).

use super::http::ProviderHttp;
use super::{EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider};
use crate::error::Result;
use crate::signal::{Signal, SignalType, OFF_CHAIN_TTL_SECS};
use crate::subject::{Subject, SubjectType};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.twitter.com/2";

pub struct TwitterProvider {
    http: ProviderHttp,
}

impl TwitterProvider {
    pub fn new(bearer_token: String, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(timeout).with_bearer_token(bearer_token),
        }
    }
}

#[async_trait]
impl SignalProvider for TwitterProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "twitter".to_string(),
            version: "1.0.0".to_string(),
            description: "Social-graph presence via the Twitter/X API".to_string(),
            supported_subject_types: vec![SubjectType::Agent],
            supported_namespaces: vec!["twitter".to_string()],
            signal_types_offered: vec![SignalType::SocialPresence],
            soft_rate_limit: Some(300),
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == "twitter"
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>> {
        let url = format!(
            "{BASE_URL}/users/by/username/{}?user.fields=created_at,public_metrics,verified,description",
            request.subject.id
        );

        let response: TwitterUserResponse = match self.http.get_json(&url).await {
            Ok(r) => r,
            Err(err) => {
                return Ok(vec![Signal::soft_error(
                    "twitter",
                    SignalType::SocialPresence,
                    err.to_string(),
                )])
            }
        };

        let user = response.data;
        let age_days = match chrono::DateTime::parse_from_rfc3339(&user.created_at) {
            Ok(dt) => (chrono::Utc::now() - dt.with_timezone(&chrono::Utc)).num_days().max(0),
            Err(_) => 0,
        };

        let followers_component = (user.public_metrics.followers_count as f64 / 5000.0).min(1.0) * 0.35;
        let age_component = (age_days as f64 / 1095.0).min(1.0) * 0.25;
        let tweets_component = (user.public_metrics.tweet_count as f64 / 1000.0).min(1.0) * 0.15;
        let listed_component = (user.public_metrics.listed_count as f64 / 50.0).min(1.0) * 0.1;
        let verified_component = if user.verified { 0.1 } else { 0.0 };
        let bio_component = if user.description.as_deref().unwrap_or("").is_empty() {
            0.0
        } else {
            0.05
        };

        let score = (followers_component + age_component + tweets_component + listed_component + verified_component + bio_component)
            .clamp(0.0, 1.0);
        let confidence = (0.25 + (user.public_metrics.followers_count as f64 / 20000.0).min(0.25)).min(0.5);

        let signal = Signal::new("twitter", SignalType::SocialPresence, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("followers", user.public_metrics.followers_count)
            .with_evidence_entry("account_age_days", age_days)
            .with_evidence_entry("verified", user.verified);

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
struct TwitterUserResponse {
    data: TwitterUser,
}

#[derive(Debug, Deserialize)]
struct TwitterUser {
    created_at: String,
    verified: bool,
    description: Option<String>,
    public_metrics: TwitterMetrics,
}

#[derive(Debug, Deserialize)]
struct TwitterMetrics {
    followers_count: u64,
    tweet_count: u64,
    listed_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_only_twitter_namespace() {
        let provider = TwitterProvider::new("token".to_string(), Duration::from_secs(10));
        let twitter_subject = Subject::new(SubjectType::Agent, "twitter", "jack");
        let other_subject = Subject::new(SubjectType::Agent, "github", "jack");
        assert!(provider.supports(&twitter_subject));
        assert!(!provider.supports(&other_subject));
    }
}
