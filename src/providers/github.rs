//! GitHub signal provider — `author_reputation` and `repo_health`
//!
//! `id = "owner"` scores author reputation from the account itself;
//! `id = "owner/repo"` scores repo health from the repository (spec.md
//! §4.1 table).

use super::http::ProviderHttp;
use super::{EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider};
use crate::error::Result;
use crate::signal::{Signal, SignalType, ON_CHAIN_TTL_SECS, OFF_CHAIN_TTL_SECS};
use crate::subject::{Subject, SubjectType};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.github.com";

pub struct GitHubProvider {
    http: ProviderHttp,
}

impl GitHubProvider {
    pub fn new(token: Option<String>, timeout: Duration) -> Self {
        let mut http = ProviderHttp::new(timeout);
        if let Some(token) = token {
            http = http.with_bearer_token(token);
        }
        Self { http }
    }

    async fn score_user(&self, login: &str) -> Result<Vec<Signal>> {
        let url = format!("{BASE_URL}/users/{login}");
        let user: GitHubUser = match self.http.get_json(&url).await {
            Ok(u) => u,
            Err(err) => return Ok(vec![Signal::soft_error("github", SignalType::AuthorReputation, err.to_string())]),
        };

        // Each input is clamped by a ceiling before being weighted, and the
        // weights sum to <= 1 (spec.md §4.1 "Scoring contract").
        let followers_component = (user.followers as f64 / 1000.0).min(1.0) * 0.4;
        let repos_component = (user.public_repos as f64 / 50.0).min(1.0) * 0.3;
        let age_days = account_age_days(&user.created_at);
        let age_component = (age_days as f64 / 730.0).min(1.0) * 0.3;

        let score = (followers_component + repos_component + age_component).clamp(0.0, 1.0);
        // Confidence grows with sample size; a single account lookup is a
        // single observation, capped at 0.5 (spec.md §4.1).
        let confidence = (0.2 + (user.public_repos as f64 / 100.0).min(0.3)).min(0.5);

        let signal = Signal::new("github", SignalType::AuthorReputation, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("followers", user.followers)
            .with_evidence_entry("public_repos", user.public_repos)
            .with_evidence_entry("account_age_days", age_days);

        Ok(vec![signal])
    }

    async fn score_repo(&self, owner: &str, repo: &str) -> Result<Vec<Signal>> {
        let url = format!("{BASE_URL}/repos/{owner}/{repo}");
        let info: GitHubRepo = match self.http.get_json(&url).await {
            Ok(r) => r,
            Err(err) => return Ok(vec![Signal::soft_error("github", SignalType::RepoHealth, err.to_string())]),
        };

        let stars_component = (info.stargazers_count as f64 / 500.0).min(1.0) * 0.25;
        let forks_component = (info.forks_count as f64 / 100.0).min(1.0) * 0.15;
        let days_since_push = days_since(&info.pushed_at);
        let freshness_component = (1.0 - (days_since_push as f64 / 180.0).min(1.0)) * 0.25;
        let license_component = if info.license.is_some() { 0.15 } else { 0.0 };
        let open_issues_component = if info.open_issues_count == 0 {
            0.2
        } else {
            (1.0 - (info.open_issues_count as f64 / 200.0).min(1.0)) * 0.2
        };

        let score = (stars_component + forks_component + freshness_component + license_component + open_issues_component)
            .clamp(0.0, 1.0);
        let confidence = (0.3 + (info.stargazers_count as f64 / 1000.0).min(0.2)).min(0.5);

        let signal = Signal::new("github", SignalType::RepoHealth, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("stars", info.stargazers_count)
            .with_evidence_entry("forks", info.forks_count)
            .with_evidence_entry("days_since_push", days_since_push)
            .with_evidence_entry("open_issues", info.open_issues_count)
            .with_evidence_entry("has_license", info.license.is_some());

        Ok(vec![signal])
    }
}

#[async_trait]
impl SignalProvider for GitHubProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "github".to_string(),
            version: "1.0.0".to_string(),
            description: "Source-code hosting reputation via the GitHub REST API".to_string(),
            supported_subject_types: vec![SubjectType::Agent, SubjectType::Skill],
            supported_namespaces: vec!["github".to_string()],
            signal_types_offered: vec![SignalType::AuthorReputation, SignalType::RepoHealth],
            soft_rate_limit: Some(60),
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == "github"
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>> {
        let id = request.subject.id.as_str();
        match id.split_once('/') {
            Some((owner, repo)) => self.score_repo(owner, repo).await,
            None => self.score_user(id).await,
        }
    }

    async fn health(&self) -> ProviderHealth {
        ProviderHealth {
            status: HealthStatus::Healthy,
            ..ProviderHealth::unknown()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    followers: u64,
    public_repos: u64,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    pushed_at: String,
    license: Option<serde_json::Value>,
}

fn account_age_days(created_at: &str) -> i64 {
    days_since(created_at)
}

fn days_since(timestamp: &str) -> i64 {
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => (chrono::Utc::now() - dt.with_timezone(&chrono::Utc)).num_days().max(0),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_owner_vs_owner_repo() {
        assert_eq!("octocat".split_once('/'), None);
        assert_eq!("octocat/hello-world".split_once('/'), Some(("octocat", "hello-world")));
    }

    #[test]
    fn metadata_advertises_github_namespace() {
        let provider = GitHubProvider::new(None, Duration::from_secs(10));
        let meta = provider.metadata();
        assert_eq!(meta.supported_namespaces, vec!["github".to_string()]);
    }

    #[test]
    fn supports_only_github_namespace() {
        let provider = GitHubProvider::new(None, Duration::from_secs(10));
        let github_subject = Subject::new(SubjectType::Agent, "github", "octocat");
        let other_subject = Subject::new(SubjectType::Agent, "twitter", "octocat");
        assert!(provider.supports(&github_subject));
        assert!(!provider.supports(&other_subject));
    }
}
