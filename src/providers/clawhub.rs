//! ClawHub signal provider — `skill_adoption`, `author_portfolio`
//!
//! `id` prefix dispatches between a single skill and an author's
//! aggregate portfolio (spec.md §4.1 table).

use super::http::ProviderHttp;
use super::{EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider};
use crate::error::Result;
use crate::signal::{Signal, SignalType, OFF_CHAIN_TTL_SECS};
use crate::subject::{Subject, SubjectType};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct ClawhubProvider {
    http: ProviderHttp,
    base_url: String,
}

impl ClawhubProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            http: ProviderHttp::new(timeout),
            base_url,
        }
    }

    /// `id` prefix `skill/` vs `author/` vs bare → author (spec.md §4.1).
    fn dispatch_target(id: &str) -> ClawhubTarget<'_> {
        if let Some(skill) = id.strip_prefix("skill/") {
            ClawhubTarget::Skill(skill)
        } else if let Some(author) = id.strip_prefix("author/") {
            ClawhubTarget::Author(author)
        } else {
            ClawhubTarget::Author(id)
        }
    }

    async fn score_skill(&self, skill: &str) -> Result<Vec<Signal>> {
        let url = format!("{}/skills/{}", self.base_url, skill);
        let info: ClawhubSkill = match self.http.get_json(&url).await {
            Ok(i) => i,
            Err(err) => return Ok(vec![Signal::soft_error("clawhub", SignalType::SkillAdoption, err.to_string())]),
        };

        let installs_component = (info.current_installs as f64 / 1000.0).min(1.0) * 0.3;
        let total_installs_component = (info.total_installs as f64 / 5000.0).min(1.0) * 0.2;
        let stars_component = (info.stars as f64 / 200.0).min(1.0) * 0.2;
        let versions_component = (info.version_count as f64 / 10.0).min(1.0) * 0.15;
        let recency_component = if info.days_since_last_release <= 90 { 0.15 } else { 0.0 };

        let score = (installs_component + total_installs_component + stars_component + versions_component + recency_component)
            .clamp(0.0, 1.0);
        let confidence = (0.3 + (info.total_installs as f64 / 10000.0).min(0.2)).min(0.5);

        let signal = Signal::new("clawhub", SignalType::SkillAdoption, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("current_installs", info.current_installs)
            .with_evidence_entry("total_installs", info.total_installs)
            .with_evidence_entry("stars", info.stars);

        Ok(vec![signal])
    }

    async fn score_author(&self, author: &str) -> Result<Vec<Signal>> {
        let url = format!("{}/authors/{}", self.base_url, author);
        let info: ClawhubAuthor = match self.http.get_json(&url).await {
            Ok(i) => i,
            Err(err) => return Ok(vec![Signal::soft_error("clawhub", SignalType::AuthorPortfolio, err.to_string())]),
        };

        let skills_component = (info.skill_count as f64 / 10.0).min(1.0) * 0.3;
        let downloads_component = (info.total_downloads as f64 / 20000.0).min(1.0) * 0.35;
        let comments_component = (info.total_comments as f64 / 200.0).min(1.0) * 0.15;
        let breakout_component = if info.breakout_skill_count > 0 { 0.2 } else { 0.0 };

        let score = (skills_component + downloads_component + comments_component + breakout_component).clamp(0.0, 1.0);
        let confidence = (0.25 + (info.skill_count as f64 / 20.0).min(0.25)).min(0.5);

        let signal = Signal::new("clawhub", SignalType::AuthorPortfolio, score, confidence, OFF_CHAIN_TTL_SECS)
            .with_evidence_entry("skill_count", info.skill_count)
            .with_evidence_entry("total_downloads", info.total_downloads);

        Ok(vec![signal])
    }
}

enum ClawhubTarget<'a> {
    Skill(&'a str),
    Author(&'a str),
}

#[async_trait]
impl SignalProvider for ClawhubProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "clawhub".to_string(),
            version: "1.0.0".to_string(),
            description: "Skill marketplace adoption and author portfolio strength".to_string(),
            supported_subject_types: vec![SubjectType::Skill, SubjectType::Agent],
            supported_namespaces: vec!["clawhub".to_string()],
            signal_types_offered: vec![SignalType::SkillAdoption, SignalType::AuthorPortfolio],
            soft_rate_limit: Some(120),
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == "clawhub"
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Vec<Signal>> {
        match Self::dispatch_target(&request.subject.id) {
            ClawhubTarget::Skill(skill) => self.score_skill(skill).await,
            ClawhubTarget::Author(author) => self.score_author(author).await,
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
struct ClawhubSkill {
    current_installs: u64,
    total_installs: u64,
    stars: u64,
    version_count: u64,
    days_since_last_release: u64,
}

#[derive(Debug, Deserialize)]
struct ClawhubAuthor {
    skill_count: u64,
    total_downloads: u64,
    total_comments: u64,
    breakout_skill_count: u64,
}
