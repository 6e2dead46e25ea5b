//! End-to-end pipeline tests against fake providers (spec.md §8 scenarios).

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trust_aggregator::config::Config;
use trust_aggregator::error::Result;
use trust_aggregator::pipeline::{ConstructOptions, EvaluationContext, Pipeline};
use trust_aggregator::providers::{
    EvaluateRequest, HealthStatus, ProviderHealth, ProviderMetadata, SignalProvider,
};
use trust_aggregator::scoring::Action;
use trust_aggregator::signal::{Signal, SignalType};
use trust_aggregator::subject::{Subject, SubjectType};

/// A provider that always claims a fixed namespace and returns a canned
/// signal set, counting how many times it was actually invoked — used to
/// assert in-flight dedup coalesces concurrent callers onto one call.
struct FakeProvider {
    namespace: &'static str,
    signals: Vec<Signal>,
    call_count: Arc<AtomicUsize>,
    latency: Duration,
}

impl FakeProvider {
    fn new(namespace: &'static str, signals: Vec<Signal>) -> Self {
        Self {
            namespace,
            signals,
            call_count: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl SignalProvider for FakeProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: format!("fake-{}", self.namespace),
            version: "0.0.0".to_string(),
            description: "test double".to_string(),
            supported_subject_types: vec![SubjectType::Agent],
            supported_namespaces: vec![self.namespace.to_string()],
            signal_types_offered: vec![],
            soft_rate_limit: None,
        }
    }

    fn supports(&self, subject: &Subject) -> bool {
        subject.namespace.as_str() == self.namespace
    }

    async fn evaluate(&self, _request: EvaluateRequest) -> Result<Vec<Signal>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.signals.clone())
    }

    async fn health(&self) -> ProviderHealth {
        ProviderHealth {
            status: HealthStatus::Healthy,
            ..ProviderHealth::unknown()
        }
    }
}

fn signal(score: f64, confidence: f64) -> Signal {
    Signal::new("fake", SignalType::AuthorReputation, score, confidence, 3600)
}

fn pipeline_with(providers: Vec<Arc<dyn SignalProvider>>) -> Pipeline {
    Pipeline::construct(ConstructOptions {
        providers,
        config: Config::default(),
    })
}

#[tokio::test]
async fn scenario_vacuous_fusion_yields_review() {
    let provider = Arc::new(FakeProvider::new("acme", vec![]));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "acme", "nobody");
    let result = pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert_eq!(result.trust_score, 50.00);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.risk_level.to_string(), "medium");
    assert_eq!(result.recommendation.to_string(), "review");
    assert_eq!(result.fraud_signals.len(), 1);
    assert_eq!(result.fraud_signals[0].kind, "no_signals");
}

#[tokio::test]
async fn scenario_single_strong_signal_yields_allow() {
    let provider = Arc::new(FakeProvider::new("acme", vec![signal(0.9, 0.9)]));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "acme", "trusted");
    let result = pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert_eq!(result.trust_score, 86.00);
    assert_eq!(result.risk_level.to_string(), "minimal");
    assert_eq!(result.recommendation.to_string(), "allow");
}

#[tokio::test]
async fn scenario_dogmatic_disagreement_yields_review() {
    let a = Arc::new(FakeProvider::new("acme", vec![signal(0.0, 1.0)]));
    let b = Arc::new(FakeProvider::new("acme", vec![signal(1.0, 1.0)]));
    let pipeline = pipeline_with(vec![a, b]);

    let subject = Subject::new(SubjectType::Agent, "acme", "split-verdict");
    let result = pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert!((result.trust_score - 42.50).abs() < 1e-6);
    assert_eq!(result.risk_level.to_string(), "medium");
    assert_eq!(result.recommendation.to_string(), "review");
}

#[tokio::test]
async fn scenario_context_escalation_downgrades_install_to_low_risk() {
    let provider = Arc::new(FakeProvider::new("acme", vec![signal(0.9, 0.9)]));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "acme", "trusted");
    let context = EvaluationContext {
        action: Some(Action::Transact),
    };
    let result = pipeline.evaluate(subject, context).await.unwrap();

    assert_eq!(result.risk_level.to_string(), "low");
    assert_eq!(result.recommendation.to_string(), "install");
}

#[tokio::test]
async fn scenario_no_provider_supports_namespace_yields_deny() {
    let provider = Arc::new(FakeProvider::new("acme", vec![signal(0.9, 0.9)]));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "unknown-ns", "x");
    let result = pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert_eq!(result.trust_score, 0.0);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.risk_level.to_string(), "critical");
    assert_eq!(result.recommendation.to_string(), "deny");
    assert_eq!(result.fraud_signals[0].kind, "no_providers");
}

#[tokio::test]
async fn scenario_low_trust_high_confidence_is_flagged() {
    let provider = Arc::new(FakeProvider::new(
        "acme",
        vec![signal(0.05, 0.9), signal(0.2, 0.4)],
    ));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "acme", "suspicious");
    let result = pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert!(result
        .fraud_signals
        .iter()
        .any(|f| f.kind == "low_trust_signal"));
}

#[tokio::test]
async fn scenario_concurrent_evaluate_coalesces_to_one_provider_call() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut provider = FakeProvider::new("acme", vec![signal(0.8, 0.8)]).with_latency(Duration::from_millis(200));
    provider.call_count = Arc::clone(&counter);
    let pipeline = Arc::new(pipeline_with(vec![Arc::new(provider)]));

    let subject = Subject::new(SubjectType::Agent, "acme", "popular");

    let pipeline_a = Arc::clone(&pipeline);
    let subject_a = subject.clone();
    let pipeline_b = Arc::clone(&pipeline);
    let subject_b = subject.clone();

    let (result_a, result_b) = tokio::join!(
        pipeline_a.evaluate(subject_a, EvaluationContext::default()),
        pipeline_b.evaluate(subject_b, EvaluationContext::default())
    );

    let result_a = result_a.unwrap();
    let result_b = result_b.unwrap();

    assert_eq!(result_a.query_id, result_b.query_id);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_aggregates_every_registered_provider() {
    let a = Arc::new(FakeProvider::new("acme", vec![]));
    let b = Arc::new(FakeProvider::new("other", vec![]));
    let pipeline = pipeline_with(vec![a, b]);

    let statuses = pipeline.health().await;
    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|(_, h)| h.status == HealthStatus::Healthy));
}

#[tokio::test]
async fn invalidate_clears_a_cached_result() {
    let provider = Arc::new(FakeProvider::new("acme", vec![signal(0.9, 0.9)]));
    let pipeline = pipeline_with(vec![provider]);

    let subject = Subject::new(SubjectType::Agent, "acme", "trusted");
    let key = subject.key();
    pipeline
        .evaluate(subject, EvaluationContext::default())
        .await
        .unwrap();

    assert!(pipeline.invalidate(&key));
    assert!(!pipeline.invalidate(&key));
}
