//! Evaluation Pipeline — orchestrates a single query end to end (spec.md §4.5)

pub mod cache;
pub mod dedup;
pub mod fraud;

use crate::config::Config;
use crate::error::Result;
use crate::identity::{IdentityGraph, IdentityResolver};
use crate::providers::{self, EvaluateRequest, HealthStatus, ProviderHealth, SignalProvider};
use crate::result::{FraudSignal, TrustResult, UnresolvedEntry};
use crate::scoring::{self, Action, RiskLevel};
use crate::signal::Signal;
use crate::subject::{detect_entity_type, Subject, SubjectKey};
use cache::{ResultCache, SweeperHandle};
use dedup::{InFlightTable, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Adapts an `Arc<dyn SignalProvider>` that happens to also implement
/// `LinkedIdentifierSource` (currently only the ERC-8004 provider) into
/// an owned `Arc<dyn LinkedIdentifierSource>` for the resolver.
struct ProviderLinkSource(Arc<dyn SignalProvider>);

#[async_trait::async_trait]
impl crate::identity::resolver::LinkedIdentifierSource for ProviderLinkSource {
    async fn linked_identifiers(&self, id: &str) -> Result<Vec<crate::identity::resolver::DeclaredLink>> {
        match self.0.as_linked_identifier_source() {
            Some(source) => source.linked_identifiers(id).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Caller-supplied evaluation context (spec.md §6).
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationContext {
    pub action: Option<Action>,
}

/// The provider registry plus the shared mutable state: cache, in-flight
/// table, and identity graph (spec.md §5 "Shared resources").
pub struct Pipeline {
    providers: Vec<Arc<dyn SignalProvider>>,
    provider_timeout: Duration,
    graph: Arc<IdentityGraph>,
    resolver: IdentityResolver,
    cache: Arc<ResultCache>,
    inflight: Arc<InFlightTable>,
    default_cache_ttl: Duration,
    _sweeper: SweeperHandle,
}

/// Options accepted by `Pipeline::construct` (spec.md §6). An empty
/// `providers` auto-builds the default set from ambient credentials.
pub struct ConstructOptions {
    pub providers: Vec<Arc<dyn SignalProvider>>,
    pub config: Config,
}

impl Pipeline {
    /// `Pipeline.construct({providers?, providerTimeoutMs?, ...})`
    /// (spec.md §6).
    pub fn construct(options: ConstructOptions) -> Self {
        let ConstructOptions { providers, config } = options;

        let providers = if providers.is_empty() {
            providers::default_providers(&config.providers)
        } else {
            providers
        };

        let graph = Arc::new(IdentityGraph::new());

        // `IdentityResolver` needs an owned `Arc<dyn LinkedIdentifierSource>`,
        // but providers are held as `Arc<dyn SignalProvider>`; re-wrap the
        // matching provider behind a thin adapter rather than downcasting.
        let erc8004_source: Option<Arc<dyn crate::identity::resolver::LinkedIdentifierSource>> = providers
            .iter()
            .find(|p| p.metadata().name == "erc8004")
            .map(|p| Arc::new(ProviderLinkSource(Arc::clone(p))) as Arc<dyn crate::identity::resolver::LinkedIdentifierSource>);

        let resolver = IdentityResolver::new(Arc::clone(&graph), erc8004_source);
        let cache = Arc::new(ResultCache::new());
        let sweeper = SweeperHandle::spawn_with_interval(
            Arc::clone(&cache),
            Duration::from_secs(config.cache.sweep_interval_secs),
        );

        Self {
            providers,
            provider_timeout: config.providers.provider_timeout(),
            graph,
            resolver,
            cache,
            inflight: Arc::new(InFlightTable::new()),
            default_cache_ttl: Duration::from_secs(config.cache.default_ttl_secs),
            _sweeper: sweeper,
        }
    }

    /// Expose the identity graph so an external challenge workflow can
    /// call `graph.addLink(...)` on verification (spec.md §6). The
    /// pipeline itself never writes to the graph, only the resolver does.
    pub fn identity_graph(&self) -> &Arc<IdentityGraph> {
        &self.graph
    }

    /// `Pipeline.evaluate({subject, context?}) → TrustResult`
    /// (spec.md §4.5, §6).
    #[instrument(skip(self), fields(subject = %subject.key()))]
    pub async fn evaluate(&self, subject: Subject, context: EvaluationContext) -> Result<TrustResult> {
        // Step 1: canonicalise subject-key.
        let key = subject.key();

        // Step 2: cache probe.
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        // Step 3: in-flight probe.
        let guard = match self.inflight.probe(key.clone()) {
            ProbeOutcome::Follow(mut rx) => {
                return rx
                    .recv()
                    .await
                    .map_err(|_| crate::error::Error::Invariant("in-flight sender dropped without completing".into()));
            }
            ProbeOutcome::Lead(guard) => guard,
        };

        let result = self.evaluate_uncached(&subject, &key, context).await;
        guard.complete(result.clone());
        Ok(result)
    }

    async fn evaluate_uncached(&self, subject: &Subject, key: &SubjectKey, context: EvaluationContext) -> TrustResult {
        // Step 4: resolve cohort.
        let cohort = self.resolver.resolve(subject).await;

        // Step 5: build dispatch set.
        let mut dispatch: Vec<(Arc<dyn SignalProvider>, Subject)> = Vec::new();
        for member in &cohort.all {
            for provider in &self.providers {
                if provider.supports(member) {
                    dispatch.push((Arc::clone(provider), member.clone()));
                }
            }
        }

        // Step 6: empty dispatch set -> synthetic "no providers" result.
        if dispatch.is_empty() {
            warn!(subject = %key, "no provider supports this subject's namespace");
            return self.no_providers_result(key);
        }

        // Step 7: dispatch all pairs concurrently, racing each against the
        // per-provider timeout.
        let timeout = self.provider_timeout;
        let calls = dispatch.into_iter().map(|(provider, member)| {
            let timeout = timeout;
            async move {
                let request = EvaluateRequest {
                    subject: member,
                    deadline: timeout,
                };
                let name = provider.metadata().name;
                match tokio::time::timeout(timeout, provider.evaluate(request)).await {
                    Ok(Ok(signals)) => Ok(signals),
                    Ok(Err(err)) => Err(UnresolvedEntry {
                        provider_name: name,
                        reason: err.to_string(),
                    }),
                    Err(_) => Err(UnresolvedEntry {
                        provider_name: name,
                        reason: format!("timed out after {}ms", timeout.as_millis()),
                    }),
                }
            }
        });

        let outcomes = futures::future::join_all(calls).await;

        let mut signals: Vec<Signal> = Vec::new();
        let mut unresolved: Vec<UnresolvedEntry> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(mut provider_signals) => signals.append(&mut provider_signals),
                Err(entry) => unresolved.push(entry),
            }
        }

        // Step 8: fraud-heuristic scan.
        let mut fraud_signals = fraud::scan(&signals);

        // Step 9: fuse -> project -> Ev-Trust adjust -> map risk -> apply
        // context -> map recommendation -> entity type -> label.
        let scored = scoring::score_signals(&signals);
        let bucket = scoring::apply_context(scored.bucket, context.action);
        let recommendation = scoring::map_recommendation(bucket, scored.adjusted);
        let entity_type = detect_entity_type(&subject.namespace, &subject.id);
        let human_label = scoring::human_label(entity_type, recommendation);

        // spec.md §3 invariant: no signals => exactly one no_signals fraud
        // entry, already guaranteed by fraud::scan; nothing further needed.
        if signals.is_empty() && fraud_signals.is_empty() {
            fraud_signals.push(FraudSignal::no_signals());
        }

        // Step 10: cached TTL = min of signal TTLs (default if none).
        let ttl = signals
            .iter()
            .map(|s| Duration::from_secs(s.ttl_seconds))
            .min()
            .unwrap_or(self.default_cache_ttl);

        // Step 11: publish TrustResult.
        let result = TrustResult {
            subject_key: key.as_str().to_string(),
            trust_score: TrustResult::format_trust_score(scored.adjusted),
            confidence: TrustResult::format_confidence(scored.opinion.uncertainty),
            risk_level: bucket,
            recommendation,
            entity_type,
            human_label,
            signals,
            fraud_signals,
            unresolved,
            evaluated_at: chrono::Utc::now(),
            query_id: uuid::Uuid::new_v4(),
        };

        // Step 12: store in cache (in-flight cleanup happens in `evaluate`
        // via the guard's RAII `Drop`/`complete`).
        self.cache.put(key.clone(), result.clone(), ttl);

        info!(
            subject = %key,
            trust_score = result.trust_score,
            risk_level = %result.risk_level,
            recommendation = %result.recommendation,
            "evaluation complete"
        );

        result
    }

    fn no_providers_result(&self, key: &SubjectKey) -> TrustResult {
        TrustResult {
            subject_key: key.as_str().to_string(),
            trust_score: 0.0,
            confidence: 0.0,
            risk_level: RiskLevel::Critical,
            recommendation: scoring::Recommendation::Deny,
            entity_type: crate::subject::EntityType::Unknown,
            human_label: scoring::human_label(crate::subject::EntityType::Unknown, scoring::Recommendation::Deny),
            signals: Vec::new(),
            fraud_signals: vec![FraudSignal::no_providers()],
            unresolved: Vec::new(),
            evaluated_at: chrono::Utc::now(),
            query_id: uuid::Uuid::new_v4(),
        }
    }

    /// `Pipeline.invalidate(subjectKey)` (spec.md §6).
    pub fn invalidate(&self, key: &SubjectKey) -> bool {
        self.cache.invalidate(key)
    }

    /// `Pipeline.health() → list of {provider, status, last_check}`
    /// (spec.md §6). Aggregates each provider's `health()`.
    pub async fn health(&self) -> Vec<(String, ProviderHealth)> {
        let futures = self.providers.iter().map(|p| async move {
            let name = p.metadata().name;
            let health = p.health().await;
            (name, health)
        });
        futures::future::join_all(futures).await
    }

    /// Whether every registered provider is currently healthy — a
    /// convenience aggregate over `health()`.
    pub async fn is_healthy(&self) -> bool {
        self.health()
            .await
            .iter()
            .all(|(_, h)| h.status == HealthStatus::Healthy)
    }
}
