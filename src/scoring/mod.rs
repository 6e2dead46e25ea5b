//! The scorer: pure functions only, never suspends (spec.md §4.4, §5).
//!
//! Everything here is side-effect free so the pipeline can call it without
//! holding any lock or awaiting anything.

pub mod opinion;
pub mod risk;

pub use opinion::{ev_adjust, fuse, fuse_all, signal_to_opinion, Opinion};
pub use risk::{apply_context, human_label, map_recommendation, map_risk, Action, Recommendation, RiskLevel};

use crate::signal::Signal;
use crate::subject::EntityType;

/// The fully-scored outcome of fusing a signal set: the fused opinion, its
/// projection, the Ev-Trust-adjusted score, risk bucket (pre-context),
/// and recommendation. `Pipeline::evaluate` attaches context escalation
/// and entity-type/label afterward since those need caller-supplied
/// context and the subject, which this function deliberately doesn't see.
#[derive(Debug, Clone)]
pub struct ScoredOpinion {
    pub opinion: Opinion,
    pub projected: f64,
    pub adjusted: f64,
    pub bucket: RiskLevel,
    pub recommendation: Recommendation,
}

/// Run the full scoring chain over a signal set: fuse → project →
/// Ev-Trust adjust → map risk → map recommendation (spec.md §4.5 step 9,
/// minus the context-escalation and labelling steps which need external
/// inputs).
pub fn score_signals(signals: &[Signal]) -> ScoredOpinion {
    let opinion = fuse_all(signals);
    let projected = opinion.project();
    let adjusted = ev_adjust(projected, signals);
    let bucket = map_risk(adjusted);
    let recommendation = map_recommendation(bucket, adjusted);

    ScoredOpinion {
        opinion,
        projected,
        adjusted,
        bucket,
        recommendation,
    }
}

/// Entity-type detection re-exported at module root for convenience
/// (spec.md §4.4 "Entity-type detection" lives logically in the scorer
/// even though its implementation is `Subject`-adjacent in `subject.rs`).
pub fn entity_type_for(namespace: &crate::subject::Namespace, id: &str) -> EntityType {
    crate::subject::detect_entity_type(namespace, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalType;

    #[test]
    fn score_signals_empty_is_vacuous_scenario() {
        let scored = score_signals(&[]);
        assert!((scored.projected - 0.5).abs() < 1e-9);
        assert!((scored.adjusted - 0.5).abs() < 1e-9);
        assert_eq!(scored.bucket, RiskLevel::Medium);
        assert_eq!(scored.recommendation, Recommendation::Review);
    }

    #[test]
    fn score_signals_single_strong_signal_scenario() {
        let signals = vec![Signal::new(
            "github",
            SignalType::AuthorReputation,
            0.9,
            0.9,
            3600,
        )];
        let scored = score_signals(&signals);
        assert!((scored.opinion.belief - 0.81).abs() < 1e-9);
        assert!((scored.adjusted - 0.86).abs() < 1e-6);
        assert_eq!(scored.bucket, RiskLevel::Minimal);
        assert_eq!(scored.recommendation, Recommendation::Allow);
    }
}
