//! TrustResult — the single cross-boundary output of an evaluation

use crate::scoring::{Recommendation, RiskLevel};
use crate::signal::Signal;
use crate::subject::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a fraud-heuristic finding (spec.md §4.5 step 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSeverity {
    Medium,
    High,
}

/// A synthetic finding raised by the fraud-heuristic scan, never by a
/// provider directly (spec.md §4.5 step 8, §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudSignal {
    pub kind: String,
    pub severity: FraudSeverity,
    pub provider_name: Option<String>,
    pub detail: Option<String>,
}

impl FraudSignal {
    pub fn no_signals() -> Self {
        Self {
            kind: "no_signals".to_string(),
            severity: FraudSeverity::High,
            provider_name: None,
            detail: None,
        }
    }

    pub fn no_providers() -> Self {
        Self {
            kind: "no_providers".to_string(),
            severity: FraudSeverity::High,
            provider_name: None,
            detail: None,
        }
    }

    pub fn low_trust_signal(signal: &Signal) -> Self {
        Self {
            kind: "low_trust_signal".to_string(),
            severity: FraudSeverity::Medium,
            provider_name: Some(signal.provider_name.clone()),
            detail: Some(format!(
                "score={:.2} confidence={:.2}",
                signal.score, signal.confidence
            )),
        }
    }
}

/// A provider that failed or timed out during dispatch (spec.md §4.5
/// step 7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedEntry {
    pub provider_name: String,
    pub reason: String,
}

/// The single bounded output of `Pipeline::evaluate` (spec.md §3).
/// Invariant: `signals.is_empty()` implies `confidence == 0.0` and
/// exactly one fraud signal of kind `no_signals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustResult {
    pub subject_key: String,
    /// `0..=100`, two decimal places (spec.md §6).
    pub trust_score: f64,
    /// `0..=1`, four decimal places (spec.md §6).
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
    pub entity_type: EntityType,
    pub human_label: String,
    pub signals: Vec<Signal>,
    pub fraud_signals: Vec<FraudSignal>,
    pub unresolved: Vec<UnresolvedEntry>,
    pub evaluated_at: DateTime<Utc>,
    pub query_id: uuid::Uuid,
}

impl TrustResult {
    /// Round `adjusted * 100` to two decimal places (spec.md §4.5 step 11).
    pub fn format_trust_score(adjusted: f64) -> f64 {
        (adjusted * 100.0 * 100.0).round() / 100.0
    }

    /// Round `1 - u_fused` to four decimal places (spec.md §4.5 step 11).
    pub fn format_confidence(uncertainty: f64) -> f64 {
        let raw = (1.0 - uncertainty).clamp(0.0, 1.0);
        (raw * 10_000.0).round() / 10_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_trust_score_rounds_to_two_decimals() {
        assert_eq!(TrustResult::format_trust_score(0.86), 86.00);
        assert_eq!(TrustResult::format_trust_score(0.425), 42.50);
    }

    #[test]
    fn format_confidence_rounds_to_four_decimals() {
        assert_eq!(TrustResult::format_confidence(0.1), 0.9);
        assert_eq!(TrustResult::format_confidence(1.0), 0.0);
    }
}
