//! Fraud-heuristic scan over a collected signal set (spec.md §4.5 step 8)

use crate::result::FraudSignal;
use crate::signal::Signal;

const LOW_TRUST_SCORE_CEILING: f64 = 0.1;
const LOW_TRUST_CONFIDENCE_FLOOR: f64 = 0.7;

/// Scan collected signals for fraud-shaped patterns:
/// - empty signal set -> `no_signals`, severity `high`
/// - any signal with `score < 0.1 && confidence > 0.7` -> `low_trust_signal`,
///   severity `medium`, referencing the offending signal
///
/// Does not fuse, score, or otherwise interpret the signals beyond this.
pub fn scan(signals: &[Signal]) -> Vec<FraudSignal> {
    if signals.is_empty() {
        return vec![FraudSignal::no_signals()];
    }

    signals
        .iter()
        .filter(|s| s.score < LOW_TRUST_SCORE_CEILING && s.confidence > LOW_TRUST_CONFIDENCE_FLOOR)
        .map(FraudSignal::low_trust_signal)
        .collect()
}
