//! Subjective Logic opinion algebra — signal → opinion, fusion, projection
//!
//! Pure functions only. The scorer never suspends and holds no state
//! (spec.md §5 "The scorer is pure and never suspends").

use crate::signal::Signal;
use serde::{Deserialize, Serialize};

/// Guard below which two opinions are considered "both dogmatic" for the
/// purposes of cumulative belief fusion (spec.md §4.4, §9). Kept as a named
/// constant rather than inlined so the guard's rationale stays attached to
/// one definition.
const DOGMATIC_GUARD: f64 = 1e-10;

/// A Subjective Logic opinion `(b, d, u, a)` with `b + d + u = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub belief: f64,
    pub disbelief: f64,
    pub uncertainty: f64,
    pub base_rate: f64,
}

impl Opinion {
    pub fn new(belief: f64, disbelief: f64, uncertainty: f64, base_rate: f64) -> Self {
        Self {
            belief,
            disbelief,
            uncertainty,
            base_rate,
        }
    }

    /// The vacuous opinion `(0, 0, 1, 0.5)` — total uncertainty, neutral
    /// base rate.
    pub fn vacuous() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.5)
    }

    /// The projected expectation `b + a·u`, clamped to `[0, 1]`.
    pub fn project(&self) -> f64 {
        (self.belief + self.base_rate * self.uncertainty).clamp(0.0, 1.0)
    }

    /// `b + d + u` — should equal `1.0` within `1e-9` for any opinion
    /// produced by this module (spec.md §8 invariant).
    pub fn mass_sum(&self) -> f64 {
        self.belief + self.disbelief + self.uncertainty
    }
}

/// Signal → Opinion (spec.md §4.4): `c = clamp(confidence)`, `s =
/// clamp(score)`, `(b = s·c, d = (1−s)·c, u = 1−c, a = 0.5)`.
pub fn signal_to_opinion(signal: &Signal) -> Opinion {
    let c = signal.confidence.clamp(0.0, 1.0);
    let s = signal.score.clamp(0.0, 1.0);
    Opinion::new(s * c, (1.0 - s) * c, 1.0 - c, 0.5)
}

/// Cumulative Belief Fusion of two opinions (spec.md §4.4).
///
/// `κ = u_A + u_B − u_A·u_B`. If `κ < 1e-10` (both dogmatic), the fused
/// opinion is the pairwise arithmetic mean of `(b, d, a)` with `u = 0`.
/// Otherwise belief/disbelief are weighted by the other opinion's
/// uncertainty, and base rate uses a separate denominator that falls back
/// to the mean when it is itself ≈ 0.
pub fn fuse(a: Opinion, b: Opinion) -> Opinion {
    let kappa = a.uncertainty + b.uncertainty - a.uncertainty * b.uncertainty;

    if kappa < DOGMATIC_GUARD {
        return Opinion::new(
            (a.belief + b.belief) / 2.0,
            (a.disbelief + b.disbelief) / 2.0,
            0.0,
            (a.base_rate + b.base_rate) / 2.0,
        );
    }

    let belief = (a.belief * b.uncertainty + b.belief * a.uncertainty) / kappa;
    let disbelief = (a.disbelief * b.uncertainty + b.disbelief * a.uncertainty) / kappa;
    let uncertainty = (a.uncertainty * b.uncertainty) / kappa;

    let base_rate_denom = kappa - 2.0 * a.uncertainty * b.uncertainty;
    let base_rate = if base_rate_denom.abs() < DOGMATIC_GUARD {
        (a.base_rate + b.base_rate) / 2.0
    } else {
        (a.base_rate * (b.uncertainty - a.uncertainty * b.uncertainty)
            + b.base_rate * (a.uncertainty - a.uncertainty * b.uncertainty))
            / base_rate_denom
    };

    Opinion::new(belief, disbelief, uncertainty, base_rate)
}

/// Fuse an ordered sequence of signals into a single opinion, via an
/// associative left-fold over `fuse`. Zero signals yields the vacuous
/// opinion; one signal yields its own opinion unchanged (spec.md §4.4).
pub fn fuse_all(signals: &[Signal]) -> Opinion {
    let mut opinions = signals.iter().map(signal_to_opinion);
    match opinions.next() {
        None => Opinion::vacuous(),
        Some(first) => opinions.fold(first, fuse),
    }
}

/// Evolutionary-stability adjustment (spec.md §4.4): when `|signals| >= 2`
/// and the score range exceeds `0.4`, multiply the projected score by
/// `(1 − λ·range)` with `λ = 0.15`. Otherwise the projection is unchanged.
/// Never increases the score; result clamped to `[0, 1]`.
pub fn ev_adjust(projected: f64, signals: &[Signal]) -> f64 {
    const LAMBDA: f64 = 0.15;
    const RANGE_THRESHOLD: f64 = 0.4;

    if signals.len() < 2 {
        return projected.clamp(0.0, 1.0);
    }

    let mut min_score = f64::INFINITY;
    let mut max_score = f64::NEG_INFINITY;
    for s in signals {
        let clamped = s.score.clamp(0.0, 1.0);
        min_score = min_score.min(clamped);
        max_score = max_score.max(clamped);
    }
    let range = max_score - min_score;

    if range > RANGE_THRESHOLD {
        (projected * (1.0 - LAMBDA * range)).clamp(0.0, 1.0)
    } else {
        projected.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalType;

    fn signal(score: f64, confidence: f64) -> Signal {
        Signal::new("test", SignalType::AuthorReputation, score, confidence, 3600)
    }

    #[test]
    fn mass_sums_to_one() {
        let op = signal_to_opinion(&signal(0.73, 0.42));
        assert!((op.mass_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fusing_with_vacuous_is_identity() {
        let op = signal_to_opinion(&signal(0.6, 0.8));
        let fused = fuse(op, Opinion::vacuous());
        assert!((fused.belief - op.belief).abs() < 1e-9);
        assert!((fused.disbelief - op.disbelief).abs() < 1e-9);
        assert!((fused.uncertainty - op.uncertainty).abs() < 1e-9);
    }

    #[test]
    fn fusing_with_more_certain_opinion_never_increases_uncertainty() {
        let uncertain = signal_to_opinion(&signal(0.5, 0.2));
        let certain = signal_to_opinion(&signal(0.9, 0.95));
        let fused = fuse(uncertain, certain);
        assert!(fused.uncertainty <= uncertain.uncertainty + 1e-9);
    }

    #[test]
    fn project_vacuous_is_half() {
        assert!((Opinion::vacuous().project() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn project_dogmatic_belief_is_one() {
        let op = Opinion::new(1.0, 0.0, 0.0, 0.5);
        assert!((op.project() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn project_dogmatic_disbelief_is_zero() {
        let op = Opinion::new(0.0, 1.0, 0.0, 0.5);
        assert!((op.project() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_single_strong_signal() {
        let op = signal_to_opinion(&signal(0.9, 0.9));
        assert!((op.belief - 0.81).abs() < 1e-9);
        assert!((op.disbelief - 0.09).abs() < 1e-9);
        assert!((op.uncertainty - 0.10).abs() < 1e-9);
    }

    #[test]
    fn scenario_dogmatic_disagreement() {
        // signals {0.0, 1.0} and {1.0, 1.0} are both fully confident and thus
        // both dogmatic (u = 0): fusion falls back to the arithmetic mean.
        let a = signal_to_opinion(&signal(0.0, 1.0));
        let b = signal_to_opinion(&signal(1.0, 1.0));
        let fused = fuse(a, b);
        assert!((fused.uncertainty - 0.0).abs() < 1e-9);
        assert!((fused.belief - 0.5).abs() < 1e-9);

        let signals = vec![signal(0.0, 1.0), signal(1.0, 1.0)];
        let projected = fused.project();
        assert!((projected - 0.5).abs() < 1e-9);
        let adjusted = ev_adjust(projected, &signals);
        // range = 1.0 > 0.4 => factor (1 - 0.15) = 0.85
        assert!((adjusted - 0.425).abs() < 1e-9);
    }

    #[test]
    fn ev_adjust_never_increases_score() {
        let signals = vec![signal(0.1, 0.9), signal(0.9, 0.9)];
        let projected = fuse_all(&signals).project();
        let adjusted = ev_adjust(projected, &signals);
        assert!(adjusted <= projected + 1e-9);
    }

    #[test]
    fn ev_adjust_identity_below_two_signals() {
        let signals = vec![signal(0.3, 0.5)];
        let projected = fuse_all(&signals).project();
        assert!((ev_adjust(projected, &signals) - projected).abs() < 1e-9);
    }

    #[test]
    fn ev_adjust_identity_when_range_not_exceeded() {
        let signals = vec![signal(0.5, 0.8), signal(0.7, 0.8)];
        let projected = fuse_all(&signals).project();
        assert!((ev_adjust(projected, &signals) - projected).abs() < 1e-9);
    }

    #[test]
    fn fuse_all_empty_is_vacuous() {
        let opinion = fuse_all(&[]);
        assert_eq!(opinion, Opinion::vacuous());
    }

    #[test]
    fn fuse_all_single_is_own_opinion() {
        let s = signal(0.7, 0.6);
        let opinion = fuse_all(std::slice::from_ref(&s));
        assert_eq!(opinion, signal_to_opinion(&s));
    }
}
