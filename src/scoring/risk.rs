//! Risk bucket, context escalation, recommendation, and human-label mapping

use crate::subject::EntityType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk bucket assigned to an adjusted `[0, 1]` score (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "minimal"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

impl RiskLevel {
    /// One step closer to `critical`; `critical` is a fixed point
    /// (spec.md §4.4 "Context escalation").
    pub fn escalate(self) -> Self {
        match self {
            RiskLevel::Minimal => RiskLevel::Low,
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium => RiskLevel::High,
            RiskLevel::High => RiskLevel::Critical,
            RiskLevel::Critical => RiskLevel::Critical,
        }
    }
}

/// The caller-supplied action context, used to decide whether the risk
/// bucket should escalate (spec.md §4.4, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Install,
    Execute,
    Delegate,
    Transact,
    Review,
}

/// Map an adjusted `[0, 1]` score to a risk bucket (spec.md §4.4).
/// Monotonic non-increasing: a higher score never yields a more severe
/// bucket.
pub fn map_risk(adjusted_score: f64) -> RiskLevel {
    if adjusted_score >= 0.8 {
        RiskLevel::Minimal
    } else if adjusted_score >= 0.6 {
        RiskLevel::Low
    } else if adjusted_score >= 0.4 {
        RiskLevel::Medium
    } else if adjusted_score >= 0.2 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Escalate the bucket one step toward `critical` when the context action
/// is `transact` or `delegate`; otherwise the bucket is unchanged
/// (spec.md §4.4).
pub fn apply_context(bucket: RiskLevel, action: Option<Action>) -> RiskLevel {
    match action {
        Some(Action::Transact) | Some(Action::Delegate) => bucket.escalate(),
        _ => bucket,
    }
}

/// The machine-actionable recommendation (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Allow,
    Install,
    Review,
    Caution,
    Deny,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Allow => write!(f, "allow"),
            Recommendation::Install => write!(f, "install"),
            Recommendation::Review => write!(f, "review"),
            Recommendation::Caution => write!(f, "caution"),
            Recommendation::Deny => write!(f, "deny"),
        }
    }
}

/// Deterministic `(bucket, adjusted score)` → recommendation table
/// (spec.md §4.4).
pub fn map_recommendation(bucket: RiskLevel, adjusted_score: f64) -> Recommendation {
    let high_score = adjusted_score >= 0.7;
    match bucket {
        RiskLevel::Minimal => Recommendation::Allow,
        RiskLevel::Low => {
            if high_score {
                Recommendation::Install
            } else {
                Recommendation::Allow
            }
        }
        RiskLevel::Medium => Recommendation::Review,
        RiskLevel::High => Recommendation::Caution,
        RiskLevel::Critical => Recommendation::Deny,
    }
}

/// A fixed, order-independent table keyed by `(entity-type, recommendation)`
/// producing a short emoji-prefixed phrase (spec.md §4.4). Presentation
/// only — never affects scoring.
pub fn human_label(entity_type: EntityType, recommendation: Recommendation) -> String {
    use EntityType::*;
    use Recommendation::*;

    let subject = match entity_type {
        Agent => "agent",
        Repo => "repository",
        Skill => "skill",
        Developer => "developer",
        Unknown => "entity",
    };

    let (emoji, verb) = match recommendation {
        Allow => ("✅", "looks safe"),
        Install => ("✅", "is well established"),
        Review => ("⚠️", "needs manual review"),
        Caution => ("🟠", "carries elevated risk"),
        Deny => ("⛔", "should be denied"),
    };

    format!("{emoji} This {subject} {verb}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_thresholds() {
        assert_eq!(map_risk(0.95), RiskLevel::Minimal);
        assert_eq!(map_risk(0.8), RiskLevel::Minimal);
        assert_eq!(map_risk(0.79), RiskLevel::Low);
        assert_eq!(map_risk(0.6), RiskLevel::Low);
        assert_eq!(map_risk(0.59), RiskLevel::Medium);
        assert_eq!(map_risk(0.4), RiskLevel::Medium);
        assert_eq!(map_risk(0.39), RiskLevel::High);
        assert_eq!(map_risk(0.2), RiskLevel::High);
        assert_eq!(map_risk(0.19), RiskLevel::Critical);
        assert_eq!(map_risk(0.0), RiskLevel::Critical);
    }

    #[test]
    fn risk_monotonic_non_increasing() {
        let samples = [0.0, 0.1, 0.19, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
        let mut prev = RiskLevel::Critical;
        for &s in &samples {
            let bucket = map_risk(s);
            assert!(bucket <= prev || s == samples[0], "bucket regressed at score {s}");
            prev = bucket;
        }
    }

    #[test]
    fn escalation_steps_toward_critical() {
        assert_eq!(apply_context(RiskLevel::Minimal, Some(Action::Transact)), RiskLevel::Low);
        assert_eq!(apply_context(RiskLevel::Low, Some(Action::Delegate)), RiskLevel::Medium);
        assert_eq!(apply_context(RiskLevel::Critical, Some(Action::Transact)), RiskLevel::Critical);
    }

    #[test]
    fn escalation_no_op_for_other_actions() {
        assert_eq!(apply_context(RiskLevel::Minimal, Some(Action::Install)), RiskLevel::Minimal);
        assert_eq!(apply_context(RiskLevel::Minimal, Some(Action::Execute)), RiskLevel::Minimal);
        assert_eq!(apply_context(RiskLevel::Minimal, Some(Action::Review)), RiskLevel::Minimal);
        assert_eq!(apply_context(RiskLevel::Minimal, None), RiskLevel::Minimal);
    }

    #[test]
    fn recommendation_table() {
        assert_eq!(map_recommendation(RiskLevel::Minimal, 0.5), Recommendation::Allow);
        assert_eq!(map_recommendation(RiskLevel::Low, 0.65), Recommendation::Allow);
        assert_eq!(map_recommendation(RiskLevel::Low, 0.7), Recommendation::Install);
        assert_eq!(map_recommendation(RiskLevel::Medium, 0.9), Recommendation::Review);
        assert_eq!(map_recommendation(RiskLevel::High, 0.3), Recommendation::Caution);
        assert_eq!(map_recommendation(RiskLevel::Critical, 0.0), Recommendation::Deny);
    }

    #[test]
    fn scenario_context_escalation() {
        // scenario 4: single strong signal escalated with action=transact
        let bucket = map_risk(0.86);
        assert_eq!(bucket, RiskLevel::Minimal);
        let escalated = apply_context(bucket, Some(Action::Transact));
        assert_eq!(escalated, RiskLevel::Low);
        assert_eq!(map_recommendation(escalated, 0.86), Recommendation::Install);
    }

    #[test]
    fn human_label_is_presentation_only() {
        let label = human_label(EntityType::Repo, Recommendation::Deny);
        assert!(label.contains("repository"));
        assert!(label.contains("⛔"));
    }
}
