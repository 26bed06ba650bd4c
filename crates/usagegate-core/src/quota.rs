//! Quota status and limit alerts
//!
//! Summarizes each gated action for UI badges and upgrade prompts: how much
//! was used today, the cap, what is left, and an alert level against
//! configurable warning/critical thresholds.

use crate::models::{ActionKind, Limit, LimitsConfig, Remaining, UsageStats};
use serde::{Deserialize, Serialize};

/// Alert level based on quota usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Usage < warning threshold (or unlimited)
    Safe,
    /// Usage >= warning threshold
    Warning,
    /// Usage >= critical threshold
    Critical,
    /// Usage >= 100%, next attempt is denied
    Exceeded,
}

/// Warning/critical thresholds in percent of a cap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning: 75.0,
            critical: 90.0,
        }
    }
}

/// Quota status of one gated action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub action: ActionKind,
    /// Counter value for today
    pub used: u64,
    pub limit: Limit,
    pub remaining: Remaining,
    /// Usage percentage (0.0-999.9, clamped for display), None if unlimited
    pub usage_pct: Option<f64>,
    pub alert_level: AlertLevel,
}

impl QuotaStatus {
    /// Same rule as the gate: strictly below the cap
    pub fn is_allowed(&self) -> bool {
        self.limit.allows(self.used)
    }
}

/// Calculate quota status of `action` from today's stats and the limits
pub fn calculate_quota_status(
    action: ActionKind,
    stats: &UsageStats,
    limits: &LimitsConfig,
    thresholds: &AlertThresholds,
) -> QuotaStatus {
    let used = stats.get(action.dimension());
    let limit = limits.get(action.limit_field());

    let usage_pct = limit.cap().map(|cap| {
        if cap == 0 {
            // A zero cap is exhausted from the start
            100.0
        } else {
            (used as f64 / cap as f64 * 100.0).min(999.9)
        }
    });

    QuotaStatus {
        action,
        used,
        limit,
        remaining: limit.remaining(used),
        usage_pct,
        alert_level: determine_alert_level(usage_pct, thresholds),
    }
}

/// Status of every gated action, in [`ActionKind::ALL`] order
pub fn quota_report(
    stats: &UsageStats,
    limits: &LimitsConfig,
    thresholds: &AlertThresholds,
) -> Vec<QuotaStatus> {
    ActionKind::ALL
        .iter()
        .map(|action| calculate_quota_status(*action, stats, limits, thresholds))
        .collect()
}

/// Determine alert level from usage percentage and thresholds
fn determine_alert_level(usage_pct: Option<f64>, thresholds: &AlertThresholds) -> AlertLevel {
    let Some(usage_pct) = usage_pct else {
        return AlertLevel::Safe;
    };
    if usage_pct >= 100.0 {
        AlertLevel::Exceeded
    } else if usage_pct >= thresholds.critical {
        AlertLevel::Critical
    } else if usage_pct >= thresholds.warning {
        AlertLevel::Warning
    } else {
        AlertLevel::Safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::tier::limits_for;
    use chrono::NaiveDate;

    fn stats() -> UsageStats {
        UsageStats::fresh(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn test_status_within_limit() {
        let mut stats = stats();
        stats.comparisons = 1;
        let status = calculate_quota_status(
            ActionKind::Comparison,
            &stats,
            &limits_for(Tier::Free),
            &AlertThresholds::default(),
        );

        assert_eq!(status.used, 1);
        assert_eq!(status.remaining, Remaining::Limited(2));
        assert_eq!(status.alert_level, AlertLevel::Safe);
        assert!(status.is_allowed());
        let pct = status.usage_pct.unwrap();
        assert!((pct - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_status_exhausted() {
        let mut stats = stats();
        stats.pdf_downloads = 2;
        let status = calculate_quota_status(
            ActionKind::PdfExport,
            &stats,
            &limits_for(Tier::Free),
            &AlertThresholds::default(),
        );

        assert_eq!(status.alert_level, AlertLevel::Exceeded);
        assert_eq!(status.remaining, Remaining::Limited(0));
        assert!(!status.is_allowed());
    }

    #[test]
    fn test_zero_cap_is_exceeded_immediately() {
        let status = calculate_quota_status(
            ActionKind::BatchProcessing,
            &stats(),
            &limits_for(Tier::Free),
            &AlertThresholds::default(),
        );
        assert_eq!(status.usage_pct, Some(100.0));
        assert_eq!(status.alert_level, AlertLevel::Exceeded);
    }

    #[test]
    fn test_unlimited_is_always_safe() {
        let mut stats = stats();
        stats.pdf_downloads = 10_000;
        let status = calculate_quota_status(
            ActionKind::PdfExport,
            &stats,
            &limits_for(Tier::Pro),
            &AlertThresholds::default(),
        );
        assert_eq!(status.usage_pct, None);
        assert_eq!(status.alert_level, AlertLevel::Safe);
        assert_eq!(status.remaining, Remaining::Unlimited);
    }

    #[test]
    fn test_determine_alert_level() {
        let thresholds = AlertThresholds {
            warning: 75.0,
            critical: 90.0,
        };

        assert_eq!(determine_alert_level(Some(50.0), &thresholds), AlertLevel::Safe);
        assert_eq!(determine_alert_level(Some(75.0), &thresholds), AlertLevel::Warning);
        assert_eq!(determine_alert_level(Some(90.0), &thresholds), AlertLevel::Critical);
        assert_eq!(determine_alert_level(Some(100.0), &thresholds), AlertLevel::Exceeded);
        assert_eq!(determine_alert_level(Some(120.0), &thresholds), AlertLevel::Exceeded);
        assert_eq!(determine_alert_level(None, &thresholds), AlertLevel::Safe);
    }

    #[test]
    fn test_report_covers_every_action() {
        let report = quota_report(&stats(), &limits_for(Tier::Free), &AlertThresholds::default());
        let actions: Vec<_> = report.iter().map(|s| s.action).collect();
        assert_eq!(actions, ActionKind::ALL.to_vec());
    }
}
