//! Output formatting for usagegate commands
//!
//! Human-readable text and tables, or pretty JSON with `--json`.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use usagegate_core::{AlertLevel, Dimension, LimitsConfig, QuotaStatus, UsageStats};

// ============================================================================
// Stats & Limits
// ============================================================================

/// Format today's usage counters
pub fn format_stats(stats: &UsageStats, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![format!("Usage for {}", stats.last_reset)];
    for dimension in Dimension::ALL {
        lines.push(format!(
            "  {:<17} {}",
            format!("{}:", dimension.field_name()),
            stats.get(dimension)
        ));
    }
    lines.join("\n")
}

/// Format the active tier limits
pub fn format_limits(limits: &LimitsConfig, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(limits).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![format!("Tier: {}", limits.tier.display_name())];
    for field in usagegate_core::models::LimitField::ALL {
        lines.push(format!(
            "  {:<23} {}",
            format!("{}:", field.field_name()),
            limits.get(field)
        ));
    }
    lines.join("\n")
}

// ============================================================================
// Quota Report
// ============================================================================

/// Format the per-action quota report as a table (or JSON)
pub fn format_report(report: &[QuotaStatus], json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "[]".to_string());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers = ["Action", "Used", "Limit", "Remaining", "Usage", "Status"];
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }

    for status in report {
        let usage = status
            .usage_pct
            .map(|pct| format!("{:.0}%", pct))
            .unwrap_or_else(|| "-".to_string());
        let level = alert_label(status.alert_level);
        let level_cell = if no_color {
            Cell::new(level)
        } else {
            Cell::new(level).fg(alert_color(status.alert_level))
        };

        table.add_row(Row::from(vec![
            Cell::new(status.action.as_str()),
            Cell::new(status.used),
            Cell::new(status.limit),
            Cell::new(status.remaining),
            Cell::new(usage),
            level_cell,
        ]));
    }

    table.to_string()
}

fn alert_label(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Safe => "ok",
        AlertLevel::Warning => "warning",
        AlertLevel::Critical => "critical",
        AlertLevel::Exceeded => "limit reached",
    }
}

fn alert_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Safe => Color::Green,
        AlertLevel::Warning => Color::Yellow,
        AlertLevel::Critical => Color::Red,
        AlertLevel::Exceeded => Color::Magenta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use usagegate_core::quota::quota_report;
    use usagegate_core::tier::limits_for;
    use usagegate_core::{AlertThresholds, Tier};

    fn stats() -> UsageStats {
        let mut stats = UsageStats::fresh(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        stats.pdf_downloads = 2;
        stats
    }

    #[test]
    fn test_format_stats_lists_every_dimension() {
        let out = format_stats(&stats(), false);
        assert!(out.starts_with("Usage for 2024-01-15"));
        for dimension in Dimension::ALL {
            assert!(out.contains(dimension.field_name()), "{}", dimension);
        }
    }

    #[test]
    fn test_format_stats_json() {
        let out = format_stats(&stats(), true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["pdfDownloads"], 2);
    }

    #[test]
    fn test_format_limits_shows_unlimited() {
        let out = format_limits(&limits_for(Tier::Pro), false);
        assert!(out.contains("Tier: Pro"));
        assert!(out.contains("unlimited"));
        assert!(out.contains("50"));
    }

    #[test]
    fn test_format_report_plain() {
        let report = quota_report(&stats(), &limits_for(Tier::Free), &AlertThresholds::default());
        let out = format_report(&report, false, true);
        assert!(out.contains("pdf_export"));
        assert!(out.contains("limit reached"));
        assert!(out.contains("batch_processing"));
    }
}
