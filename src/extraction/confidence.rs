// Confidence tier bucketing and display formatting
use crate::config::{HIGH_CONFIDENCE, MAX_DETAIL_ENTRIES, MEDIUM_CONFIDENCE};

use super::protocol::ConfidenceReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Fixed thresholds: high >= 0.90, medium >= 0.70, low below.
    pub fn of(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if score >= MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Overall confidence as a percentage with one decimal, e.g. "87.3%"
pub fn format_overall(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Per-field confidence as a whole percentage, e.g. "62%"
pub fn format_field(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

/// Tier distribution bar, filled proportionally to count/total
pub fn distribution_bar(count: u32, total: u32, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((count as usize * width) / total as usize).min(width)
    };
    let mut bar = "\u{2588}".repeat(filled);
    bar.push_str(&"\u{2591}".repeat(width - filled));
    bar
}

/// Presentational aggregation of a backend confidence report. Counts are
/// taken as reported (the backend already classified them); only the
/// low-confidence detail list is formatted per entry, capped at 5.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceSummary {
    pub overall: String,
    pub overall_tier: Option<ConfidenceTier>,
    pub total: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub low_fields: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfidenceSummary {
    pub fn from_report(report: &ConfidenceReport) -> Self {
        let counts = report.field_count;
        Self {
            overall: format_overall(report.overall_confidence),
            overall_tier: Some(ConfidenceTier::of(report.overall_confidence)),
            total: counts.total,
            high: counts.high_confidence,
            medium: counts.medium_confidence,
            low: counts.low_confidence,
            low_fields: report
                .low_confidence_fields
                .iter()
                .take(MAX_DETAIL_ENTRIES)
                .map(|f| format!("{}: {}", f.field, format_field(f.confidence)))
                .collect(),
            warnings: report
                .validation_warnings
                .iter()
                .take(MAX_DETAIL_ENTRIES)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::protocol::{FieldCount, LowConfidenceField};
    use pretty_assertions::assert_eq;

    fn report_with_low_fields(n: usize) -> ConfidenceReport {
        ConfidenceReport {
            overall_confidence: 0.873,
            field_count: FieldCount {
                total: 10,
                high_confidence: 7,
                medium_confidence: 2,
                low_confidence: 1,
            },
            low_confidence_fields: (0..n)
                .map(|i| LowConfidenceField {
                    field: format!("field_{i}"),
                    confidence: 0.615,
                })
                .collect(),
            validation_warnings: vec![],
        }
    }

    #[test]
    fn tier_thresholds_are_inclusive_at_the_bottom() {
        assert_eq!(ConfidenceTier::of(0.90), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::of(0.95), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::of(0.899), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::of(0.70), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::of(0.699), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::of(0.0), ConfidenceTier::Low);
    }

    #[test]
    fn overall_formats_with_one_decimal() {
        assert_eq!(format_overall(0.873), "87.3%");
        assert_eq!(format_overall(1.0), "100.0%");
        assert_eq!(format_overall(0.0), "0.0%");
    }

    #[test]
    fn field_detail_rounds_to_whole_percent() {
        assert_eq!(format_field(0.615), "62%");
        assert_eq!(format_field(0.5), "50%");
    }

    #[test]
    fn tier_counts_sum_to_total() {
        let summary = ConfidenceSummary::from_report(&report_with_low_fields(1));
        assert_eq!(summary.high + summary.medium + summary.low, summary.total);
        assert_eq!(summary.overall, "87.3%");
    }

    #[test]
    fn low_field_detail_is_capped_at_five() {
        let summary = ConfidenceSummary::from_report(&report_with_low_fields(8));
        assert_eq!(summary.low_fields.len(), 5);
        assert_eq!(summary.low_fields[0], "field_0: 62%");
    }

    #[test]
    fn absent_counts_render_as_zero() {
        let summary = ConfidenceSummary::from_report(&ConfidenceReport::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.overall, "0.0%");
        assert!(summary.low_fields.is_empty());
    }

    #[test]
    fn distribution_bar_fills_proportionally() {
        assert_eq!(distribution_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(distribution_bar(0, 10, 4), "░░░░");
        assert_eq!(distribution_bar(3, 0, 4), "░░░░");
    }
}
