// Activity log and result presentation
use chrono::{DateTime, Local};

use crate::extraction::confidence::{distribution_bar, ConfidenceSummary};
use crate::extraction::protocol::{Declaration, ExtractionResult, OutputFiles};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

/// Append-only, ordered status log. Never truncated or cleared
/// automatically; a new-file-load is the only reset point.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            time: Local::now(),
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Last `n` entries, oldest first
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

/// A downloadable output file affordance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub filename: String,
    pub url: String,
}

/// One entry per generated file, each independently fetchable
pub fn download_entries(output: &OutputFiles, base_url: &str) -> Vec<DownloadEntry> {
    let base = base_url.trim_end_matches('/');
    output
        .csv_files
        .iter()
        .map(|name| DownloadEntry {
            filename: name.clone(),
            url: format!("{base}/download/{name}"),
        })
        .collect()
}

/// Confidence summary block: overall percentage, tier counts with
/// distribution bars, then capped low-confidence and warning details.
pub fn confidence_block(summary: &ConfidenceSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Overall confidence: {}", summary.overall),
        format!("Fields scored: {}", summary.total),
        format!(
            "  high   {:>4}  {}",
            summary.high,
            distribution_bar(summary.high, summary.total, BAR_WIDTH)
        ),
        format!(
            "  medium {:>4}  {}",
            summary.medium,
            distribution_bar(summary.medium, summary.total, BAR_WIDTH)
        ),
        format!(
            "  low    {:>4}  {}",
            summary.low,
            distribution_bar(summary.low, summary.total, BAR_WIDTH)
        ),
    ];
    if !summary.low_fields.is_empty() {
        lines.push("Low-confidence fields:".to_string());
        for field in &summary.low_fields {
            lines.push(format!("  - {field}"));
        }
    }
    if !summary.warnings.is_empty() {
        lines.push("Warnings:".to_string());
        for warning in &summary.warnings {
            lines.push(format!("  - {warning}"));
        }
    }
    lines
}

/// One-line count summary of the extracted groups
pub fn group_counts(data: &Declaration) -> String {
    format!(
        "{} assets, {} statements, {} positions, {} relatives",
        data.assets.len(),
        data.statements.len(),
        data.submitter_positions.len(),
        data.relatives.len()
    )
}

/// Tabular preview of the structured records, grouped by entity kind.
/// Empty groups are omitted; a lone notice stands in when nothing at all
/// was extracted.
pub fn preview(data: &Declaration) -> Vec<String> {
    if data.is_empty() {
        return vec!["(no data extracted)".to_string()];
    }

    let mut lines = Vec::new();

    if let Some(person) = &data.submitter {
        lines.push("Submitter".to_string());
        lines.push(format!(
            "  {} {} {}{}",
            person.title,
            person.first_name,
            person.last_name,
            person
                .age
                .map(|a| format!(" (age {a})"))
                .unwrap_or_default()
        ));
    }

    if let Some(person) = &data.spouse {
        lines.push("Spouse".to_string());
        lines.push(format!(
            "  {} {} {}{}",
            person.title,
            person.first_name,
            person.last_name,
            person
                .age
                .map(|a| format!(" (age {a})"))
                .unwrap_or_default()
        ));
    }

    if !data.relatives.is_empty() {
        lines.push(format!("Relatives ({})", data.relatives.len()));
        for person in &data.relatives {
            lines.push(format!(
                "  {} {} {}",
                person.title, person.first_name, person.last_name
            ));
        }
    }

    if !data.submitter_positions.is_empty() {
        lines.push(format!("Positions ({})", data.submitter_positions.len()));
        for position in &data.submitter_positions {
            let span = match (
                position.position_start_year.is_empty(),
                position.position_ending_year.is_empty(),
            ) {
                (false, false) => format!(
                    "  {} - {}",
                    position.position_start_year, position.position_ending_year
                ),
                (false, true) => format!("  {} -", position.position_start_year),
                _ => String::new(),
            };
            lines.push(format!("  {}{}", position.position_name, span));
        }
    }

    if !data.assets.is_empty() {
        lines.push(format!("Assets ({})", data.assets.len()));
        lines.push(format!("  {:<30} {:>14}  {}", "name", "valuation", "owned by"));
        for asset in &data.assets {
            lines.push(format!(
                "  {:<30} {:>14}  {}",
                truncate(&asset.asset_name, 30),
                asset
                    .valuation
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
                asset.owners.labels()
            ));
        }
    }

    if !data.statements.is_empty() {
        lines.push(format!("Statements ({})", data.statements.len()));
        lines.push(format!("  {:<30} {:>14}  {}", "name", "valuation", "owned by"));
        for statement in &data.statements {
            lines.push(format!(
                "  {:<30} {:>14}  {}",
                truncate(&statement.statement_name, 30),
                statement
                    .valuation
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
                statement.owners.labels()
            ));
        }
    }

    lines
}

/// Everything the shell shows for a settled extraction: confidence block
/// when reported, download affordances when files were generated.
pub fn result_block(result: &ExtractionResult, base_url: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(report) = &result.confidence {
        lines.extend(confidence_block(&ConfidenceSummary::from_report(report)));
    }
    if let Some(output) = &result.output {
        let entries = download_entries(output, base_url);
        if !entries.is_empty() {
            lines.push(format!("Generated files ({}):", entries.len()));
            for entry in &entries {
                lines.push(format!("  {} -> {}", entry.filename, entry.url));
            }
        }
    }
    if let Some(data) = &result.data {
        lines.push(group_counts(data));
    }
    lines
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::protocol::{Asset, Ownership, Person};
    use pretty_assertions::assert_eq;

    #[test]
    fn log_is_append_only_and_ordered() {
        let mut log = ActivityLog::default();
        log.info("loading");
        log.success("loaded");
        log.error("boom");
        let messages: Vec<_> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["loading", "loaded", "boom"]);
        assert_eq!(log.entries()[2].severity, Severity::Error);
    }

    #[test]
    fn tail_returns_most_recent_entries() {
        let mut log = ActivityLog::default();
        for i in 0..10 {
            log.info(format!("line {i}"));
        }
        let tail = log.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].message, "line 7");
        assert_eq!(log.tail(100).len(), 10);
    }

    #[test]
    fn two_files_yield_two_independent_entries() {
        let output = OutputFiles {
            csv_files: vec!["a.csv".to_string(), "b.csv".to_string()],
            count: 2,
        };
        let entries = download_entries(&output, "http://localhost:5001");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "http://localhost:5001/download/a.csv");
        assert_eq!(entries[1].url, "http://localhost:5001/download/b.csv");
    }

    #[test]
    fn missing_output_shows_no_download_list() {
        let result = ExtractionResult::default();
        let lines = result_block(&result, "http://localhost:5001");
        assert!(lines.iter().all(|l| !l.contains("Generated files")));
    }

    #[test]
    fn empty_declaration_previews_as_single_notice() {
        let lines = preview(&Declaration::default());
        assert_eq!(lines, vec!["(no data extracted)".to_string()]);
    }

    #[test]
    fn empty_groups_are_omitted_from_preview() {
        let data = Declaration {
            assets: vec![Asset {
                asset_name: "Land plot".to_string(),
                valuation: Some(1_200_000.0),
                owners: Ownership {
                    owner_by_submitter: true,
                    owner_by_spouse: true,
                    owner_by_child: false,
                },
                ..Default::default()
            }],
            ..Default::default()
        };
        let lines = preview(&data);
        assert!(lines.iter().any(|l| l.starts_with("Assets (1)")));
        assert!(lines.iter().all(|l| !l.starts_with("Statements")));
        assert!(lines.iter().all(|l| !l.starts_with("Relatives")));
        // Joint ownership shows both role labels
        assert!(lines.iter().any(|l| l.contains("submitter, spouse")));
    }

    #[test]
    fn submitter_preview_includes_age_when_present() {
        let data = Declaration {
            submitter: Some(Person {
                title: "Mr.".to_string(),
                first_name: "Arthit".to_string(),
                last_name: "S.".to_string(),
                age: Some(52),
                ..Default::default()
            }),
            ..Default::default()
        };
        let lines = preview(&data);
        assert!(lines.iter().any(|l| l.contains("(age 52)")));
    }
}
