//! Report rendering and output
//!
//! Renders an [`AnalysisResult`] plus entity id findings as plain text,
//! grouped by document, and appends it to a per-source log file.

use crate::analyzer::{AnalysisResult, DuplicateCounts};
use crate::entity_id::EntityIdFinding;
use segaudit_common::record::display_value;
use segaudit_common::{Error, FieldNames, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DOCUMENT_INDENT: &str = "    - ";
const DETAIL_INDENT: &str = "\n        ";
const RUN_SEPARATOR: &str = "\n\n-----\n\n";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Messages grouped by document, in first-mention order
#[derive(Default)]
struct Grouped {
    groups: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl Grouped {
    fn push(&mut self, document_id: &str, message: String) {
        match self.positions.get(document_id) {
            Some(&slot) => self.groups[slot].1.push(message),
            None => {
                self.positions.insert(document_id.to_string(), self.groups.len());
                self.groups.push((document_id.to_string(), vec![message]));
            }
        }
    }

    fn render_into(self, lines: &mut Vec<String>) {
        for (document_id, messages) in self.groups {
            lines.push(format!("\nDocument ID {document_id}:"));
            lines.extend(messages.into_iter().map(|m| format!("{DOCUMENT_INDENT}{m}")));
        }
    }
}

/// Render the analyzer result.
///
/// Always contains the distinct story count; every other section appears only
/// when it has something to say.
pub fn format_analysis(result: &AnalysisResult) -> String {
    let mut lines = vec![format!(
        "Number of distinct stories: {}",
        result.distinct_stories_count
    )];
    let mut grouped = Grouped::default();

    for document_id in result.reported_documents() {
        if let Some(missing) = result.missing.get(document_id) {
            grouped.push(document_id, format!("Missing indices: {}", bracketed(missing)));
        }
        if let Some(extra) = result.extra_indices.get(document_id) {
            grouped.push(document_id, format!("Extra indices: {}", bracketed(extra)));
        }
        if let Some(duplicates) = result.identical_duplicates.get(document_id) {
            if !duplicates.is_empty() {
                grouped.push(
                    document_id,
                    format!("Identical duplicate indices: {}", describe_duplicates(duplicates)),
                );
            }
        }
        if let Some(duplicates) = result.different_duplicates.get(document_id) {
            if !duplicates.is_empty() {
                grouped.push(
                    document_id,
                    format!("Different duplicate indices: {}", describe_duplicates(duplicates)),
                );
            }
        }
        if let Some(errors) = result.indexing_errors.get(document_id) {
            if !errors.invalid_type.is_empty() {
                grouped.push(
                    document_id,
                    format!(
                        "Invalid Type Errors:{DETAIL_INDENT}{}",
                        errors.invalid_type.join(DETAIL_INDENT)
                    ),
                );
            }
            if !errors.out_of_range.is_empty() {
                let mut out_of_range = errors.out_of_range.clone();
                out_of_range.sort_unstable();
                let detail: Vec<String> = out_of_range
                    .iter()
                    .map(|index| format!("Out of range index: {index}"))
                    .collect();
                grouped.push(
                    document_id,
                    format!("Out of Range Errors:{DETAIL_INDENT}{}", detail.join(DETAIL_INDENT)),
                );
            }
            if !errors.count_mismatch.is_empty() {
                grouped.push(
                    document_id,
                    format!("Count Mismatches: {}", bracketed(&errors.count_mismatch)),
                );
            }
        }
        if let Some(counts) = result.invalid_document_counts.get(document_id) {
            let rendered: Vec<String> = counts.iter().map(Value::to_string).collect();
            grouped.push(document_id, format!("Invalid Counts: [{}]", rendered.join(", ")));
        }
    }

    grouped.render_into(&mut lines);

    if !result.invalid_document_ids.is_empty() {
        lines.push("\n--- Invalid Document IDs ---".to_string());
        for entry in &result.invalid_document_ids {
            lines.push(format!(
                "{DOCUMENT_INDENT}Document ID {}: entity {}",
                entry.document_id, entry.entity_id
            ));
        }
    }

    lines.join("\n")
}

/// Render entity id findings, grouped by document id.
///
/// Returns an empty string when there are no findings.
pub fn format_entity_findings(findings: &[EntityIdFinding], fields: &FieldNames) -> String {
    if findings.is_empty() {
        return String::new();
    }

    let entity_field = &fields.entity_id;
    let mut grouped = Grouped::default();

    for finding in findings {
        let index = display_value(finding.record_index.as_ref());
        let message = match &finding.entity_id {
            None => format!("Missing {entity_field} at index {index}"),
            Some(entity_id) => format!("Invalid {entity_field}: '{entity_id}' at index {index}"),
        };
        grouped.push(&display_value(finding.document_id.as_ref()), message);
    }

    let mut lines = vec!["--- Entity ID Validation Logs ---".to_string()];
    grouped.render_into(&mut lines);
    lines.join("\n")
}

/// Full report for one source: label, analysis, then entity findings.
pub fn compose(
    result: &AnalysisResult,
    findings: &[EntityIdFinding],
    source_label: &str,
    fields: &FieldNames,
) -> String {
    let mut report = format!("{source_label}\n\n{}", format_analysis(result));
    let entity_logs = format_entity_findings(findings, fields);
    if !entity_logs.is_empty() {
        report.push_str("\n\n");
        report.push_str(&entity_logs);
    }
    report
}

/// Pretty JSON form of the analyzer result.
pub fn to_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Path of the log file for a source name.
pub fn log_file_path(log_directory: &Path, source_name: &str) -> PathBuf {
    log_directory.join(format!("{source_name}_logs.txt"))
}

/// Appends reports to `<log_directory>/<source>_logs.txt`
#[derive(Debug, Clone)]
pub struct ReportWriter {
    log_directory: PathBuf,
}

impl ReportWriter {
    pub fn new(log_directory: impl Into<PathBuf>) -> Self {
        Self {
            log_directory: log_directory.into(),
        }
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_directory
    }

    /// Append `report` to the source's log file and echo it to the console.
    ///
    /// Creates the directory if needed. Earlier runs in the same file are
    /// separated by a dashed line. Returns the file path.
    pub fn write(&self, source_name: &str, report: &str) -> Result<PathBuf> {
        if source_name.is_empty() || source_name.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!(
                "Source name must be a plain file name: {source_name:?}"
            )));
        }

        std::fs::create_dir_all(&self.log_directory)?;

        let path = log_file_path(&self.log_directory, source_name);
        let existed = path.exists();

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if existed {
            file.write_all(RUN_SEPARATOR.as_bytes())?;
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        writeln!(file, "{timestamp} - {report}")?;

        debug!(path = %path.display(), appended = existed, "Report written");
        info!("{report}");

        Ok(path)
    }
}

fn bracketed(values: &[i64]) -> String {
    let rendered: Vec<String> = values.iter().map(i64::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn describe_duplicates(duplicates: &DuplicateCounts) -> String {
    duplicates
        .iter()
        .map(|(index, count)| {
            let unit = if *count == 1 { "time" } else { "times" };
            format!("index: {index}, repeated: {count} {unit}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}
