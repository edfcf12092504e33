//! Consistency Analyzer
//!
//! Checks a batch of segment records for structural consistency: every story
//! (document id) declares how many segments it has and where each segment
//! sits, and the analyzer reports what does not add up.
//!
//! # Pipeline
//! 1. **Identifier pass**: unusable document ids are recorded once per raw
//!    value; distinct usable ids are counted.
//! 2. **Per-record loop** (input order, single pass):
//!    - create the document state on first sighting
//!    - log malformed counts (always, every occurrence)
//!    - establish or reconcile the expected count (first positive JSON
//!      integer wins; digit strings never set it)
//!    - validate the index (type, then range when a count is known)
//!    - store the record at its position, or classify it as a duplicate
//! 3. **Post-pass**: missing and extra positions per document.
//!
//! Nothing at record level aborts the run; every problem becomes an entry in
//! [`AnalysisResult`].
//!
//! # Ordering
//! A position accepted before the document's count is known is never
//! re-checked. If a later record establishes a smaller count, that position
//! surfaces under `extra_indices`.
//!
//! # Example
//! ```rust,ignore
//! use segaudit::analyzer::Analyzer;
//! use segaudit_common::FieldNames;
//!
//! let result = Analyzer::new(FieldNames::default()).analyze(&records);
//! println!("{} stories", result.distinct_stories_count);
//! ```

mod result;
mod state;


pub use result::{AnalysisResult, DuplicateCounts, IndexingErrors, InvalidDocumentId};
pub use state::DocumentState;

use segaudit_common::record::{display_value, field, valid_document_id, value_type_name};
use segaudit_common::{FieldNames, IntegerCoercion, Record};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Record-consistency analyzer
///
/// Owns all per-document state and the result for exactly one batch.
/// [`Analyzer::analyze`] consumes the analyzer; build a fresh one per batch.
/// The sub-steps are public so each can be driven in isolation.
pub struct Analyzer {
    fields: FieldNames,
    documents: BTreeMap<String, DocumentState>,
    result: AnalysisResult,
}

impl Analyzer {
    /// Create an analyzer reading the given field names
    pub fn new(fields: FieldNames) -> Self {
        Self {
            fields,
            documents: BTreeMap::new(),
            result: AnalysisResult::default(),
        }
    }

    /// Run the full pipeline over `records` and return the result.
    pub fn analyze(mut self, records: &[Record]) -> AnalysisResult {
        self.identify_invalid_document_ids(records);
        self.count_distinct_stories(records);

        for record in records {
            self.analyze_record(record);
        }

        self.identify_missing_indices();

        info!(
            records = records.len(),
            stories = self.result.distinct_stories_count,
            documents = self.documents.len(),
            invalid_ids = self.result.invalid_document_ids.len(),
            with_missing = self.result.missing.len(),
            clean = self.result.is_clean(),
            "Consistency analysis complete"
        );

        self.result
    }

    fn analyze_record(&mut self, record: &Record) {
        let Some(document_id) = self.ensure_document(field(record, &self.fields.document_id)) else {
            return;
        };

        let count = field(record, &self.fields.record_count);
        let index = field(record, &self.fields.record_index);

        self.check_document_count(count, document_id);
        self.reconcile_expected_count(count, document_id);

        if let Some(position) = self.validate_index(index, document_id) {
            self.record_position(record, position, document_id);
        }
    }

    /// Record every unusable document id, once per distinct raw value.
    ///
    /// Absent and `null` ids are the same raw value; the empty string is a
    /// different one.
    pub fn identify_invalid_document_ids(&mut self, records: &[Record]) {
        let mut logged: HashSet<String> = HashSet::new();

        for record in records {
            let raw = field(record, &self.fields.document_id);
            if valid_document_id(raw).is_some() {
                continue;
            }

            let raw = raw.cloned().unwrap_or(Value::Null);
            if !logged.insert(raw.to_string()) {
                continue;
            }

            let entity_id = field(record, &self.fields.entity_id)
                .cloned()
                .unwrap_or(Value::Null);

            debug!(document_id = %raw, entity_id = %entity_id, "Invalid document id");

            self.result.invalid_document_ids.push(InvalidDocumentId {
                document_id: raw,
                entity_id,
                record: record.clone(),
            });
        }
    }

    /// Count distinct usable document ids across the batch.
    pub fn count_distinct_stories(&mut self, records: &[Record]) -> usize {
        let distinct: HashSet<&str> = records
            .iter()
            .filter_map(|record| valid_document_id(field(record, &self.fields.document_id)))
            .collect();

        self.result.distinct_stories_count = distinct.len();
        self.result.distinct_stories_count
    }

    /// Create the state for a usable document id if it does not exist yet.
    ///
    /// Returns the id when usable, `None` when the record must be skipped.
    /// Existing state is never replaced.
    pub fn ensure_document<'v>(&mut self, document_id: Option<&'v Value>) -> Option<&'v str> {
        let id = valid_document_id(document_id)?;
        if !self.documents.contains_key(id) {
            debug!(document_id = id, "New document");
            self.documents.insert(id.to_string(), DocumentState::default());
        }
        Some(id)
    }

    /// Log `count` under `invalid_document_counts` unless it is a positive
    /// integer (or a digit-only string of one).
    ///
    /// Every invalid occurrence is appended verbatim, absent counts as `null`.
    pub fn check_document_count(&mut self, count: Option<&Value>, document_id: &str) {
        if IntegerCoercion::strict(count).positive().is_some() {
            return;
        }

        let raw = count.cloned().unwrap_or(Value::Null);
        debug!(document_id, count = %raw, "Invalid record count");
        self.result
            .invalid_document_counts
            .entry(document_id.to_string())
            .or_default()
            .push(raw);
    }

    /// Establish the expected count from the first positive JSON integer, or
    /// log a `count_mismatch` when a later one disagrees.
    ///
    /// Digit strings pass the count check but never set or contradict the
    /// expected count.
    pub fn reconcile_expected_count(&mut self, count: Option<&Value>, document_id: &str) {
        let Some(count) = IntegerCoercion::exact(count).positive() else {
            return;
        };

        let state = self.documents.entry(document_id.to_string()).or_default();
        match state.expected_count {
            None => {
                debug!(document_id, expected_count = count, "Expected count established");
                state.expected_count = Some(count);
            }
            Some(expected) if expected != count => {
                debug!(document_id, expected, found = count, "Record count mismatch");
                self.result
                    .indexing_errors
                    .entry(document_id.to_string())
                    .or_default()
                    .count_mismatch
                    .push(count);
            }
            Some(_) => {}
        }
    }

    /// Resolve `index` to a usable position.
    ///
    /// Booleans and non-coercible values produce an `invalid_type` entry.
    /// When the expected count is known, positions outside `1..=expected`
    /// produce an `out_of_range` entry (once per value) and are rejected on
    /// every occurrence. Without a known count any integer is accepted.
    pub fn validate_index(&mut self, index: Option<&Value>, document_id: &str) -> Option<i64> {
        let position = match IntegerCoercion::lenient(index) {
            IntegerCoercion::Integer(position) => position,
            IntegerCoercion::WasBoolean | IntegerCoercion::NotAnInteger => {
                let message = format!(
                    "Expected: int, Found: {} for index: {}",
                    value_type_name(index),
                    display_value(index)
                );
                debug!(document_id, %message, "Invalid record index type");
                self.result
                    .indexing_errors
                    .entry(document_id.to_string())
                    .or_default()
                    .invalid_type
                    .push(message);
                return None;
            }
        };

        let state = self.documents.entry(document_id.to_string()).or_default();
        if let Some(expected) = state.expected_count {
            if position < 1 || position > expected {
                if state.logged_out_of_range.insert(position) {
                    debug!(document_id, position, expected, "Record index out of range");
                    self.result
                        .indexing_errors
                        .entry(document_id.to_string())
                        .or_default()
                        .out_of_range
                        .push(position);
                }
                return None;
            }
        }

        Some(position)
    }

    /// Store `record` at `position`, or classify it as an identical or
    /// different duplicate of the record already stored there.
    pub fn record_position(&mut self, record: &Record, position: i64, document_id: &str) {
        let state = self.documents.entry(document_id.to_string()).or_default();
        let identical = state.stored_by_position.get(&position).map(|stored| stored == record);

        match identical {
            None => {
                state.stored_by_position.insert(position, record.clone());
                state.seen_positions.insert(position);
            }
            Some(true) => {
                let count = state.identical_duplicate_counts.entry(position).or_insert(0);
                *count += 1;
                debug!(document_id, position, count = *count, "Identical duplicate");
                self.result
                    .identical_duplicates
                    .entry(document_id.to_string())
                    .or_default()
                    .insert(position, *count);
            }
            Some(false) => {
                let count = state.different_duplicate_counts.entry(position).or_insert(0);
                *count += 1;
                debug!(document_id, position, count = *count, "Different duplicate");
                self.result
                    .different_duplicates
                    .entry(document_id.to_string())
                    .or_default()
                    .insert(position, *count);
            }
        }
    }

    /// Compute missing and extra positions for every document with a known
    /// expected count. Re-running replaces, never accumulates.
    pub fn identify_missing_indices(&mut self) {
        for (document_id, state) in &self.documents {
            let Some(expected) = state.expected_count else {
                continue;
            };

            let extra: Vec<i64> = state
                .seen_positions
                .iter()
                .copied()
                .filter(|position| *position > expected)
                .collect();
            if extra.is_empty() {
                self.result.extra_indices.remove(document_id);
            } else {
                self.result.extra_indices.insert(document_id.clone(), extra);
            }

            let missing: Vec<i64> = (1..=expected)
                .filter(|position| !state.seen_positions.contains(position))
                .collect();
            if missing.is_empty() {
                self.result.missing.remove(document_id);
            } else {
                debug!(document_id = %document_id, missing = missing.len(), "Missing positions");
                self.result.missing.insert(document_id.clone(), missing);
            }
        }
    }

    /// Field names this analyzer reads
    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    /// Working state for one document
    pub fn document(&self, document_id: &str) -> Option<&DocumentState> {
        self.documents.get(document_id)
    }

    /// Result accumulated so far
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Finish without running the post-pass
    pub fn into_result(self) -> AnalysisResult {
        self.result
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(FieldNames::default())
    }
}
