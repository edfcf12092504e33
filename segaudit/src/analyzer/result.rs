//! Analysis result types
//!
//! Every per-document map is keyed by a document id that passed identifier
//! validation. Maps are ordered (document id, then position) so rendering and
//! JSON output are deterministic. Per-document containers are created on
//! first write through `entry(..).or_default()`.

use segaudit_common::Record;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Duplicate counts for one document, keyed by position
pub type DuplicateCounts = BTreeMap<i64, usize>;

/// Indexing problems recorded for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexingErrors {
    /// Non-coercible indices, as "Expected: int, Found: <type> for index: <value>"
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_type: Vec<String>,
    /// Indices outside 1..=expected_count, each value at most once
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub out_of_range: Vec<i64>,
    /// Integer counts disagreeing with the established expected count, every occurrence
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub count_mismatch: Vec<i64>,
}

impl IndexingErrors {
    pub fn is_empty(&self) -> bool {
        self.invalid_type.is_empty() && self.out_of_range.is_empty() && self.count_mismatch.is_empty()
    }
}

/// A record whose document id is unusable (first occurrence of each raw id)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidDocumentId {
    /// Raw document id (`null` when absent)
    pub document_id: Value,
    /// Raw entity id of the record (`null` when absent)
    pub entity_id: Value,
    /// The full offending record
    pub record: Record,
}

/// Outcome of one analyzer run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Positions in 1..=expected_count never accepted, ascending
    pub missing: BTreeMap<String, Vec<i64>>,
    /// Accepted positions above expected_count, ascending
    pub extra_indices: BTreeMap<String, Vec<i64>>,
    pub identical_duplicates: BTreeMap<String, DuplicateCounts>,
    pub different_duplicates: BTreeMap<String, DuplicateCounts>,
    pub indexing_errors: BTreeMap<String, IndexingErrors>,
    pub invalid_document_ids: Vec<InvalidDocumentId>,
    /// Raw offending `record_count` values, every occurrence
    pub invalid_document_counts: BTreeMap<String, Vec<Value>>,
    pub distinct_stories_count: usize,
}

impl AnalysisResult {
    /// True when the batch showed no structural problem of any kind.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.extra_indices.is_empty()
            && self.identical_duplicates.is_empty()
            && self.different_duplicates.is_empty()
            && self.indexing_errors.values().all(IndexingErrors::is_empty)
            && self.invalid_document_ids.is_empty()
            && self.invalid_document_counts.is_empty()
    }

    /// Ids of every document mentioned in any per-document section, ordered.
    pub fn reported_documents(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .missing
            .keys()
            .chain(self.extra_indices.keys())
            .chain(self.identical_duplicates.keys())
            .chain(self.different_duplicates.keys())
            .chain(self.indexing_errors.keys())
            .chain(self.invalid_document_counts.keys())
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
