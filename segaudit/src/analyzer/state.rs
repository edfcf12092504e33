//! Per-document working state
//!
//! One `DocumentState` exists per distinct valid document id. It is created on
//! the first record carrying that id, mutated through the run and dropped with
//! the analyzer. The analyzer mirrors duplicate counts into the result at the
//! point of mutation; the state never points back at the result.

use segaudit_common::Record;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    /// Set once from the first positive JSON integer count, immutable afterwards
    pub(crate) expected_count: Option<i64>,
    /// Positions accepted as first-seen valid indices
    pub(crate) seen_positions: BTreeSet<i64>,
    /// First record stored at each position
    pub(crate) stored_by_position: BTreeMap<i64, Record>,
    pub(crate) identical_duplicate_counts: BTreeMap<i64, usize>,
    pub(crate) different_duplicate_counts: BTreeMap<i64, usize>,
    /// Out-of-range values already reported
    pub(crate) logged_out_of_range: BTreeSet<i64>,
}

impl DocumentState {
    pub fn expected_count(&self) -> Option<i64> {
        self.expected_count
    }

    pub fn seen_positions(&self) -> &BTreeSet<i64> {
        &self.seen_positions
    }

    /// The canonical (first) record stored at `position`.
    pub fn stored(&self, position: i64) -> Option<&Record> {
        self.stored_by_position.get(&position)
    }

    pub fn identical_duplicates(&self, position: i64) -> usize {
        self.identical_duplicate_counts.get(&position).copied().unwrap_or(0)
    }

    pub fn different_duplicates(&self, position: i64) -> usize {
        self.different_duplicate_counts.get(&position).copied().unwrap_or(0)
    }

    pub fn out_of_range_logged(&self, position: i64) -> bool {
        self.logged_out_of_range.contains(&position)
    }
}
