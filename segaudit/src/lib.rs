//! segaudit library interface
//!
//! Exposes the analyzer, entity id validator, loader and report renderer for
//! the binary and for integration testing.

pub mod analyzer;
pub mod entity_id;
pub mod loader;
pub mod report;

pub use analyzer::{AnalysisResult, Analyzer};
pub use entity_id::{EntityIdFinding, EntityIdValidator};
pub use loader::{JsonLinesSource, LoadError, LoadedRecords, RecordSource};
pub use report::ReportWriter;

use segaudit_common::FieldNames;
use std::path::Path;

/// Everything one audit run produces before rendering
#[derive(Debug, Clone)]
pub struct Audit {
    pub result: AnalysisResult,
    pub findings: Vec<EntityIdFinding>,
    pub loaded: LoadedRecords,
}

/// Load `input` and run both validators over the batch.
pub fn audit<S: RecordSource>(source: &S, input: &Path, fields: &FieldNames) -> Result<Audit, LoadError> {
    let loaded = source.load(input)?;
    let result = Analyzer::new(fields.clone()).analyze(&loaded.records);
    let findings = EntityIdValidator::new(fields.clone()).validate_records(&loaded.records);
    Ok(Audit {
        result,
        findings,
        loaded,
    })
}

/// Label used in the report header and log file name: the input's file name.
pub fn source_label(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
