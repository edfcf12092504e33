//! Record loading
//!
//! Reads a JSON-lines file, one record object per line, optionally packed as
//! the first file member of a `.zip` archive.
//!
//! Archives are extracted into a scratch directory that lives only for the
//! duration of [`RecordSource::load`]; it is removed on success and on error.
//! Malformed lines never abort a load: they are collected as
//! [`SkippedLine`]s and the rest of the batch is returned.

use segaudit_common::Record;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Record loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input path does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Archive holds no file member
    #[error("Archive contains no file: {0}")]
    EmptyArchive(PathBuf),

    /// Archive cannot be opened or read
    #[error("Archive error {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A line that did not yield a record
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the input
    pub line_number: usize,
    pub content: String,
    pub reason: String,
}

/// Records read from one source, in input order
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedLine>,
}

/// Anything that can produce a batch of records from a path
pub trait RecordSource {
    fn load(&self, path: &Path) -> Result<LoadedRecords, LoadError>;
}

/// JSON-lines reader with `.zip` support
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesSource;

impl JsonLinesSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse JSON-lines text from any reader.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<LoadedRecords, LoadError> {
        let mut loaded = LoadedRecords::default();

        for (offset, bytes) in reader.split(b'\n').enumerate() {
            let mut bytes = bytes?;
            let line_number = offset + 1;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }

            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => {
                    let reason = format!("invalid UTF-8: {}", e.utf8_error());
                    warn!(line_number, %reason, "Skipping line");
                    loaded.skipped.push(SkippedLine {
                        line_number,
                        content: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                        reason,
                    });
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(record)) => loaded.records.push(record),
                Ok(other) => {
                    let reason = format!("expected a JSON object, found {}", json_kind(&other));
                    warn!(line_number, %reason, "Skipping line");
                    loaded.skipped.push(SkippedLine {
                        line_number,
                        content: line,
                        reason,
                    });
                }
                Err(e) => {
                    warn!(line_number, error = %e, "Skipping malformed line");
                    loaded.skipped.push(SkippedLine {
                        line_number,
                        content: line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(loaded)
    }

    fn load_file(&self, path: &Path) -> Result<LoadedRecords, LoadError> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    fn load_archive(&self, path: &Path) -> Result<LoadedRecords, LoadError> {
        let scratch = tempfile::TempDir::new()?;
        let extracted = extract_first_file(path, scratch.path())?;
        debug!(archive = %path.display(), extracted = %extracted.display(), "Archive member extracted");
        self.load_file(&extracted)
    }
}

impl RecordSource for JsonLinesSource {
    fn load(&self, path: &Path) -> Result<LoadedRecords, LoadError> {
        if !path.exists() {
            return Err(LoadError::SourceNotFound(path.to_path_buf()));
        }

        let loaded = if is_archive(path) {
            self.load_archive(path)?
        } else {
            self.load_file(path)?
        };

        info!(
            source = %path.display(),
            records = loaded.records.len(),
            skipped = loaded.skipped.len(),
            "Records loaded"
        );
        Ok(loaded)
    }
}

/// True for paths ending in `.zip`, any case.
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Extract the first file member of `archive` into `dest`.
fn extract_first_file(archive: &Path, dest: &Path) -> Result<PathBuf, LoadError> {
    let archive_error = |reason: String| LoadError::Archive {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| archive_error(e.to_string()))?;

    for i in 0..zip.len() {
        let mut member = zip
            .by_index(i)
            .map_err(|e| archive_error(format!("entry {i}: {e}")))?;
        if member.is_dir() {
            continue;
        }

        let name = member
            .enclosed_name()
            .and_then(|p| p.file_name().map(PathBuf::from))
            .ok_or_else(|| archive_error(format!("unsafe entry name: {}", member.name())))?;

        let mut contents = Vec::new();
        member.read_to_end(&mut contents)?;

        let out_path = dest.join(name);
        std::fs::write(&out_path, &contents)?;
        return Ok(out_path);
    }

    Err(LoadError::EmptyArchive(archive.to_path_buf()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reader_skips_blank_and_reports_bad_lines() {
        let text = "{\"a\": 1}\n\n   \nnot json\n[1, 2]\n{\"b\": 2}\n";
        let loaded = JsonLinesSource::new().parse_reader(text.as_bytes()).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1]["b"], 2);
        assert_eq!(loaded.skipped.len(), 2);
        assert_eq!(loaded.skipped[0].line_number, 4);
        assert_eq!(loaded.skipped[0].content, "not json");
        assert_eq!(loaded.skipped[1].line_number, 5);
        assert!(loaded.skipped[1].reason.contains("array"));
    }

    #[test]
    fn test_invalid_utf8_line_skipped_not_fatal() {
        let text = b"{\"a\": 1}\r\n{\"x\": \"\xff\xfe\"}\n{\"b\": 2}";
        let loaded = JsonLinesSource::new().parse_reader(&text[..]).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0]["a"], 1);
        assert_eq!(loaded.records[1]["b"], 2);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].line_number, 2);
        assert!(loaded.skipped[0].reason.starts_with("invalid UTF-8"));
        assert!(loaded.skipped[0].content.starts_with("{\"x\": \""));
    }

    #[test]
    fn test_parse_reader_empty_input() {
        let loaded = JsonLinesSource::new().parse_reader(&b""[..]).unwrap();
        assert!(loaded.records.is_empty());
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive(Path::new("batch.zip")));
        assert!(is_archive(Path::new("/data/BATCH.ZIP")));
        assert!(!is_archive(Path::new("batch.json")));
        assert!(!is_archive(Path::new("zip")));
    }
}
