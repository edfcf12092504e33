//! Entity id format validation
//!
//! Stateless, per record. Runs over the same batch as the analyzer but never
//! feeds into its decisions; findings are only merged into the report.
//!
//! Per record at most one finding is produced, first match wins:
//! 1. document id problem (absent, null, blank, boolean)
//! 2. entity id absent or null
//! 3. entity id display form not six uppercase letters or digits

use once_cell::sync::Lazy;
use regex::Regex;
use segaudit_common::record::{display_value, field};
use segaudit_common::{FieldNames, Record};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

static ENTITY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6}$").expect("entity id pattern compiles"));

/// One entity id problem
///
/// | problem            | `entity_id`         | `document_id` |
/// |--------------------|---------------------|---------------|
/// | document id        | `Some("")` for an empty-string id, else `None` | `None` |
/// | entity id missing  | `None`              | raw id        |
/// | bad format         | trimmed display form | raw id       |
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityIdFinding {
    pub entity_id: Option<String>,
    pub document_id: Option<Value>,
    pub record_index: Option<Value>,
}

impl EntityIdFinding {
    /// True when the finding reports an absent entity id on a usable record.
    pub fn is_missing_entity(&self) -> bool {
        self.entity_id.is_none() && self.document_id.is_some()
    }
}

pub struct EntityIdValidator {
    fields: FieldNames,
}

impl EntityIdValidator {
    pub fn new(fields: FieldNames) -> Self {
        Self { fields }
    }

    /// Check one record.
    pub fn check(&self, record: &Record) -> Option<EntityIdFinding> {
        let document_id = field(record, &self.fields.document_id);
        let record_index = field(record, &self.fields.record_index).cloned();

        if let Some(marker) = document_id_problem(document_id) {
            return Some(EntityIdFinding {
                entity_id: marker,
                document_id: None,
                record_index,
            });
        }

        let entity_id = match field(record, &self.fields.entity_id) {
            None | Some(Value::Null) => {
                return Some(EntityIdFinding {
                    entity_id: None,
                    document_id: document_id.cloned(),
                    record_index,
                });
            }
            Some(value) => value,
        };

        let displayed = display_value(Some(entity_id));
        let displayed = displayed.trim();
        if ENTITY_ID_PATTERN.is_match(displayed) {
            return None;
        }

        Some(EntityIdFinding {
            entity_id: Some(displayed.to_string()),
            document_id: document_id.cloned(),
            record_index,
        })
    }

    /// Check every record in order.
    pub fn validate_records(&self, records: &[Record]) -> Vec<EntityIdFinding> {
        let findings: Vec<EntityIdFinding> = records
            .iter()
            .filter_map(|record| self.check(record))
            .inspect(|finding| {
                debug!(
                    entity_id = ?finding.entity_id,
                    document_id = ?finding.document_id,
                    record_index = ?finding.record_index,
                    "Entity id finding"
                )
            })
            .collect();

        info!(
            records = records.len(),
            findings = findings.len(),
            "Entity id validation complete"
        );
        findings
    }
}

impl Default for EntityIdValidator {
    fn default() -> Self {
        Self::new(FieldNames::default())
    }
}

/// `Some(marker)` when the document id disqualifies the record.
///
/// Numbers are not a problem here; only absent, null, blank and boolean ids.
fn document_id_problem(document_id: Option<&Value>) -> Option<Option<String>> {
    match document_id {
        None | Some(Value::Null) | Some(Value::Bool(_)) => Some(None),
        Some(Value::String(id)) if id.is_empty() => Some(Some(String::new())),
        Some(Value::String(id)) if id.trim().is_empty() => Some(None),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: Value) -> Option<EntityIdFinding> {
        let Value::Object(record) = value else {
            panic!("test record must be an object");
        };
        EntityIdValidator::default().check(&record)
    }

    #[test]
    fn test_well_formed_entity_ids_pass() {
        for entity in ["ABC123", "000000", "ZZZZZZ", " ABC123 "] {
            let finding = check(json!({
                "RP_DOCUMENT_ID": "DOC1",
                "DOCUMENT_RECORD_INDEX": 1,
                "RP_ENTITY_ID": entity,
            }));
            assert_eq!(finding, None, "entity {entity:?}");
        }
    }

    #[test]
    fn test_numeric_entity_id_checked_by_display_form() {
        let ok = check(json!({"RP_DOCUMENT_ID": "DOC1", "RP_ENTITY_ID": 123456}));
        assert_eq!(ok, None);

        let short = check(json!({"RP_DOCUMENT_ID": "DOC1", "DOCUMENT_RECORD_INDEX": 2, "RP_ENTITY_ID": 12345}));
        assert_eq!(short.unwrap().entity_id.as_deref(), Some("12345"));
    }

    #[test]
    fn test_short_entity_id_reported() {
        let finding = check(json!({
            "RP_DOCUMENT_ID": "DOC1",
            "DOCUMENT_RECORD_INDEX": 3,
            "RP_ENTITY_ID": "AB12",
        }));

        assert_eq!(
            finding,
            Some(EntityIdFinding {
                entity_id: Some("AB12".to_string()),
                document_id: Some(json!("DOC1")),
                record_index: Some(json!(3)),
            })
        );
    }

    #[test]
    fn test_reported_entity_id_is_trimmed() {
        let finding = check(json!({
            "RP_DOCUMENT_ID": "DOC1",
            "DOCUMENT_RECORD_INDEX": 1,
            "RP_ENTITY_ID": " AB12 ",
        }));
        assert_eq!(finding.unwrap().entity_id.as_deref(), Some("AB12"));
    }

    #[test]
    fn test_malformed_entity_ids_reported() {
        for entity in [json!("abc123"), json!("ABC1234"), json!("ABC-12"), json!(""), json!(true)] {
            let finding = check(json!({"RP_DOCUMENT_ID": "DOC1", "RP_ENTITY_ID": entity.clone()}));
            let finding = finding.unwrap_or_else(|| panic!("expected finding for {entity}"));
            assert!(!finding.is_missing_entity());
            assert_eq!(finding.document_id, Some(json!("DOC1")));
        }
    }

    #[test]
    fn test_missing_entity_id() {
        for record in [
            json!({"RP_DOCUMENT_ID": "DOC1", "DOCUMENT_RECORD_INDEX": 4}),
            json!({"RP_DOCUMENT_ID": "DOC1", "DOCUMENT_RECORD_INDEX": 4, "RP_ENTITY_ID": null}),
        ] {
            let finding = check(record).unwrap();
            assert!(finding.is_missing_entity());
            assert_eq!(finding.record_index, Some(json!(4)));
        }
    }

    #[test]
    fn test_document_id_problem_takes_priority() {
        let empty = check(json!({"RP_DOCUMENT_ID": "", "DOCUMENT_RECORD_INDEX": 1})).unwrap();
        assert_eq!(empty.entity_id.as_deref(), Some(""));
        assert_eq!(empty.document_id, None);

        for id in [Value::Null, json!("   "), json!(false)] {
            let finding = check(json!({"RP_DOCUMENT_ID": id, "RP_ENTITY_ID": "bad"})).unwrap();
            assert_eq!(finding.entity_id, None);
            assert_eq!(finding.document_id, None);
        }

        let absent = check(json!({"RP_ENTITY_ID": "ABC123", "DOCUMENT_RECORD_INDEX": 9})).unwrap();
        assert_eq!(absent.entity_id, None);
        assert_eq!(absent.record_index, Some(json!(9)));
    }

    #[test]
    fn test_numeric_document_id_still_checks_entity() {
        assert_eq!(check(json!({"RP_DOCUMENT_ID": 123, "RP_ENTITY_ID": "ABC123"})), None);

        let finding = check(json!({"RP_DOCUMENT_ID": 123, "RP_ENTITY_ID": "x"})).unwrap();
        assert_eq!(finding.document_id, Some(json!(123)));
    }

    #[test]
    fn test_validate_records_keeps_input_order() {
        let records: Vec<Record> = [
            json!({"RP_DOCUMENT_ID": "D1", "DOCUMENT_RECORD_INDEX": 1, "RP_ENTITY_ID": "ABC123"}),
            json!({"RP_DOCUMENT_ID": "D1", "DOCUMENT_RECORD_INDEX": 2}),
            json!({"RP_DOCUMENT_ID": "D2", "DOCUMENT_RECORD_INDEX": 1, "RP_ENTITY_ID": "nope"}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        let findings = EntityIdValidator::default().validate_records(&records);
        assert_eq!(findings.len(), 2);
        assert!(findings[0].is_missing_entity());
        assert_eq!(findings[1].entity_id.as_deref(), Some("nope"));
    }
}
