//! Patch document construction for work item mutations.
//!
//! The remote service accepts ordered `application/json-patch+json`
//! documents where every path points into the fields mapping. Create and
//! update intents are translated into one operation per set field, in a
//! fixed order, so documents are deterministic and every path is unique.

use crate::item::field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Patch operation verb.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

/// One step in a mutation document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    /// An `add` targeting a named field.
    #[must_use]
    pub fn add(field_name: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Add,
            path: field_path(field_name),
            value: Some(value.into()),
        }
    }

    /// A `replace` targeting a named field.
    #[must_use]
    pub fn replace(field_name: &str, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: field_path(field_name),
            value: Some(value.into()),
        }
    }
}

/// JSON pointer into the fields mapping, e.g. `/fields/System.Title`.
fn field_path(name: &str) -> String {
    format!("/fields/{name}")
}

/// Optional fields accepted when creating a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFields {
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub acceptance_criteria: Option<String>,
}

/// Fields accepted when updating a work item; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub state: Option<String>,
    pub priority: Option<i64>,
    pub severity: Option<String>,
}

/// Build a creation document: the mandatory title operation first, then one
/// `add` per non-empty optional field.
#[must_use]
pub fn create_document(title: &str, fields: &CreateFields) -> Vec<PatchOperation> {
    let mut document = vec![PatchOperation::add(field::TITLE, title)];

    push_text(&mut document, PatchOp::Add, field::DESCRIPTION, &fields.description);
    push_text(&mut document, PatchOp::Add, field::ASSIGNED_TO, &fields.assigned_to);
    push_text(
        &mut document,
        PatchOp::Add,
        field::ACCEPTANCE_CRITERIA,
        &fields.acceptance_criteria,
    );

    document
}

/// Build an update document: one `replace` per non-empty set field.
///
/// An empty result means the caller set nothing; no remote call should be
/// made for it.
#[must_use]
pub fn update_document(fields: &UpdateFields) -> Vec<PatchOperation> {
    let mut document = Vec::new();

    push_text(&mut document, PatchOp::Replace, field::TITLE, &fields.title);
    push_text(&mut document, PatchOp::Replace, field::DESCRIPTION, &fields.description);
    push_text(&mut document, PatchOp::Replace, field::ASSIGNED_TO, &fields.assigned_to);
    push_text(
        &mut document,
        PatchOp::Replace,
        field::ACCEPTANCE_CRITERIA,
        &fields.acceptance_criteria,
    );
    push_text(&mut document, PatchOp::Replace, field::STATE, &fields.state);

    if let Some(priority) = fields.priority {
        document.push(PatchOperation::replace(field::PRIORITY, priority));
    }

    push_text(&mut document, PatchOp::Replace, field::SEVERITY, &fields.severity);

    document
}

/// Append a text operation when the value is set and non-empty.
fn push_text(
    document: &mut Vec<PatchOperation>,
    op: PatchOp,
    field_name: &str,
    value: &Option<String>,
) {
    if let Some(value) = value.as_deref() {
        if !value.is_empty() {
            document.push(PatchOperation {
                op,
                path: field_path(field_name),
                value: Some(Value::String(value.to_string())),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashSet;

    fn paths(document: &[PatchOperation]) -> Vec<&str> {
        document.iter().map(|op| op.path.as_str()).collect()
    }

    #[test]
    fn create_title_only() {
        let document = create_document("T", &CreateFields::default());

        assert_eq!(document.len(), 1);
        assert_eq!(document[0].op, PatchOp::Add);
        assert_eq!(document[0].path, "/fields/System.Title");
        assert_eq!(document[0].value, Some(json!("T")));
    }

    #[test]
    fn create_title_always_first() {
        let fields = CreateFields {
            description: Some("d".to_string()),
            assigned_to: Some("alice@contoso.com".to_string()),
            acceptance_criteria: Some("ac".to_string()),
        };
        let document = create_document("T", &fields);

        assert_eq!(document.len(), 4);
        assert_eq!(document[0].path, "/fields/System.Title");
        assert_eq!(
            paths(&document),
            vec![
                "/fields/System.Title",
                "/fields/System.Description",
                "/fields/System.AssignedTo",
                "/fields/Microsoft.VSTS.Common.AcceptanceCriteria",
            ]
        );
    }

    #[test]
    fn empty_strings_are_not_set() {
        let fields = CreateFields {
            description: Some(String::new()),
            ..CreateFields::default()
        };
        let document = create_document("T", &fields);
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn update_with_nothing_set_is_empty() {
        assert!(update_document(&UpdateFields::default()).is_empty());
    }

    #[test]
    fn update_emits_one_replace_per_set_field() {
        let fields = UpdateFields {
            title: Some("new title".to_string()),
            state: Some("Resolved".to_string()),
            priority: Some(1),
            ..UpdateFields::default()
        };
        let document = update_document(&fields);

        assert_eq!(document.len(), 3);
        assert!(document.iter().all(|op| op.op == PatchOp::Replace));
        assert_eq!(
            paths(&document),
            vec![
                "/fields/System.Title",
                "/fields/System.State",
                "/fields/Microsoft.VSTS.Common.Priority",
            ]
        );
        assert_eq!(document[2].value, Some(json!(1)));
    }

    #[test]
    fn paths_are_unique_in_full_update() {
        let fields = UpdateFields {
            title: Some("t".to_string()),
            description: Some("d".to_string()),
            assigned_to: Some("a".to_string()),
            acceptance_criteria: Some("ac".to_string()),
            state: Some("Active".to_string()),
            priority: Some(2),
            severity: Some("2 - High".to_string()),
        };
        let document = update_document(&fields);

        let unique: HashSet<&str> = paths(&document).into_iter().collect();
        assert_eq!(unique.len(), document.len());
        assert_eq!(document.len(), 7);
    }

    #[test]
    fn serializes_as_json_patch() {
        let document = create_document("T", &CreateFields::default());
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(
            value,
            json!([{ "op": "add", "path": "/fields/System.Title", "value": "T" }])
        );
    }
}
