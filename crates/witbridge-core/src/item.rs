//! Work item model as the remote tracking service returns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reference names of the well-known fields, as used in WIQL and patch paths.
pub mod field {
    pub const ID: &str = "System.Id";
    pub const TITLE: &str = "System.Title";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const STATE: &str = "System.State";
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    pub const DESCRIPTION: &str = "System.Description";
    pub const CREATED_DATE: &str = "System.CreatedDate";
    pub const CHANGED_DATE: &str = "System.ChangedDate";
    pub const AREA_PATH: &str = "System.AreaPath";
    pub const ITERATION_PATH: &str = "System.IterationPath";
    pub const PRIORITY: &str = "Microsoft.VSTS.Common.Priority";
    pub const SEVERITY: &str = "Microsoft.VSTS.Common.Severity";
    pub const ACCEPTANCE_CRITERIA: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";
}

/// Identity reference used by assignment fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    /// Display name shown in the tracking UI.
    pub display_name: String,

    /// Unique name, usually an email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
}

/// Typed view over the well-known work item fields.
///
/// Every field is optional because the remote service only returns what a
/// given item carries. Fields this layer does not model are kept verbatim in
/// `extra`, so custom fields round-trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkItemFields {
    #[serde(rename = "System.Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "System.WorkItemType", default, skip_serializing_if = "Option::is_none")]
    pub work_item_type: Option<String>,

    #[serde(rename = "System.State", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "System.Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "System.AssignedTo", default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<IdentityRef>,

    #[serde(rename = "System.CreatedDate", default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,

    #[serde(rename = "System.ChangedDate", default, skip_serializing_if = "Option::is_none")]
    pub changed_date: Option<DateTime<Utc>>,

    #[serde(rename = "System.AreaPath", default, skip_serializing_if = "Option::is_none")]
    pub area_path: Option<String>,

    #[serde(rename = "System.IterationPath", default, skip_serializing_if = "Option::is_none")]
    pub iteration_path: Option<String>,

    #[serde(rename = "Microsoft.VSTS.Common.Priority", default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    #[serde(rename = "Microsoft.VSTS.Common.Severity", default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    #[serde(
        rename = "Microsoft.VSTS.Common.AcceptanceCriteria",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub acceptance_criteria: Option<String>,

    /// Any field this layer does not model, keyed by its namespaced name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A work item record owned by the remote tracking service.
///
/// `id` is assigned on creation and never reused; `rev` is bumped by every
/// accepted mutation. Staleness detection via `rev` is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkItem {
    pub id: u64,
    pub rev: u64,
    pub fields: WorkItemFields,

    /// Resource URL echoed by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl WorkItem {
    /// Title, or a placeholder when the remote omitted it.
    #[must_use]
    pub fn title(&self) -> &str {
        self.fields.title.as_deref().unwrap_or("(untitled)")
    }

    #[must_use]
    pub fn state(&self) -> &str {
        self.fields.state.as_deref().unwrap_or("-")
    }

    #[must_use]
    pub fn work_item_type(&self) -> &str {
        self.fields.work_item_type.as_deref().unwrap_or("-")
    }

    /// Display name of the assignee, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.fields.assigned_to.as_ref().map(|a| a.display_name.as_str())
    }
}
