//! WIQL query result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a WIQL query: ordered identifiers only, no field data.
///
/// The query and result kinds are echoed as opaque strings; this layer only
/// interprets the flat-list case. `as_of` is the snapshot time of the query
/// and is informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_result_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,

    #[serde(default)]
    pub work_items: Vec<WorkItemRef>,
}

impl QueryResult {
    /// Matched identifiers in result order.
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.work_items.iter().map(|r| r.id).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.work_items.is_empty()
    }
}

/// Identifier/locator pair for one matched item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItemRef {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
