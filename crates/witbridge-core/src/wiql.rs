//! WIQL query construction.
//!
//! The remote service evaluates Work Item Query Language server-side; this
//! module only assembles query text. String literals are escaped before
//! interpolation so caller-supplied text cannot alter query structure.

use crate::item::field;
use std::fmt::Write;

/// Escape a WIQL string literal: single quotes are doubled.
#[must_use]
pub fn escape_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Build the fixed-projection search query.
///
/// With `text`, filters by title or description containing it; without,
/// selects everything. Always ordered by last change, newest first.
#[must_use]
pub fn search_query(text: Option<&str>) -> String {
    let mut wiql = format!(
        "SELECT [{}], [{}], [{}], [{}], [{}] FROM WorkItems",
        field::ID,
        field::TITLE,
        field::STATE,
        field::WORK_ITEM_TYPE,
        field::ASSIGNED_TO,
    );

    if let Some(text) = text {
        let literal = escape_literal(text);
        let _ = write!(
            wiql,
            " WHERE [{}] CONTAINS '{literal}' OR [{}] CONTAINS '{literal}'",
            field::TITLE,
            field::DESCRIPTION,
        );
    }

    let _ = write!(wiql, " ORDER BY [{}] DESC", field::CHANGED_DATE);
    wiql
}
