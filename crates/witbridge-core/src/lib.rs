//! witbridge-core: Domain models and pure logic for the work item access layer.
//!
//! This crate provides:
//! - `WorkItem`: a remote work item record with typed well-known fields
//! - `QueryResult`: identifier-only result of a WIQL query
//! - Patch document construction for create/update mutations
//! - WIQL query building with literal escaping
//!
//! Nothing here performs I/O; the `witbridge-client` crate drives these
//! types over the remote REST contract.

pub mod item;
pub mod patch;
pub mod query;
pub mod wiql;

pub use item::{field, IdentityRef, WorkItem, WorkItemFields};
pub use patch::{create_document, update_document, CreateFields, PatchOp, PatchOperation, UpdateFields};
pub use query::{QueryResult, WorkItemRef};
