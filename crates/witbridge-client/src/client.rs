//! Authenticated client for the work item REST endpoints.
//!
//! One `WitClient` is constructed from a `ClientConfig` and shared across
//! all operations. Construction computes the credential header and pins the
//! protocol version; it performs no I/O itself.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use witbridge_core::{
    create_document, update_document, wiql, CreateFields, QueryResult, UpdateFields, WorkItem,
};

/// Maximum identifiers per batch fetch. Keeps request URLs under the
/// transport's length limits.
pub const BATCH_CHUNK_SIZE: usize = 200;

/// Content type signaling an ordered patch document.
const JSON_PATCH: &str = "application/json-patch+json";

/// Authenticated transport descriptor bound to one project's `_apis` root.
#[derive(Debug, Clone)]
pub struct WitClient {
    http: reqwest::Client,
    api_root: Url,
    api_version: String,
}

/// Outcome of a chunked fetch: hydrated items plus any chunks that failed.
///
/// A failed chunk never aborts the remaining chunks; callers distinguish
/// "all hydrated" from "partial" through `failures`.
#[derive(Debug, Default)]
pub struct HydrateOutcome {
    /// Items in remote return order, concatenated chunk by chunk.
    pub items: Vec<WorkItem>,
    /// Chunks that could not be hydrated.
    pub failures: Vec<ChunkFailure>,
}

impl HydrateOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A chunk of identifiers that could not be hydrated, with its cause.
#[derive(Debug)]
pub struct ChunkFailure {
    pub ids: Vec<u64>,
    pub error: ClientError,
}

/// Result of an update call.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The remote accepted the patch; this is the resulting item state.
    Updated(WorkItem),
    /// No fields were set, so no remote call was made.
    Unchanged,
}

/// Envelope the batch endpoint wraps item lists in.
#[derive(Debug, Deserialize)]
struct WorkItemList {
    value: Vec<WorkItem>,
}

impl WitClient {
    /// Build a client bound to the configured project.
    ///
    /// # Errors
    /// Returns a configuration-class error when the endpoint URL is invalid
    /// or the transport cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let root = config.api_root();
        let api_root =
            Url::parse(&root).map_err(|e| ClientError::InvalidUrl(format!("{root}: {e}")))?;
        if api_root.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(root));
        }

        let credential = BASE64.encode(format!(":{}", config.token));
        let mut auth = HeaderValue::from_str(&format!("Basic {credential}"))
            .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if config.danger_accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(ClientError::BuildClient)?;

        Ok(Self {
            http,
            api_root,
            api_version: config.api_version.clone(),
        })
    }

    /// Endpoint URL under `_apis` with the protocol version pinned.
    ///
    /// Segments are percent-encoded, so caller-supplied values (like work
    /// item type names) cannot alter the path structure.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        // Checked at construction: the root is a valid base URL.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url.query_pairs_mut().append_pair("api-version", &self.api_version);
        url
    }

    /// Submit literal WIQL text to the query endpoint.
    ///
    /// Returns identifiers only; pair with `get_many` to hydrate fields.
    /// No client-side syntax validation: a malformed query surfaces as a
    /// remote error.
    ///
    /// # Errors
    /// Returns `Remote`/`Request` errors tagged with the operation.
    pub async fn run_query(&self, wiql_text: &str) -> Result<QueryResult> {
        const OP: &str = "query work items";
        debug!(wiql = wiql_text, "Submitting WIQL query");

        let url = self.endpoint(&["wit", "wiql"]);
        let response = self
            .http
            .post(url)
            .json(&json!({ "query": wiql_text }))
            .send()
            .await
            .map_err(|source| ClientError::Request { operation: OP, source })?;

        let response = check_status(OP, response).await?;
        decode(OP, response).await
    }

    /// Free-text search over titles and descriptions, newest change first.
    ///
    /// # Errors
    /// Same contract as `run_query`.
    pub async fn search(&self, text: Option<&str>) -> Result<QueryResult> {
        self.run_query(&wiql::search_query(text)).await
    }

    /// Fetch a single item with full field expansion.
    ///
    /// # Errors
    /// Returns `NotFound` when the id does not exist remotely.
    pub async fn get_item(&self, id: u64) -> Result<WorkItem> {
        const OP: &str = "get work item";

        let mut url = self.endpoint(&["wit", "workitems", &id.to_string()]);
        url.query_pairs_mut().append_pair("$expand", "Fields");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Request { operation: OP, source })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }

        let response = check_status(OP, response).await?;
        decode(OP, response).await
    }

    /// Fetch up to `BATCH_CHUNK_SIZE` items in one call.
    ///
    /// Items come back in whatever order the remote returns them; callers
    /// needing input order must re-sort by id.
    ///
    /// # Errors
    /// Returns `Remote`/`Request` errors tagged with the operation.
    pub async fn get_batch(&self, ids: &[u64]) -> Result<Vec<WorkItem>> {
        const OP: &str = "batch fetch work items";

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let mut url = self.endpoint(&["wit", "workitems"]);
        url.query_pairs_mut()
            .append_pair("ids", &joined)
            .append_pair("$expand", "Fields");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Request { operation: OP, source })?;

        let response = check_status(OP, response).await?;
        let list: WorkItemList = decode(OP, response).await?;
        Ok(list.value)
    }

    /// Fetch an arbitrary number of items, chunked sequentially.
    ///
    /// A chunk that fails is logged and recorded in the outcome instead of
    /// aborting the remaining chunks.
    pub async fn get_many(&self, ids: &[u64]) -> HydrateOutcome {
        let mut outcome = HydrateOutcome::default();

        for chunk in ids.chunks(BATCH_CHUNK_SIZE) {
            match self.get_batch(chunk).await {
                Ok(items) => outcome.items.extend(items),
                Err(error) => {
                    warn!(
                        first = chunk.first().copied(),
                        last = chunk.last().copied(),
                        %error,
                        "Chunk fetch failed; continuing with remaining chunks"
                    );
                    outcome.failures.push(ChunkFailure {
                        ids: chunk.to_vec(),
                        error,
                    });
                }
            }
        }

        outcome
    }

    /// Create a work item of the given type.
    ///
    /// The type name travels as a percent-encoded path segment; an
    /// unrecognized type is a remote-side error, not validated here.
    ///
    /// # Errors
    /// Returns `Remote`/`Request` errors tagged with the operation.
    pub async fn create_item(
        &self,
        work_item_type: &str,
        title: &str,
        fields: &CreateFields,
    ) -> Result<WorkItem> {
        const OP: &str = "create work item";

        let document = create_document(title, fields);
        let url = self.endpoint(&["wit", "workitems", &format!("${work_item_type}")]);
        debug!(work_item_type, operations = document.len(), "Creating work item");

        // The content type must be in place before `json()`, which only
        // inserts its own when the header is absent.
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_PATCH)
            .json(&document)
            .send()
            .await
            .map_err(|source| ClientError::Request { operation: OP, source })?;

        let response = check_status(OP, response).await?;
        decode(OP, response).await
    }

    /// Apply a partial update to an existing item.
    ///
    /// Setting zero fields short-circuits to `UpdateOutcome::Unchanged`
    /// before any remote call.
    ///
    /// # Errors
    /// Returns `NotFound` when the id does not exist remotely.
    pub async fn update_item(&self, id: u64, fields: &UpdateFields) -> Result<UpdateOutcome> {
        const OP: &str = "update work item";

        let document = update_document(fields);
        if document.is_empty() {
            debug!(id, "No fields set; skipping update");
            return Ok(UpdateOutcome::Unchanged);
        }

        let url = self.endpoint(&["wit", "workitems", &id.to_string()]);
        debug!(id, operations = document.len(), "Updating work item");

        let response = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, JSON_PATCH)
            .json(&document)
            .send()
            .await
            .map_err(|source| ClientError::Request { operation: OP, source })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }

        let response = check_status(OP, response).await?;
        let item = decode(OP, response).await?;
        Ok(UpdateOutcome::Updated(item))
    }
}

/// Map a non-success status to a `Remote` error carrying the body text.
async fn check_status(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Remote {
        operation,
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|source| ClientError::Request { operation, source })
}
