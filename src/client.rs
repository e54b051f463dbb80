//! HTTP client for the SharePoint REST API.
//!
//! Wraps `reqwest::Client` bound to a site base URL, manages the
//! `X-RequestDigest` anti-forgery token (acquired once per instance via
//! `/_api/contextinfo` by a task spawned at construction), and exposes the
//! request helpers every endpoint facade is built on.  No retries — failures
//! propagate to the caller.

use crate::comments::SharePointComments;
use crate::error::{SharePointError, SharePointResult};
use crate::files::SharePointFiles;
use crate::folders::SharePointFolders;
use crate::groups::SharePointGroups;
use crate::history::VersionHistory;
use crate::items::SharePointItems;
use crate::lists::SharePointLists;
use crate::search::{SearchCancellation, SharePointSearch};
use crate::types::SharePointConfig;
use crate::users::SharePointUsers;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde_json::Value;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

pub(crate) const ACCEPT_VERBOSE: &str = "application/json;odata=verbose";
pub(crate) const ACCEPT_NOMETADATA: &str = "application/json; odata=nometadata";

/// SharePoint REST client.
///
/// Cloning is cheap; clones share the same digest and the same single
/// pending people-search slot.
#[derive(Debug, Clone)]
pub struct SharePointClient {
    http: reqwest::Client,
    base_url: String,
    /// Anti-forgery token.  Empty until the startup acquisition resolves;
    /// mutating requests issued before that carry an empty header value and
    /// are rejected server-side.
    digest: Arc<RwLock<String>>,
    /// Single-flight slot for the convenience people search (see
    /// [`SharePointSearch::search_people`]).
    pending_people_search: Arc<Mutex<Option<SearchCancellation>>>,
}

impl SharePointClient {
    /// Create a client and start the digest acquisition in the background.
    ///
    /// The constructor returns immediately; the digest is filled in once the
    /// `/_api/contextinfo` call resolves.  Acquisition failure is logged and
    /// non-fatal — later mutating calls will fail with an authorization
    /// error from the server.  Must be called within a Tokio runtime.
    pub fn new(config: &SharePointConfig) -> SharePointResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| SharePointError::internal(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            digest: Arc::new(RwLock::new(String::new())),
            pending_people_search: Arc::new(Mutex::new(None)),
        };

        let startup = client.clone();
        tokio::spawn(async move {
            if let Err(e) = startup.refresh_digest().await {
                error!("Could not acquire request digest: {}", e);
            }
        });

        Ok(client)
    }

    /// Current digest value (empty until acquisition resolves).
    pub fn digest(&self) -> String {
        self.digest.read().unwrap().clone()
    }

    /// Re-acquire the request digest.
    ///
    /// Used by the startup task; callers may also invoke it when the server
    /// starts rejecting mutating calls with an expired-digest error.
    pub async fn refresh_digest(&self) -> SharePointResult<()> {
        let url = self.url("/_api/contextinfo");
        debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header(ACCEPT, ACCEPT_VERBOSE)
            .send()
            .await
            .map_err(SharePointError::from)?;

        let value = handle_response(resp).await?;
        let digest = value["d"]["GetContextWebInformation"]["FormDigestValue"]
            .as_str()
            .ok_or_else(|| {
                SharePointError::internal("contextinfo response missing FormDigestValue")
            })?
            .to_string();

        *self.digest.write().unwrap() = digest;
        info!("Acquired request digest");
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Facades ─────────────────────────────────────────────────────

    pub fn folders(&self) -> SharePointFolders<'_> {
        SharePointFolders::new(self)
    }

    pub fn files(&self) -> SharePointFiles<'_> {
        SharePointFiles::new(self)
    }

    pub fn lists(&self) -> SharePointLists<'_> {
        SharePointLists::new(self)
    }

    pub fn items(&self) -> SharePointItems<'_> {
        SharePointItems::new(self)
    }

    pub fn users(&self) -> SharePointUsers<'_> {
        SharePointUsers::new(self)
    }

    pub fn groups(&self) -> SharePointGroups<'_> {
        SharePointGroups::new(self)
    }

    pub fn comments(&self) -> SharePointComments<'_> {
        SharePointComments::new(self)
    }

    pub fn search(&self) -> SharePointSearch<'_> {
        SharePointSearch::new(self)
    }

    pub fn history(&self) -> VersionHistory<'_> {
        VersionHistory::new(self)
    }

    // ─── Request helpers ─────────────────────────────────────────────

    /// Full URL for a server-relative API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET with the verbose OData accept header.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> SharePointResult<Value> {
        self.get_with_accept(path, query, ACCEPT_VERBOSE).await
    }

    /// GET with the nometadata OData accept header.
    pub async fn get_nometadata(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        self.get_with_accept(path, query, ACCEPT_NOMETADATA).await
    }

    /// GET with an explicit accept header.
    pub async fn get_with_accept(
        &self,
        path: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> SharePointResult<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(
            self.http
                .get(&url)
                .header(ACCEPT, accept)
                .query(query),
        )
        .await
    }

    /// GET a response body as text (file contents, rendered pages).
    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> SharePointResult<String> {
        let url = self.url(path);
        debug!("GET (text) {}", url);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(SharePointError::from)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(SharePointError::from)?;
        if status >= 400 {
            return Err(SharePointError::from_api_response(status, &body));
        }
        Ok(body)
    }

    /// POST a JSON body with the digest header.
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        self.send(self.mutating_post(path).query(query).json(body))
            .await
    }

    /// POST with an empty body (actions: like, unlike, ensureuser).
    pub async fn post_action(&self, path: &str) -> SharePointResult<Value> {
        self.send(
            self.mutating_post(path)
                .header(CONTENT_TYPE, "application/json")
                .body(""),
        )
        .await
    }

    /// POST a text body with the digest header (file uploads).
    pub async fn post_text(
        &self,
        path: &str,
        content: String,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        self.send(self.mutating_post(path).query(query).body(content))
            .await
    }

    /// POST raw bytes with the digest header plus extra headers
    /// (item attachments).
    pub async fn post_raw(
        &self,
        path: &str,
        data: Vec<u8>,
        extra_headers: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let mut req = self.mutating_post(path).body(data);
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }
        self.send(req).await
    }

    /// Update via method override: POST + `X-HTTP-Method: MERGE` +
    /// unconditional `IF-MATCH`.
    pub async fn merge(&self, path: &str, body: &Value) -> SharePointResult<Value> {
        self.send(
            self.mutating_post(path)
                .header("X-HTTP-Method", "MERGE")
                .header("IF-MATCH", "*")
                .json(body),
        )
        .await
    }

    /// Delete via method override: POST + `X-HTTP-Method: DELETE` +
    /// unconditional `IF-MATCH`.
    pub async fn post_delete(&self, path: &str) -> SharePointResult<Value> {
        self.post_delete_with(path, &[]).await
    }

    /// Method-override delete with extra headers (item attachments).
    pub async fn post_delete_with(
        &self,
        path: &str,
        extra_headers: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let mut req = self
            .mutating_post(path)
            .header("X-HTTP-Method", "DELETE")
            .header("IF-MATCH", "*")
            .header(CONTENT_TYPE, "application/json")
            .body("{}");
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }
        self.send(req).await
    }

    /// True HTTP DELETE with the digest header (comments).
    pub async fn delete(&self, path: &str) -> SharePointResult<Value> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.send(
            self.http
                .delete(&url)
                .header(ACCEPT, ACCEPT_NOMETADATA)
                .header("X-RequestDigest", self.digest_header())
                .header("If-Match", "*"),
        )
        .await
    }

    // ─── Internal ────────────────────────────────────────────────────

    /// POST request builder carrying the digest and the verbose accept
    /// header.  Also used by the people search to attach its own
    /// cancellation scope.
    pub(crate) fn mutating_post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("POST {}", url);
        self.http
            .post(&url)
            .header(ACCEPT, ACCEPT_VERBOSE)
            .header("X-RequestDigest", self.digest_header())
    }

    pub(crate) async fn send(&self, req: RequestBuilder) -> SharePointResult<Value> {
        let resp = req.send().await.map_err(SharePointError::from)?;
        handle_response(resp).await
    }

    /// Store the new pending-search cancellation handle, returning the
    /// superseded one (if any) for the caller to cancel.
    pub(crate) fn replace_pending_search(
        &self,
        handle: SearchCancellation,
    ) -> Option<SearchCancellation> {
        self.pending_people_search.lock().unwrap().replace(handle)
    }

    fn digest_header(&self) -> HeaderValue {
        HeaderValue::from_str(&self.digest()).unwrap_or_else(|_| {
            warn!("Request digest contains header-invalid characters, sending it empty");
            HeaderValue::from_static("")
        })
    }
}

async fn handle_response(resp: reqwest::Response) -> SharePointResult<Value> {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();

    debug!("Response status={} body_len={}", status, body.len());

    if status >= 400 {
        return Err(SharePointError::from_api_response(status, &body));
    }

    // 204 No Content and empty 200s — return null.
    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(SharePointError::from)
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_url_building() {
        let cfg = SharePointConfig::new("https://contoso.sharepoint.com/sites/hr/");
        let client = SharePointClient::new(&cfg).unwrap();
        assert_eq!(
            client.url("/_api/web/lists"),
            "https://contoso.sharepoint.com/sites/hr/_api/web/lists"
        );
        assert_eq!(
            client.url("_api/contextinfo"),
            "https://contoso.sharepoint.com/sites/hr/_api/contextinfo"
        );
    }

    #[tokio::test]
    async fn test_digest_starts_empty() {
        // Unroutable host: the startup acquisition fails and is logged;
        // the digest must stay empty rather than poison construction.
        let cfg = SharePointConfig::new("https://sharepoint.invalid");
        let client = SharePointClient::new(&cfg).unwrap();
        assert_eq!(client.digest(), "");
    }

    #[tokio::test]
    async fn test_header_invalid_digest_falls_back_to_empty() {
        let cfg = SharePointConfig::new("https://sharepoint.invalid");
        let client = SharePointClient::new(&cfg).unwrap();
        *client.digest.write().unwrap() = "0xDIGEST\nwith-newline".into();
        assert_eq!(client.digest_header(), HeaderValue::from_static(""));
    }

    #[tokio::test]
    async fn test_clones_share_digest() {
        let cfg = SharePointConfig::new("https://sharepoint.invalid");
        let client = SharePointClient::new(&cfg).unwrap();
        let clone = client.clone();
        *client.digest.write().unwrap() = "0xDIGEST".into();
        assert_eq!(clone.digest(), "0xDIGEST");
    }
}
