//! Search operations: full-text search queries and the cancellable
//! people-picker (typeahead) search.
//!
//! Every people search owns its own cancellation scope
//! ([`search_people_scoped`](SharePointSearch::search_people_scoped)).  The
//! convenience wrapper [`search_people`](SharePointSearch::search_people)
//! reproduces the classic single-flight typeahead behavior: the client holds
//! one pending-search slot, and each new call cancels whatever is in it.
//! Concurrent independent callers that need isolated scopes must use the
//! scoped primitive instead.

use crate::client::SharePointClient;
use crate::error::{SharePointError, SharePointResult};
use crate::types::PeopleSearchOptions;
use log::debug;
use serde_json::{json, Value};
use std::future::Future;
use tokio::sync::oneshot;

const PEOPLE_PICKER_PATH: &str =
    "/_api/SP.UI.ApplicationPages.ClientPeoplePickerWebServiceInterface.clientPeoplePickerSearchUser";

/// Cancellation control for one in-flight people search.
///
/// Cancelling settles the paired future with a
/// [`Cancelled`](crate::SharePointErrorCode::Cancelled) error, never a
/// normal result.  Dropping the handle leaves the search running.
#[derive(Debug)]
pub struct SearchCancellation {
    tx: oneshot::Sender<()>,
}

impl SearchCancellation {
    /// Cancel the paired search.  Best-effort: a no-op when the search has
    /// already completed.
    pub fn cancel(self) {
        let _ = self.tx.send(());
    }
}

/// Search operations.
pub struct SharePointSearch<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointSearch<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Full-text search via `/_api/search/query`.
    pub async fn search_items(&self, query: &[(&str, &str)]) -> SharePointResult<Value> {
        self.client.get("/_api/search/query", query).await
    }

    /// People-picker search bound to its own cancellation scope.
    ///
    /// Returns the cancellation control together with the result future;
    /// the future settles with a `Cancelled` error when the control fires
    /// first.
    pub fn search_people_scoped(
        &self,
        query: &str,
        options: &PeopleSearchOptions,
    ) -> (
        SearchCancellation,
        impl Future<Output = SharePointResult<Value>> + 'a,
    ) {
        let (tx, mut rx) = oneshot::channel();
        let body = people_picker_body(query, options);
        let client = self.client;
        let req = client.mutating_post(PEOPLE_PICKER_PATH).json(&body);

        let fut = async move {
            let send = client.send(req);
            tokio::pin!(send);
            tokio::select! {
                res = &mut send => res,
                r = &mut rx => match r {
                    Ok(()) => Err(SharePointError::cancelled("people search superseded")),
                    // Sender dropped without firing: the scope is gone but
                    // the search keeps running.
                    Err(_) => send.await,
                },
            }
        };

        (SearchCancellation { tx }, fut)
    }

    /// Single-flight people search: cancels the previous in-flight search
    /// issued through this method on the same client instance.
    pub async fn search_people(
        &self,
        query: &str,
        options: &PeopleSearchOptions,
    ) -> SharePointResult<Value> {
        let (cancel, fut) = self.search_people_scoped(query, options);
        if let Some(previous) = self.client.replace_pending_search(cancel) {
            debug!("Cancelling superseded people search");
            previous.cancel();
        }
        fut.await
    }
}

fn people_picker_body(query: &str, options: &PeopleSearchOptions) -> Value {
    json!({
        "queryParams": {
            "AllowEmailAddresses": options.allow_email_addresses,
            "AllowMultipleEntities": options.allow_multiple_entities,
            "AllUrlZones": options.all_url_zones,
            "MaximumEntitySuggestions": options.maximum_entity_suggestions,
            "PrincipalSource": options.principal_source,
            "PrincipalType": options.principal_type,
            "QueryString": query,
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
