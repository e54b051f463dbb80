//! List, field, column, subsite, and site-page operations.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use crate::types::ListInfo;
use serde_json::{json, Value};

/// Default field type when creating a column (2 = single line of text).
const DEFAULT_FIELD_TYPE: u32 = 2;

/// List template for newly created lists (100 = generic list).
const GENERIC_LIST_TEMPLATE: u32 = 100;

/// List operations.
pub struct SharePointLists<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointLists<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    // ─── Read ────────────────────────────────────────────────────────

    /// All lists in the web.
    pub async fn get_lists(&self) -> SharePointResult<Value> {
        self.client.get("/_api/web/lists", &[]).await
    }

    /// A single list by title.
    pub async fn get_list(&self, title: &str) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')", title);
        self.client.get(&path, &[]).await
    }

    /// All fields of a list.
    pub async fn get_list_fields(
        &self,
        title: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/fields", title);
        self.client.get(&path, query).await
    }

    /// User-editable fields of a list (hidden and read-only fields
    /// filtered out, matching what edit forms show).
    pub async fn get_fields(
        &self,
        title: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/getbytitle('{}')/fields", title);
        let mut params: Vec<(&str, &str)> = query.to_vec();
        params.push(("$filter", "Hidden eq false and ReadOnlyField eq false"));
        self.client.get(&path, &params).await
    }

    /// Titles and server-relative URLs of the web's subsites.
    pub async fn get_sub_sites(&self) -> SharePointResult<Value> {
        self.client
            .get(
                "/_api/web/webinfos",
                &[("$select", "ServerRelativeUrl,Title")],
            )
            .await
    }

    /// A site page by id.
    pub async fn get_page(&self, id: i64) -> SharePointResult<Value> {
        let path = format!("/_api/sitepages/pages({})", id);
        self.client.get(&path, &[]).await
    }

    // ─── Write ───────────────────────────────────────────────────────

    /// Create a generic list.
    pub async fn create_list(&self, info: &ListInfo) -> SharePointResult<Value> {
        let body = json!({
            "Title": info.title,
            "Description": info.description,
            "ContentTypesEnabled": true,
            "AllowContentTypes": true,
            "BaseTemplate": GENERIC_LIST_TEMPLATE,
        });
        self.client.post("/_api/web/lists", &body, &[]).await
    }

    /// Update a list by id (method-override MERGE).
    pub async fn update_list(&self, list_id: &str, info: &ListInfo) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists('{}')", list_id);
        let body = json!({
            "Title": info.title,
            "Description": info.description,
            "ContentTypesEnabled": true,
            "AllowContentTypes": true,
            "BaseTemplate": GENERIC_LIST_TEMPLATE,
        });
        self.client.merge(&path, &body).await
    }

    /// Delete a list by id (method-override DELETE).
    pub async fn delete_list(&self, list_id: &str) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists('{}')", list_id);
        self.client.post_delete(&path).await
    }

    /// Add a column to a list.  `field_type` defaults to single line of
    /// text when `None`.
    pub async fn create_column(
        &self,
        list: &str,
        name: &str,
        field_type: Option<u32>,
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/getByTitle('{}')/fields", list);
        let body = json!({
            "FieldTypeKind": field_type.unwrap_or(DEFAULT_FIELD_TYPE),
            "Title": name,
        });
        self.client.post(&path, &body, &[]).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
