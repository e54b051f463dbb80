//! List-item CRUD, attachments, CAML queries, and item versions.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use log::debug;
use serde_json::{json, Value};

/// List-item operations.
pub struct SharePointItems<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointItems<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    // ─── Write ───────────────────────────────────────────────────────

    /// Create an item in a list.
    pub async fn create_item(&self, list: &str, payload: &Value) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/items", list);
        self.client.post(&path, payload, &[]).await
    }

    /// Update an item (method-override MERGE, unconditional match).
    pub async fn update_item(
        &self,
        list: &str,
        id: i64,
        payload: &Value,
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/items({})", list, id);
        self.client.merge(&path, payload).await
    }

    /// Delete an item (method-override DELETE, unconditional match).
    pub async fn delete_item(&self, list: &str, id: i64) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/items({})", list, id);
        self.client.post_delete(&path).await
    }

    /// Attach a file to an item.
    pub async fn add_item_attachment(
        &self,
        list: &str,
        id: i64,
        data: Vec<u8>,
        file_name: &str,
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/lists/GetByTitle('{}')/items({})/AttachmentFiles/add(FileName='{}')",
            list, id, file_name
        );
        self.client
            .post_raw(&path, data, &[("X-Requested-With", "XMLHttpRequest")])
            .await
    }

    /// Remove an attachment from an item.
    pub async fn delete_item_attachment(
        &self,
        list: &str,
        id: i64,
        file_name: &str,
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/lists/GetByTitle('{}')/items({})/AttachmentFiles/getByFileName('{}')",
            list, id, file_name
        );
        self.client
            .post_delete_with(&path, &[("X-Requested-With", "XMLHttpRequest")])
            .await
    }

    // ─── Read ────────────────────────────────────────────────────────

    /// A single item by id.
    pub async fn get_item(
        &self,
        list: &str,
        id: i64,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/items({})", list, id);
        self.client.get(&path, query).await
    }

    /// Items of a list (nometadata envelope — rows appear under `value`).
    pub async fn get_items(
        &self,
        list: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/items", list);
        self.client.get_nometadata(&path, query).await
    }

    /// Items selected by a CAML view, returned as the bare row array.
    pub async fn get_items_caml(
        &self,
        list: &str,
        view_xml: Option<&str>,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/GetItems", list);
        let body = match view_xml {
            Some(xml) => json!({
                "query": {
                    "__metadata": { "type": "SP.CamlQuery" },
                    "ViewXml": xml,
                }
            }),
            None => json!({}),
        };
        let resp = self.client.post(&path, &body, query).await?;
        let rows = resp["value"].clone();
        debug!(
            "CAML query on '{}' returned {} rows",
            list,
            rows.as_array().map(|a| a.len()).unwrap_or(0)
        );
        Ok(rows)
    }

    /// Number of items in a list.
    pub async fn get_item_count(&self, list: &str) -> SharePointResult<Value> {
        let path = format!("/_api/web/lists/GetByTitle('{}')/itemcount", list);
        self.client.get(&path, &[]).await
    }

    /// Version metadata of an item, via the REST versions collection.
    /// For the parsed field-level change history see
    /// [`crate::history::VersionHistory`].
    pub async fn get_item_versions(
        &self,
        list: &str,
        id: i64,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/lists/GetByTitle('{}')/items({})/versions",
            list, id
        );
        self.client.get(&path, query).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
