//! Folder operations.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use log::debug;
use serde_json::{json, Value};

/// Folder operations.
pub struct SharePointFolders<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointFolders<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Create a folder under a server-relative parent path.
    pub async fn create_folder(&self, parent: &str, name: &str) -> SharePointResult<Value> {
        let body = json!({
            "ServerRelativeUrl": format!("{}/{}", parent, name),
        });
        self.client.post("/_api/web/folders", &body, &[]).await
    }

    /// Whether a folder exists at a server-relative path.
    pub async fn folder_exists(&self, path: &str) -> SharePointResult<bool> {
        let api_path = format!("/_api/web/GetFolderByServerRelativeUrl('{}')/Exists", path);
        let resp = self.client.get(&api_path, &[]).await?;
        // Verbose responses wrap the boolean in `d.Exists`; plain ones
        // expose it as `value`.
        let exists = resp["d"]["Exists"]
            .as_bool()
            .or_else(|| resp["value"].as_bool())
            .unwrap_or(false);
        debug!("Folder '{}' exists: {}", path, exists);
        Ok(exists)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_folder_payload_shape() {
        let body = json!({
            "ServerRelativeUrl": format!("{}/{}", "Shared Documents", "reports"),
        });
        assert_eq!(body["ServerRelativeUrl"], "Shared Documents/reports");
    }
}
