//! File operations: upload, conditional create-in-folder, delete, and reads
//! by path, id, and containing folder.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use crate::folders::SharePointFolders;
use log::{debug, info};
use serde_json::Value;

/// File operations.
pub struct SharePointFiles<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointFiles<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    // ─── Write ───────────────────────────────────────────────────────

    /// Upload a file into a server-relative folder, overwriting any
    /// existing file of the same name.
    pub async fn create_file(
        &self,
        folder: &str,
        file_name: &str,
        contents: String,
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/GetFolderByServerRelativeUrl('{}')/Files/add(url='{}',overwrite=true)",
            folder, file_name
        );
        self.client
            .post_text(&path, contents, &[("$expand", "ListItemAllFields")])
            .await
    }

    /// Upload a file into a folder within a document library, creating the
    /// folder first when it does not exist.
    ///
    /// Issues the existence check, at most one folder creation, then the
    /// upload — sequenced within this single call.  Two outstanding calls
    /// targeting the same folder are not coordinated.
    pub async fn create_file_in_folder(
        &self,
        library: &str,
        folder: &str,
        file_name: &str,
        contents: String,
    ) -> SharePointResult<Value> {
        let folders = SharePointFolders::new(self.client);
        let exists = folders
            .folder_exists(&format!("{}/{}", library, folder))
            .await?;

        if !exists {
            info!("Folder '{}/{}' missing, creating it", library, folder);
            folders.create_folder(library, folder).await?;
        }

        // Nested folders address each segment as folders('segment').
        let segments = folder
            .split('/')
            .map(|s| format!("folders('{}')", s))
            .collect::<Vec<_>>()
            .join("/");
        let path = format!(
            "/_api/web/lists/GetByTitle('{}')/RootFolder/{}/files/add(url='{}',overwrite=true)",
            library, segments, file_name
        );
        self.client.post_text(&path, contents, &[]).await
    }

    /// Delete a file by folder path and name (method-override DELETE).
    pub async fn delete_file(&self, folder: &str, file_name: &str) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/GetFolderByServerRelativeUrl('{}/{}')",
            folder, file_name
        );
        self.client.post_delete(&path).await
    }

    // ─── Read ────────────────────────────────────────────────────────

    /// Raw file contents by server-relative path.
    pub async fn get_file_content(
        &self,
        file_path: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<String> {
        let path = format!("/_api/web/GetFileByServerRelativeUrl('{}')/$value", file_path);
        self.client.get_text(&path, query).await
    }

    /// File metadata by server-relative path.
    pub async fn get_file_by_path(
        &self,
        file_path: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/GetFileByServerRelativeUrl('{}')", file_path);
        self.client.get(&path, query).await
    }

    /// File property bag by server-relative path.
    pub async fn get_file_properties(
        &self,
        file_path: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/web/GetFileByServerRelativeUrl('{}')/Properties",
            file_path
        );
        self.client.get(&path, query).await
    }

    /// File metadata by unique id.
    pub async fn get_file_by_id(
        &self,
        id: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/GetFileById('{}')", id);
        self.client.get(&path, query).await
    }

    /// Folder metadata (and, via `$expand`, its files) by server-relative
    /// path.
    pub async fn get_folder(
        &self,
        folder: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/GetFolderByServerRelativeUrl('{}')", folder);
        self.client.get(&path, query).await
    }

    /// Files directly inside a folder.
    pub async fn get_files_in_folder(
        &self,
        folder: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        let path = format!("/_api/web/GetFolderByServerRelativeUrl('{}')/Files", folder);
        let resp = self.client.get(&path, query).await?;
        debug!("Listed files in '{}'", folder);
        Ok(resp)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    #[test]
    fn test_nested_folder_segments() {
        let folder = "2026/august/reports";
        let segments = folder
            .split('/')
            .map(|s| format!("folders('{}')", s))
            .collect::<Vec<_>>()
            .join("/");
        assert_eq!(
            segments,
            "folders('2026')/folders('august')/folders('reports')"
        );
    }

    #[test]
    fn test_single_folder_segment() {
        let segments = "reports"
            .split('/')
            .map(|s| format!("folders('{}')", s))
            .collect::<Vec<_>>()
            .join("/");
        assert_eq!(segments, "folders('reports')");
    }
}
