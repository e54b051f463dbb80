//! List-item comment operations.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use serde_json::Value;

fn comments_path(list: &str, id: i64) -> String {
    format!("/_api/web/lists/GetByTitle('{}')/items({})/Comments()", list, id)
}

fn comment_path(list: &str, id: i64, comment_id: i64) -> String {
    format!(
        "/_api/web/lists/GetByTitle('{}')/items({})/Comments({})",
        list, id, comment_id
    )
}

/// Comment operations.
pub struct SharePointComments<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointComments<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Comments on an item.
    pub async fn get_comments(
        &self,
        list: &str,
        id: i64,
        query: &[(&str, &str)],
    ) -> SharePointResult<Value> {
        self.client.get(&comments_path(list, id), query).await
    }

    /// Add a comment to an item.  The payload is the comment body, e.g.
    /// `{"text": "Looks good"}`.
    pub async fn add_comment(
        &self,
        list: &str,
        id: i64,
        payload: &Value,
    ) -> SharePointResult<Value> {
        self.client.post(&comments_path(list, id), payload, &[]).await
    }

    /// Delete a comment.
    pub async fn delete_comment(
        &self,
        list: &str,
        id: i64,
        comment_id: i64,
    ) -> SharePointResult<Value> {
        self.client.delete(&comment_path(list, id, comment_id)).await
    }

    /// Like a comment.
    pub async fn like_comment(
        &self,
        list: &str,
        id: i64,
        comment_id: i64,
    ) -> SharePointResult<Value> {
        let path = format!("{}/like", comment_path(list, id, comment_id));
        self.client.post_action(&path).await
    }

    /// Remove a like from a comment.
    pub async fn unlike_comment(
        &self,
        list: &str,
        id: i64,
        comment_id: i64,
    ) -> SharePointResult<Value> {
        let path = format!("{}/unlike", comment_path(list, id, comment_id));
        self.client.post_action(&path).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
