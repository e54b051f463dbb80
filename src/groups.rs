//! Site-group membership operations.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use crate::users::membership_login;
use serde_json::{json, Value};

/// Group operations.
pub struct SharePointGroups<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointGroups<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Members of a site group, by group name.
    pub async fn get_users_in_group(&self, group_name: &str) -> SharePointResult<Value> {
        let path = format!("/_api/Web/SiteGroups/GetByName('{}')/users", group_name);
        self.client.get(&path, &[]).await
    }

    /// Add a user (by email) to a site group.
    pub async fn add_user_to_group(&self, group_id: i64, email: &str) -> SharePointResult<Value> {
        let path = format!("/_api/Web/SiteGroups({})/users", group_id);
        let body = json!({ "LoginName": membership_login(email) });
        self.client.post(&path, &body, &[]).await
    }

    /// Remove a user (by email) from a site group (method-override DELETE).
    pub async fn remove_user_from_group(
        &self,
        group_id: i64,
        email: &str,
    ) -> SharePointResult<Value> {
        let path = format!(
            "/_api/Web/SiteGroups({})/users/getByEmail('{}')",
            group_id, email
        );
        self.client.post_delete(&path).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_user_payload() {
        let body = json!({ "LoginName": membership_login("jane@contoso.com") });
        assert_eq!(body["LoginName"], "i:0#.f|membership|jane@contoso.com");
    }
}
