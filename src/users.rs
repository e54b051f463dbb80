//! User and profile operations.

use crate::client::SharePointClient;
use crate::error::SharePointResult;
use serde_json::Value;

/// Claims-encoded login name for an email account.
pub(crate) fn membership_login(email: &str) -> String {
    format!("i:0#.f|membership|{}", email)
}

/// User operations.
pub struct SharePointUsers<'a> {
    client: &'a SharePointClient,
}

impl<'a> SharePointUsers<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Profile properties for an account name.
    pub async fn get_user(&self, account: &str) -> SharePointResult<Value> {
        let account = format!("'{}'", account);
        self.client
            .get(
                "/_api/sp.userprofiles.peoplemanager/getpropertiesfor(@v)",
                &[("@v", account.as_str())],
            )
            .await
    }

    /// Profile properties looked up by email, via the claims-encoded
    /// membership login.
    pub async fn get_user_by_email(&self, email: &str) -> SharePointResult<Value> {
        let account = format!("'{}'", membership_login(email));
        self.client
            .get(
                "/_api/sp.userprofiles.peoplemanager/getpropertiesfor(@v)",
                &[("@v", account.as_str())],
            )
            .await
    }

    /// Site user by numeric id.
    pub async fn get_user_by_id(&self, id: i64) -> SharePointResult<Value> {
        let path = format!("/_api/web/getuserbyid({})", id);
        self.client.get(&path, &[]).await
    }

    /// Profile properties of the current user.
    pub async fn get_my_properties(&self) -> SharePointResult<Value> {
        self.client
            .get(
                "/_api/SP.UserProfiles.PeopleManager/GetMyProperties/UserProfileProperties",
                &[],
            )
            .await
    }

    /// The current site user, with group membership expanded.
    pub async fn get_current_user(&self) -> SharePointResult<Value> {
        self.client
            .get("/_api/web/currentuser", &[("$expand", "groups")])
            .await
    }

    /// Groups of the current user (the `Groups` collection of
    /// [`get_current_user`](Self::get_current_user)).
    pub async fn get_user_groups(&self) -> SharePointResult<Value> {
        let resp = self.get_current_user().await?;
        let groups = if resp["d"].is_object() {
            resp["d"]["Groups"].clone()
        } else {
            resp["Groups"].clone()
        };
        Ok(groups)
    }

    /// Ensure a user exists in the site, creating the site user if needed.
    pub async fn ensure_user(&self, email: &str) -> SharePointResult<Value> {
        let path = format!("/_api/web/ensureuser('{}')", email);
        self.client.post_action(&path).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
