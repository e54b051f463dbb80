//! Shared types for the SharePoint REST integration.
//!
//! Models cover client configuration, version-history records produced by
//! the history extractor, people-picker search options, and list payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Configuration for a SharePoint site connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointConfig {
    /// Base URL of the site, e.g. `https://contoso.sharepoint.com/sites/hr`.
    pub base_url: String,
    /// Timeout in seconds for HTTP calls.  Default: 60.
    pub timeout_sec: u64,
}

impl Default for SharePointConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_sec: 60,
        }
    }
}

impl SharePointConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Version history
// ═══════════════════════════════════════════════════════════════════════

/// One entry of an item's version history, parsed from the rendered
/// `versions.aspx` page.  Records are ordered as the server renders them:
/// newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Internal version identifier (the `verid` embedded in the markup).
    pub version_id: i64,
    /// Version number, e.g. `3.0`.
    pub version: f64,
    /// When the version was created.
    pub date: NaiveDateTime,
    /// Who created the version.
    pub author: VersionAuthor,
    /// Field-level changes; empty when the page rendered no detail group
    /// for this version.
    pub changes: Vec<ChangeRecord>,
}

/// Author of a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionAuthor {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// One field-level change within a version.  Cells missing from the
/// rendered markup yield `None` — a normal, non-error condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Element identifier of the nested change row.
    pub id: String,
    pub field: Option<String>,
    pub previous_value: Option<String>,
    pub value: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
//  People-picker search
// ═══════════════════════════════════════════════════════════════════════

/// Query parameters for the client people-picker search.  Defaults match
/// the values SharePoint's own picker sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PeopleSearchOptions {
    pub allow_email_addresses: bool,
    pub allow_multiple_entities: bool,
    pub all_url_zones: bool,
    pub maximum_entity_suggestions: u32,
    pub principal_source: u32,
    pub principal_type: u32,
}

impl Default for PeopleSearchOptions {
    fn default() -> Self {
        Self {
            allow_email_addresses: true,
            allow_multiple_entities: false,
            all_url_zones: false,
            maximum_entity_suggestions: 50,
            principal_source: 15,
            principal_type: 1,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Lists
// ═══════════════════════════════════════════════════════════════════════

/// Payload for creating or updating a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListInfo {
    pub title: String,
    pub description: String,
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
