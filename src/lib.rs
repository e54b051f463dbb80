//! # sharepoint-rest — SharePoint REST API client
//!
//! Convenience client for the SharePoint REST API (`/_api/...`):
//!
//! - **Session** — one `X-RequestDigest` anti-forgery token per client
//!   instance, acquired in the background via `/_api/contextinfo` and
//!   attached to every mutating request.
//! - **Folders & Files** — create, upload (including conditional
//!   create-folder-then-upload), delete, and reads by path, id, and folder.
//! - **Lists & Items** — list/item CRUD, columns, fields, attachments,
//!   CAML queries, item counts, subsites, site pages.
//! - **Users & Groups** — profiles, current user, ensure-user, site-group
//!   membership.
//! - **Comments** — list-item comment CRUD with like/unlike.
//! - **Search** — full-text `/_api/search/query` plus a cancellable
//!   people-picker search with per-call cancellation scopes.
//! - **Version history** — parses the server-rendered `versions.aspx` page
//!   into structured, newest-first version records with field-level changes.
//!
//! No retries, caching, or batching: failures propagate to the caller.

pub mod types;
pub mod error;
pub mod client;
pub mod folders;
pub mod files;
pub mod lists;
pub mod items;
pub mod users;
pub mod groups;
pub mod comments;
pub mod search;
pub mod history;

pub use client::SharePointClient;
pub use error::{SharePointError, SharePointErrorCode, SharePointResult};
pub use history::parse_history_page;
pub use search::SearchCancellation;
pub use types::*;
