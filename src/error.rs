//! Error types for the SharePoint REST integration.
//!
//! All public API surfaces in this crate return `SharePointResult<T>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type SharePointResult<T> = Result<T, SharePointError>;

/// Error codes specific to SharePoint REST operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharePointErrorCode {
    /// Missing / invalid request digest or credentials (HTTP 401 / 403).
    AuthFailed,
    /// Resource (list, item, file, folder) not found (HTTP 404).
    NotFound,
    /// Conflict (name collision, stale ETag).
    Conflict,
    /// Rate-limited (HTTP 429).
    RateLimited,
    /// Bad request / invalid parameter.
    InvalidRequest,
    /// Network / connectivity error.
    NetworkError,
    /// (De)serialization error.
    SerializationError,
    /// The rendered version-history page did not match the expected shape.
    UnparseableHistory,
    /// The request was cancelled before it completed.
    Cancelled,
    /// Catch-all internal / server-side error.
    InternalError,
}

impl fmt::Display for SharePointErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every public function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointError {
    pub code: SharePointErrorCode,
    pub message: String,
    /// HTTP status, when the error came from a response.
    pub status: Option<u16>,
    /// OData error code from the response envelope, when present.
    pub odata_error_code: Option<String>,
}

impl fmt::Display for SharePointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref oc) = self.odata_error_code {
            write!(f, " (odata: {})", oc)?;
        }
        Ok(())
    }
}

impl std::error::Error for SharePointError {}

impl SharePointError {
    /// Create from a code + message.
    pub fn new(code: SharePointErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status: None,
            odata_error_code: None,
        }
    }

    /// Shortcut: network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::NetworkError, msg)
    }

    /// Shortcut: internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::InternalError, msg)
    }

    /// Shortcut: unparseable version-history page.
    pub fn unparseable_history(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::UnparseableHistory, msg)
    }

    /// Shortcut: cancelled request.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::new(SharePointErrorCode::Cancelled, msg)
    }

    /// Build an error from a SharePoint REST error response body.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let code = match status {
            401 | 403 => SharePointErrorCode::AuthFailed,
            404 => SharePointErrorCode::NotFound,
            409 => SharePointErrorCode::Conflict,
            429 => SharePointErrorCode::RateLimited,
            _ if status >= 500 => SharePointErrorCode::InternalError,
            _ => SharePointErrorCode::InvalidRequest,
        };

        let (odata_code, odata_msg) = Self::parse_odata_error_body(body);

        let message = odata_msg
            .unwrap_or_else(|| format!("SharePoint REST error (HTTP {})", status));

        Self {
            code,
            message,
            status: Some(status),
            odata_error_code: odata_code,
        }
    }

    /// Try to extract the OData error envelope. Verbose responses use
    /// `{ "error": { "code": "...", "message": { "value": "..." } } }`,
    /// nometadata responses use `{ "odata.error": { ... } }`.
    fn parse_odata_error_body(body: &str) -> (Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None);
        };
        let err = if v["error"].is_object() {
            &v["error"]
        } else {
            &v["odata.error"]
        };
        let code = err["code"].as_str().map(String::from);
        let msg = err["message"]["value"]
            .as_str()
            .or_else(|| err["message"].as_str())
            .map(String::from);
        (code, msg)
    }
}

impl From<reqwest::Error> for SharePointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::internal(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SharePointError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            SharePointErrorCode::SerializationError,
            format!("JSON error: {}", err),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
