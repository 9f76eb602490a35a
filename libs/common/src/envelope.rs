//! Response envelope and pagination types for the marketplace API
//!
//! Every non-multipart response uses the same wrapper:
//! `{ success, message, data?, errors? }`. A call only counts as successful
//! when the HTTP status is 2xx *and* `success` is true; both conditions are
//! checked by the transport, not by callers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Uniform wrapper around every API response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Field-level validation errors, populated on 422-style responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

/// Pagination cursor returned alongside every list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<u32>,
    pub has_more_pages: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: 10,
            total: 0,
            from: None,
            to: None,
            has_more_pages: false,
        }
    }
}

impl<T> Envelope<T> {
    /// Whether the server reported the call as successful.
    ///
    /// The transport still requires a 2xx HTTP status on top of this.
    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_envelope() {
        let body = r#"{
            "success": true,
            "message": "OK",
            "data": {"id": 3, "name": "Alice"}
        }"#;

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.message, "OK");
        assert_eq!(envelope.data.unwrap()["id"], 3);
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn keeps_every_field_error_inspectable() {
        let body = r#"{
            "success": false,
            "message": "The given data was invalid.",
            "errors": {
                "email": ["The email has already been taken."],
                "password": ["The password must be at least 8 characters.", "The password confirmation does not match."]
            }
        }"#;

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);

        let errors = envelope.errors.unwrap();
        assert_eq!(errors["email"].len(), 1);
        assert_eq!(errors["password"].len(), 2);
    }

    #[test]
    fn decodes_paginated_page() {
        let body = r#"{
            "data": [{"id": 1}, {"id": 2}],
            "pagination": {
                "current_page": 1,
                "last_page": 5,
                "per_page": 2,
                "total": 10,
                "from": 1,
                "to": 2,
                "has_more_pages": true
            }
        }"#;

        let page: Page<serde_json::Value> = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 10);
        assert!(page.pagination.has_more_pages);
    }
}
