//! Session principal and authentication payload models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, a closed set resolved by the server
///
/// The store exposes the resolved role as data; where the caller routes a
/// freshly authenticated user is the caller's policy, not this crate's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Seller-side account; the API also accepts the legacy name "lister".
    #[serde(alias = "lister")]
    Agent,
    Client,
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Pending,
    Suspended,
}

/// Authenticated identity associated with the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload returned by login and register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: Principal,
}

/// Request for account creation
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
    pub password_confirmation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Profile update payload; unset fields are left untouched by the server
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Password change payload
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_the_legacy_lister_name() {
        let role: Role = serde_json::from_str("\"lister\"").unwrap();
        assert_eq!(role, Role::Agent);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"agent\"");
    }

    #[test]
    fn principal_tolerates_missing_optional_fields() {
        let body = r#"{
            "id": 3,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "status": "active"
        }"#;

        let principal: Principal = serde_json::from_str(body).unwrap();
        assert_eq!(principal.id, 3);
        assert!(principal.phone.is_none());
        assert!(principal.created_at.is_none());
    }

    #[test]
    fn profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Ada L.".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body.as_object().unwrap().len(), 1);
    }
}
