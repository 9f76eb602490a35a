//! Admin user directory resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use client::models::{AccountStatus, Role};
use common::filters::FilterSet;

use crate::resource::{ResourceDesc, ResourceMutation, ResourceStore};

/// User row as the admin dashboard sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    /// Server-derived listing count; mirrored, never computed locally.
    #[serde(default)]
    pub listings_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters accepted by the admin user list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

impl FilterSet for UserFilter {
    fn cleared(&self) -> Self {
        Self {
            search: self.search.clone(),
            ..Self::default()
        }
    }
}

/// Closed set of mutations the user endpoint accepts
#[derive(Debug, Clone)]
pub enum UserMutation {
    Status(AccountStatus),
    Role(Role),
}

impl ResourceMutation for UserMutation {
    fn segment(&self) -> &'static str {
        match self {
            UserMutation::Status(_) => "status",
            UserMutation::Role(_) => "role",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            UserMutation::Status(status) => json!({ "status": status }),
            UserMutation::Role(role) => json!({ "role": role }),
        }
    }
}

impl ResourceDesc for AdminUser {
    type Filter = UserFilter;
    type Mutation = UserMutation;

    const COLLECTION: &'static str = "admin/users";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Store over the admin user directory
pub type AdminUsers = ResourceStore<AdminUser>;

/// Rollup over the currently held page only.
///
/// The server exposes no user statistics endpoint, so these counts are a
/// page-local approximation, not a global truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPageStats {
    pub total_on_page: usize,
    pub active: usize,
    pub pending: usize,
    pub suspended: usize,
    pub admins: usize,
    pub agents: usize,
    pub clients: usize,
}

impl UserPageStats {
    pub fn from_page(items: &[AdminUser]) -> Self {
        let mut stats = Self {
            total_on_page: items.len(),
            ..Self::default()
        };
        for user in items {
            match user.status {
                AccountStatus::Active => stats.active += 1,
                AccountStatus::Pending => stats.pending += 1,
                AccountStatus::Suspended => stats.suspended += 1,
            }
            match user.role {
                Role::Admin => stats.admins += 1,
                Role::Agent => stats.agents += 1,
                Role::Client => stats.clients += 1,
            }
        }
        stats
    }
}
