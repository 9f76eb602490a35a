//! Admin property moderation resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::filters::FilterSet;

use crate::resource::{ResourceDesc, ResourceMutation, ResourceStore};

/// Moderation status of a published property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Pending,
    Approved,
    Rejected,
}

/// Property category, a closed set owned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Apartment,
    House,
    Villa,
    Land,
    Commercial,
}

/// Property row as the admin moderation screen sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProperty {
    pub id: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub status: PropertyStatus,
    pub price: u64,
    /// Display price formatted by the server; mirrored verbatim.
    #[serde(default)]
    pub formatted_price: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters accepted by the admin property list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFilter {
    pub search: Option<String>,
    pub status: Option<PropertyStatus>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyKind>,
    pub city: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub amenities: Vec<String>,
}

impl FilterSet for PropertyFilter {
    fn cleared(&self) -> Self {
        Self {
            search: self.search.clone(),
            ..Self::default()
        }
    }
}

/// Closed set of mutations the property endpoint accepts
#[derive(Debug, Clone)]
pub enum PropertyMutation {
    Status(PropertyStatus),
    Featured(bool),
}

impl ResourceMutation for PropertyMutation {
    fn segment(&self) -> &'static str {
        match self {
            PropertyMutation::Status(_) => "status",
            PropertyMutation::Featured(_) => "featured",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            PropertyMutation::Status(status) => json!({ "status": status }),
            PropertyMutation::Featured(featured) => json!({ "featured": featured }),
        }
    }
}

impl ResourceDesc for AdminProperty {
    type Filter = PropertyFilter;
    type Mutation = PropertyMutation;

    const COLLECTION: &'static str = "admin/properties";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Store over the admin property list
pub type AdminProperties = ResourceStore<AdminProperty>;

/// Rollup over the currently held page only; a page-local approximation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyPageStats {
    pub total_on_page: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total_views: u64,
}

impl PropertyPageStats {
    pub fn from_page(items: &[AdminProperty]) -> Self {
        let mut stats = Self {
            total_on_page: items.len(),
            ..Self::default()
        };
        for property in items {
            match property.status {
                PropertyStatus::Pending => stats.pending += 1,
                PropertyStatus::Approved => stats.approved += 1,
                PropertyStatus::Rejected => stats.rejected += 1,
            }
            stats.total_views += property.views;
        }
        stats
    }
}
