//! Seller's own listings resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::filters::FilterSet;

use crate::resource::{ResourceDesc, ResourceMutation, ResourceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Published,
    Archived,
}

/// Listing row as the seller dashboard sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyListing {
    pub id: u64,
    pub title: String,
    pub status: ListingStatus,
    pub price: u64,
    /// Display price formatted by the server; mirrored verbatim.
    #[serde(default)]
    pub formatted_price: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub photos_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters accepted by the my-listings endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub status: Option<ListingStatus>,
}

impl FilterSet for ListingFilter {
    fn cleared(&self) -> Self {
        Self {
            search: self.search.clone(),
            ..Self::default()
        }
    }
}

/// Closed set of mutations the my-listings endpoint accepts
#[derive(Debug, Clone)]
pub enum ListingMutation {
    Status(ListingStatus),
    Price(u64),
}

impl ResourceMutation for ListingMutation {
    fn segment(&self) -> &'static str {
        match self {
            ListingMutation::Status(_) => "status",
            ListingMutation::Price(_) => "price",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ListingMutation::Status(status) => json!({ "status": status }),
            ListingMutation::Price(price) => json!({ "price": price }),
        }
    }
}

impl ResourceDesc for MyListing {
    type Filter = ListingFilter;
    type Mutation = ListingMutation;

    const COLLECTION: &'static str = "my-listings";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Store over the seller's own listings
pub type MyListings = ResourceStore<MyListing>;

/// Rollup over the currently held page only; a page-local approximation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingPageStats {
    pub total_on_page: usize,
    pub drafts: usize,
    pub published: usize,
    pub archived: usize,
    pub total_views: u64,
}

impl ListingPageStats {
    pub fn from_page(items: &[MyListing]) -> Self {
        let mut stats = Self {
            total_on_page: items.len(),
            ..Self::default()
        };
        for listing in items {
            match listing.status {
                ListingStatus::Draft => stats.drafts += 1,
                ListingStatus::Published => stats.published += 1,
                ListingStatus::Archived => stats.archived += 1,
            }
            stats.total_views += listing.views;
        }
        stats
    }
}
