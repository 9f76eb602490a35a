//! Partner directory resource (file-bearing: logo uploads)

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::filters::FilterSet;

use crate::resource::{ResourceDesc, ResourceMutation, ResourceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerStatus {
    Active,
    Inactive,
}

/// Partner row as the admin directory sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Server-hosted logo location; set by the API after upload.
    #[serde(default)]
    pub logo_url: Option<String>,
    pub sort_order: i32,
    pub status: PartnerStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Filters accepted by the partner list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerFilter {
    pub search: Option<String>,
    pub status: Option<PartnerStatus>,
}

impl FilterSet for PartnerFilter {
    fn cleared(&self) -> Self {
        Self {
            search: self.search.clone(),
            ..Self::default()
        }
    }
}

/// Closed set of mutations the partner endpoint accepts
#[derive(Debug, Clone)]
pub enum PartnerMutation {
    Status(PartnerStatus),
    SortOrder(i32),
}

impl ResourceMutation for PartnerMutation {
    fn segment(&self) -> &'static str {
        match self {
            PartnerMutation::Status(_) => "status",
            PartnerMutation::SortOrder(_) => "sort",
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            PartnerMutation::Status(status) => json!({ "status": status }),
            PartnerMutation::SortOrder(order) => json!({ "sort_order": order }),
        }
    }
}

impl ResourceDesc for Partner {
    type Filter = PartnerFilter;
    type Mutation = PartnerMutation;

    const COLLECTION: &'static str = "admin/partners";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Store over the partner directory
pub type AdminPartners = ResourceStore<Partner>;

/// Multipart payload for creating or updating a partner
///
/// The logo travels as a file part; textual fields as form fields. Updates
/// go through the store's `update_multipart`, which adds the `_method=PUT`
/// override.
#[derive(Debug, Clone, Default)]
pub struct PartnerUpload {
    pub name: String,
    pub website: Option<String>,
    pub logo: Option<LogoFile>,
}

/// Logo file attachment
#[derive(Debug, Clone)]
pub struct LogoFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PartnerUpload {
    pub fn into_form(self) -> Form {
        let mut form = Form::new().text("name", self.name);
        if let Some(website) = self.website {
            form = form.text("website", website);
        }
        if let Some(logo) = self.logo {
            form = form.part("logo", Part::bytes(logo.bytes).file_name(logo.file_name));
        }
        form
    }
}
