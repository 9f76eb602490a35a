//! Client-side resource synchronization for the marketplace API
//!
//! One generic paginated store ([`resource::ResourceStore`]) instantiated
//! per server resource (admin users, admin properties, admin partners, my
//! listings), plus the debounce-driven filter-sync controller that turns
//! rapid filter edits into coalesced fetches.

pub mod resource;
pub mod resources;
pub mod sync;
