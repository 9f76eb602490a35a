//! Per-resource instantiations of the generic store

pub mod listings;
pub mod partners;
pub mod properties;
pub mod users;
