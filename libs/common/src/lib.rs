//! Shared wire contract for the marketplace client SDK
//!
//! This crate provides the types every other crate in the workspace agrees
//! on: the uniform response envelope, the pagination model for list
//! endpoints, filter-set encoding to and from URL query strings, and the
//! client configuration.

pub mod config;
pub mod envelope;
pub mod filters;
