//! HTTP transport and session lifecycle for the marketplace API
//!
//! This crate owns the two process-wide concerns of the SDK: the single
//! request path every resource call goes through (bearer injection, envelope
//! decoding, error classification, the 401 teardown protocol) and the
//! session store (login, register, bootstrap, logout, profile refresh) with
//! pluggable token persistence.

pub mod error;
pub mod http;
pub mod models;
pub mod session;
pub mod token_store;
