//! Networking for the platform REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns the HTTP client and bearer-token handling, `types` defines the
//! wire schema shared with the backend.

pub mod api;
pub mod types;
