//! Networking modules for the attendance REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` owns HTTP and the bearer credential, `api` maps endpoints to
//! typed calls, and `types` defines the wire schema.

pub mod api;
pub mod transport;
pub mod types;

// =============================================================================
// TEST HELPERS
// =============================================================================
