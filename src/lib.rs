//! Client for the attendance-tracking REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` keeps the logged-in token and user mirrored to durable storage,
//! `router` guards every page transition against that session, `net` talks to
//! the backend, and `app` wires them together and turns a 401 from any call
//! into a logout.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod session;

pub use app::{App, AppError};
pub use config::ClientConfig;
