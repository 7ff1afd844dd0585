//! Session state and its durable backing store.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{AuthError, LoginOutcome, Session, SessionStore};
