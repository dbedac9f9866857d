//! eventhub-core library.
//!
//! A college event registry: one persisted container of events, a
//! capacity-checked registration operation, and pure queries over snapshots.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at module boundaries, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` only in config loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: operations that stamp or compare dates take `now`/`as_of`
//!   explicitly.

pub mod config;
pub mod error;
pub mod health;
pub mod id;
pub mod lock;
pub mod model;
pub mod moderation;
pub mod query;
pub mod registration;
pub mod seed;
pub mod session;
pub mod stats;
pub mod store;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use model::{Event, EventStatus};
pub use registration::{RegistrationOutcome, register};
pub use session::{Role, Session};
pub use store::{EventStore, FileBackend, MemoryBackend, StorageBackend, StoreError};
