//! Cloud sync for a point-of-sale client.
//!
//! Bills, menu items and shop settings live in a local SQLite store and are
//! mirrored to a remote spreadsheet-backed endpoint that speaks a small
//! action-based HTTP protocol. Bills are pushed as they are created and
//! tracked with a per-bill sync flag; a pull makes the local store match the
//! remote copy exactly.

pub mod config;
pub mod db;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError, SyncConfig};
pub use remote::{RemoteApi, RemoteClient, RemoteError};
pub use store::StoreError;
pub use sync::{PullReport, Scheduler, SyncEngine, SyncError};
