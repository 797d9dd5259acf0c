//! Background Tasks Module
//!
//! Contains background tasks that run alongside the wallet core.
//!
//! # Tasks
//! - Persistence: writes fetched values to the persistent store
//! - Auto-refresh: refreshes the wallet at configured intervals

mod persistence;
mod refresh;

pub use persistence::{spawn_persistence_task, PersistenceHandle};
pub use refresh::spawn_refresh_task;
