// src/models/mod.rs

//! Domain models for the stats notifier.

mod config;
mod item;
mod notification;

// Re-export all public types
pub use config::{Config, EnvConfig, HttpConfig, NotificationConfig, StorageConfig};
pub use item::{Item, Snapshot};
pub use notification::{DeliveryResult, NotificationPayload};
