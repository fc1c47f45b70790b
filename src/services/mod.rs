//! Service layer for the stats notifier.
//!
//! This module contains the two remote collaborators:
//! - Catalog fetching (`CatalogFetcher`)
//! - Encrypted Bark delivery (`BarkClient`)

mod bark;
mod catalog;

pub use bark::BarkClient;
pub use catalog::{CatalogFetcher, parse_catalog};
