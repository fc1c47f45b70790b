// src/lib.rs

//! Raycast extension stats notifier library.
//!
//! Fetches download counts from the Raycast store, diffs them against the
//! last saved snapshot and pushes an encrypted summary to Bark.

pub mod crypto;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
