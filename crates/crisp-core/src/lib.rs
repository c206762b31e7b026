//! crisp-core - Core library for the CRISP client
//!
//! This crate contains the shared models, REST API client, synchronization
//! engine, and collection-view state machine used by all CRISP client
//! front ends.

pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{RecordId, ResourceKind};
