//! Shared types for the voicegate services
//!
//! Error taxonomy and configuration resolution used by every
//! voicegate crate.

pub mod config;
pub mod error;

pub use error::{Error, Result};
