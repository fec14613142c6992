//! tinystore Common - Shared types and utilities
//!
//! This crate provides the error taxonomy, validated names and configuration
//! used by the store and the gateway.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
