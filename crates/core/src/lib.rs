//! Bramble Core - Shared types library.
//!
//! This crate provides common types used across all Bramble components:
//! - `server` - The HTTP backend (auth + product catalog)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated username wrapper and the schemaless product document

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
