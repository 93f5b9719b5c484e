//! Core types for Bramble.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod product;
pub mod username;

pub use product::{ProductDoc, ProductDocError, fields};
pub use username::{Username, UsernameError};
