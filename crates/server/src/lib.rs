//! Bramble Server - Session-authenticated product catalog backend.
//!
//! # Architecture
//!
//! - Axum web framework with Askama templates for server-side rendering
//! - tower-sessions for cookie-referenced, server-side session state
//! - `PostgreSQL` for credentials and schemaless product documents, behind
//!   the [`db::UserStore`] / [`db::ProductStore`] traits (with in-memory
//!   backends for tests)
//! - Two response modes: page-serving (redirects + rendered views) and JSON
//!
//! The crate is a library so the integration tests can assemble the full
//! router in-process; the binary in `main.rs` wires the `PostgreSQL`
//! backends and serves it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
