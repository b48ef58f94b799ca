//! Folio Core - Shared domain types.
//!
//! This crate provides the types shared by every Folio component:
//! - `site` - The portfolio web service (public views and admin dashboard)
//! - `cli` - Command-line tools for migrations and role administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, slugs, tech stacks, statuses, resume schema
//!   and contact form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
