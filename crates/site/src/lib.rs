//! Folio site library.
//!
//! Portfolio, blog and admin dashboard as a JSON service. Exposed as a
//! library so the router can be driven in-process by tests and the CLI can
//! reuse the stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
