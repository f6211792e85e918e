//! Core types and trait definitions for paperlog.
//!
//! This crate has no HTTP or database dependencies. The
//! feed client, the SQLite store and the HTTP API all depend on it.

// Native `async fn` in traits; the returned futures carry explicit `Send`
// bounds where it matters.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod feed;
pub mod query;
pub mod record;
pub mod store;

pub use error::{Error, Result};
