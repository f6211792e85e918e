//! arXiv feed access for paperlog.
//!
//! [`atom`] reads the Atom documents the arXiv export API answers with;
//! [`FeedClient`] issues the HTTP call and implements
//! [`paperlog_core::feed::PaperFeed`].

pub mod atom;
mod client;
pub mod error;

pub use atom::{FeedPage, parse};
pub use client::{DEFAULT_FEED_URL, FeedClient};
pub use error::{Error, Result};
