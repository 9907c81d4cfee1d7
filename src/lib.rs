//! Dynamic DNS client for Cloudflare, Netlify, Namecheap and Vercel.
//!
//! Each provider module exposes a client that resolves a zone (or domain)
//! and a record, then updates, creates or deletes records through immutable
//! handles. All of them share the error taxonomy in [`error`] and the
//! pagination types in [`pagination`].

pub mod config;
pub mod dns;
pub mod error;
pub mod ip;
pub mod pagination;

pub use error::{ApiError, ApiErrorDetail, Error, Result, Rollback, UnrecognizedError};
