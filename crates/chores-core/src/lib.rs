//! Core types and trait definitions for the Housechores ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the web server both depend on it.

pub mod error;
pub mod model;
pub mod policy;
pub mod store;
pub mod view;

pub use error::{Error, Result};
