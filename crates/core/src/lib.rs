//! Saltmarsh Core - Shared types library.
//!
//! This crate provides common types used across all Saltmarsh components:
//! - `client` - Cart/wishlist synchronization engine
//! - `cli` - Command-line tool driving the engine against a store API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Cart, wishlist, and product types plus newtype IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
