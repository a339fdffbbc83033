//! Saltmarsh Client - Cart/wishlist synchronization engine.
//!
//! Holds the in-memory cart and wishlist for one session, applies
//! optimistic mutations, confirms them against the store API, and rolls
//! back to a captured snapshot when the durable call fails.
//!
//! # Architecture
//!
//! - [`SyncController`] - single-writer state container; all mutations go
//!   through its operations
//! - [`RemoteStore`] - REST client for the store API (10 second timeout,
//!   bearer credential, typed failures)
//! - [`DeviceStore`] - device-local JSON slot used for the guest wishlist
//! - [`Notifier`] - fire-and-forget sink for transient user messages
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use saltmarsh_client::{LogNotifier, SyncConfig, SyncController};
//!
//! let config = SyncConfig::from_env()?;
//! let mut controller = SyncController::from_config(&config, Arc::new(LogNotifier))?;
//!
//! controller.fetch_cart().await?;
//! let cart = controller.add_to_cart(&product, 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod notify;
pub mod pending;
pub mod remote;
pub mod session;

pub use config::{ConfigError, SyncConfig};
pub use controller::{SyncController, WishlistToggle};
pub use device::DeviceStore;
pub use error::SyncError;
pub use notify::{LogNotifier, Notifier, Severity};
pub use pending::{ActionKey, PendingActions};
pub use remote::RemoteStore;
pub use session::SessionToken;
