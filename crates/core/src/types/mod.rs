//! Core types for Saltmarsh.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;
pub mod wishlist;

pub use cart::{Cart, CartItem, CartSummary};
pub use id::*;
pub use product::{ProductRef, ProductRefError};
pub use wishlist::{Rating, WishlistItem};
