//! Shelf Core Library
//!
//! Domain types, error taxonomy, and port traits for the Shelf book
//! catalog service. Backend implementations live in shelf-server.

pub mod error;
pub mod ports;
pub mod types;

pub use error::{Result, ShelfError};
pub use types::{Book, Review};
