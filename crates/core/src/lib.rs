//! Shared core for the savepoint persistence engine
//!
//! This crate holds the pieces both the container and codec layers need:
//! - the common error type
//! - host / on-disk byte order conversion
//! - the process-wide name and sprite intern pools

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod endian;
pub mod error;
pub mod name;
pub mod sprite;

pub use error::{Error, Result};
pub use name::Name;
pub use sprite::Sprite;
