//! Common utilities and types shared across CryptKit crates.
//!
//! This module provides the error taxonomy, the chainable [`Outcome`] type
//! used for expected failures, and the byte/text codec.

pub mod codec;
pub mod error;
pub mod outcome;
pub mod types;

pub use error::{ConstructionError, Error, Result};
pub use outcome::{Outcome, OutcomeFutureExt};
pub use types::SensitiveBytes;
