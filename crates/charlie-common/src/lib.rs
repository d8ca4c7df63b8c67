//! # Charlie Common
//!
//! Shared types, errors, and constants used across Charlie components.
//!
//! ## Modules
//! - `types` - Core data structures (Session, CaptchaChallenge, Post, etc.)
//! - `error` - Common error type
//! - `constants` - Storage keys and default tunables

pub mod constants;
pub mod error;
pub mod types;

pub use error::{CharlieError, Result};
pub use types::*;
