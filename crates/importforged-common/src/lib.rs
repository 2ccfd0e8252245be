//! Importforged-Common: Shared types and errors.
//!
//! This crate provides the pieces shared by the post-import pipeline:
//!
//! - **Library types**: scheduled tasks and library items as exposed by the
//!   remote library service
//! - **Subtitle types**: candidates, classifier reports and conversion outcomes
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use importforged_common::{Error, Result, TaskState};
//!
//! assert!(TaskState::Running.is_running());
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("missing video path"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
