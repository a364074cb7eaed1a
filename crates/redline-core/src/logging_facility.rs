//! Structured logging facility for Redline
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use redline_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use redline_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
