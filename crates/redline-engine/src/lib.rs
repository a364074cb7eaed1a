//! Redline Engine - Orchestration layer
//!
//! Coordinates extraction, merge and highlighting (redline-core) with the
//! version chain (redline-store) behind fixed, typed entry points.

pub mod commands;
