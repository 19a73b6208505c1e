//! # CSVF Core
//!
//! Core components for the CSVF toolchain.
//!
//! This crate provides the building blocks shared by the converter and the
//! codec:
//!
//! - [`error`]: Error types
//! - [`window`]: Bounded look-back window for streaming decompression
//!
//! ## Architecture
//!
//! The toolchain is a small layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ csvf-xsvf                                               │
//! │     XSVF command model, parser, CSVF re-encoder         │
//! ├─────────────────────────────────────────────────────────┤
//! │ csvf-codec                                              │
//! │     run/copy token compressor, streaming pull reader    │
//! ├─────────────────────────────────────────────────────────┤
//! │ csvf-core (this crate)                                  │
//! │     CsvfError, HistoryWindow                            │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod window;

// Re-exports for convenience
pub use error::{CsvfError, Result};
pub use window::HistoryWindow;
