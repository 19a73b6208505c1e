//! XSVF parsing and conversion to CSVF.
//!
//! XSVF is the binary command encoding produced by vendor tools for JTAG
//! device programming. This crate parses a raw XSVF byte stream into a typed
//! command model and re-emits it in CSVF, the compact instruction encoding
//! consumed by the rest of the toolchain. Conversion also reports
//! `max_buf_size`, the byte length of the largest single vector operand in
//! the stream — the scratch buffer a replay engine must allocate.
//!
//! # Example
//!
//! ```
//! use csvf_xsvf::convert;
//!
//! // XSDRSIZE 8, XSDR 0xA5, XCOMPLETE
//! let xsvf = [0x08, 0x00, 0x00, 0x00, 0x08, 0x03, 0xA5, 0x00];
//! let conversion = convert(&xsvf).unwrap();
//! assert_eq!(conversion.max_buf_size, 1);
//! assert_eq!(conversion.data[0], 0x00); // CSVF revision byte
//! ```

#![warn(clippy::all)]

pub mod command;
pub mod convert;
pub mod csvf;
pub mod parse;

pub use command::{Command, EndState, TapState};
pub use convert::{Conversion, convert, load_and_convert};
pub use parse::XsvfParser;

#[cfg(feature = "parallel")]
pub use convert::load_and_convert_many;
