//! XSVF to CSVF conversion.
//!
//! Conversion is a single pass: parse each XSVF command, re-emit it in the
//! CSVF encoding, and track the largest vector operand seen. It is a pure
//! function of the input buffer — no shared state — so independent files may
//! be converted concurrently.

use crate::csvf;
use crate::parse::XsvfParser;
use csvf_core::Result;
use log::debug;
use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of converting an XSVF stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The uncompressed CSVF instruction stream.
    pub data: Vec<u8>,
    /// Byte length of the largest single vector operand in the source:
    /// the scratch buffer a replay engine must allocate.
    pub max_buf_size: u32,
}

/// Convert a raw XSVF stream to uncompressed CSVF.
///
/// Fails with `UnsupportedOpcode` on an opcode outside the recognized set
/// and `MalformedStream` when a declared length overruns the remaining
/// input. On failure no partial output is observable.
pub fn convert(xsvf: &[u8]) -> Result<Conversion> {
    let mut parser = XsvfParser::new(xsvf);
    let mut data = Vec::with_capacity(xsvf.len() + 1);
    csvf::begin_stream(&mut data);

    let mut max_buf_size = 0u32;
    let mut commands = 0usize;
    while let Some(command) = parser.next_command()? {
        max_buf_size = max_buf_size.max(command.vector_len() as u32);
        csvf::encode_command(&command, &mut data);
        commands += 1;
    }

    debug!(
        "converted {} commands: {} XSVF bytes -> {} CSVF bytes, max vector {} bytes",
        commands,
        xsvf.len(),
        data.len(),
        max_buf_size
    );
    Ok(Conversion { data, max_buf_size })
}

/// Load an XSVF file and convert it to uncompressed CSVF.
pub fn load_and_convert(path: impl AsRef<Path>) -> Result<Conversion> {
    let raw = fs::read(path)?;
    convert(&raw)
}

/// Load and convert a batch of XSVF files in parallel.
///
/// Results come back in input order, one per path, so a failed file does
/// not hide the others.
#[cfg(feature = "parallel")]
pub fn load_and_convert_many<P>(paths: &[P]) -> Vec<Result<Conversion>>
where
    P: AsRef<Path> + Sync,
{
    paths.par_iter().map(load_and_convert).collect()
}
