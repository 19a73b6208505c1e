//! Error types for CSVF operations.
//!
//! This module provides the error type shared by every stage of the
//! toolchain: file loading, XSVF parsing and conversion, compression, and
//! streaming decompression.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// The main error type for CSVF operations.
#[derive(Debug, Error)]
pub enum CsvfError {
    /// I/O error from the file loader.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The XSVF input is structurally invalid (a declared length overruns
    /// the remaining input, an operand is out of range, or the stream ends
    /// without XCOMPLETE).
    #[error("Malformed stream at offset {offset}: {message}")]
    MalformedStream {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// An opcode outside the recognized XSVF set.
    #[error("Unsupported opcode {opcode:#04x} at offset {offset}")]
    UnsupportedOpcode {
        /// The unrecognized opcode byte.
        opcode: u8,
        /// Byte offset of the opcode.
        offset: usize,
    },

    /// The compressor could not reserve working memory.
    #[error("Out of memory")]
    OutOfMemory,

    /// The compressed stream contains an invalid or truncated token. Fatal
    /// to the reader context that reported it.
    #[error("Corrupt stream at offset {offset}: {message}")]
    CorruptStream {
        /// Byte offset of the offending token in the compressed buffer.
        offset: usize,
        /// Description of the corruption.
        message: String,
    },

    /// A byte was requested after the stream was fully decoded.
    #[error("Reader exhausted after {emitted} bytes")]
    ReaderExhausted {
        /// Total bytes the reader had emitted when the pull arrived.
        emitted: u64,
    },
}

/// Result type alias for CSVF operations.
pub type Result<T> = std::result::Result<T, CsvfError>;

impl CsvfError {
    /// Create a malformed-stream error.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedStream {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported-opcode error.
    pub fn unsupported_opcode(opcode: u8, offset: usize) -> Self {
        Self::UnsupportedOpcode { opcode, offset }
    }

    /// Create a corrupt-stream error.
    pub fn corrupt(offset: usize, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            offset,
            message: message.into(),
        }
    }

    /// Create a reader-exhausted error.
    pub fn exhausted(emitted: u64) -> Self {
        Self::ReaderExhausted { emitted }
    }
}

impl From<TryReserveError> for CsvfError {
    fn from(_: TryReserveError) -> Self {
        CsvfError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CsvfError::unsupported_opcode(0x42, 17);
        assert!(err.to_string().contains("0x42"));
        assert!(err.to_string().contains("17"));

        let err = CsvfError::malformed(3, "XSIR vector overruns input");
        assert!(err.to_string().contains("XSIR"));

        let err = CsvfError::exhausted(1024);
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: CsvfError = io_err.into();
        assert!(matches!(err, CsvfError::Io(_)));
    }

    #[test]
    fn test_try_reserve_conversion() {
        let mut v: Vec<u8> = Vec::new();
        let reserve_err = v.try_reserve(usize::MAX).unwrap_err();
        let err: CsvfError = reserve_err.into();
        assert!(matches!(err, CsvfError::OutOfMemory));
    }
}
