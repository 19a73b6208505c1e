//! Token framing shared by the compressor and the reader.
//!
//! Compressed stream layout:
//! - Byte 0 is the first uncompressed byte, stored raw, so reader
//!   initialization can hand it back without decoding a token.
//! - Tokens follow. Each starts with a control byte: the top two bits
//!   select the kind, the low six bits hold a base count.
//!   - `00` literal: `base + 1` bytes follow verbatim
//!   - `01` run: one value byte follows, repeated `base + 3` times
//!   - `10` copy: one distance byte `d` follows; `base + 3` bytes are
//!     copied from `d + 1` bytes back in the output
//!   - `11` is invalid
//! - A base of 63 overflows into extension bytes: each adds its value to
//!   the count and the sequence ends at the first byte below 255.
//!
//! Copies never reach further back than [`WINDOW`] bytes, which is what
//! lets the reader decode with a fixed-size history and nothing else.

/// Look-back window for copy tokens.
pub(crate) const WINDOW: usize = 256;

/// Token kinds (control byte top two bits).
pub(crate) const KIND_LITERAL: u8 = 0b00;
pub(crate) const KIND_RUN: u8 = 0b01;
pub(crate) const KIND_COPY: u8 = 0b10;

/// Largest count the six-bit base field can hold; this value signals
/// extension bytes.
pub(crate) const BASE_OVERFLOW: u8 = 0x3F;

/// Shortest run worth a token. Below this, literals are cheaper.
pub(crate) const MIN_RUN: usize = 3;

/// Shortest copy worth a token.
pub(crate) const MIN_COPY: usize = 3;

/// Smallest count each kind can encode; the base field counts up from it.
pub(crate) fn min_count(kind: u8) -> usize {
    if kind == KIND_LITERAL { 1 } else { MIN_RUN }
}

/// Append the control byte for `kind` and `count`, plus any extension
/// bytes. `count` must be at least `min_count(kind)`.
pub(crate) fn push_control(out: &mut Vec<u8>, kind: u8, count: usize) {
    let base = count - min_count(kind);
    if base < BASE_OVERFLOW as usize {
        out.push((kind << 6) | base as u8);
        return;
    }
    out.push((kind << 6) | BASE_OVERFLOW);
    let mut rest = base - BASE_OVERFLOW as usize;
    while rest >= 255 {
        out.push(255);
        rest -= 255;
    }
    out.push(rest as u8);
}
