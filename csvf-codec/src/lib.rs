//! Compression and streaming decompression for CSVF data.
//!
//! JTAG programming streams carry long constant-byte vectors and repeated
//! command sequences; the compressor removes exactly that redundancy with
//! three token kinds (literal, run, short-distance copy) and nothing else.
//! The decoder side is [`Reader`], a pull decompressor producing one byte
//! per call with constant auxiliary memory, small enough to re-implement on
//! a microcontroller that clocks the bytes straight out to JTAG pins.
//!
//! Compression is deterministic and lossless: the same input always yields
//! the same compressed bytes, and decoding reproduces the input exactly.
//!
//! # Example
//!
//! ```
//! use csvf_codec::{Reader, compress};
//!
//! let data = [&[0x00u8][..], &[0xFF; 300][..], &[0x12, 0x34][..]].concat();
//! let compressed = compress(&data).unwrap();
//! assert!(compressed.len() < data.len());
//!
//! let (mut reader, first) = Reader::init(&compressed, false).unwrap();
//! assert_eq!(first, data[0]);
//! let mut decoded = vec![first];
//! for _ in 1..data.len() {
//!     decoded.push(reader.next_byte().unwrap());
//! }
//! assert_eq!(decoded, data);
//! ```

#![warn(clippy::all)]

mod compress;
mod reader;
mod token;

pub use compress::{compress, compress_in_place};
pub use reader::Reader;

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(compressed: &[u8], len: usize) -> Vec<u8> {
        let (mut reader, first) = Reader::init(compressed, false).unwrap();
        let mut output = vec![first];
        for _ in 1..len {
            output.push(reader.next_byte().unwrap());
        }
        output
    }

    #[test]
    fn test_roundtrip_single_byte() {
        let data = [0x00];
        let compressed = compress(&data).unwrap();
        assert_eq!(decode_all(&compressed, 1), data);
    }

    #[test]
    fn test_roundtrip_zero_heavy() {
        let data = [&[0x00u8; 700][..], &[0x01, 0x02, 0x03][..], &[0x00; 700][..]].concat();
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < 32);
        assert_eq!(decode_all(&compressed, data.len()), data);
    }

    #[test]
    fn test_roundtrip_mixed_vectors() {
        // Looks like a programming stream: tags, lengths, fills, payloads
        let mut data = vec![0x00];
        for block in 0..64u32 {
            data.push(0x08);
            data.extend_from_slice(&(block * 8).to_be_bytes());
            data.push(0x03);
            data.extend_from_slice(&[0x00; 17]);
            data.extend_from_slice(&[0xA5; 9]);
            data.push((block % 251) as u8);
        }
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decode_all(&compressed, data.len()), data);
    }

    #[test]
    fn test_roundtrip_incompressible() {
        let data: Vec<u8> = (0u8..=255).rev().collect();
        let compressed = compress(&data).unwrap();
        assert_eq!(decode_all(&compressed, data.len()), data);
    }

    #[test]
    fn test_roundtrip_long_copy_past_window_boundary() {
        // Period just under the window size, repeated well past it
        let mut data = Vec::new();
        let period: Vec<u8> = (0..=250u8).collect();
        for _ in 0..10 {
            data.extend_from_slice(&period);
        }
        let compressed = compress(&data).unwrap();
        assert_eq!(decode_all(&compressed, data.len()), data);
    }
}
