//! The CSVF compressor.
//!
//! CSVF instruction streams are dominated by two kinds of redundancy: long
//! constant-byte stretches (zero fill in TDI and mask vectors) and repeated
//! command sequences (identical SDR commands issued back-to-back during
//! bulk programming). The encoder targets exactly those with run tokens and
//! short-distance copy tokens; everything else passes through as literals.
//!
//! The encoder is greedy and fully deterministic: identical input buffers
//! always produce byte-identical output, so compressed artifacts can be
//! compared against golden files.

use crate::token::{
    KIND_COPY, KIND_LITERAL, KIND_RUN, MIN_COPY, MIN_RUN, WINDOW, push_control,
};
use csvf_core::Result;
use log::debug;

/// Upper bound on compressed size: one control byte per input byte in the
/// worst case (single-byte literal blocks between copies), plus the raw
/// first byte and extension slack.
fn worst_case(len: usize) -> usize {
    2 * len + 16
}

/// Compress an uncompressed CSVF buffer.
///
/// The only failure is `OutOfMemory`, raised before any output is built;
/// on failure no partial buffer is observable. An empty input compresses
/// to an empty output.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    output.try_reserve(worst_case(input.len()))?;
    if input.is_empty() {
        return Ok(output);
    }

    // First byte travels raw; tokens cover the rest.
    output.push(input[0]);

    let mut pos = 1;
    let mut literal_start = 1;
    while pos < input.len() {
        let run = run_length(input, pos);
        let (copy_len, distance) = longest_copy(input, pos);

        if run >= MIN_RUN && run >= copy_len {
            flush_literals(&mut output, &input[literal_start..pos]);
            push_control(&mut output, KIND_RUN, run);
            output.push(input[pos]);
            pos += run;
            literal_start = pos;
        } else if copy_len >= MIN_COPY {
            flush_literals(&mut output, &input[literal_start..pos]);
            push_control(&mut output, KIND_COPY, copy_len);
            output.push((distance - 1) as u8);
            pos += copy_len;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }
    flush_literals(&mut output, &input[literal_start..]);

    debug!(
        "compressed {} bytes to {} ({}%)",
        input.len(),
        output.len(),
        output.len() * 100 / input.len()
    );
    Ok(output)
}

/// Replace `buffer`'s contents with their compressed encoding.
///
/// The buffer is only touched on success.
pub fn compress_in_place(buffer: &mut Vec<u8>) -> Result<()> {
    let compressed = compress(buffer)?;
    *buffer = compressed;
    Ok(())
}

/// Length of the identical-byte run starting at `pos`.
fn run_length(input: &[u8], pos: usize) -> usize {
    let value = input[pos];
    input[pos..].iter().take_while(|&&b| b == value).count()
}

/// Longest match for `input[pos..]` within the look-back window.
///
/// Returns `(length, distance)`; length is zero when nothing matches.
/// Ties break toward the smallest distance, which keeps the encoding
/// deterministic. Matches may overlap their source: with distance `d`,
/// byte `k` of the copy reads the byte emitted `d` positions earlier,
/// which for `k >= d` is part of the copy itself — the same repeating
/// pattern the reader's history window reproduces.
fn longest_copy(input: &[u8], pos: usize) -> (usize, usize) {
    let remaining = input.len() - pos;
    let mut best_len = 0;
    let mut best_distance = 0;

    for distance in 1..=pos.min(WINDOW) {
        let mut len = 0;
        while len < remaining && input[pos + len - distance] == input[pos + len] {
            len += 1;
        }
        if len > best_len {
            best_len = len;
            best_distance = distance;
            if best_len == remaining {
                break;
            }
        }
    }
    (best_len, best_distance)
}

/// Emit one literal token covering `literals`, if any.
fn flush_literals(output: &mut Vec<u8>, literals: &[u8]) {
    if literals.is_empty() {
        return;
    }
    push_control(output, KIND_LITERAL, literals.len());
    output.extend_from_slice(literals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(compress(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_single_byte_is_raw() {
        assert_eq!(compress(&[0x00]).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_zero_fill_collapses() {
        // A zero-filled vector: raw byte + one run token
        let input = vec![0u8; 1000];
        let compressed = compress(&input).unwrap();
        assert!(compressed.len() < 10);
        assert_eq!(compressed[0], 0x00);
    }

    #[test]
    fn test_incompressible_input_stays_close_to_raw() {
        // No run or copy of length 3 anywhere
        let input: Vec<u8> = (0u8..=255).collect();
        let compressed = compress(&input).unwrap();
        // raw byte + one literal token (control + extension) + literals
        assert_eq!(compressed.len(), input.len() + 2);
    }

    #[test]
    fn test_repeated_command_sequence_uses_copies() {
        // The same fake 8-byte command issued 32 times
        let command = [0x09, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x11, 0x22];
        let mut input = Vec::new();
        for _ in 0..32 {
            input.extend_from_slice(&command);
        }
        let compressed = compress(&input).unwrap();
        assert!(compressed.len() < input.len() / 4);
    }

    #[test]
    fn test_determinism() {
        let mut input = Vec::new();
        for i in 0..512u32 {
            input.push((i % 7) as u8);
            input.extend_from_slice(&[0x00; 13]);
        }
        assert_eq!(compress(&input).unwrap(), compress(&input).unwrap());
    }

    #[test]
    fn test_compress_in_place_replaces_buffer() {
        let mut buffer = vec![0xAAu8; 256];
        let expected = compress(&buffer).unwrap();
        compress_in_place(&mut buffer).unwrap();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_run_length() {
        assert_eq!(run_length(&[5, 5, 5, 2], 0), 3);
        assert_eq!(run_length(&[5, 5, 5, 2], 3), 1);
    }

    #[test]
    fn test_longest_copy_prefers_small_distance() {
        // "ababab": at pos 2, distance 2 matches to the end
        let input = b"ababab";
        let (len, distance) = longest_copy(input, 2);
        assert_eq!((len, distance), (4, 2));
    }
}
