//! The uncompressed CSVF instruction encoding.
//!
//! CSVF keeps XSVF's general shape — a tag byte followed by operands, DR
//! vector lengths implied by the preceding SDRSIZE — so the replay engine's
//! parser stays trivial, but differs where it pays to:
//!
//! - every stream opens with a one-byte format revision, currently 0x00;
//! - XSIR and XSIR2 collapse into a single SIR tag with a 16-bit count;
//! - comments are not carried; they have no replay semantics.
//!
//! Multi-byte integers are big-endian, as in XSVF.

use crate::command::Command;

/// Format revision emitted at the start of every stream.
pub const REVISION: u8 = 0x00;

/// CSVF command tags. Shared commands keep their XSVF numbering.
pub mod tag {
    pub const COMPLETE: u8 = 0x00;
    pub const TDOMASK: u8 = 0x01;
    pub const SIR: u8 = 0x02;
    pub const SDR: u8 = 0x03;
    pub const RUNTEST: u8 = 0x04;
    pub const REPEAT: u8 = 0x07;
    pub const SDRSIZE: u8 = 0x08;
    pub const SDRTDO: u8 = 0x09;
    pub const SDRB: u8 = 0x0C;
    pub const SDRC: u8 = 0x0D;
    pub const SDRE: u8 = 0x0E;
    pub const SDRTDOB: u8 = 0x0F;
    pub const SDRTDOC: u8 = 0x10;
    pub const SDRTDOE: u8 = 0x11;
    pub const STATE: u8 = 0x12;
    pub const ENDIR: u8 = 0x13;
    pub const ENDDR: u8 = 0x14;
    pub const WAIT: u8 = 0x17;
}

/// Start a CSVF stream: append the format revision.
pub fn begin_stream(out: &mut Vec<u8>) {
    out.push(REVISION);
}

/// Append the CSVF encoding of `command` to `out`.
///
/// [`Command::Comment`] encodes to nothing. [`Command::Repeat`] is carried;
/// it holds the retry count a replay engine may honor on TDO mismatch.
pub fn encode_command(command: &Command, out: &mut Vec<u8>) {
    match command {
        Command::Complete => out.push(tag::COMPLETE),
        Command::TdoMask(mask) => {
            out.push(tag::TDOMASK);
            out.extend_from_slice(mask);
        }
        Command::Sir { bits, tdi } => {
            out.push(tag::SIR);
            out.extend_from_slice(&bits.to_be_bytes());
            out.extend_from_slice(tdi);
        }
        Command::Sdr(tdi) => {
            out.push(tag::SDR);
            out.extend_from_slice(tdi);
        }
        Command::RunTest(ticks) => {
            out.push(tag::RUNTEST);
            out.extend_from_slice(&ticks.to_be_bytes());
        }
        Command::Repeat(count) => {
            out.push(tag::REPEAT);
            out.push(*count);
        }
        Command::SdrSize(bits) => {
            out.push(tag::SDRSIZE);
            out.extend_from_slice(&bits.to_be_bytes());
        }
        Command::SdrTdo { tdi, tdo } => {
            out.push(tag::SDRTDO);
            out.extend_from_slice(tdi);
            out.extend_from_slice(tdo);
        }
        Command::SdrBegin(tdi) => {
            out.push(tag::SDRB);
            out.extend_from_slice(tdi);
        }
        Command::SdrContinue(tdi) => {
            out.push(tag::SDRC);
            out.extend_from_slice(tdi);
        }
        Command::SdrEnd(tdi) => {
            out.push(tag::SDRE);
            out.extend_from_slice(tdi);
        }
        Command::SdrTdoBegin { tdi, tdo } => {
            out.push(tag::SDRTDOB);
            out.extend_from_slice(tdi);
            out.extend_from_slice(tdo);
        }
        Command::SdrTdoContinue { tdi, tdo } => {
            out.push(tag::SDRTDOC);
            out.extend_from_slice(tdi);
            out.extend_from_slice(tdo);
        }
        Command::SdrTdoEnd { tdi, tdo } => {
            out.push(tag::SDRTDOE);
            out.extend_from_slice(tdi);
            out.extend_from_slice(tdo);
        }
        Command::State(state) => {
            out.push(tag::STATE);
            out.push(state.code());
        }
        Command::EndIr(end) => {
            out.push(tag::ENDIR);
            out.push(end.code());
        }
        Command::EndDr(end) => {
            out.push(tag::ENDDR);
            out.push(end.code());
        }
        Command::Comment(_) => {}
        Command::Wait { state, end, ticks } => {
            out.push(tag::WAIT);
            out.push(state.code());
            out.push(end.code());
            out.extend_from_slice(&ticks.to_be_bytes());
        }
    }
}
