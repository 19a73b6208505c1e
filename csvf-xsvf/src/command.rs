//! The command stream model.
//!
//! One typed variant per recognized XSVF opcode. A parsed program is an
//! ordered sequence of these commands; the converter builds them once and
//! the CSVF encoder consumes them.

use std::fmt::Display;

/// TAP controller states, numbered the way the XSTATE operand numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TapState {
    TestLogicReset = 0x00,
    RunTestIdle = 0x01,
    SelectDrScan = 0x02,
    CaptureDr = 0x03,
    ShiftDr = 0x04,
    Exit1Dr = 0x05,
    PauseDr = 0x06,
    Exit2Dr = 0x07,
    UpdateDr = 0x08,
    SelectIrScan = 0x09,
    CaptureIr = 0x0A,
    ShiftIr = 0x0B,
    Exit1Ir = 0x0C,
    PauseIr = 0x0D,
    Exit2Ir = 0x0E,
    UpdateIr = 0x0F,
}

impl TapState {
    /// Decode a state from its XSVF operand byte.
    pub fn from_code(code: u8) -> Option<Self> {
        use TapState::*;
        Some(match code {
            0x00 => TestLogicReset,
            0x01 => RunTestIdle,
            0x02 => SelectDrScan,
            0x03 => CaptureDr,
            0x04 => ShiftDr,
            0x05 => Exit1Dr,
            0x06 => PauseDr,
            0x07 => Exit2Dr,
            0x08 => UpdateDr,
            0x09 => SelectIrScan,
            0x0A => CaptureIr,
            0x0B => ShiftIr,
            0x0C => Exit1Ir,
            0x0D => PauseIr,
            0x0E => Exit2Ir,
            0x0F => UpdateIr,
            _ => return None,
        })
    }

    /// The state's operand byte.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Display for TapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Where the TAP controller parks after a shift (XENDIR/XENDDR operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EndState {
    /// Run-Test/Idle.
    #[default]
    Idle = 0x00,
    /// The matching Pause state.
    Pause = 0x01,
}

impl EndState {
    /// Decode an end state from its XSVF operand byte.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(EndState::Idle),
            0x01 => Some(EndState::Pause),
            _ => None,
        }
    }

    /// The end state's operand byte.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A single parsed XSVF command.
///
/// Vector operands are stored as byte vectors, most significant byte first,
/// exactly as they appear on the wire. Their lengths come either from the
/// command itself (SIR) or from the most recent [`Command::SdrSize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End of the command stream.
    Complete,
    /// Mask applied to TDO comparison for subsequent DR shifts.
    TdoMask(Vec<u8>),
    /// Shift a vector into the instruction register.
    Sir {
        /// Significant bit count of the vector.
        bits: u16,
        /// TDI bits, `bits` rounded up to whole bytes.
        tdi: Vec<u8>,
    },
    /// Shift a vector into the data register without capturing TDO.
    Sdr(Vec<u8>),
    /// TCK ticks to spend in Run-Test/Idle after each shift.
    RunTest(u32),
    /// Retry count for shifts whose TDO comparison fails.
    Repeat(u8),
    /// Bit length of subsequent DR shift vectors.
    SdrSize(u32),
    /// Shift TDI into the data register and compare the captured TDO.
    SdrTdo {
        /// TDI bits to shift in.
        tdi: Vec<u8>,
        /// Expected TDO bits, compared under the current mask.
        tdo: Vec<u8>,
    },
    /// First fragment of a split DR shift, no TDO capture.
    SdrBegin(Vec<u8>),
    /// Middle fragment of a split DR shift.
    SdrContinue(Vec<u8>),
    /// Final fragment of a split DR shift.
    SdrEnd(Vec<u8>),
    /// First fragment of a split DR shift with TDO comparison.
    SdrTdoBegin {
        /// TDI bits to shift in.
        tdi: Vec<u8>,
        /// Expected TDO bits.
        tdo: Vec<u8>,
    },
    /// Middle fragment of a split DR shift with TDO comparison.
    SdrTdoContinue {
        /// TDI bits to shift in.
        tdi: Vec<u8>,
        /// Expected TDO bits.
        tdo: Vec<u8>,
    },
    /// Final fragment of a split DR shift with TDO comparison.
    SdrTdoEnd {
        /// TDI bits to shift in.
        tdi: Vec<u8>,
        /// Expected TDO bits.
        tdo: Vec<u8>,
    },
    /// Move the TAP controller to an explicit state.
    State(TapState),
    /// End state for IR shifts.
    EndIr(EndState),
    /// End state for DR shifts.
    EndDr(EndState),
    /// Free-form annotation, no replay semantics.
    Comment(String),
    /// Wait in `state` for `ticks` TCK cycles, then move to `end`.
    Wait {
        /// State to wait in.
        state: TapState,
        /// State to move to afterwards.
        end: TapState,
        /// TCK cycles to wait.
        ticks: u32,
    },
}

impl Command {
    /// Byte length of the largest single vector operand this command
    /// carries, zero for non-vector commands. The maximum of this value
    /// across a stream is the `max_buf_size` a replay engine must allocate.
    pub fn vector_len(&self) -> usize {
        match self {
            Command::TdoMask(mask) => mask.len(),
            Command::Sir { tdi, .. } => tdi.len(),
            Command::Sdr(tdi)
            | Command::SdrBegin(tdi)
            | Command::SdrContinue(tdi)
            | Command::SdrEnd(tdi) => tdi.len(),
            Command::SdrTdo { tdi, tdo }
            | Command::SdrTdoBegin { tdi, tdo }
            | Command::SdrTdoContinue { tdi, tdo }
            | Command::SdrTdoEnd { tdi, tdo } => tdi.len().max(tdo.len()),
            _ => 0,
        }
    }
}
