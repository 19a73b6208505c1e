//! Sequential parser for raw XSVF opcode streams.
//!
//! Commands are self-delimiting: the opcode determines the operand size,
//! either fixed, length-prefixed, or — for DR vectors — given by the most
//! recent XSDRSIZE. The parser therefore needs a single forward pass and no
//! lookahead.

use crate::command::{Command, EndState, TapState};
use csvf_core::{CsvfError, Result};

/// XSVF opcode bytes.
pub mod opcode {
    pub const XCOMPLETE: u8 = 0x00;
    pub const XTDOMASK: u8 = 0x01;
    pub const XSIR: u8 = 0x02;
    pub const XSDR: u8 = 0x03;
    pub const XRUNTEST: u8 = 0x04;
    pub const XREPEAT: u8 = 0x07;
    pub const XSDRSIZE: u8 = 0x08;
    pub const XSDRTDO: u8 = 0x09;
    pub const XSDRB: u8 = 0x0C;
    pub const XSDRC: u8 = 0x0D;
    pub const XSDRE: u8 = 0x0E;
    pub const XSDRTDOB: u8 = 0x0F;
    pub const XSDRTDOC: u8 = 0x10;
    pub const XSDRTDOE: u8 = 0x11;
    pub const XSTATE: u8 = 0x12;
    pub const XENDIR: u8 = 0x13;
    pub const XENDDR: u8 = 0x14;
    pub const XSIR2: u8 = 0x15;
    pub const XCOMMENT: u8 = 0x16;
    pub const XWAIT: u8 = 0x17;
}

/// Pull parser over a raw XSVF byte slice.
///
/// Yields one [`Command`] per call until XCOMPLETE, then `None`. Bytes after
/// XCOMPLETE are ignored; loaders commonly pad the file to an even length.
#[derive(Debug)]
pub struct XsvfParser<'a> {
    input: &'a [u8],
    pos: usize,
    /// Byte length of DR shift vectors, from the last XSDRSIZE.
    sdr_bytes: usize,
    done: bool,
}

impl<'a> XsvfParser<'a> {
    /// Create a parser over a raw XSVF stream.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            sdr_bytes: 0,
            done: false,
        }
    }

    /// Current byte offset into the input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Parse the next command.
    ///
    /// Returns `Ok(None)` once XCOMPLETE has been consumed. An input that
    /// ends before XCOMPLETE is malformed.
    pub fn next_command(&mut self) -> Result<Option<Command>> {
        if self.done {
            return Ok(None);
        }
        if self.pos >= self.input.len() {
            return Err(CsvfError::malformed(
                self.pos,
                "input ended without XCOMPLETE",
            ));
        }

        let at = self.pos;
        let op = self.read_u8("opcode")?;
        let command = match op {
            opcode::XCOMPLETE => {
                self.done = true;
                Command::Complete
            }
            opcode::XTDOMASK => Command::TdoMask(self.read_vec(self.sdr_bytes, "XTDOMASK mask")?),
            opcode::XSIR => {
                let bits = self.read_u8("XSIR bit count")?;
                let tdi = self.read_vec(bytes_for(bits as u32), "XSIR vector")?;
                Command::Sir {
                    bits: bits as u16,
                    tdi,
                }
            }
            opcode::XSIR2 => {
                let bits = self.read_u16_be("XSIR2 bit count")?;
                let tdi = self.read_vec(bytes_for(bits as u32), "XSIR2 vector")?;
                Command::Sir { bits, tdi }
            }
            opcode::XSDR => Command::Sdr(self.read_vec(self.sdr_bytes, "XSDR vector")?),
            opcode::XRUNTEST => Command::RunTest(self.read_u32_be("XRUNTEST tick count")?),
            opcode::XREPEAT => Command::Repeat(self.read_u8("XREPEAT count")?),
            opcode::XSDRSIZE => {
                let bits = self.read_u32_be("XSDRSIZE bit count")?;
                self.sdr_bytes = bytes_for(bits);
                Command::SdrSize(bits)
            }
            opcode::XSDRTDO => {
                let (tdi, tdo) = self.read_tdi_tdo("XSDRTDO")?;
                Command::SdrTdo { tdi, tdo }
            }
            opcode::XSDRB => Command::SdrBegin(self.read_vec(self.sdr_bytes, "XSDRB vector")?),
            opcode::XSDRC => Command::SdrContinue(self.read_vec(self.sdr_bytes, "XSDRC vector")?),
            opcode::XSDRE => Command::SdrEnd(self.read_vec(self.sdr_bytes, "XSDRE vector")?),
            opcode::XSDRTDOB => {
                let (tdi, tdo) = self.read_tdi_tdo("XSDRTDOB")?;
                Command::SdrTdoBegin { tdi, tdo }
            }
            opcode::XSDRTDOC => {
                let (tdi, tdo) = self.read_tdi_tdo("XSDRTDOC")?;
                Command::SdrTdoContinue { tdi, tdo }
            }
            opcode::XSDRTDOE => {
                let (tdi, tdo) = self.read_tdi_tdo("XSDRTDOE")?;
                Command::SdrTdoEnd { tdi, tdo }
            }
            opcode::XSTATE => {
                let code = self.read_u8("XSTATE operand")?;
                let state = TapState::from_code(code).ok_or_else(|| {
                    CsvfError::malformed(self.pos - 1, format!("invalid TAP state {:#04x}", code))
                })?;
                Command::State(state)
            }
            opcode::XENDIR => Command::EndIr(self.read_end_state("XENDIR")?),
            opcode::XENDDR => Command::EndDr(self.read_end_state("XENDDR")?),
            opcode::XCOMMENT => Command::Comment(self.read_cstr("XCOMMENT text")?),
            opcode::XWAIT => {
                let state = self.read_tap_state("XWAIT wait state")?;
                let end = self.read_tap_state("XWAIT end state")?;
                let ticks = self.read_u32_be("XWAIT tick count")?;
                Command::Wait { state, end, ticks }
            }
            _ => return Err(CsvfError::unsupported_opcode(op, at)),
        };
        Ok(Some(command))
    }

    fn read_u8(&mut self, what: &str) -> Result<u8> {
        match self.input.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(CsvfError::malformed(
                self.pos,
                format!("{what} overruns input"),
            )),
        }
    }

    fn read_u16_be(&mut self, what: &str) -> Result<u16> {
        let bytes = self.read_vec(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_be(&mut self, what: &str) -> Result<u32> {
        let bytes = self.read_vec(4, what)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_vec(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| CsvfError::malformed(self.pos, format!("{what} overruns input")))?;
        let bytes = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }

    fn read_tdi_tdo(&mut self, what: &str) -> Result<(Vec<u8>, Vec<u8>)> {
        let tdi = self.read_vec(self.sdr_bytes, &format!("{what} TDI vector"))?;
        let tdo = self.read_vec(self.sdr_bytes, &format!("{what} TDO vector"))?;
        Ok((tdi, tdo))
    }

    fn read_tap_state(&mut self, what: &str) -> Result<TapState> {
        let code = self.read_u8(what)?;
        TapState::from_code(code).ok_or_else(|| {
            CsvfError::malformed(self.pos - 1, format!("invalid TAP state {:#04x}", code))
        })
    }

    fn read_end_state(&mut self, what: &str) -> Result<EndState> {
        let code = self.read_u8(&format!("{what} operand"))?;
        EndState::from_code(code).ok_or_else(|| {
            CsvfError::malformed(
                self.pos - 1,
                format!("invalid {what} end state {:#04x}", code),
            )
        })
    }

    fn read_cstr(&mut self, what: &str) -> Result<String> {
        let start = self.pos;
        let nul = self.input[start..]
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| CsvfError::malformed(start, format!("{what} is not NUL-terminated")))?;
        let text = String::from_utf8_lossy(&self.input[start..start + nul]).into_owned();
        self.pos = start + nul + 1;
        Ok(text)
    }
}

/// Whole bytes needed to hold `bits` bits.
fn bytes_for(bits: u32) -> usize {
    bits.div_ceil(8) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> Result<Vec<Command>> {
        let mut parser = XsvfParser::new(input);
        let mut commands = Vec::new();
        while let Some(command) = parser.next_command()? {
            commands.push(command);
        }
        Ok(commands)
    }

    #[test]
    fn test_parse_basic_stream() {
        let input = [
            opcode::XREPEAT, 32,
            opcode::XSDRSIZE, 0x00, 0x00, 0x00, 0x10, // 16 bits
            opcode::XTDOMASK, 0xFF, 0xFF,
            opcode::XSIR, 0x06, 0x3F,
            opcode::XSDRTDO, 0x12, 0x34, 0x56, 0x78,
            opcode::XSTATE, 0x00,
            opcode::XCOMPLETE,
        ];
        let commands = collect(&input).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Repeat(32),
                Command::SdrSize(16),
                Command::TdoMask(vec![0xFF, 0xFF]),
                Command::Sir {
                    bits: 6,
                    tdi: vec![0x3F]
                },
                Command::SdrTdo {
                    tdi: vec![0x12, 0x34],
                    tdo: vec![0x56, 0x78]
                },
                Command::State(TapState::TestLogicReset),
                Command::Complete,
            ]
        );
    }

    #[test]
    fn test_sdr_size_rounds_up_to_bytes() {
        // 36 bits -> 5 byte vectors
        let input = [
            opcode::XSDRSIZE, 0x00, 0x00, 0x00, 0x24,
            opcode::XSDR, 0x01, 0x02, 0x03, 0x04, 0x05,
            opcode::XCOMPLETE,
        ];
        let commands = collect(&input).unwrap();
        assert_eq!(commands[1], Command::Sdr(vec![0x01, 0x02, 0x03, 0x04, 0x05]));
    }

    #[test]
    fn test_trailing_padding_ignored() {
        // Loaders may pad odd files to an even length
        let input = [opcode::XCOMPLETE, 0xAA];
        let commands = collect(&input).unwrap();
        assert_eq!(commands, vec![Command::Complete]);
    }

    #[test]
    fn test_unsupported_opcode_reports_offset() {
        let input = [opcode::XREPEAT, 0, 0x05, opcode::XCOMPLETE];
        let err = collect(&input).unwrap_err();
        assert!(matches!(
            err,
            CsvfError::UnsupportedOpcode {
                opcode: 0x05,
                offset: 2
            }
        ));
    }

    #[test]
    fn test_truncated_vector_is_malformed() {
        let input = [
            opcode::XSDRSIZE, 0x00, 0x00, 0x00, 0x20, // 32 bits
            opcode::XSDR, 0x01, 0x02, // two of four bytes
        ];
        let err = collect(&input).unwrap_err();
        assert!(matches!(err, CsvfError::MalformedStream { .. }));
    }

    #[test]
    fn test_missing_xcomplete_is_malformed() {
        let input = [opcode::XREPEAT, 0];
        let err = collect(&input).unwrap_err();
        assert!(matches!(err, CsvfError::MalformedStream { offset: 2, .. }));
    }

    #[test]
    fn test_comment_parsing() {
        let input = [
            opcode::XCOMMENT, b'h', b'i', 0x00,
            opcode::XCOMPLETE,
        ];
        let commands = collect(&input).unwrap();
        assert_eq!(commands[0], Command::Comment("hi".to_string()));
    }

    #[test]
    fn test_unterminated_comment_is_malformed() {
        let input = [opcode::XCOMMENT, b'h', b'i'];
        let err = collect(&input).unwrap_err();
        assert!(matches!(err, CsvfError::MalformedStream { .. }));
    }

    #[test]
    fn test_invalid_tap_state() {
        let input = [opcode::XSTATE, 0x20, opcode::XCOMPLETE];
        let err = collect(&input).unwrap_err();
        assert!(matches!(err, CsvfError::MalformedStream { .. }));
    }

    #[test]
    fn test_xsir2_wide_bit_count() {
        let input = [
            opcode::XSIR2, 0x00, 0x0A, 0x03, 0xFF, // 10 bits -> 2 bytes
            opcode::XCOMPLETE,
        ];
        let commands = collect(&input).unwrap();
        assert_eq!(
            commands[0],
            Command::Sir {
                bits: 10,
                tdi: vec![0x03, 0xFF]
            }
        );
    }

    #[test]
    fn test_xwait() {
        let input = [
            opcode::XWAIT, 0x01, 0x01, 0x00, 0x00, 0x03, 0xE8,
            opcode::XCOMPLETE,
        ];
        let commands = collect(&input).unwrap();
        assert_eq!(
            commands[0],
            Command::Wait {
                state: TapState::RunTestIdle,
                end: TapState::RunTestIdle,
                ticks: 1000
            }
        );
    }
}
