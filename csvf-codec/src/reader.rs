//! The streaming CSVF reader: a bounded-state pull decoder.
//!
//! The consumer is typically firmware clocking JTAG pins, so the reader
//! never materializes the decompressed stream. It holds only a cursor into
//! the compressed buffer, the remainder of the token it is in the middle
//! of, and a fixed look-back window for copy tokens — the same auxiliary
//! memory no matter how large the output is.

use crate::token::{BASE_OVERFLOW, KIND_COPY, KIND_LITERAL, KIND_RUN, WINDOW, min_count};
use csvf_core::{CsvfError, HistoryWindow, Result};
use log::debug;

/// A decoded token with its output still (partially) owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// Copying literal bytes straight from the compressed stream.
    Literal { remaining: usize },
    /// Repeating a byte value.
    Run { value: u8, remaining: usize },
    /// Copying from the look-back window.
    Copy { distance: usize, remaining: usize },
}

/// Streaming decoder over a compressed CSVF buffer.
///
/// Created by [`Reader::init`], which also yields the first decoded byte.
/// Each [`Reader::next_byte`] call resolves exactly one further byte,
/// consuming a new token only when the current one is exhausted. Pulling
/// past the end of the stream yields `ReaderExhausted`; an invalid or
/// truncated token yields `CorruptStream`, after which the context is dead
/// and must be discarded.
///
/// The compressed buffer is borrowed immutably for the reader's lifetime.
/// Distinct readers, even over the same buffer, are fully independent.
#[derive(Debug)]
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    /// Token currently being emitted; `None` means the next pull consumes
    /// a fresh one.
    pending: Option<Token>,
    window: HistoryWindow,
    emitted: u64,
    verbose: bool,
}

impl<'a> Reader<'a> {
    /// Establish decode state over `input` and return the reader together
    /// with the first decoded byte.
    ///
    /// `verbose` enables per-token diagnostics through the `log` facade; it
    /// never affects the decoded bytes. An empty buffer has no first byte
    /// and yields `ReaderExhausted`.
    pub fn init(input: &'a [u8], verbose: bool) -> Result<(Self, u8)> {
        let Some(&first) = input.first() else {
            return Err(CsvfError::exhausted(0));
        };

        let mut window = HistoryWindow::new(WINDOW);
        window.write_byte(first);
        if verbose {
            debug!("reader over {} compressed bytes", input.len());
        }

        let reader = Reader {
            input,
            pos: 1,
            pending: None,
            window,
            emitted: 1,
            verbose,
        };
        Ok((reader, first))
    }

    /// Total decoded bytes handed out so far, the init byte included.
    pub fn bytes_emitted(&self) -> u64 {
        self.emitted
    }

    /// Decode and return the next byte.
    pub fn next_byte(&mut self) -> Result<u8> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => self.next_token()?,
        };

        let byte = match token {
            Token::Literal { remaining } => {
                let byte = self.input[self.pos];
                self.pos += 1;
                self.retire(Token::Literal {
                    remaining: remaining - 1,
                });
                byte
            }
            Token::Run { value, remaining } => {
                self.retire(Token::Run {
                    value,
                    remaining: remaining - 1,
                });
                value
            }
            Token::Copy {
                distance,
                remaining,
            } => {
                // Distance was validated against the window when the token
                // was consumed; the window only grows from there.
                let byte = self
                    .window
                    .read_at_distance(distance)
                    .ok_or_else(|| CsvfError::corrupt(self.pos, "copy distance out of history"))?;
                self.retire(Token::Copy {
                    distance,
                    remaining: remaining - 1,
                });
                byte
            }
        };

        self.window.write_byte(byte);
        self.emitted += 1;
        Ok(byte)
    }

    /// Store the decremented token, unless it is spent.
    fn retire(&mut self, token: Token) {
        self.pending = match token {
            Token::Literal { remaining: 0 }
            | Token::Run { remaining: 0, .. }
            | Token::Copy { remaining: 0, .. } => None,
            live => Some(live),
        };
    }

    /// Consume the next token from the compressed stream.
    fn next_token(&mut self) -> Result<Token> {
        if self.pos >= self.input.len() {
            return Err(CsvfError::exhausted(self.emitted));
        }

        let at = self.pos;
        let control = self.input[self.pos];
        self.pos += 1;

        let kind = control >> 6;
        if kind != KIND_LITERAL && kind != KIND_RUN && kind != KIND_COPY {
            return Err(CsvfError::corrupt(
                at,
                format!("invalid token control byte {:#04x}", control),
            ));
        }
        let count = self.read_count(control & BASE_OVERFLOW, kind, at)?;

        let token = match kind {
            KIND_LITERAL => {
                if self.input.len() - self.pos < count {
                    return Err(CsvfError::corrupt(at, "literal block overruns input"));
                }
                Token::Literal { remaining: count }
            }
            KIND_RUN => {
                let value = self.read_operand(at, "run value")?;
                Token::Run {
                    value,
                    remaining: count,
                }
            }
            _ => {
                let distance = self.read_operand(at, "copy distance")? as usize + 1;
                if distance > self.window.len() {
                    return Err(CsvfError::corrupt(
                        at,
                        format!(
                            "copy distance {} exceeds {} bytes of history",
                            distance,
                            self.window.len()
                        ),
                    ));
                }
                Token::Copy {
                    distance,
                    remaining: count,
                }
            }
        };

        if self.verbose {
            debug!("token at {}: {:?}, {} bytes out", at, token, self.emitted);
        }
        Ok(token)
    }

    /// Resolve the count field, following extension bytes when the base
    /// field overflows.
    fn read_count(&mut self, base: u8, kind: u8, at: usize) -> Result<usize> {
        let mut count = min_count(kind) + base as usize;
        if base < BASE_OVERFLOW {
            return Ok(count);
        }
        loop {
            let byte = self.read_operand(at, "count extension")?;
            count += byte as usize;
            if byte < 255 {
                return Ok(count);
            }
        }
    }

    /// Read one token operand byte; running out of input mid-token is
    /// corruption, not exhaustion.
    fn read_operand(&mut self, at: usize, what: &str) -> Result<u8> {
        match self.input.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(CsvfError::corrupt(
                at,
                format!("token truncated reading {what}"),
            )),
        }
    }
}
