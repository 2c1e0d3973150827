//! SCPI parser, execution driver and response formatter.

pub mod lexer;
pub mod parameters;
pub mod pattern;
pub mod response;

pub(crate) mod unit;

use arrayvec::ArrayVec;

use crate::command::Command;
use crate::error::{Error, ErrorCode, ErrorQueue};
use crate::Interface;

use self::parameters::Parameters;
use self::response::{OutputState, ResponseWriter};

/// Wrappers to discriminate SCPI parameter types
pub mod format {
    /// Arbitrary block data
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct Arbitrary<'a>(pub &'a [u8]);

    /// Character data
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct Character<'a>(pub &'a [u8]);

    /// Expression data
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct Expression<'a>(pub &'a [u8]);
}

/// Capacity of the scratch a compound-expanded header is materialised
/// into. Fits nine levels of twelve-character mnemonics.
pub(crate) const MAX_HEADER_LEN: usize = 128;

/// Prepend the previous header's prefix, through its last `:`, to a
/// relative header (IEEE 488.2-1992 6.2.5 header path compounding).
///
/// Common (`*…`) and absolute (`:…`) headers, and any header following a
/// common command, pass through unchanged and borrow straight from the
/// input buffer. Returns None if the expansion does not fit `scratch`.
pub(crate) fn compose_compound<'b>(
    prev: &[u8],
    current: &'b [u8],
    scratch: &'b mut ArrayVec<u8, MAX_HEADER_LEN>,
) -> Option<&'b [u8]> {
    if current.is_empty() || matches!(current.first(), Some(b'*' | b':')) {
        return Some(current);
    }
    if prev.first().map_or(true, |c| *c == b'*') {
        return Some(current);
    }
    match prev.iter().rposition(|c| *c == b':') {
        Some(last) => {
            scratch.try_extend_from_slice(&prev[..=last]).ok()?;
            scratch.try_extend_from_slice(current).ok()?;
            Some(scratch.as_slice())
        }
        // Previous header was a simple command
        None => Some(current),
    }
}

/// Everything a [crate::Context] owns apart from the input buffer. Split
/// out so the driver can parse spans of its own buffer.
pub(crate) struct Executor<'a, D, I, Q> {
    pub commands: &'a [Command<'a, D>],
    pub interface: I,
    pub errors: Q,
    pub idn: [&'a [u8]; 4],
    pub line_ending: &'a [u8],
    pub output: OutputState,
}

impl<'a, D, I, Q> Executor<'a, D, I, Q>
where
    I: Interface,
    Q: ErrorQueue,
{
    fn writer(&mut self) -> ResponseWriter<'_> {
        ResponseWriter {
            sink: &mut self.interface,
            out: &mut self.output,
            line_ending: self.line_ending,
        }
    }

    /// Parse and execute a complete span of program message units.
    /// Returns false if any unit failed.
    pub(crate) fn parse(&mut self, device: &mut D, data: &[u8]) -> bool {
        let mut result = true;
        self.output.begin_message();
        let mut prev: ArrayVec<u8, MAX_HEADER_LEN> = ArrayVec::new();
        let mut chunk = data;
        loop {
            let (detected, consumed) = unit::detect_program_message_unit(chunk);
            match detected.header {
                unit::HeaderToken::Invalid(_) => {
                    self.errors
                        .push_back_error(ErrorCode::InvalidCharacter.into());
                    result = false;
                }
                unit::HeaderToken::Mnemonic(header) => {
                    let mut scratch = ArrayVec::new();
                    match compose_compound(&prev, header, &mut scratch) {
                        Some(expanded) => {
                            let commands = self.commands;
                            let command = commands
                                .iter()
                                .find(|c| pattern::match_command(c.pattern, expanded, None, 0));
                            if let Some(command) = command {
                                result &= self.process_command(
                                    device,
                                    command,
                                    expanded,
                                    &detected,
                                );
                                prev.clear();
                                let _ = prev.try_extend_from_slice(expanded);
                            } else {
                                self.errors
                                    .push_back_error(ErrorCode::UndefinedHeader.into());
                                result = false;
                            }
                        }
                        None => {
                            self.errors
                                .push_back_error(ErrorCode::CommandHeaderError.into());
                            result = false;
                        }
                    }
                }
                unit::HeaderToken::Unknown => {}
            }
            if consumed < chunk.len() {
                chunk = &chunk[consumed..];
            } else {
                break;
            }
        }
        if let Err(err) = self.writer().message_end() {
            self.errors.push_back_error(err);
            result = false;
        }
        result
    }

    fn process_command(
        &mut self,
        device: &mut D,
        command: &'a Command<'a, D>,
        header: &[u8],
        detected: &unit::ProgramMessageUnit,
    ) -> bool {
        // The next field owes a `;` if a previous unit produced output
        if self.output.count > 0 {
            self.output.pending_separator = true;
        }
        self.output.begin_unit();

        let mut call = CommandCall {
            command,
            header,
            params: Parameters::new(detected.data, detected.parameters),
            response: ResponseWriter {
                sink: &mut self.interface,
                out: &mut self.output,
                line_ending: self.line_ending,
            },
            errors: &mut self.errors,
            idn: self.idn,
            cmd_error: false,
        };

        let mut result = true;
        match command.handler.handle(device, &mut call) {
            Ok(()) => {
                if call.cmd_error {
                    result = false;
                }
            }
            Err(err) => {
                // An error bubbled out without being pushed by the
                // extraction that raised it
                if !call.cmd_error {
                    call.push_error(err);
                }
                result = false;
            }
        }

        // The handler must have consumed the whole parameter list
        if !call.cmd_error && !call.params.at_end() {
            call.push_error(ErrorCode::ParameterNotAllowed.into());
            result = false;
        }
        result
    }
}

/// Execution context of one matched command, handed to its handler.
///
/// Provides the parameter extraction API over the unit's data span and the
/// result writer. Tokens returned from it borrow the driver's input buffer
/// and must not escape the handler.
pub struct CommandCall<'a, D> {
    pub(crate) command: &'a Command<'a, D>,
    pub(crate) header: &'a [u8],
    pub(crate) params: Parameters<'a>,
    pub(crate) response: ResponseWriter<'a>,
    pub(crate) errors: &'a mut dyn ErrorQueue,
    pub(crate) idn: [&'a [u8]; 4],
    pub(crate) cmd_error: bool,
}

impl<'a, D> CommandCall<'a, D> {
    /// The matched header as received, compound-expanded
    pub fn header(&self) -> &'a [u8] {
        self.header
    }

    /// True when the executing header is a query
    pub fn is_query(&self) -> bool {
        self.header.last() == Some(&b'?')
    }

    /// Application tag of the matched table entry
    pub fn tag(&self) -> i32 {
        self.command.tag
    }

    /// Test whether the current command also matches `header`. Useful for
    /// one handler serving several related commands.
    pub fn matches(&self, header: &[u8]) -> bool {
        pattern::match_command(self.command.pattern, header, None, 0)
    }

    /// Extract the numeric header suffixes of the executing command into
    /// `numbers`, filling `default` where the input spelled none.
    pub fn header_suffixes(&self, numbers: &mut [i32], default: i32) -> bool {
        pattern::match_command(self.command.pattern, self.header, Some(numbers), default)
    }

    /// Identity slot `index` (0..4), as reported by an `*IDN?` handler
    pub fn idn(&self, index: usize) -> &'a [u8] {
        self.idn[index]
    }

    /// Push an error onto the error queue and mark the command as failed
    pub fn push_error(&mut self, err: Error) {
        self.cmd_error = true;
        self.errors.push_back_error(err);
    }

    /// True if any error was pushed during this command
    pub fn cmd_error(&self) -> bool {
        self.cmd_error
    }

    /// Pop the oldest queued error
    pub fn pop_error(&mut self) -> Error {
        self.errors.pop_front_error()
    }

    /// Number of queued errors
    pub fn error_count(&self) -> usize {
        self.errors.num_errors()
    }

    pub(crate) fn raise(&mut self, err: Error) -> Error {
        self.push_error(err);
        err
    }

    /// Select binary (definite-length block) or ASCII array responses
    pub fn set_binary_output(&mut self, binary: bool) {
        self.response.out.binary_output = binary;
    }

    pub fn binary_output(&self) -> bool {
        self.response.out.binary_output
    }

    /* Result writer, see [ResponseWriter] for the emission rules */

    pub fn result_characters(&mut self, data: &[u8]) -> crate::error::Result<()> {
        self.response.result_characters(data)
    }

    pub fn result_i32(&mut self, value: i32) -> crate::error::Result<()> {
        self.response.result_i32(value)
    }

    pub fn result_u32(&mut self, value: u32) -> crate::error::Result<()> {
        self.response.result_u32(value)
    }

    pub fn result_i64(&mut self, value: i64) -> crate::error::Result<()> {
        self.response.result_i64(value)
    }

    pub fn result_u64(&mut self, value: u64) -> crate::error::Result<()> {
        self.response.result_u64(value)
    }

    pub fn result_u32_base(&mut self, value: u32, base: u8) -> crate::error::Result<()> {
        self.response.result_u32_base(value, base)
    }

    pub fn result_u64_base(&mut self, value: u64, base: u8) -> crate::error::Result<()> {
        self.response.result_u64_base(value, base)
    }

    pub fn result_f32(&mut self, value: f32) -> crate::error::Result<()> {
        self.response.result_f32(value)
    }

    pub fn result_f64(&mut self, value: f64) -> crate::error::Result<()> {
        self.response.result_f64(value)
    }

    pub fn result_bool(&mut self, value: bool) -> crate::error::Result<()> {
        self.response.result_bool(value)
    }

    pub fn result_text(&mut self, data: &[u8]) -> crate::error::Result<()> {
        self.response.result_text(data)
    }

    pub fn result_expression(&mut self, data: &[u8]) -> crate::error::Result<()> {
        self.response.result_expression(data)
    }

    pub fn result_error(&mut self, err: Error) -> crate::error::Result<()> {
        self.response.result_error(err)
    }

    pub fn result_arbitrary_block(&mut self, data: &[u8]) -> crate::error::Result<()> {
        self.response.result_arbitrary_block(data)
    }

    pub fn result_buffer_i16(&mut self, data: &[i16]) -> crate::error::Result<()> {
        self.response.result_buffer_i16(data)
    }

    pub fn result_buffer_f32(&mut self, data: &[f32]) -> crate::error::Result<()> {
        self.response.result_buffer_f32(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_compound() {
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"MEAS:VOLT:DC?", b"AC?", &mut scratch),
            Some(b"MEAS:VOLT:AC?".as_slice())
        );

        // Common and absolute headers are never rewritten
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"MEAS:VOLT:DC?", b"*OPC", &mut scratch),
            Some(b"*OPC".as_slice())
        );
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"MEAS:VOLT:DC?", b":SYST:ERR?", &mut scratch),
            Some(b":SYST:ERR?".as_slice())
        );

        // No inheritance from common or simple commands
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"*IDN?", b"CURR?", &mut scratch),
            Some(b"CURR?".as_slice())
        );
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"ABORt", b"CURR?", &mut scratch),
            Some(b"CURR?".as_slice())
        );
        let mut scratch = ArrayVec::new();
        assert_eq!(
            compose_compound(b"", b"CURR?", &mut scratch),
            Some(b"CURR?".as_slice())
        );
    }

    #[test]
    fn test_compose_compound_chained() {
        // The inherited prefix comes from the previous *expanded* header
        let mut scratch = ArrayVec::new();
        let first = compose_compound(b"MEAS:CURR:DC?", b"AC?", &mut scratch).unwrap();
        assert_eq!(first, b"MEAS:CURR:AC?");
        let mut scratch2 = ArrayVec::new();
        assert_eq!(
            compose_compound(first, b"FREQ?", &mut scratch2),
            Some(b"MEAS:CURR:FREQ?".as_slice())
        );
    }

    #[test]
    fn test_compose_compound_overflow() {
        let mut scratch = ArrayVec::new();
        let long = [b'A'; MAX_HEADER_LEN];
        assert_eq!(compose_compound(b"PRE:FIX", &long, &mut scratch), None);
    }
}
