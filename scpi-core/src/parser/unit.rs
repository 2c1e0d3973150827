//! Program-message-unit detection.
//!
//! One step consumes one `<PROGRAM MESSAGE UNIT>` (IEEE 488.2-1992 7.5):
//! a header, its parameter data and the following `;` or newline. The
//! parameter data is only skipped over here, slicing out the span a
//! command handler will re-lex through the parameter API.

use super::lexer::Lexer;

/// Header of a detected unit.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) enum HeaderToken<'a> {
    /// No header could be read (end of input)
    Unknown,
    /// The offending byte of a syntactically invalid unit
    Invalid(&'a [u8]),
    /// A well-formed program header
    Mnemonic(&'a [u8]),
}

/// How the unit was terminated.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub(crate) enum Termination {
    /// Input ran out mid-unit, more bytes are needed
    None,
    /// Unit separator `;`, the message continues
    Semicolon,
    /// Message terminator
    Newline,
}

#[derive(Debug)]
pub(crate) struct ProgramMessageUnit<'a> {
    pub header: HeaderToken<'a>,
    /// Raw parameter-data span between header and terminator
    pub data: &'a [u8],
    /// Number of parameters in `data`
    pub parameters: usize,
    pub termination: Termination,
}

/// Detect one program message unit at the start of `input`.
/// Returns the unit and the number of bytes consumed.
pub(crate) fn detect_program_message_unit(input: &[u8]) -> (ProgramMessageUnit<'_>, usize) {
    let mut lexer = Lexer::new(input);
    lexer.whitespace();

    let header = match lexer.program_header() {
        Some(header) => HeaderToken::Mnemonic(header),
        None => HeaderToken::Unknown,
    };
    let mut data = &input[lexer.pos()..lexer.pos()];
    let mut parameters = 0;
    if matches!(header, HeaderToken::Mnemonic(_)) && lexer.whitespace() > 0 {
        let (span, count) = parse_all_program_data(&mut lexer, input);
        data = span;
        parameters = count;
    }

    let termination = if lexer.newline() {
        Termination::Newline
    } else if lexer.semicolon() {
        Termination::Semicolon
    } else {
        Termination::None
    };

    if termination == Termination::None && !lexer.at_end() {
        // Report the offending byte and resynchronise one byte further on
        let pos = lexer.pos();
        let unit = ProgramMessageUnit {
            header: HeaderToken::Invalid(&input[pos..pos + 1]),
            data: &input[pos..pos],
            parameters: 0,
            termination,
        };
        return (unit, pos + 1);
    }

    (
        ProgramMessageUnit {
            header,
            data,
            parameters,
            termination,
        },
        lexer.pos(),
    )
}

/// Skip the whole parameter-data list, counting parameters.
///
/// Returns an empty span when the list is malformed (the terminator check
/// in the caller then reports the offending byte).
fn parse_all_program_data<'a>(lexer: &mut Lexer<'a>, input: &'a [u8]) -> (&'a [u8], usize) {
    let start = lexer.pos();
    let mut end = start;
    let mut count = 0usize;
    loop {
        if lexer.program_data().is_none() {
            return (&input[start..start], 0);
        }
        count += 1;
        end = lexer.pos();
        if !lexer.comma() {
            break;
        }
    }
    (&input[start..end], count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_simple() {
        let (unit, consumed) = detect_program_message_unit(b"*IDN?\n");
        assert_eq!(unit.header, HeaderToken::Mnemonic(b"*IDN?"));
        assert_eq!(unit.data, b"");
        assert_eq!(unit.termination, Termination::Newline);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_detect_with_parameters() {
        let (unit, consumed) = detect_program_message_unit(b"CONF:VOLT 1.5, 42 ;rest");
        assert_eq!(unit.header, HeaderToken::Mnemonic(b"CONF:VOLT"));
        assert_eq!(unit.data, b"1.5, 42 ");
        assert_eq!(unit.parameters, 2);
        assert_eq!(unit.termination, Termination::Semicolon);
        assert_eq!(consumed, b"CONF:VOLT 1.5, 42 ;".len());
    }

    #[test]
    fn test_detect_incomplete() {
        // No terminator: the unit may grow when more bytes arrive
        let (unit, _) = detect_program_message_unit(b"CONF:CHAN5?");
        assert_eq!(unit.header, HeaderToken::Mnemonic(b"CONF:CHAN5?"));
        assert_eq!(unit.termination, Termination::None);

        let (unit, consumed) = detect_program_message_unit(b"");
        assert_eq!(unit.header, HeaderToken::Unknown);
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_detect_invalid_byte() {
        let (unit, consumed) = detect_program_message_unit(b"&GARBAGE\n");
        assert_eq!(unit.header, HeaderToken::Invalid(b"&"));
        assert_eq!(unit.termination, Termination::None);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_detect_bad_data_tail() {
        // Junk after valid parameters surfaces as an invalid unit
        let (unit, consumed) = detect_program_message_unit(b"MEAS 1,2 !\n");
        assert_eq!(unit.header, HeaderToken::Invalid(b"!"));
        assert_eq!(consumed, b"MEAS 1,2 !".len());
    }

    #[test]
    fn test_detect_block_spans_terminators() {
        // Separators inside a block payload do not terminate the unit
        let (unit, _) = detect_program_message_unit(b"DATA #15ab\ncd\n");
        assert_eq!(unit.header, HeaderToken::Mnemonic(b"DATA"));
        assert_eq!(unit.parameters, 1);
        assert_eq!(unit.termination, Termination::Newline);
    }

    #[test]
    fn test_detect_terminator_only() {
        let (unit, consumed) = detect_program_message_unit(b"\n");
        assert_eq!(unit.header, HeaderToken::Unknown);
        assert_eq!(unit.termination, Termination::Newline);
        assert_eq!(consumed, 1);
    }
}
