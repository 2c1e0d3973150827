//! Command parameter extraction.
//!
//! Handlers pull typed parameters out of the current unit's data span
//! through [CommandCall]. Each extraction enforces the `,` separator
//! discipline and pushes the matching SCPI error onto the error queue
//! before returning it, so `?`-propagation out of a handler leaves the
//! queue in the right state.

use core::str;

use lexical_core::NumberFormatBuilder;

use super::lexer::{Lexer, Token};
use super::{format, pattern, CommandCall};
use crate::error::{Error, ErrorCode, Result};

/// Lexer cursor over one unit's parameter-data span.
pub(crate) struct Parameters<'a> {
    lexer: Lexer<'a>,
    input_count: u32,
    count: usize,
}

impl<'a> Parameters<'a> {
    pub(crate) fn new(data: &'a [u8], count: usize) -> Self {
        Parameters {
            lexer: Lexer::new(data),
            input_count: 0,
            count,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.lexer.at_end()
    }
}

impl<'a, D> CommandCall<'a, D> {
    /// Total number of parameters the executing unit carries
    pub fn parameter_count(&self) -> usize {
        self.params.count
    }

    /// Attempt to consume the next parameter.
    /// Returns None when the parameter list is exhausted.
    ///
    /// Errors (and pushes):
    /// * [ErrorCode::InvalidSeparator] - missing `,` between parameters
    /// * [ErrorCode::InvalidStringData] - unparsable program data
    pub fn next_optional_token(&mut self) -> Result<Option<Token<'a>>> {
        if self.params.lexer.at_end() {
            return Ok(None);
        }
        if self.params.input_count != 0 && !self.params.lexer.comma() {
            return Err(self.raise(ErrorCode::InvalidSeparator.into()));
        }
        self.params.input_count += 1;
        match self.params.lexer.program_data() {
            Some(token) => Ok(Some(token)),
            None => Err(self.raise(ErrorCode::InvalidStringData.into())),
        }
    }

    /// Consume the next, mandatory, parameter.
    ///
    /// Same as [Self::next_optional_token] but an exhausted list raises
    /// [ErrorCode::MissingParameter].
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        match self.next_optional_token() {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(self.raise(ErrorCode::MissingParameter.into())),
            Err(err) => Err(err),
        }
    }

    /// Consume the next, mandatory, parameter and convert it to `T`.
    pub fn next_data<T>(&mut self) -> Result<T>
    where
        T: TryFrom<Token<'a>, Error = Error>,
    {
        let token = self.next_token()?;
        token.try_into().map_err(|err| self.raise(err))
    }

    /// Attempt to consume the next parameter and convert it to `T`.
    /// Returns None when the parameter list is exhausted.
    pub fn next_optional_data<T>(&mut self) -> Result<Option<T>>
    where
        T: TryFrom<Token<'a>, Error = Error>,
    {
        match self.next_optional_token()? {
            Some(token) => match token.try_into() {
                Ok(value) => Ok(Some(value)),
                Err(err) => Err(self.raise(err)),
            },
            None => Ok(None),
        }
    }

    /// Consume a mandatory quoted-string parameter and copy its content
    /// into `buf`, unfolding doubled quotes. Content beyond the buffer is
    /// truncated. Returns the filled prefix of `buf`.
    pub fn next_text_into<'b>(&mut self, buf: &'b mut [u8]) -> Result<&'b [u8]> {
        let token = self.next_token()?;
        let (quote, inner) = match token {
            Token::SingleQuoteString(_) => (b'\'', token.string_inner().unwrap()),
            Token::DoubleQuoteString(_) => (b'"', token.string_inner().unwrap()),
            _ => return Err(self.raise(ErrorCode::DataTypeError.into())),
        };
        let mut len = 0;
        let mut bytes = inner.iter();
        while let Some(&c) = bytes.next() {
            if len >= buf.len() {
                break;
            }
            buf[len] = c;
            len += 1;
            if c == quote {
                // The second half of a doubled quote
                bytes.next();
            }
        }
        Ok(&buf[..len])
    }
}

fn parse_radix_u64(s: &[u8], radix: u8) -> Result<u64> {
    let options = lexical_core::ParseIntegerOptions::new();
    let value = match radix {
        16 => {
            const FORMAT: u128 = NumberFormatBuilder::from_radix(16);
            lexical_core::parse_with_options::<u64, FORMAT>(s, &options)
        }
        8 => {
            const FORMAT: u128 = NumberFormatBuilder::from_radix(8);
            lexical_core::parse_with_options::<u64, FORMAT>(s, &options)
        }
        _ => {
            const FORMAT: u128 = NumberFormatBuilder::from_radix(2);
            lexical_core::parse_with_options::<u64, FORMAT>(s, &options)
        }
    };
    value.map_err(|err| match err {
        lexical_core::Error::InvalidDigit(_) => ErrorCode::InvalidCharacterInNumber.into(),
        lexical_core::Error::Overflow(_) | lexical_core::Error::Underflow(_) => {
            ErrorCode::DataOutOfRange.into()
        }
        _ => ErrorCode::NumericDataError.into(),
    })
}

/// Convert string data into a slice of its content, quotes stripped.
///
/// Doubled quotes are NOT unfolded; use [CommandCall::next_text_into] when
/// the text may contain the enclosing quote character.
///
/// # Returns
/// * `Ok(&[u8])` - If data is a string.
/// * `Err(DataTypeError)` - If data is not a string.
impl<'a> TryFrom<Token<'a>> for &'a [u8] {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<&'a [u8]> {
        value
            .string_inner()
            .ok_or_else(|| ErrorCode::DataTypeError.into())
    }
}

/// Convert string or block data into a str, checking UTF8.
///
/// # Returns
/// * `Ok(&str)` - If data is a string or a block with valid UTF8.
/// * `Err(StringDataError)` - If the content is not valid UTF8.
/// * `Err(DataTypeError)` - If data is neither string nor block.
impl<'a> TryFrom<Token<'a>> for &'a str {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<&'a str> {
        let bytes = match value {
            Token::ArbitraryBlock(s) => s,
            _ => value
                .string_inner()
                .ok_or(Error::new(ErrorCode::DataTypeError))?,
        };
        str::from_utf8(bytes).map_err(|_| ErrorCode::StringDataError.into())
    }
}

/// Convert data into a boolean.
///
/// # Returns
/// * `Ok(bool)` - If data is character data matching `ON|OFF` or a decimal
///   numeric (non-zero rounds to true).
/// * `Err(IllegalParameterValue)` - If character data is not a boolean.
/// * `Err(DataTypeError)` - Otherwise.
impl<'a> TryFrom<Token<'a>> for bool {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<bool> {
        match value {
            Token::DecimalNumeric(_) => Ok(<isize>::try_from(value)? != 0),
            Token::ProgramMnemonic(s) => {
                if s.eq_ignore_ascii_case(b"ON") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case(b"OFF") {
                    Ok(false)
                } else {
                    Err(ErrorCode::IllegalParameterValue.into())
                }
            }
            _ => Err(ErrorCode::DataTypeError.into()),
        }
    }
}

/// Convert block data into [format::Arbitrary].
impl<'a> TryFrom<Token<'a>> for format::Arbitrary<'a> {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<format::Arbitrary<'a>> {
        match value {
            Token::ArbitraryBlock(s) => Ok(format::Arbitrary(s)),
            _ => Err(ErrorCode::DataTypeError.into()),
        }
    }
}

/// Convert character data into [format::Character].
impl<'a> TryFrom<Token<'a>> for format::Character<'a> {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<format::Character<'a>> {
        match value {
            Token::ProgramMnemonic(s) => Ok(format::Character(s)),
            _ => Err(ErrorCode::DataTypeError.into()),
        }
    }
}

/// Convert expression data into [format::Expression].
impl<'a> TryFrom<Token<'a>> for format::Expression<'a> {
    type Error = Error;

    fn try_from(value: Token<'a>) -> Result<format::Expression<'a>> {
        match value {
            Token::Expression(s) => Ok(format::Expression(s)),
            _ => Err(ErrorCode::DataTypeError.into()),
        }
    }
}

macro_rules! impl_tryfrom_float {
    ($from:ty) => {
        impl<'a> TryFrom<Token<'a>> for $from {
            type Error = Error;

            fn try_from(value: Token) -> Result<Self> {
                match value {
                    Token::DecimalNumeric(s) => {
                        lexical_core::parse::<$from>(s).map_err(|err| match err {
                            lexical_core::Error::InvalidDigit(_) => {
                                ErrorCode::InvalidCharacterInNumber.into()
                            }
                            lexical_core::Error::Overflow(_)
                            | lexical_core::Error::Underflow(_) => {
                                ErrorCode::DataOutOfRange.into()
                            }
                            _ => ErrorCode::NumericDataError.into(),
                        })
                    }
                    Token::HexNumeric(s) => Ok(parse_radix_u64(s, 16)? as $from),
                    Token::OctNumeric(s) => Ok(parse_radix_u64(s, 8)? as $from),
                    Token::BinNumeric(s) => Ok(parse_radix_u64(s, 2)? as $from),
                    Token::ProgramMnemonic(s) => match s {
                        //Check for special float values
                        x if pattern::match_pattern(b"INFinity", x, None) => Ok(<$from>::INFINITY),
                        x if pattern::match_pattern(b"NINFinity", x, None) => {
                            Ok(<$from>::NEG_INFINITY)
                        }
                        x if pattern::match_pattern(b"NAN", x, None) => Ok(<$from>::NAN),
                        x if pattern::match_pattern(b"MAXimum", x, None) => Ok(<$from>::MAX),
                        x if pattern::match_pattern(b"MINimum", x, None) => Ok(<$from>::MIN),
                        _ => Err(ErrorCode::DataTypeError.into()),
                    },
                    Token::DecimalNumericWithSuffix(_, _) => {
                        Err(ErrorCode::SuffixNotAllowed.into())
                    }
                    _ => Err(ErrorCode::DataTypeError.into()),
                }
            }
        }
    };
}

impl_tryfrom_float!(f32);
impl_tryfrom_float!(f64);

macro_rules! impl_tryfrom_integer {
    ($from:ty, $intermediate:ty) => {
        impl<'a> TryFrom<Token<'a>> for $from {
            type Error = Error;

            fn try_from(value: Token) -> Result<Self> {
                match value {
                    Token::DecimalNumeric(s) => lexical_core::parse::<$from>(s)
                        .or_else(|err| {
                            // Not NR1 formatted, fall back to rounding a float
                            if matches!(err, lexical_core::Error::InvalidDigit(_)) {
                                let value = lexical_core::parse::<$intermediate>(s)?;

                                if !value.is_normal() && value != 0.0 {
                                    Err(lexical_core::Error::Overflow(0))
                                } else if value > (<$from>::MAX as $intermediate) {
                                    Err(lexical_core::Error::Overflow(0))
                                } else if value < (<$from>::MIN as $intermediate) {
                                    Err(lexical_core::Error::Underflow(0))
                                } else {
                                    // <f32|f64>::round() doesn't exist in no_std.
                                    // Safe: value is finite and within bounds.
                                    if value.is_sign_positive() {
                                        Ok(unsafe { (value + 0.5).to_int_unchecked() })
                                    } else {
                                        Ok(unsafe { (value - 0.5).to_int_unchecked() })
                                    }
                                }
                            } else {
                                Err(err)
                            }
                        })
                        .map_err(|err| match err {
                            lexical_core::Error::InvalidDigit(_) => {
                                ErrorCode::InvalidCharacterInNumber.into()
                            }
                            lexical_core::Error::Overflow(_)
                            | lexical_core::Error::Underflow(_) => {
                                ErrorCode::DataOutOfRange.into()
                            }
                            _ => ErrorCode::NumericDataError.into(),
                        }),
                    Token::HexNumeric(s) => <$from>::try_from(parse_radix_u64(s, 16)?)
                        .map_err(|_| ErrorCode::DataOutOfRange.into()),
                    Token::OctNumeric(s) => <$from>::try_from(parse_radix_u64(s, 8)?)
                        .map_err(|_| ErrorCode::DataOutOfRange.into()),
                    Token::BinNumeric(s) => <$from>::try_from(parse_radix_u64(s, 2)?)
                        .map_err(|_| ErrorCode::DataOutOfRange.into()),
                    Token::ProgramMnemonic(s) => match s {
                        x if pattern::match_pattern(b"MAXimum", x, None) => Ok(<$from>::MAX),
                        x if pattern::match_pattern(b"MINimum", x, None) => Ok(<$from>::MIN),
                        _ => Err(ErrorCode::DataTypeError.into()),
                    },
                    Token::DecimalNumericWithSuffix(_, _) => {
                        Err(ErrorCode::SuffixNotAllowed.into())
                    }
                    _ => Err(ErrorCode::DataTypeError.into()),
                }
            }
        }
    };
}

// Fall back to floating point when the numeric is not NR1 formatted.
// Use double precision on larger types to avoid rounding errors.
impl_tryfrom_integer!(usize, f64);
impl_tryfrom_integer!(isize, f64);
impl_tryfrom_integer!(i64, f64);
impl_tryfrom_integer!(u64, f64);
impl_tryfrom_integer!(i32, f64);
impl_tryfrom_integer!(u32, f64);
impl_tryfrom_integer!(i16, f32);
impl_tryfrom_integer!(u16, f32);
impl_tryfrom_integer!(i8, f32);
impl_tryfrom_integer!(u8, f32);
