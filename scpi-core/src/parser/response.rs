//! Response formatting and emission.
//!
//! All results go straight to the transport sink; the only buffering is a
//! per-scalar stack scratch. The writer tracks how many fields the current
//! unit has produced so that `,`, `;` and the message terminator land in
//! the right places.

use lexical_core::{FormattedSize, NumberFormatBuilder, WriteIntegerOptions};

use crate::error::{Error, ErrorCode, Result};
use crate::Interface;

/// Payload of a definite-length block is limited to nine length digits.
const MAX_BLOCK_LEN: usize = 999_999_999;

/// Per-message output bookkeeping shared between driver and writer.
#[derive(Debug, Default)]
pub(crate) struct OutputState {
    /// ASCII fields emitted by the current unit
    pub count: u32,
    /// Binary blocks emitted by the current unit
    pub binary_count: u32,
    /// Did any unit of the current message produce ASCII output?
    pub message_ascii: bool,
    /// Did any unit of the current message produce binary output?
    pub message_binary: bool,
    /// A previous unit in this message produced output; a `;` is owed
    /// before the next field
    pub pending_separator: bool,
    /// Emit array results as definite-length blocks instead of ASCII lists
    pub binary_output: bool,
}

impl OutputState {
    pub fn begin_message(&mut self) {
        self.count = 0;
        self.binary_count = 0;
        self.message_ascii = false;
        self.message_binary = false;
        self.pending_separator = false;
    }

    pub fn begin_unit(&mut self) {
        self.count = 0;
        self.binary_count = 0;
    }
}

/// Writes command results onto the transport sink with SCPI response
/// punctuation.
pub struct ResponseWriter<'a> {
    pub(crate) sink: &'a mut dyn Interface,
    pub(crate) out: &'a mut OutputState,
    pub(crate) line_ending: &'a [u8],
}

macro_rules! impl_result_int {
    ($(#[$meta:meta])* $name:ident: $typ:ty) => {
        $(#[$meta])*
        pub fn $name(&mut self, value: $typ) -> Result<()> {
            let mut buf = [0u8; <$typ>::FORMATTED_SIZE_DECIMAL];
            let slc = lexical_core::write(value, &mut buf);
            self.delimiter()?;
            self.write_all(slc)?;
            self.finish_field();
            Ok(())
        }
    };
}

macro_rules! impl_result_int_base {
    ($(#[$meta:meta])* $name:ident: $typ:ty) => {
        $(#[$meta])*
        pub fn $name(&mut self, value: $typ, base: u8) -> Result<()> {
            let options = WriteIntegerOptions::new();
            let mut buf = [0u8; <$typ>::FORMATTED_SIZE];
            self.delimiter()?;
            match base {
                16 => {
                    const FORMAT: u128 = NumberFormatBuilder::from_radix(16);
                    let slc = lexical_core::write_with_options::<_, FORMAT>(value, &mut buf, &options);
                    self.write_all(b"#H")?;
                    self.write_all(slc)?;
                }
                8 => {
                    const FORMAT: u128 = NumberFormatBuilder::from_radix(8);
                    let slc = lexical_core::write_with_options::<_, FORMAT>(value, &mut buf, &options);
                    self.write_all(b"#Q")?;
                    self.write_all(slc)?;
                }
                2 => {
                    const FORMAT: u128 = NumberFormatBuilder::from_radix(2);
                    let slc = lexical_core::write_with_options::<_, FORMAT>(value, &mut buf, &options);
                    self.write_all(b"#B")?;
                    self.write_all(slc)?;
                }
                _ => {
                    let slc = lexical_core::write(value, &mut buf);
                    self.write_all(slc)?;
                }
            }
            self.finish_field();
            Ok(())
        }
    };
}

macro_rules! impl_result_real {
    ($(#[$meta:meta])* $name:ident: $typ:ty) => {
        $(#[$meta])*
        pub fn $name(&mut self, value: $typ) -> Result<()> {
            self.delimiter()?;
            if value.is_nan() {
                // NaN is represented by 9.91E+37, SCPI-99 7.2.1.5
                self.write_all(b"9.91E+37")?;
            } else if value.is_infinite() {
                // +/- infinity is represented by +/-9.9E+37, SCPI-99 7.2.1.4
                if value.is_sign_negative() {
                    self.write_all(b"-9.9E+37")?;
                } else {
                    self.write_all(b"9.9E+37")?;
                }
            } else {
                let mut buf = [0u8; <$typ>::FORMATTED_SIZE_DECIMAL];
                let slc = lexical_core::write(value, &mut buf);
                self.write_all(slc)?;
            }
            self.finish_field();
            Ok(())
        }
    };
}

impl<'a> ResponseWriter<'a> {
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let written = self.sink.write(data)?;
            if written == 0 {
                return Err(ErrorCode::SystemError.into());
            }
            data = &data[written..];
        }
        Ok(())
    }

    /// `,` between fields of one unit; the owed `;` before the first
    /// field of a later unit
    fn delimiter(&mut self) -> Result<()> {
        if self.out.count > 0 {
            self.write_all(b",")?;
        } else if self.out.pending_separator {
            self.out.pending_separator = false;
            self.write_all(b";")?;
        }
        Ok(())
    }

    fn finish_field(&mut self) {
        self.out.count += 1;
        self.out.message_ascii = true;
    }

    fn finish_block(&mut self) {
        self.out.binary_count += 1;
        self.out.message_binary = true;
    }

    /// Message terminator if any unit produced ASCII output, a plain flush
    /// if only binary output was produced.
    pub(crate) fn message_end(&mut self) -> Result<()> {
        if self.out.message_ascii {
            let line_ending = self.line_ending;
            self.write_all(line_ending)?;
            self.sink.flush()
        } else if self.out.message_binary {
            self.sink.flush()
        } else {
            Ok(())
        }
    }

    /// Write raw characters (unquoted) to the result
    pub fn result_characters(&mut self, data: &[u8]) -> Result<()> {
        self.delimiter()?;
        self.write_all(data)?;
        self.finish_field();
        Ok(())
    }

    impl_result_int! {
        /// Write a signed 32-bit integer result
        result_i32: i32
    }
    impl_result_int! {
        /// Write an unsigned 32-bit integer result
        result_u32: u32
    }
    impl_result_int! {
        /// Write a signed 64-bit integer result
        result_i64: i64
    }
    impl_result_int! {
        /// Write an unsigned 64-bit integer result
        result_u64: u64
    }

    impl_result_int_base! {
        /// Write an unsigned 32-bit integer result in the given base.
        /// Bases 16, 8 and 2 are prefixed `#H`, `#Q` and `#B`; anything
        /// else falls back to decimal.
        result_u32_base: u32
    }
    impl_result_int_base! {
        /// Write an unsigned 64-bit integer result in the given base
        result_u64_base: u64
    }

    impl_result_real! {
        /// Write a float (32-bit) result
        result_f32: f32
    }
    impl_result_real! {
        /// Write a double (64-bit) result
        result_f64: f64
    }

    /// Write a boolean result as `1` or `0`
    pub fn result_bool(&mut self, value: bool) -> Result<()> {
        self.delimiter()?;
        self.write_all(if value { b"1" } else { b"0" })?;
        self.finish_field();
        Ok(())
    }

    /// Write quoted text. Embedded `"` characters are escaped by doubling.
    pub fn result_text(&mut self, data: &[u8]) -> Result<()> {
        if !data.is_ascii() {
            return Err(ErrorCode::ExecutionError.into());
        }
        self.delimiter()?;
        self.write_all(b"\"")?;
        let mut first = true;
        for part in data.split(|c| *c == b'"') {
            if !first {
                self.write_all(b"\"\"")?;
            }
            self.write_all(part)?;
            first = false;
        }
        self.write_all(b"\"")?;
        self.finish_field();
        Ok(())
    }

    /// Write expression data, `(…)`
    pub fn result_expression(&mut self, data: &[u8]) -> Result<()> {
        self.delimiter()?;
        self.write_all(b"(")?;
        self.write_all(data)?;
        self.write_all(b")")?;
        self.finish_field();
        Ok(())
    }

    /// Write an error as `<code>,"<message[;extended]>"`
    pub fn result_error(&mut self, err: Error) -> Result<()> {
        self.result_i32(err.get_code() as i32)?;
        self.delimiter()?;
        self.write_all(b"\"")?;
        self.write_all(err.get_message())?;
        if let Some(ext) = err.get_extended() {
            self.write_all(b";")?;
            self.write_all(ext)?;
        }
        self.write_all(b"\"")?;
        self.finish_field();
        Ok(())
    }

    /// Write arbitrary data as an IEEE 488.2 definite-length block,
    /// `#<d><length><payload>`.
    ///
    /// Payloads beyond the nine-digit length limit emit nothing and fail
    /// with [ErrorCode::ExecutionError].
    pub fn result_arbitrary_block(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_BLOCK_LEN {
            return Err(ErrorCode::ExecutionError.into());
        }
        let mut buf = [0u8; usize::FORMATTED_SIZE_DECIMAL];
        let len = lexical_core::write(data.len(), &mut buf);
        self.delimiter()?;
        self.write_all(b"#")?;
        self.write_all(&[b'0' + len.len() as u8])?;
        self.write_all(len)?;
        self.write_all(data)?;
        self.finish_field();
        Ok(())
    }

    /// Definite-length block header for `elems` samples of `size` bytes
    fn write_block_header(&mut self, elems: usize, size: usize) -> Result<()> {
        let bytes = elems
            .checked_mul(size)
            .filter(|bytes| *bytes <= MAX_BLOCK_LEN)
            .ok_or(Error::new(ErrorCode::ExecutionError))?;
        let mut buf = [0u8; usize::FORMATTED_SIZE_DECIMAL];
        let len = lexical_core::write(bytes, &mut buf);
        self.write_all(b"#")?;
        self.write_all(&[b'0' + len.len() as u8])?;
        self.write_all(len)?;
        Ok(())
    }

    /// Write an array of 16-bit integers: a definite-length block with
    /// network-byte-order samples when binary output is selected, an ASCII
    /// `{a,b,c}` list otherwise.
    pub fn result_buffer_i16(&mut self, data: &[i16]) -> Result<()> {
        if self.out.binary_output {
            self.write_block_header(data.len(), 2)?;
            for value in data {
                self.write_all(&value.to_be_bytes())?;
            }
            self.finish_block();
        } else {
            self.delimiter()?;
            self.write_all(b"{")?;
            for (i, value) in data.iter().enumerate() {
                if i > 0 {
                    self.write_all(b",")?;
                }
                let mut buf = [0u8; i16::FORMATTED_SIZE_DECIMAL];
                let slc = lexical_core::write(*value, &mut buf);
                self.write_all(slc)?;
            }
            self.write_all(b"}")?;
            self.finish_field();
        }
        Ok(())
    }

    /// Write an array of floats, block or ASCII list as for
    /// [Self::result_buffer_i16]
    pub fn result_buffer_f32(&mut self, data: &[f32]) -> Result<()> {
        if self.out.binary_output {
            self.write_block_header(data.len(), 4)?;
            for value in data {
                self.write_all(&value.to_be_bytes())?;
            }
            self.finish_block();
        } else {
            self.delimiter()?;
            self.write_all(b"{")?;
            for (i, value) in data.iter().enumerate() {
                if i > 0 {
                    self.write_all(b",")?;
                }
                let mut buf = [0u8; f32::FORMATTED_SIZE_DECIMAL];
                let slc = lexical_core::write(*value, &mut buf);
                self.write_all(slc)?;
            }
            self.write_all(b"}")?;
            self.finish_field();
        }
        Ok(())
    }
}
