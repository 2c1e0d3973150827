#![cfg_attr(not(feature = "std"), no_std)]

//! This crate implements the core of a SCPI / IEEE 488.2 command parser:
//! it tokenises program messages, matches headers against an application
//! command table, dispatches to handler callbacks and formats their
//! results back onto a transport sink.
//!
//! * [SCPI-1999](https://www.ivifoundation.org/docs/scpi-99.pdf)
//! * [IEEE 488.2](http://dx.doi.org/10.1109/IEEESTD.2004.95390)
//!
//! It does not require the std library (it is `no_std` compatible) or an
//! allocator; the hot path performs no allocation.
//!
//! # Scope
//! The crate does not implement any transport: bytes come in through
//! [Context::input] and responses leave through a caller-supplied
//! [Interface] sink. Status-byte and event-register machinery, unit
//! conversion of numeric suffixes and response buffering are equally out
//! of scope and belong to the application.
//!
//! # Getting started
//! Build a command table, hand the context a buffer, a sink and an error
//! queue, and feed it bytes as they arrive:
//!
//! ```
//! use scpi_core::prelude::*;
//! use scpi_core::commands::IdnQ;
//! use scpi_core::error::ArrayErrorQueue;
//! use arrayvec::ArrayVec;
//!
//! struct Voltmeter {
//!     reading: f64,
//! }
//!
//! struct MeasureQ;
//! impl Handler<Voltmeter> for MeasureQ {
//!     fn handle(&self, device: &mut Voltmeter, context: &mut CommandCall<Voltmeter>) -> Result<()> {
//!         context.result_f64(device.reading)
//!     }
//! }
//!
//! const COMMANDS: &[Command<Voltmeter>] = &[
//!     Command::new(b"*IDN?", &IdnQ),
//!     Command::new(b"MEASure:VOLTage:DC?", &MeasureQ),
//! ];
//!
//! let mut device = Voltmeter { reading: 1.25 };
//! let mut buffer = [0u8; 128];
//! let mut context = Context::new(
//!     COMMANDS,
//!     &mut buffer,
//!     ArrayVec::<u8, 128>::new(),
//!     ArrayErrorQueue::<8>::new(),
//! );
//!
//! assert!(context.input(&mut device, b"MEAS:VOLT:DC?\n"));
//! assert_eq!(context.interface().as_slice(), b"1.25\n");
//! ```
//!
//! # Character coding
//! SCPI is strictly ASCII; non-ASCII bytes outside arbitrary block data
//! are rejected with an `InvalidCharacter` error.
//!
//! # Error handling
//! Errors are side-channel: parse and execution errors are pushed onto
//! the caller-supplied [error::ErrorQueue] and [Context::input] reports
//! plain success/failure. Handlers propagate extraction errors with `?`;
//! the extraction that raised an error has already queued it.
//!
//! # Features
#![doc = document_features::document_features!()]

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

pub mod command;
pub mod commands;
pub mod error;
pub mod option;
pub mod parser;

use command::Command;
use error::{ErrorCode, ErrorQueue, Result};
use parser::response::OutputState;
use parser::unit::{self, Termination};
use parser::Executor;

/// Prelude containing the most useful items
pub mod prelude {
    pub use crate::{
        command::{Command, Handler},
        error::{Error, ErrorCode, ErrorQueue, Result},
        option::ScpiEnum,
        parser::{format, lexer::Token, CommandCall},
        Context, Interface,
    };
}

/// Transport sink responses are written to.
///
/// Implementations exist for `ArrayVec<u8, CAP>` and (with the
/// `alloc`/`std` features) `Vec<u8>`; real instruments implement this
/// over their UART/USB/socket writer.
pub trait Interface {
    /// Write a chunk, returning how many bytes were accepted.
    /// The driver retries with the remainder; accepting zero bytes
    /// reports a `SystemError`.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush buffered output towards the controller. Called once per
    /// response message.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Interface + ?Sized> Interface for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<const CAP: usize> Interface for arrayvec::ArrayVec<u8, CAP> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.try_extend_from_slice(data)
            .map_err(|_| ErrorCode::OutOfMemory)?;
        Ok(data.len())
    }
}

#[cfg(any(feature = "std", feature = "alloc"))]
impl Interface for alloc::vec::Vec<u8> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.extend_from_slice(data);
        Ok(data.len())
    }
}

struct InputBuffer<'a> {
    data: &'a mut [u8],
    position: usize,
}

/// A SCPI parser context: one instrument-facing session.
///
/// Owns the caller-supplied input buffer (whose capacity bounds the
/// longest acceptable program message), the transport sink `I` and the
/// error queue `Q`; the command table `D` is the application state the
/// handlers run against.
///
/// All state hangs off the context, so independent contexts may serve
/// independent transports concurrently.
pub struct Context<'a, D, I, Q> {
    buffer: InputBuffer<'a>,
    exec: Executor<'a, D, I, Q>,
}

impl<'a, D, I, Q> Context<'a, D, I, Q>
where
    I: Interface,
    Q: ErrorQueue,
{
    pub fn new(
        commands: &'a [Command<'a, D>],
        buffer: &'a mut [u8],
        interface: I,
        errors: Q,
    ) -> Self {
        Context {
            buffer: InputBuffer {
                data: buffer,
                position: 0,
            },
            exec: Executor {
                commands,
                interface,
                errors,
                idn: [b"MANUFACTURER", b"INSTR2000", b"0", b"01-02"],
                line_ending: b"\n",
                output: OutputState::default(),
            },
        }
    }

    /// Set the four `*IDN?` identity slots
    /// (manufacturer, model, serial, firmware revision)
    pub fn with_idn(mut self, idn: [&'a [u8]; 4]) -> Self {
        self.exec.idn = idn;
        self
    }

    /// Set the response message terminator (default `"\n"`)
    pub fn with_line_ending(mut self, line_ending: &'a [u8]) -> Self {
        self.exec.line_ending = line_ending;
        self
    }

    /// Select binary (definite-length block) or ASCII array responses
    pub fn set_binary_output(&mut self, binary: bool) {
        self.exec.output.binary_output = binary;
    }

    pub fn binary_output(&self) -> bool {
        self.exec.output.binary_output
    }

    /// The transport sink
    pub fn interface(&mut self) -> &mut I {
        &mut self.exec.interface
    }

    /// The error queue
    pub fn errors(&mut self) -> &mut Q {
        &mut self.exec.errors
    }

    /// Feed input bytes to the parser.
    ///
    /// Data accumulates in the context buffer until a message terminator
    /// arrives; every complete message is parsed and executed and its
    /// span released from the buffer. A trailing unterminated unit stays
    /// buffered until more bytes (or a flush) arrive.
    ///
    /// An empty `data` forces a parse of everything accumulated, for
    /// transports that signal END out of band.
    ///
    /// Returns false if a command failed or the buffer overflowed; the
    /// specific errors are on the error queue.
    pub fn input(&mut self, device: &mut D, data: &[u8]) -> bool {
        if data.is_empty() {
            let span = &self.buffer.data[..self.buffer.position];
            let result = self.exec.parse(device, span);
            self.buffer.position = 0;
            return result;
        }

        let free = self.buffer.data.len() - self.buffer.position;
        if data.len() > free {
            // Unit alignment can no longer be trusted, drop everything
            self.buffer.position = 0;
            self.exec
                .errors
                .push_back_error(ErrorCode::InputBufferOverrun.into());
            return false;
        }
        self.buffer.data[self.buffer.position..self.buffer.position + data.len()]
            .copy_from_slice(data);
        self.buffer.position += data.len();

        let mut result = true;
        let mut total = 0usize;
        loop {
            let tail = &self.buffer.data[total..self.buffer.position];
            let (detected, consumed) = unit::detect_program_message_unit(tail);
            total += consumed;
            match detected.termination {
                Termination::Newline => {
                    let span = &self.buffer.data[..total];
                    result = self.exec.parse(device, span);
                    self.buffer.data.copy_within(total..self.buffer.position, 0);
                    self.buffer.position -= total;
                    total = 0;
                }
                Termination::Semicolon => {
                    if total >= self.buffer.position {
                        break;
                    }
                }
                Termination::None => {
                    // An invalid byte was consumed: keep scanning for the
                    // terminator. Anything else is an incomplete tail that
                    // waits for more bytes.
                    match detected.header {
                        unit::HeaderToken::Invalid(_) => {
                            if total >= self.buffer.position {
                                break;
                            }
                        }
                        _ => break,
                    }
                }
            }
        }
        result
    }

    /// Parse and execute a complete span of program message units,
    /// bypassing the input buffer.
    ///
    /// Returns false if any unit failed.
    pub fn parse(&mut self, device: &mut D, data: &[u8]) -> bool {
        self.exec.parse(device, data)
    }
}
