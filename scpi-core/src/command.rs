//! Command table entries and handler callbacks.

use crate::error::{ErrorCode, Result};
use crate::parser::CommandCall;

/// One entry of an application's command table.
///
/// The table is a plain slice scanned in order; the first entry whose
/// pattern matches the (compound-expanded) header wins.
///
/// # Example
/// ```
/// use scpi_core::command::Command;
/// use scpi_core::commands::IdnQ;
///
/// struct Instr;
/// const COMMANDS: &[Command<Instr>] = &[
///     Command::new(b"*IDN?", &IdnQ),
/// ];
/// ```
pub struct Command<'a, D> {
    /// Pattern matched against incoming headers,
    /// e.g. `b"SYSTem:ERRor[:NEXT]?"`
    pub pattern: &'static [u8],
    /// Handler invoked when the pattern matches
    pub handler: &'a dyn Handler<D>,
    /// Application tag, readable from the handler via
    /// [CommandCall::tag]. Useful when one handler serves many entries.
    pub tag: i32,
}

impl<'a, D> Command<'a, D> {
    pub const fn new(pattern: &'static [u8], handler: &'a dyn Handler<D>) -> Self {
        Command {
            pattern,
            handler,
            tag: 0,
        }
    }

    pub const fn tagged(pattern: &'static [u8], handler: &'a dyn Handler<D>, tag: i32) -> Self {
        Command {
            pattern,
            handler,
            tag,
        }
    }
}

/// A command callback.
///
/// `device` is the application state the context was run against;
/// `context` provides parameter extraction and the result writer.
///
/// Returning an error fails the command: the driver pushes the error onto
/// the error queue unless an extraction already did.
///
/// Handlers are usually stateless unit structs:
/// ```
/// use scpi_core::prelude::*;
///
/// # struct Instr { armed: bool }
/// struct Arm;
/// impl Handler<Instr> for Arm {
///     fn handle(&self, device: &mut Instr, _context: &mut CommandCall<Instr>) -> Result<()> {
///         device.armed = true;
///         Ok(())
///     }
/// }
/// let table = [Command::new(b"ARM", &Arm)];
/// ```
pub trait Handler<D> {
    fn handle(&self, device: &mut D, context: &mut CommandCall<D>) -> Result<()>;
}

/// Placeholder handler for unfinished commands; rejects both forms.
pub struct Todo;

impl<D> Handler<D> for Todo {
    fn handle(&self, _device: &mut D, _context: &mut CommandCall<D>) -> Result<()> {
        Err(ErrorCode::UndefinedHeader.into())
    }
}
