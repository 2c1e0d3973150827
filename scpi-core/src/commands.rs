//! Optional built-in handlers for the identification and error-queue
//! queries every instrument carries.
//!
//! Wire them into the application's command table under the conventional
//! patterns:
//! ```
//! use scpi_core::command::Command;
//! use scpi_core::commands::{IdnQ, SystemErrorCountQ, SystemErrorNextQ};
//!
//! # struct Instr;
//! const COMMANDS: &[Command<Instr>] = &[
//!     Command::new(b"*IDN?", &IdnQ),
//!     Command::new(b"SYSTem:ERRor[:NEXT]?", &SystemErrorNextQ),
//!     Command::new(b"SYSTem:ERRor:COUNt?", &SystemErrorCountQ),
//! ];
//! ```

use crate::command::Handler;
use crate::error::Result;
use crate::parser::CommandCall;

/// `*IDN?`
///
/// Identification query; emits the context's four identity slots
/// (manufacturer, model, serial, firmware revision) as unquoted
/// comma-separated fields.
pub struct IdnQ;

impl<D> Handler<D> for IdnQ {
    fn handle(&self, _device: &mut D, context: &mut CommandCall<D>) -> Result<()> {
        for index in 0..4 {
            context.result_characters(context.idn(index))?;
        }
        Ok(())
    }
}

/// `SYSTem:ERRor[:NEXT]?`
///
/// Pop the oldest queued error and report it as `<code>,"<message>"`.
/// An empty queue reports `0,"No error"`.
pub struct SystemErrorNextQ;

impl<D> Handler<D> for SystemErrorNextQ {
    fn handle(&self, _device: &mut D, context: &mut CommandCall<D>) -> Result<()> {
        let err = context.pop_error();
        context.result_error(err)
    }
}

/// `SYSTem:ERRor:COUNt?`
///
/// Report the number of queued errors.
pub struct SystemErrorCountQ;

impl<D> Handler<D> for SystemErrorCountQ {
    fn handle(&self, _device: &mut D, context: &mut CommandCall<D>) -> Result<()> {
        context.result_u32(context.error_count() as u32)
    }
}
