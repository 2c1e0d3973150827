//! A minimal line-based "voltmeter" on stdin/stdout.
//!
//! ```text
//! $ cargo run --features std --example voltmeter
//! *IDN?
//! scpi-core,VOLT2000,0,0.2
//! MEAS:VOLT:DC?;DC?
//! 1.25;1.25
//! SYST:ERR?
//! 0,"No error"
//! ```

use std::io::{self, BufRead, Write};

use scpi_core::commands::{IdnQ, SystemErrorCountQ, SystemErrorNextQ};
use scpi_core::error::ArrayErrorQueue;
use scpi_core::prelude::*;

struct Voltmeter {
    reading: f64,
}

struct MeasVoltDcQ;
impl Handler<Voltmeter> for MeasVoltDcQ {
    fn handle(&self, device: &mut Voltmeter, context: &mut CommandCall<Voltmeter>) -> Result<()> {
        context.result_f64(device.reading)
    }
}

struct ConfVolt;
impl Handler<Voltmeter> for ConfVolt {
    fn handle(&self, device: &mut Voltmeter, context: &mut CommandCall<Voltmeter>) -> Result<()> {
        device.reading = context.next_data()?;
        Ok(())
    }
}

const COMMANDS: &[Command<Voltmeter>] = &[
    Command::new(b"*IDN?", &IdnQ),
    Command::new(b"MEASure:VOLTage[:DC]?", &MeasVoltDcQ),
    Command::new(b"CONFigure:VOLTage", &ConfVolt),
    Command::new(b"SYSTem:ERRor[:NEXT]?", &SystemErrorNextQ),
    Command::new(b"SYSTem:ERRor:COUNt?", &SystemErrorCountQ),
];

fn main() {
    let mut device = Voltmeter { reading: 1.25 };
    let mut buffer = [0u8; 256];
    let mut context = Context::new(
        COMMANDS,
        &mut buffer,
        Vec::new(),
        ArrayErrorQueue::<8>::new(),
    )
    .with_idn([b"scpi-core", b"VOLT2000", b"0", b"0.2"]);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let mut line = line.unwrap().into_bytes();
        line.push(b'\n');

        context.input(&mut device, &line);

        stdout.write_all(context.interface()).unwrap();
        stdout.flush().unwrap();
        context.interface().clear();
    }
}
