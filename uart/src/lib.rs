#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! Blocking byte-level serial I/O with text formatting helpers.
//!
//! [`SerialPort`] wraps any embedded-hal serial peripheral. Every operation polls the peripheral
//! until it is ready, so it returns only once all of its bytes are on the wire. By default the
//! polling never gives up. [`Timeout::AfterPolls`] bounds it instead, and a stalled transfer then
//! fails with `HardwareTimeout`.

use core::{ffi::CStr, fmt, num::NonZeroU32};

pub use embedded_hal::serial::{Read as SerialRead, Write as SerialWrite};
pub use nb;

mod binary;
mod decimal;
mod errors;
mod hex;
mod logging;
mod parse;
mod word;

#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub mod avr;
pub mod config;
#[cfg(any(test, feature = "std"))]
mod memory;
pub mod showcase;

pub use binary::Bin;
pub use decimal::{Decimal, SignedDecimal};
pub use errors::{InputError, IoError, ReadError, WriteError};
pub use hex::Hex;
#[cfg(any(test, feature = "std"))]
pub use memory::MemorySerial;
pub use parse::{parse_bin, parse_decimal, parse_hex, ParseError};
pub use word::Word;

use errors::Stalled;
use logging::{log_debug, log_info, log_trace, log_warn};

pub trait SerialReadWrite: SerialRead<u8> + SerialWrite<u8> {}

impl<S: SerialRead<u8> + SerialWrite<u8>> SerialReadWrite for S {}

/// How long a transfer may wait for the hardware.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    #[default]
    Never,
    /// Give up after this many consecutive polls that found the hardware busy.
    AfterPolls(NonZeroU32),
}

impl Timeout {
    fn block<T, E>(self, mut poll: impl FnMut() -> nb::Result<T, E>) -> Result<T, Stalled<E>> {
        let mut remaining = match self {
            Timeout::Never => None,
            Timeout::AfterPolls(polls) => Some(polls.get()),
        };

        loop {
            match poll() {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(err)) => return Err(Stalled::Failed(err)),
                Err(nb::Error::WouldBlock) => {
                    if let Some(polls) = remaining.as_mut() {
                        *polls -= 1;
                        if *polls == 0 {
                            log_warn!("Serial hardware not ready, giving up");
                            return Err(Stalled::TimedOut);
                        }
                    }
                }
            }
        }
    }
}

/// Exclusive handle on one serial peripheral.
pub struct SerialPort<S> {
    serial: S,
    timeout: Timeout,
}

impl<S> SerialPort<S> {
    pub fn new(serial: S) -> Self {
        log_debug!("Serial port ready");

        Self {
            serial,
            timeout: Timeout::Never,
        }
    }

    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn serial(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Hands the peripheral back.
    pub fn release(self) -> S {
        self.serial
    }
}

impl<R: SerialRead<u8>> SerialPort<R> {
    pub fn read_byte(&mut self) -> Result<u8, ReadError<R>> {
        let serial = &mut self.serial;
        let b = self.timeout.block(|| serial.read())?;
        log_trace!("Read {}", b);
        Ok(b)
    }
}

impl<W: SerialWrite<u8>> SerialPort<W> {
    pub fn write_byte(&mut self, b: u8) -> Result<(), WriteError<W>> {
        let serial = &mut self.serial;
        Ok(self.timeout.block(|| serial.write(b))?)
    }

    /// Blocks until the transmitter has taken every byte written so far.
    pub fn flush(&mut self) -> Result<(), WriteError<W>> {
        let serial = &mut self.serial;
        Ok(self.timeout.block(|| serial.flush())?)
    }

    fn write_iter(&mut self, bytes: impl IntoIterator<Item = u8>) -> Result<(), WriteError<W>> {
        bytes.into_iter().try_for_each(|b| self.write_byte(b))
    }

    /// Writes every byte of `bytes`, NUL included.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WriteError<W>> {
        self.write_iter(bytes.iter().copied())
    }

    /// Writes `text` up to, not including, its first NUL. Text without a NUL is written in full.
    pub fn write_text(&mut self, text: &[u8]) -> Result<(), WriteError<W>> {
        self.write_iter(text.iter().copied().take_while(|&b| b != 0))
    }

    pub fn write_cstr(&mut self, text: &CStr) -> Result<(), WriteError<W>> {
        self.write_bytes(text.to_bytes())
    }

    pub fn write_newline(&mut self) -> Result<(), WriteError<W>> {
        self.write_byte(b'\r')?;
        self.write_byte(b'\n')
    }

    pub fn write_bool(&mut self, b: bool) -> Result<(), WriteError<W>> {
        let text: &[u8] = if b { b"true" } else { b"false" };
        self.write_bytes(text)
    }

    /// Writes formatted text, as produced by `format_args!`.
    pub fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> Result<(), WriteError<W>> {
        let mut target = FormatTarget {
            port: self,
            state: Ok(()),
        };

        fmt::write(&mut target, args).map_err(|fmt::Error| match target.state {
            Ok(()) => WriteError::Format,
            Err(err) => err,
        })
    }
}

impl<S: SerialReadWrite> SerialPort<S> {
    /// Writes `prompt` as by [`SerialPort::write_text`], then waits for one byte.
    pub fn prompt_and_read(&mut self, prompt: &[u8]) -> Result<u8, IoError<S>> {
        self.write_text(prompt)?;
        log_info!("Waiting for input");
        Ok(self.read_byte()?)
    }
}

/// Lets `write!` target the port directly. The cause of a failure is lost; use
/// [`SerialPort::write_formatted`] to keep it.
impl<W: SerialWrite<u8>> fmt::Write for SerialPort<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

struct FormatTarget<'a, W: SerialWrite<u8>> {
    port: &'a mut SerialPort<W>,
    state: Result<(), WriteError<W>>,
}

impl<'a, W: SerialWrite<u8>> fmt::Write for FormatTarget<'a, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.port.write_bytes(s.as_bytes()).map_err(|err| {
            self.state = Err(err);

            fmt::Error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polls(n: u32) -> Timeout {
        Timeout::AfterPolls(NonZeroU32::new(n).unwrap())
    }

    fn output(port: SerialPort<MemorySerial>) -> Vec<u8> {
        port.release().into_output()
    }

    #[derive(Debug)]
    struct Unplugged;

    struct Broken;

    impl SerialRead<u8> for Broken {
        type Error = Unplugged;

        fn read(&mut self) -> nb::Result<u8, Unplugged> {
            Err(nb::Error::Other(Unplugged))
        }
    }

    impl SerialWrite<u8> for Broken {
        type Error = Unplugged;

        fn write(&mut self, _word: u8) -> nb::Result<(), Unplugged> {
            Err(nb::Error::Other(Unplugged))
        }

        fn flush(&mut self) -> nb::Result<(), Unplugged> {
            Ok(())
        }
    }

    #[test]
    fn text_stops_at_nul() {
        let mut port = SerialPort::new(MemorySerial::new());
        port.write_text(b"hello\0world").unwrap();
        port.write_text(b" there").unwrap();
        assert_eq!(output(port), b"hello there");
    }

    #[test]
    fn cstr() {
        let mut port = SerialPort::new(MemorySerial::new());
        port.write_cstr(CStr::from_bytes_with_nul(b"hello world\0").unwrap())
            .unwrap();
        assert_eq!(output(port), b"hello world");
    }

    #[test]
    fn newline_is_crlf() {
        let mut port = SerialPort::new(MemorySerial::new());
        port.write_newline().unwrap();
        assert_eq!(output(port), b"\r\n");
    }

    #[test]
    fn booleans() {
        let mut port = SerialPort::new(MemorySerial::new());
        port.write_bool(true).unwrap();
        port.write_byte(b' ').unwrap();
        port.write_bool(false).unwrap();
        assert_eq!(output(port), b"true false");
    }

    #[test]
    fn prompt_then_read() {
        let mut port = SerialPort::new(MemorySerial::with_input(b"7"));
        let b = port.prompt_and_read(b"enter a number: \0").unwrap();
        assert_eq!(b, b'7');
        assert_eq!(output(port), b"enter a number: ");
    }

    #[test]
    fn formatted() {
        let mut port = SerialPort::new(MemorySerial::new());
        port.write_formatted(format_args!("{} = {}", Hex(0xD00D_u16), Decimal(0xD00D)))
            .unwrap();
        assert_eq!(output(port), b"D00D = 53261");
    }

    #[test]
    fn write_macro() {
        use core::fmt::Write as _;

        let mut port = SerialPort::new(MemorySerial::new());
        write!(port, "{}: {}", "bin8", Bin(0b0101_0101_u8)).unwrap();
        writeln!(port, " {}", SignedDecimal(-1)).unwrap();
        assert_eq!(output(port), b"bin8: 0101 0101  -1\n");

        let mut port = SerialPort::new(Broken);
        assert!(write!(port, "{}", 1).is_err());
    }

    fn every_formatter(
        port: &mut SerialPort<MemorySerial>,
    ) -> Result<(), WriteError<MemorySerial>> {
        port.write_hex_nibble(0xA)?;
        port.write_hex8(0x0D)?;
        port.write_hex16(0xD00D)?;
        port.write_hex32(0x1234_D00D)?;
        port.write_hex64(0xDEAD_BEEF_1234_D00D)?;
        port.write_decimal(32768)?;
        port.write_signed_decimal(-32768)?;
        port.write_bin8(0b0101_0101)?;
        port.write_bin16(0xD00D)?;
        port.write_bin32(0xDEAD_BEEF)?;
        port.write_bool(true)?;
        port.write_bool(false)?;
        port.write_text(b"text\0ignored")?;
        port.write_formatted(format_args!("{}", Hex(0xBEEF_u16)))?;
        port.write_newline()
    }

    #[test]
    fn formatters_repeat_exactly() {
        let mut once = SerialPort::new(MemorySerial::new());
        every_formatter(&mut once).unwrap();
        let once = output(once);

        let mut twice = SerialPort::new(MemorySerial::new());
        every_formatter(&mut twice).unwrap();
        every_formatter(&mut twice).unwrap();

        assert!(!once.is_empty());
        assert_eq!(output(twice), [once.as_slice(), once.as_slice()].concat());
    }

    #[test]
    fn waits_for_busy_hardware() {
        let mut serial = MemorySerial::new();
        serial.stall(3);
        let mut port = SerialPort::new(serial).with_timeout(polls(4));
        port.write_byte(b'x').unwrap();
        assert_eq!(output(port), b"x");

        let mut serial = MemorySerial::with_input(b"y");
        serial.stall(1000);
        let mut port = SerialPort::new(serial);
        assert_eq!(port.read_byte().unwrap(), b'y');
    }

    #[test]
    fn gives_up_on_stalled_hardware() {
        let mut serial = MemorySerial::new();
        serial.stall(3);
        let mut port = SerialPort::new(serial).with_timeout(polls(3));
        assert!(matches!(
            port.write_byte(b'x'),
            Err(WriteError::HardwareTimeout)
        ));

        let mut port = SerialPort::new(MemorySerial::new()).with_timeout(polls(5));
        assert!(matches!(port.read_byte(), Err(ReadError::HardwareTimeout)));
    }

    #[test]
    fn timeout_is_lifted_into_io_error() {
        let mut port = SerialPort::new(MemorySerial::new()).with_timeout(polls(1));
        assert!(matches!(
            port.prompt_and_read(b"?"),
            Err(IoError::HardwareTimeout)
        ));
    }

    #[test]
    fn hardware_errors_propagate() {
        let mut port = SerialPort::new(Broken);
        assert!(matches!(port.write_hex16(1), Err(WriteError::Write(Unplugged))));
        assert!(matches!(port.read_byte(), Err(ReadError::Read(Unplugged))));
        assert!(matches!(
            port.prompt_and_read(b"?"),
            Err(IoError::Write(Unplugged))
        ));
        assert!(matches!(
            port.write_formatted(format_args!("{}", 1)),
            Err(WriteError::Write(Unplugged))
        ));
    }
}
