use core::fmt::{self, Formatter, Write as _};

use super::{log_trace, SerialPort, SerialWrite, Word, WriteError};

/// The low four bits of `n` as an uppercase hexadecimal digit.
pub(crate) fn nibble(n: u8) -> u8 {
    match n & 0x0F {
        n @ 0..=9 => b'0' + n,
        n => b'A' + (n - 10),
    }
}

pub(crate) fn digits<N: Word>(n: N) -> impl Iterator<Item = u8> {
    n.into_be_bytes()
        .into_iter()
        .flat_map(|b| [nibble(b >> 4), nibble(b)])
}

/// Fixed-width uppercase hexadecimal, zero padded to the width of `N`.
#[derive(Clone, Copy)]
pub struct Hex<N>(pub N);

impl<N: Word> fmt::Display for Hex<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        digits(self.0).try_for_each(|d| f.write_char(d.into()))
    }
}

impl<W: SerialWrite<u8>> SerialPort<W> {
    pub fn write_hex_nibble(&mut self, n: u8) -> Result<(), WriteError<W>> {
        self.write_byte(nibble(n))
    }

    pub fn write_hex<N: Word>(&mut self, n: N) -> Result<(), WriteError<W>> {
        log_trace!("Hex of {} bytes", N::BYTES);
        self.write_iter(digits(n))
    }

    pub fn write_hex8(&mut self, n: u8) -> Result<(), WriteError<W>> {
        self.write_hex(n)
    }

    pub fn write_hex16(&mut self, n: u16) -> Result<(), WriteError<W>> {
        self.write_hex(n)
    }

    pub fn write_hex32(&mut self, n: u32) -> Result<(), WriteError<W>> {
        self.write_hex(n)
    }

    pub fn write_hex64(&mut self, n: u64) -> Result<(), WriteError<W>> {
        self.write_hex(n)
    }
}
