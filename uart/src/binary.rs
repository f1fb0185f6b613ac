use core::fmt::{self, Formatter, Write as _};

use super::{log_trace, SerialPort, SerialWrite, Word, WriteError};

/// One byte as `bbbb bbbb `, most significant bit first.
fn byte(b: u8) -> [u8; 10] {
    let mut rendered = [b' '; 10];
    let (high, low) = rendered.split_at_mut(5);

    for (slot, bit) in high[..4].iter_mut().chain(low[..4].iter_mut()).zip((0..8).rev()) {
        *slot = if b & (1 << bit) != 0 { b'1' } else { b'0' };
    }

    rendered
}

pub(crate) fn digits<N: Word>(n: N) -> impl Iterator<Item = u8> {
    n.into_be_bytes().into_iter().flat_map(byte)
}

/// Binary digits of every byte of `N`, each byte split at its nibble boundary and followed by a
/// space.
#[derive(Clone, Copy)]
pub struct Bin<N>(pub N);

impl<N: Word> fmt::Display for Bin<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        digits(self.0).try_for_each(|d| f.write_char(d.into()))
    }
}

impl<W: SerialWrite<u8>> SerialPort<W> {
    pub fn write_bin<N: Word>(&mut self, n: N) -> Result<(), WriteError<W>> {
        log_trace!("Binary of {} bytes", N::BYTES);
        self.write_iter(digits(n))
    }

    pub fn write_bin8(&mut self, n: u8) -> Result<(), WriteError<W>> {
        self.write_bin(n)
    }

    pub fn write_bin16(&mut self, n: u16) -> Result<(), WriteError<W>> {
        self.write_bin(n)
    }

    pub fn write_bin32(&mut self, n: u32) -> Result<(), WriteError<W>> {
        self.write_bin(n)
    }
}
