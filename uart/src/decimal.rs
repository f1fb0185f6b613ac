use core::fmt::{self, Formatter, Write as _};

use super::{SerialPort, SerialWrite, WriteError};

static RANKS: [u32; 10] = [
    1_000_000_000,
    100_000_000,
    10_000_000,
    1_000_000,
    100_000,
    10_000,
    1_000,
    100,
    10,
    1,
];

/// Decimal digits by repeated subtraction of each power of ten.
pub(crate) struct Digits {
    n: u32,
    ranks: core::slice::Iter<'static, u32>,
    started: bool,
}

impl Iterator for Digits {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        for &rank in self.ranks.by_ref() {
            let mut digit = 0;
            while self.n >= rank {
                self.n -= rank;
                digit += 1;
            }

            // The units digit is always written, so zero renders as "0".
            if digit != 0 || self.started || rank == 1 {
                self.started = true;
                return Some(b'0' + digit);
            }
        }

        None
    }
}

pub(crate) fn digits(n: u32) -> Digits {
    Digits {
        n,
        ranks: RANKS.iter(),
        started: false,
    }
}

pub(crate) fn signed_digits(n: i32) -> impl Iterator<Item = u8> {
    (n < 0)
        .then_some(b'-')
        .into_iter()
        .chain(digits(n.unsigned_abs()))
}

/// Base 10 without leading zeros.
#[derive(Clone, Copy)]
pub struct Decimal(pub u32);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        digits(self.0).try_for_each(|d| f.write_char(d.into()))
    }
}

#[derive(Clone, Copy)]
pub struct SignedDecimal(pub i32);

impl fmt::Display for SignedDecimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        signed_digits(self.0).try_for_each(|d| f.write_char(d.into()))
    }
}

impl<W: SerialWrite<u8>> SerialPort<W> {
    pub fn write_decimal(&mut self, n: u32) -> Result<(), WriteError<W>> {
        self.write_iter(digits(n))
    }

    pub fn write_signed_decimal(&mut self, n: i32) -> Result<(), WriteError<W>> {
        self.write_iter(signed_digits(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(n: u32) -> String {
        String::from_utf8(digits(n).collect()).unwrap()
    }

    #[test]
    fn samples() {
        assert_eq!(render(32768), "32768");
        assert_eq!(render(10), "10");
        assert_eq!(render(1_000_000_007), "1000000007");
        assert_eq!(render(u32::MAX), "4294967295");
    }

    #[test]
    fn zero() {
        assert_eq!(render(0), "0");
        assert_eq!(Decimal(0).to_string(), "0");
    }

    #[test]
    fn minimal_digits() {
        for _ in 0..1000 {
            let n = rand::random::<u32>();
            assert_eq!(render(n), n.to_string());
        }

        for n in 0..=1000 {
            assert_eq!(render(n), n.to_string());
        }
    }

    #[test]
    fn signed() {
        assert_eq!(SignedDecimal(-32768).to_string(), "-32768");
        assert_eq!(SignedDecimal(0).to_string(), "0");
        assert_eq!(SignedDecimal(i32::MIN).to_string(), "-2147483648");
        assert_eq!(SignedDecimal(i32::MAX).to_string(), "2147483647");
    }

    #[test]
    fn port_output() {
        let mut port = SerialPort::new(crate::MemorySerial::new());
        port.write_decimal(32768).unwrap();
        port.write_byte(b' ').unwrap();
        port.write_signed_decimal(-5).unwrap();
        port.write_byte(b' ').unwrap();
        port.write_decimal(32768).unwrap();
        assert_eq!(port.release().into_output(), b"32768 -5 32768");
    }
}
