use core::fmt;

use super::{log_debug, InputError, ReadError, SerialPort, SerialRead, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub enum ParseError {
    Empty,
    InvalidDigit(u8),
    Length { expected: usize, found: usize },
    Overflow,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "No digits"),
            ParseError::InvalidDigit(b) => write!(f, "Invalid digit {:?}", *b as char),
            ParseError::Length { expected, found } => {
                write!(f, "Expected {} digits, found {}", expected, found)
            }
            ParseError::Overflow => write!(f, "Number too large"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|digit| digit as u8)
}

fn decimal_value(b: u8) -> Option<u32> {
    (b as char).to_digit(10)
}

/// Exactly two hex digits per byte of `N`, in either case.
pub fn parse_hex<N: Word>(text: &[u8]) -> Result<N, ParseError> {
    let expected = 2 * N::BYTES;

    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if text.len() != expected {
        return Err(ParseError::Length {
            expected,
            found: text.len(),
        });
    }

    let mut bytes = N::Bytes::default();
    for (b, pair) in bytes.as_mut().iter_mut().zip(text.chunks_exact(2)) {
        let high = hex_value(pair[0]).ok_or(ParseError::InvalidDigit(pair[0]))?;
        let low = hex_value(pair[1]).ok_or(ParseError::InvalidDigit(pair[1]))?;
        *b = (high << 4) | low;
    }

    Ok(N::from_be_bytes(bytes))
}

pub fn parse_decimal(text: &[u8]) -> Result<u32, ParseError> {
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    text.iter().try_fold(0_u32, |n, &b| {
        let digit = decimal_value(b).ok_or(ParseError::InvalidDigit(b))?;
        n.checked_mul(10)
            .and_then(|n| n.checked_add(digit))
            .ok_or(ParseError::Overflow)
    })
}

/// One binary digit per bit of `N`. Spaces are skipped wherever they appear.
pub fn parse_bin<N: Word>(text: &[u8]) -> Result<N, ParseError> {
    let expected = 8 * N::BYTES;

    let mut bytes = N::Bytes::default();
    let mut found = 0;

    for b in text.iter().copied().filter(|&b| b != b' ') {
        let bit = match b {
            b'0' => 0,
            b'1' => 1,
            b => return Err(ParseError::InvalidDigit(b)),
        };

        if let Some(byte) = bytes.as_mut().get_mut(found / 8) {
            *byte = (*byte << 1) | bit;
        }

        found += 1;
    }

    match found {
        0 => Err(ParseError::Empty),
        found if found != expected => Err(ParseError::Length { expected, found }),
        _ => Ok(N::from_be_bytes(bytes)),
    }
}

impl<R: SerialRead<u8>> SerialPort<R> {
    fn read_non_whitespace(&mut self) -> Result<u8, ReadError<R>> {
        loop {
            let b = self.read_byte()?;
            if !b.is_ascii_whitespace() {
                return Ok(b);
            }
        }
    }

    /// Reads exactly two hex digits per byte of `N`, after skipping leading whitespace.
    pub fn read_hex<N: Word>(&mut self) -> Result<N, InputError<R>> {
        let mut bytes = N::Bytes::default();
        let mut first = true;

        for b in bytes.as_mut() {
            for _ in 0..2 {
                let input = if first {
                    first = false;
                    self.read_non_whitespace()?
                } else {
                    self.read_byte()?
                };

                let Some(digit) = hex_value(input) else {
                    log_debug!("Rejected hex digit {}", input);
                    return Err(InputError::Unexpected(input));
                };

                *b = (*b << 4) | digit;
            }
        }

        Ok(N::from_be_bytes(bytes))
    }

    /// Reads decimal digits after skipping leading whitespace.
    /// The first non-digit ends the number and is consumed.
    pub fn read_decimal(&mut self) -> Result<u32, InputError<R>> {
        let first = self.read_non_whitespace()?;
        let Some(mut n) = decimal_value(first) else {
            log_debug!("Rejected decimal digit {}", first);
            return Err(InputError::Unexpected(first));
        };

        loop {
            let input = self.read_byte()?;
            let Some(digit) = decimal_value(input) else {
                return Ok(n);
            };

            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit))
                .ok_or(InputError::Overflow)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;

    use super::*;
    use crate::{Bin, Decimal, Hex, MemorySerial, Timeout};

    fn port(input: &[u8]) -> SerialPort<MemorySerial> {
        SerialPort::new(MemorySerial::with_input(input))
            .with_timeout(Timeout::AfterPolls(NonZeroU32::new(8).unwrap()))
    }

    #[test]
    fn hex_samples() {
        assert_eq!(parse_hex::<u16>(b"D00D"), Ok(0xD00D));
        assert_eq!(parse_hex::<u16>(b"d00d"), Ok(0xD00D));
        assert_eq!(parse_hex::<u64>(b"DEADBEEF1234D00D"), Ok(0xDEAD_BEEF_1234_D00D));
        assert_eq!(parse_hex::<u8>(b""), Err(ParseError::Empty));
        assert_eq!(
            parse_hex::<u32>(b"D00D"),
            Err(ParseError::Length {
                expected: 8,
                found: 4
            })
        );
        assert_eq!(parse_hex::<u8>(b"0G"), Err(ParseError::InvalidDigit(b'G')));
    }

    #[test]
    fn decimal_samples() {
        assert_eq!(parse_decimal(b"32768"), Ok(32768));
        assert_eq!(parse_decimal(b"0"), Ok(0));
        assert_eq!(parse_decimal(b"4294967295"), Ok(u32::MAX));
        assert_eq!(parse_decimal(b"4294967296"), Err(ParseError::Overflow));
        assert_eq!(parse_decimal(b"12a"), Err(ParseError::InvalidDigit(b'a')));
        assert_eq!(parse_decimal(b""), Err(ParseError::Empty));
    }

    #[test]
    fn bin_samples() {
        assert_eq!(parse_bin::<u8>(b"0101 0101 "), Ok(0b0101_0101));
        assert_eq!(parse_bin::<u16>(b"0101 0101 1100 1100 "), Ok(0b0101_0101_1100_1100));
        assert_eq!(
            parse_bin::<u8>(b"0101"),
            Err(ParseError::Length {
                expected: 8,
                found: 4
            })
        );
        assert_eq!(
            parse_bin::<u8>(b"0101 0101 1"),
            Err(ParseError::Length {
                expected: 8,
                found: 9
            })
        );
        assert_eq!(parse_bin::<u8>(b"   "), Err(ParseError::Empty));
        assert_eq!(parse_bin::<u8>(b"0102 0101"), Err(ParseError::InvalidDigit(b'2')));
    }

    #[test]
    fn render_then_parse() {
        for _ in 0..1000 {
            let n = rand::random::<u64>();

            assert_eq!(parse_hex::<u64>(Hex(n).to_string().as_bytes()), Ok(n));
            assert_eq!(parse_hex::<u16>(Hex(n as u16).to_string().as_bytes()), Ok(n as u16));
            assert_eq!(parse_decimal(Decimal(n as u32).to_string().as_bytes()), Ok(n as u32));
            assert_eq!(parse_bin::<u32>(Bin(n as u32).to_string().as_bytes()), Ok(n as u32));
        }
    }

    #[test]
    fn read_hex_from_port() {
        let mut port = port(b"  \r\n1a2B ff");
        assert_eq!(port.read_hex::<u16>().unwrap(), 0x1A2B);
        assert_eq!(port.read_hex::<u8>().unwrap(), 0xFF);
    }

    #[test]
    fn read_hex_rejects_garbage() {
        let mut port = port(b"1x");
        assert!(matches!(
            port.read_hex::<u8>(),
            Err(InputError::Unexpected(b'x'))
        ));
    }

    #[test]
    fn read_decimal_from_port() {
        let mut port = port(b" 32768\r4294967295 ");
        assert_eq!(port.read_decimal().unwrap(), 32768);
        assert_eq!(port.read_decimal().unwrap(), u32::MAX);
    }

    #[test]
    fn read_decimal_overflow() {
        let mut port = port(b"99999999999\r");
        assert!(matches!(port.read_decimal(), Err(InputError::Overflow)));
    }

    #[test]
    fn read_decimal_needs_a_digit() {
        let mut port = port(b"-1\r");
        assert!(matches!(
            port.read_decimal(),
            Err(InputError::Unexpected(b'-'))
        ));
    }

    #[test]
    fn read_times_out_when_input_stops() {
        let mut port = port(b"12");
        assert!(matches!(
            port.read_decimal(),
            Err(InputError::Read(ReadError::HardwareTimeout))
        ));
    }
}
