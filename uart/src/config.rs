//! Baud rate divisor selection.
//!
//! The clock frequency and baud rate are fixed when the crate is built, from the `UART_F_CPU` and
//! `UART_BAUD` environment variables (16 MHz and 9600 baud when unset). The divisor follows
//! avr-libc's `<util/setbaud.h>`: normal speed when the achieved rate is within 2 %, otherwise
//! double speed.

use core::fmt;

pub const F_CPU: u32 = parse_setting(option_env!("UART_F_CPU"), 16_000_000);
pub const BAUD: u32 = parse_setting(option_env!("UART_BAUD"), 9_600);

/// The divisor for [`F_CPU`] and [`BAUD`], checked at build time.
pub const DEFAULT: BaudRate = match BaudRate::new(F_CPU, BAUD) {
    Ok(baud_rate) => baud_rate,
    Err(ConfigError::ZeroBaud) => panic!("UART_BAUD must not be zero"),
    Err(ConfigError::Unreachable) => panic!("UART_BAUD cannot be reached from UART_F_CPU"),
};

const TOLERANCE_PERCENT: u64 = 2;

const UBRR_MAX: u64 = 0x0FFF;

const fn parse_setting(value: Option<&str>, default: u32) -> u32 {
    let Some(value) = value else {
        return default;
    };

    let digits = value.as_bytes();
    if digits.is_empty() {
        panic!("Build-time UART setting is empty");
    }

    let mut n: u32 = 0;
    let mut i = 0;
    while i < digits.len() {
        let b = digits[i];
        if !b.is_ascii_digit() {
            panic!("Build-time UART setting must be a decimal number");
        }

        n = match n.checked_mul(10) {
            Some(n) => n,
            None => panic!("Build-time UART setting is too large"),
        };
        n = match n.checked_add((b - b'0') as u32) {
            Some(n) => n,
            None => panic!("Build-time UART setting is too large"),
        };

        i += 1;
    }

    n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub enum ConfigError {
    ZeroBaud,
    /// The divisor falls outside the 12-bit UBRR register at either speed.
    Unreachable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBaud => write!(f, "Baud rate is zero"),
            ConfigError::Unreachable => write!(f, "Baud rate is out of range for the clock"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Contents of the UBRR register and the U2X double speed bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-logging", derive(defmt::Format))]
pub struct BaudRate {
    pub ubrr: u16,
    pub u2x: bool,
}

/// UBRR + 1 for `samples` clocks per bit, rounded to nearest.
const fn divisor(f_cpu: u64, baud: u64, samples: u64) -> Option<u64> {
    let divisor = (f_cpu + samples / 2 * baud) / (samples * baud);
    if divisor == 0 || divisor - 1 > UBRR_MAX {
        None
    } else {
        Some(divisor)
    }
}

const fn within_tolerance(f_cpu: u64, baud: u64, samples: u64, divisor: u64) -> bool {
    let clocks = samples * divisor;
    let too_fast = 100 * f_cpu > clocks * (100 * baud + baud * TOLERANCE_PERCENT);
    let too_slow = 100 * f_cpu < clocks * (100 * baud - baud * TOLERANCE_PERCENT);
    !too_fast && !too_slow
}

impl BaudRate {
    pub const fn new(f_cpu: u32, baud: u32) -> Result<Self, ConfigError> {
        if baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }

        let (f_cpu, baud) = (f_cpu as u64, baud as u64);

        let normal = divisor(f_cpu, baud, 16);
        if let Some(divisor) = normal {
            if within_tolerance(f_cpu, baud, 16, divisor) {
                return Ok(Self {
                    ubrr: (divisor - 1) as u16,
                    u2x: false,
                });
            }
        }

        match (divisor(f_cpu, baud, 8), normal) {
            (Some(divisor), _) => Ok(Self {
                ubrr: (divisor - 1) as u16,
                u2x: true,
            }),
            (None, Some(divisor)) => Ok(Self {
                ubrr: (divisor - 1) as u16,
                u2x: false,
            }),
            (None, None) => Err(ConfigError::Unreachable),
        }
    }

    const fn samples(&self) -> u64 {
        if self.u2x {
            8
        } else {
            16
        }
    }

    /// The baud rate this divisor produces from `f_cpu`.
    pub const fn actual(&self, f_cpu: u32) -> u32 {
        (f_cpu as u64 / (self.samples() * (self.ubrr as u64 + 1))) as u32
    }

    pub const fn within_tolerance(&self, f_cpu: u32, baud: u32) -> bool {
        baud != 0
            && within_tolerance(
                f_cpu as u64,
                baud as u64,
                self.samples(),
                self.ubrr as u64 + 1,
            )
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        DEFAULT
    }
}
