use std::{collections::VecDeque, vec::Vec};

use core::convert::Infallible;

use super::{SerialRead, SerialWrite};

/// A serial line backed by memory.
///
/// Reads replay the bytes supplied up front and report `WouldBlock` once they run out.
/// Writes are recorded. [`MemorySerial::stall`] makes the next polls report `WouldBlock`,
/// standing in for a transmitter or receiver that is not ready yet.
#[derive(Debug, Default)]
pub struct MemorySerial {
    input: VecDeque<u8>,
    output: Vec<u8>,
    stalled_polls: u32,
}

impl MemorySerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn stall(&mut self, polls: u32) {
        self.stalled_polls = polls;
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    fn poll(&mut self) -> nb::Result<(), Infallible> {
        match self.stalled_polls.checked_sub(1) {
            Some(remaining) => {
                self.stalled_polls = remaining;
                Err(nb::Error::WouldBlock)
            }
            None => Ok(()),
        }
    }
}

impl SerialRead<u8> for MemorySerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.poll()?;
        self.input.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl SerialWrite<u8> for MemorySerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.poll()?;
        self.output.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        self.poll()
    }
}
