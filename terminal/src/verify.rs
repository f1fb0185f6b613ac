use std::fmt;

use uart::{showcase, MemorySerial, ParseError, ReadError, SerialPort};

use crate::port::{HostPort, Port, StdSerial};

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Device went quiet after {lines} lines")]
    Silent { lines: usize },
    #[error("Line {line}: expected {expected:?}, received {received:?}")]
    Mismatch {
        line: usize,
        expected: String,
        received: String,
    },
    #[error("Sample {label:?} is missing")]
    MissingSample { label: &'static str },
    #[error("Sample {label:?} does not parse")]
    Unparsable {
        label: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("Sample {label:?}: expected {expected}, parsed {parsed}")]
    WrongSample {
        label: &'static str,
        expected: String,
        parsed: String,
    },
}

fn split_lines(text: &[u8]) -> Vec<Vec<u8>> {
    text.split_inclusive(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\n").unwrap_or(line);
            line.strip_suffix(b"\r").unwrap_or(line).to_vec()
        })
        .collect()
}

/// The showcase as this build of the library renders it.
pub fn expected_lines() -> Result<Vec<Vec<u8>>, uart::WriteError<MemorySerial>> {
    let mut port = SerialPort::new(MemorySerial::new());
    showcase::run(&mut port)?;
    Ok(split_lines(port.release().output()))
}

fn read_line(port: &mut HostPort) -> Result<Vec<u8>, ReadError<StdSerial<Port>>> {
    let mut line = Vec::new();
    loop {
        match port.read_byte()? {
            b'\n' => {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(line);
            }
            b => line.push(b),
        }
    }
}

/// Reads from the greeting through the final `done` line, skipping anything sent before.
fn receive(port: &mut HostPort) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();

    loop {
        let line = match read_line(port) {
            Ok(line) => line,
            Err(ReadError::HardwareTimeout) => {
                return Err(VerifyError::Silent { lines: lines.len() }.into())
            }
            Err(err) => return Err(err.into()),
        };

        if lines.is_empty() && line != showcase::GREETING.as_bytes() {
            log::debug!("Skipping {:?}", String::from_utf8_lossy(&line));
            continue;
        }

        let done = line == showcase::DONE.as_bytes();
        lines.push(line);

        if done {
            return Ok(lines);
        }
    }
}

fn compare(expected: &[Vec<u8>], received: &[Vec<u8>]) -> Result<(), VerifyError> {
    for line in 0..usize::max(expected.len(), received.len()) {
        let expected = expected.get(line).map(Vec::as_slice).unwrap_or_default();
        let received = received.get(line).map(Vec::as_slice).unwrap_or_default();

        if expected != received {
            return Err(VerifyError::Mismatch {
                line: line + 1,
                expected: String::from_utf8_lossy(expected).into_owned(),
                received: String::from_utf8_lossy(received).into_owned(),
            });
        }
    }

    Ok(())
}

fn check<T: PartialEq + fmt::Display>(
    lines: &[Vec<u8>],
    sample: &showcase::Sample<T>,
    parse: impl FnOnce(&[u8]) -> Result<T, ParseError>,
) -> Result<(), VerifyError> {
    let label = sample.label;

    let text = lines
        .iter()
        .find_map(|line| line.strip_prefix(label.as_bytes())?.strip_prefix(b": "))
        .ok_or(VerifyError::MissingSample { label })?;

    let parsed = parse(text).map_err(|source| VerifyError::Unparsable { label, source })?;

    if parsed != sample.value {
        return Err(VerifyError::WrongSample {
            label,
            expected: sample.value.to_string(),
            parsed: parsed.to_string(),
        });
    }

    log::debug!("Sample {} reads back as {}", label, parsed);

    Ok(())
}

fn check_samples(lines: &[Vec<u8>]) -> Result<(), VerifyError> {
    check(lines, &showcase::HEX16, uart::parse_hex::<u16>)?;
    check(lines, &showcase::HEX32, uart::parse_hex::<u32>)?;
    check(lines, &showcase::HEX64, uart::parse_hex::<u64>)?;
    check(lines, &showcase::PADDED_HEX32, uart::parse_hex::<u32>)?;
    check(lines, &showcase::PADDED_HEX64, uart::parse_hex::<u64>)?;
    check(lines, &showcase::DEC32, uart::parse_decimal)?;
    check(lines, &showcase::BIN8, uart::parse_bin::<u8>)?;
    check(lines, &showcase::BIN16, uart::parse_bin::<u16>)?;
    check(lines, &showcase::BIN32, uart::parse_bin::<u32>)?;

    Ok(())
}

/// Checks the device's showcase against the local rendering.
///
/// Returns the number of lines compared.
pub fn verify(port: &mut HostPort) -> anyhow::Result<usize> {
    let expected = expected_lines()?;
    let received = receive(port)?;

    check_samples(&received)?;
    compare(&expected, &received)?;

    Ok(received.len())
}
