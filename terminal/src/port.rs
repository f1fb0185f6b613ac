use std::{
    io::{self, Read, Write},
    num::NonZeroU32,
    time::Duration,
};

use anyhow::Context;
use serialport::SerialPortType;
use uart::{nb, SerialRead, SerialWrite};

use crate::simulator;

pub enum Port {
    Simulator(simulator::Channels),
    Serial(Box<dyn serialport::SerialPort>),
}

impl Port {
    /// Opens `name`, or the first USB serial port when no name is given.
    pub fn open(name: Option<String>, baud: u32) -> anyhow::Result<Self> {
        let name = match name {
            Some(name) => name,
            None => serialport::available_ports()?
                .into_iter()
                .find_map(|port| match port.port_type {
                    SerialPortType::UsbPort(_) => Some(port.port_name),
                    _ => None,
                })
                .context("Device not connected")?,
        };

        log::info!("Opening {} at {} baud", name, baud);

        let serial = serialport::new(name.as_str(), baud)
            .open()
            .with_context(|| format!("Failed to open {}", name))?;

        Ok(Self::Serial(serial))
    }

    /// How long a read waits for the device before reporting that it timed out.
    pub fn set_timeout(&mut self, timeout: Duration) -> anyhow::Result<()> {
        match self {
            Self::Simulator(channels) => channels.set_timeout(timeout),
            Self::Serial(serial) => serial.set_timeout(timeout)?,
        }

        Ok(())
    }
}

impl Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Simulator(channels) => channels.read(buf),
            Self::Serial(serial) => serial.read(buf),
        }
    }
}

impl Write for Port {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Simulator(channels) => channels.write(buf),
            Self::Serial(serial) => serial.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Simulator(channels) => channels.flush(),
            Self::Serial(serial) => serial.flush(),
        }
    }
}

/// Presents a blocking `std::io` stream as an embedded-hal serial peripheral.
///
/// An expired read timeout is reported as `WouldBlock`.
pub struct StdSerial<T>(pub T);

fn would_block(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

fn nb_error(err: io::Error) -> nb::Error<io::Error> {
    if would_block(&err) {
        nb::Error::WouldBlock
    } else {
        nb::Error::Other(err)
    }
}

impl<T: Read> SerialRead<u8> for StdSerial<T> {
    type Error = io::Error;

    fn read(&mut self) -> nb::Result<u8, io::Error> {
        let mut byte = 0;
        match self.0.read(std::slice::from_mut(&mut byte)) {
            Ok(0) => Err(nb::Error::Other(io::ErrorKind::UnexpectedEof.into())),
            Ok(_) => Ok(byte),
            Err(err) => Err(nb_error(err)),
        }
    }
}

impl<T: Write> SerialWrite<u8> for StdSerial<T> {
    type Error = io::Error;

    fn write(&mut self, word: u8) -> nb::Result<(), io::Error> {
        match self.0.write(&[word]) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(_) => Ok(()),
            Err(err) => Err(nb_error(err)),
        }
    }

    fn flush(&mut self) -> nb::Result<(), io::Error> {
        self.0.flush().map_err(nb_error)
    }
}

pub type HostPort = uart::SerialPort<StdSerial<Port>>;

/// Hands `port` to the library. Reads and writes wait up to `timeout` for the device.
pub fn connect(mut port: Port, timeout: Duration) -> anyhow::Result<HostPort> {
    port.set_timeout(timeout)?;

    // The port itself waits out the timeout, so one failed poll is enough to give up.
    Ok(uart::SerialPort::new(StdSerial(port))
        .with_timeout(uart::Timeout::AfterPolls(NonZeroU32::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_streams_as_serial() {
        let mut serial = StdSerial(io::Cursor::new(b"ok".to_vec()));

        assert_eq!(serial.read().ok(), Some(b'o'));
        assert_eq!(serial.read().ok(), Some(b'k'));
        assert!(matches!(
            serial.read(),
            Err(nb::Error::Other(err)) if err.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn writes_through_library() {
        let mut port = uart::SerialPort::new(StdSerial(Vec::new()));
        port.write_hex16(0xD00D).unwrap();
        port.write_newline().unwrap();
        assert_eq!(port.release().0, b"D00D\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn showcase_waits_for_slow_device() {
        use serialport::{SerialPort as _, TTYPort};

        const REPEATS: usize = 4;

        let mut rendered = uart::SerialPort::new(uart::MemorySerial::new());
        uart::showcase::run(&mut rendered).unwrap();
        let showcase_len = rendered.release().output().len();

        let (host, mut device) = TTYPort::pair().unwrap();
        device.set_timeout(Duration::from_millis(500)).unwrap();

        let device = std::thread::spawn(move || {
            let mut buf = [0; 1024];
            let mut received = 0;
            while let Ok(n @ 1..) = device.read(&mut buf) {
                received += n;
                std::thread::sleep(Duration::from_millis(10));
            }
            received
        });

        let mut port = connect(Port::Serial(Box::new(host)), Duration::from_secs(2)).unwrap();
        for _ in 0..REPEATS {
            uart::showcase::run(&mut port).unwrap();
        }

        assert_eq!(device.join().unwrap(), REPEATS * showcase_len);
    }
}
