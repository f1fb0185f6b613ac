use std::{io, sync::mpsc, time::Duration};

use uart::{nb, SerialRead, SerialWrite};

/// The terminal's end of the simulated serial line.
pub struct Channels {
    tx: mpsc::Sender<u8>,
    rx: mpsc::Receiver<u8>,
    timeout: Duration,
}

impl Channels {
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

impl io::Read for Channels {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(slot) = buf.first_mut() else {
            return Ok(0);
        };

        match self.rx.recv_timeout(self.timeout) {
            Ok(byte) => {
                *slot = byte;
                Ok(1)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "Simulator sent nothing",
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(0),
        }
    }
}

impl io::Write for Channels {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            match self.tx.send(byte) {
                Ok(()) => (),
                Err(mpsc::SendError(_)) => {
                    return Err(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "Simulator has stopped",
                    ))
                }
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Terminal has disconnected")]
pub struct Disconnection;

/// The simulated device's end of the line.
pub struct Device {
    tx: mpsc::Sender<u8>,
    rx: mpsc::Receiver<u8>,
}

impl SerialRead<u8> for Device {
    type Error = Disconnection;

    fn read(&mut self) -> nb::Result<u8, Disconnection> {
        self.rx
            .recv()
            .map_err(|mpsc::RecvError| nb::Error::Other(Disconnection))
    }
}

impl SerialWrite<u8> for Device {
    type Error = Disconnection;

    fn write(&mut self, word: u8) -> nb::Result<(), Disconnection> {
        self.tx
            .send(word)
            .map_err(|mpsc::SendError(_)| nb::Error::Other(Disconnection))
    }

    fn flush(&mut self) -> nb::Result<(), Disconnection> {
        Ok(())
    }
}

/// Starts a device that runs the showcase once and then echoes key presses, as the firmware does.
pub fn run() -> Channels {
    let (to_simulator, from_terminal) = mpsc::channel();
    let (to_terminal, from_simulator) = mpsc::channel();

    std::thread::spawn(move || {
        let mut port = uart::SerialPort::new(Device {
            tx: to_terminal,
            rx: from_terminal,
        });

        let stopped: uart::IoError<Device> = match uart::showcase::run(&mut port) {
            Err(err) => err.into(),
            Ok(()) => loop {
                if let Err(err) = uart::showcase::echo(&mut port) {
                    break err;
                }
            },
        };

        log::info!("Simulated device stopped: {}", stopped);
    });

    Channels {
        tx: to_simulator,
        rx: from_simulator,
        timeout: Duration::from_secs(2),
    }
}
