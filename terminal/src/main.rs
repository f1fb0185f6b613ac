use std::{io::Write, time::Duration};

use clap::{Parser, Subcommand};
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind},
    style::Print,
    ExecutableCommand, QueueableCommand,
};
use serialport::{SerialPortType, UsbPortInfo};

mod port;
use port::{HostPort, Port};

mod simulator;
mod verify;

/// How often the monitor checks the keyboard while the device is quiet.
const MONITOR_POLL: Duration = Duration::from_millis(20);

#[derive(Parser)]
struct Cli {
    /// Serial port to open. Defaults to the first USB serial port
    #[arg(short, long)]
    port: Option<String>,

    /// Line speed
    #[arg(short, long, default_value_t = uart::config::BAUD)]
    baud: u32,

    /// Connect to the simulator
    #[arg(short = 's', long = "simulator")]
    connect_to_simulator: bool,

    /// How long to wait for the device to send or accept data
    #[arg(short, long = "timeout-ms", default_value_t = 2000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List serial ports
    Ports,
    /// Print what the device sends and send it key presses. Esc quits
    Monitor,
    /// Send the showcase from this machine
    Showcase,
    /// Check the device's showcase against the expected text
    Verify,
}

fn list_ports() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();

    for port in serialport::available_ports()? {
        match port.port_type {
            SerialPortType::UsbPort(UsbPortInfo {
                vid, pid, product, ..
            }) => stdout.execute(Print(format_args!(
                "{} USB {:04X}:{:04X} {}\n",
                port.port_name,
                vid,
                pid,
                product.unwrap_or_default()
            )))?,
            _ => stdout.execute(Print(format_args!("{}\n", port.port_name)))?,
        };
    }

    Ok(())
}

struct RawMode;

impl RawMode {
    fn enable() -> anyhow::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            log::error!("Failed to restore terminal: {}", err);
        }
    }
}

fn monitor(port: &mut HostPort) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let _raw_mode = RawMode::enable()?;

    loop {
        while crossterm::event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = crossterm::event::read()?
            {
                match code {
                    KeyCode::Esc => return Ok(()),
                    KeyCode::Enter => port.write_byte(b'\r')?,
                    KeyCode::Char(c) if c.is_ascii() => port.write_byte(c as u8)?,
                    code => log::debug!("Ignoring key {:?}", code),
                }
            }
        }

        match port.read_byte() {
            Ok(b) => {
                stdout.queue(Print(char::from(b)))?;
                if b == b'\n' {
                    stdout.flush()?;
                }
            }
            Err(uart::ReadError::HardwareTimeout) => stdout.flush()?,
            Err(err) => return Err(err.into()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Cli {
        port,
        baud,
        connect_to_simulator,
        timeout_ms,
        command,
    } = Cli::parse();

    if let Command::Ports = command {
        return list_ports();
    }

    let port = if connect_to_simulator {
        Port::Simulator(simulator::run())
    } else {
        Port::open(port, baud)?
    };

    let mut port = port::connect(port, Duration::from_millis(timeout_ms))?;

    match command {
        Command::Ports => Ok(()),
        Command::Monitor => {
            port.serial().0.set_timeout(MONITOR_POLL)?;
            monitor(&mut port)
        }
        Command::Showcase => {
            uart::showcase::run(&mut port)?;
            log::info!("Showcase sent");
            Ok(())
        }
        Command::Verify => {
            let lines = verify::verify(&mut port)?;
            std::io::stdout().execute(Print(format_args!("{} lines match\n", lines)))?;
            Ok(())
        }
    }
}
