//! A demonstration of every formatter, one labelled line each, ending with a line reading `done`.

use super::{log_info, IoError, SerialPort, SerialReadWrite, SerialWrite, WriteError};

pub struct Sample<T> {
    pub label: &'static str,
    pub value: T,
}

pub const GREETING: &str = "hello world";
pub const DONE: &str = "done";

pub const BYTES: &str = "bytes";
pub const HEX16: Sample<u16> = Sample {
    label: "hex16",
    value: 0xD00D,
};
pub const HEX32: Sample<u32> = Sample {
    label: "hex32",
    value: 0x1234_D00D,
};
pub const HEX64: Sample<u64> = Sample {
    label: "hex64",
    value: 0xDEAD_BEEF_1234_D00D,
};
pub const PADDED_HEX32: Sample<u32> = Sample {
    label: "padded hex32",
    value: 0xD00D,
};
pub const PADDED_HEX64: Sample<u64> = Sample {
    label: "padded hex64",
    value: 0xD00D,
};
pub const DECIMAL: &str = "decimal";
pub const THOUSANDS: &str = "thousands";
pub const DEC32: Sample<u32> = Sample {
    label: "dec32",
    value: 32768,
};
pub const DEC32_AS_HEX: &str = "dec32 as hex32";
pub const BIN8: Sample<u8> = Sample {
    label: "bin8",
    value: 0b0101_0101,
};
pub const BIN16: Sample<u16> = Sample {
    label: "bin16",
    value: 0b0101_0101_1100_1100,
};
pub const BIN32: Sample<u32> = Sample {
    label: "bin32",
    value: 0xDEAD_BEEF,
};
pub const BOOL: &str = "bool";
pub const SIGNED: Sample<i32> = Sample {
    label: "signed",
    value: -32768,
};

pub const PROMPT: &[u8] = b"enter a key: \0";

fn labelled<W: SerialWrite<u8>>(
    port: &mut SerialPort<W>,
    label: &str,
) -> Result<(), WriteError<W>> {
    port.write_bytes(label.as_bytes())?;
    port.write_bytes(b": ")
}

pub fn run<W: SerialWrite<u8>>(port: &mut SerialPort<W>) -> Result<(), WriteError<W>> {
    log_info!("Showcase started");

    port.write_bytes(GREETING.as_bytes())?;
    port.write_newline()?;

    labelled(port, BYTES)?;
    for n in 0..=u8::MAX {
        port.write_hex8(n)?;
        port.write_byte(b' ')?;
    }
    port.write_newline()?;

    labelled(port, HEX16.label)?;
    port.write_hex16(HEX16.value)?;
    port.write_newline()?;

    labelled(port, HEX32.label)?;
    port.write_hex32(HEX32.value)?;
    port.write_newline()?;

    labelled(port, HEX64.label)?;
    port.write_hex64(HEX64.value)?;
    port.write_newline()?;

    labelled(port, PADDED_HEX32.label)?;
    port.write_hex32(PADDED_HEX32.value)?;
    port.write_newline()?;

    labelled(port, PADDED_HEX64.label)?;
    port.write_hex64(PADDED_HEX64.value)?;
    port.write_newline()?;

    labelled(port, DECIMAL)?;
    for n in 0..=u32::from(u8::MAX) {
        port.write_decimal(n)?;
        port.write_byte(b' ')?;
    }
    port.write_newline()?;

    labelled(port, THOUSANDS)?;
    for n in (999..1_000_000).step_by(1000) {
        port.write_decimal(n)?;
        port.write_byte(b' ')?;
    }
    port.write_newline()?;

    labelled(port, DEC32.label)?;
    port.write_decimal(DEC32.value)?;
    port.write_newline()?;

    labelled(port, DEC32_AS_HEX)?;
    port.write_hex32(DEC32.value)?;
    port.write_newline()?;

    labelled(port, BIN8.label)?;
    port.write_bin8(BIN8.value)?;
    port.write_newline()?;

    labelled(port, BIN16.label)?;
    port.write_bin16(BIN16.value)?;
    port.write_newline()?;

    labelled(port, BIN32.label)?;
    port.write_bin32(BIN32.value)?;
    port.write_newline()?;

    labelled(port, BOOL)?;
    port.write_bool(true)?;
    port.write_byte(b' ')?;
    port.write_bool(false)?;
    port.write_newline()?;

    labelled(port, SIGNED.label)?;
    port.write_signed_decimal(SIGNED.value)?;
    port.write_newline()?;

    port.write_bytes(DONE.as_bytes())?;
    port.write_newline()?;

    port.flush()
}

/// Prompts for a key and echoes its code back as 16 bit hex on a line of its own.
pub fn echo<S: SerialReadWrite>(port: &mut SerialPort<S>) -> Result<(), IoError<S>> {
    let key = port.prompt_and_read(PROMPT)?;

    port.write_newline()?;
    port.write_hex16(key.into())?;
    port.write_newline()?;
    port.flush()?;

    Ok(())
}
