#![no_std]
#![no_main]

use panic_halt as _;

use uart::{avr::Usart0, showcase, SerialPort};

#[avr_device::entry]
fn main() -> ! {
    let Some(peripherals) = avr_device::atmega328p::Peripherals::take() else {
        panic!("Peripherals already taken");
    };

    let mut port = SerialPort::new(Usart0::new(peripherals.USART0, uart::config::DEFAULT));

    // USART0 never reports an error and the port never times out.
    let _ = showcase::run(&mut port);

    loop {
        let _ = showcase::echo(&mut port);
    }
}
