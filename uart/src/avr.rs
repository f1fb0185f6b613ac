//! USART0 of the ATmega328P.

use core::convert::Infallible;

use avr_device::atmega328p::USART0;

use super::{config::BaudRate, log_debug, SerialRead, SerialWrite};

/// USART0 configured for asynchronous 8N1.
///
/// Owning the `USART0` peripheral is what makes this the only driver of the hardware, and the
/// registers are programmed once, here, when it is moved in.
pub struct Usart0 {
    usart: USART0,
}

impl Usart0 {
    pub fn new(usart: USART0, baud_rate: BaudRate) -> Self {
        usart.ubrr0.write(|w| unsafe { w.bits(baud_rate.ubrr) });
        usart.ucsr0a.write(|w| w.u2x0().bit(baud_rate.u2x));
        usart
            .ucsr0c
            .write(|w| w.umsel0().usart_async().ucsz0().chr8().usbs0().stop1().upm0().disabled());
        usart.ucsr0b.write(|w| w.txen0().set_bit().rxen0().set_bit());

        log_debug!("USART0 divisor {}", baud_rate.ubrr);

        Self { usart }
    }

    pub fn free(self) -> USART0 {
        self.usart
    }
}

impl SerialRead<u8> for Usart0 {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        if self.usart.ucsr0a.read().rxc0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }

        Ok(self.usart.udr0.read().bits())
    }
}

impl SerialWrite<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().udre0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }

        self.usart.udr0.write(|w| unsafe { w.bits(word) });
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().udre0().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }

        Ok(())
    }
}
