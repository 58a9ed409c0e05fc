use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

/// Failures surfaced by the EEPROM driver, `E` is the I2C bus error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    #[error("EEPROM did not acknowledge the transfer")]
    Nack,

    #[error("EEPROM still busy after {attempts} ready polls")]
    Timeout { attempts: u32 },

    #[error("I2C bus error: {0:?}")]
    Bus(E),

    #[error("raw write of {len} bytes at {address:#06x} crosses a page boundary")]
    PageOverflow { address: u16, len: usize },

    #[error("access of {len} bytes at {address:#06x} runs past the end of the device")]
    OutOfRange { address: u16, len: usize },
}

impl<E: embedded_hal::i2c::Error> Error<E> {
    /// Sorts a transport error into a NACK or a generic bus error.
    pub fn from_bus(error: E) -> Self {
        match error.kind() {
            ErrorKind::NoAcknowledge(_) => Error::Nack,
            _ => Error::Bus(error),
        }
    }
}
