use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    #[error("settings storage failed: {0}")]
    Storage(#[from] eeprom::Error<E>),
}
