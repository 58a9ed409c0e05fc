#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! Blocking driver for the AT24C256 I2C EEPROM.
//!
//! The AT24C256 holds 32,768 bytes organised as 512 pages of 64 bytes. Writes
//! are split so that a single bus write never crosses a page, since the device
//! wraps inside the page instead of moving on to the next one.

mod driver;
mod error;
pub mod scanner;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use driver::{Eeprom, PageChunks};
pub use error::Error;
pub use scanner::{is_reserved, log_scan, scan, BusScan, Presence, ScanEntry};

/// Bytes per write page
pub const PAGE_SIZE: usize = 64;

/// Total bytes on the device
pub const CAPACITY: usize = 32_768;

/// Fixed `1010` prefix of the 7-bit device address, A2..A0 are strapped on the board
pub const BASE_ADDRESS: u8 = 0x50;

const DEFAULT_POLL_INTERVAL_US: u32 = 100;
const DEFAULT_POLL_ATTEMPTS: u32 = 200; // 20ms, four times the 5ms write cycle

/// Linear offset into the EEPROM, sent big-endian on the wire.
pub type MemoryAddress = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// State of the A2 A1 A0 strap pins, e.g. `0b101`
    pub address_pins: u8,
    /// Delay between ready polls while a write cycle is in progress
    pub poll_interval_us: u32,
    /// Ready polls before giving up with `Error::Timeout`
    pub poll_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address_pins: 0,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn device_address(&self) -> u8 {
        BASE_ADDRESS | (self.address_pins & 0x07)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_address() {
        assert_eq!(0x50, Config::default().device_address());

        let config = Config {
            address_pins: 0b101,
            ..Config::default()
        };
        assert_eq!(0x55, config.device_address());

        let config = Config {
            address_pins: 0xFF,
            ..Config::default()
        };
        assert_eq!(0x57, config.device_address());
    }
}
