#![cfg_attr(not(test), no_std)]

//! Settings record kept on the EEPROM, validated by a magic code and checksum.
//!
//! `Settings::load` runs once at start up and leaves a working copy in memory.
//! Changes are made to that copy and only reach the device on `Settings::save`.

mod error;
mod record;
mod store;

pub use error::Error;
pub use record::{SettingsRecord, IDENTIFIER_LEN, MAGIC_CODE, RECORD_SIZE};
pub use store::{LoadOutcome, Settings};

/// Where the record lives on the device
pub const SETTINGS_ADDRESS: eeprom::MemoryAddress = 0x0000;
