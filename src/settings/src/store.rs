use eeprom::{Eeprom, MemoryAddress};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use rtt_target::rprintln;

use crate::record::{SettingsRecord, RECORD_SIZE};
use crate::{Error, SETTINGS_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored record was valid and is now the working copy
    Loaded,
    /// Storage was blank or corrupt, defaults were written back
    Recovered,
}

/// Owns the in-memory working copy of the settings record.
pub struct Settings {
    base_address: MemoryAddress,
    record: SettingsRecord,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings::with_base_address(SETTINGS_ADDRESS)
    }

    pub fn with_base_address(base_address: MemoryAddress) -> Self {
        Settings {
            base_address,
            record: SettingsRecord::defaults(),
        }
    }

    pub fn base_address(&self) -> MemoryAddress {
        self.base_address
    }

    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut SettingsRecord {
        &mut self.record
    }

    /// Reads the stored record. A bad magic code or checksum means the storage
    /// was never written or got corrupted; both are repaired by writing defaults.
    pub fn load<I2C, D>(&mut self, eeprom: &mut Eeprom<I2C, D>) -> Result<LoadOutcome, Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let mut bytes = [0u8; RECORD_SIZE];
        eeprom.read_buffer(self.base_address, &mut bytes)?;
        let stored = SettingsRecord::decode(&bytes);

        if stored.is_valid() {
            self.record = stored;
            rprintln!("settings loaded");
            self.record.log_dump();
            return Ok(LoadOutcome::Loaded);
        }

        rprintln!("EEPROM blank or settings corrupt, loading defaults...");
        self.record = SettingsRecord::defaults();
        self.save(eeprom)?;
        Ok(LoadOutcome::Recovered)
    }

    /// Refreshes the checksum and writes the working copy back.
    pub fn save<I2C, D>(&mut self, eeprom: &mut Eeprom<I2C, D>) -> Result<(), Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        self.record.checksum = self.record.compute_checksum();
        eeprom.write_buffer(self.base_address, &self.record.encode())?;
        rprintln!("settings saved");
        Ok(())
    }

    pub fn log_dump(&self) {
        rprintln!("settings at 0x{:04X}:", self.base_address);
        self.record.log_dump();
    }
}
