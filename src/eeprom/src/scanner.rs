//! I2C bus scan, reports which 7-bit addresses acknowledge.

use embedded_hal::i2c::I2c;
use rtt_target::rprint;

const ADDRESS_COUNT: u8 = 1 << 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// Reserved by the I2C protocol, never probed
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEntry {
    pub address: u8,
    pub status: Presence,
}

impl ScanEntry {
    pub fn present(&self) -> bool {
        self.status == Presence::Present
    }
}

/// Addresses 0x00-0x07 and 0x78-0x7F are reserved by the I2C protocol.
pub fn is_reserved(address: u8) -> bool {
    (address & 0x78) == 0 || (address & 0x78) == 0x78
}

/// Lazily probes addresses 0 to 127, one bus read per non reserved address.
pub struct BusScan<'a, I2C> {
    i2c: &'a mut I2C,
    next: u8,
}

pub fn scan<I2C: I2c>(i2c: &mut I2C) -> BusScan<'_, I2C> {
    BusScan { i2c, next: 0 }
}

impl<I2C: I2c> Iterator for BusScan<'_, I2C> {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<ScanEntry> {
        if self.next >= ADDRESS_COUNT {
            return None;
        }
        let address = self.next;
        self.next += 1;

        let status = if is_reserved(address) {
            Presence::Reserved
        } else {
            // only the acknowledge matters, the byte itself is thrown away
            let mut rx_data = [0u8; 1];
            match self.i2c.read(address, &mut rx_data) {
                Ok(()) => Presence::Present,
                Err(_) => Presence::Absent,
            }
        };

        Some(ScanEntry { address, status })
    }
}

/// Prints a scan as a 16 column table, `@` marks a device. Returns how many were found.
pub fn log_scan(entries: impl Iterator<Item = ScanEntry>) -> usize {
    rprint!("\nScanning I2C Bus...\n");
    rprint!("   0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F\n");

    let mut found = 0;
    for entry in entries {
        if entry.address % 16 == 0 {
            rprint!("{:02x} ", entry.address);
        }
        if entry.present() {
            found += 1;
            rprint!("@  ");
        } else {
            rprint!(".  ");
        }
        if entry.address % 16 == 15 {
            rprint!("\n");
        }
    }

    rprint!("Scan complete.\n");
    found
}
