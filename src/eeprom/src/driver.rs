use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use rtt_target::rprintln;

use crate::scanner::{self, BusScan};
use crate::{Config, Error, MemoryAddress, CAPACITY, PAGE_SIZE};

// a lone byte is taken as the high half of an address pointer, no write cycle starts
const READY_PROBE: [u8; 1] = [0];

/// Splits `address..address + len` into pieces that each stay inside one page.
///
/// Yields the device address of each piece and its range within the source data.
pub struct PageChunks {
    address: usize,
    offset: usize,
    len: usize,
}

impl PageChunks {
    pub fn new(address: MemoryAddress, len: usize) -> Self {
        PageChunks {
            address: address as usize,
            offset: 0,
            len,
        }
    }
}

impl Iterator for PageChunks {
    type Item = (MemoryAddress, core::ops::Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.len - self.offset;
        if remaining == 0 {
            return None;
        }

        // e.g. address 60 leaves 64 - 60 = 4 bytes in the page
        let space_in_page = PAGE_SIZE - (self.address % PAGE_SIZE);
        let chunk_size = remaining.min(space_in_page);

        let chunk = (self.address as MemoryAddress, self.offset..self.offset + chunk_size);
        self.address += chunk_size;
        self.offset += chunk_size;
        Some(chunk)
    }
}

pub struct Eeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
}

impl<I2C, D> Eeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: Config) -> Self {
        Eeprom { i2c, delay, config }
    }

    /// Hands the bus and delay back, e.g. to share the bus with another driver.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device_address(&self) -> u8 {
        self.config.device_address()
    }

    /// Acknowledge polling. The device ignores its address while an internal
    /// write cycle (about 5ms) runs, so keep probing until it answers.
    pub fn wait_ready(&mut self) -> Result<(), Error<I2C::Error>> {
        let device_address = self.device_address();
        let attempts = self.config.poll_attempts.max(1);

        for _ in 0..attempts {
            match self.i2c.write(device_address, &READY_PROBE) {
                Ok(()) => return Ok(()),
                Err(error) => match error.kind() {
                    ErrorKind::NoAcknowledge(_) => {
                        self.delay.delay_us(self.config.poll_interval_us);
                    }
                    _ => return Err(Error::Bus(error)),
                },
            }
        }

        rprintln!("EEPROM not ready after {} polls", attempts);
        Err(Error::Timeout { attempts })
    }

    /// Sequential read. The device advances its pointer across pages on its
    /// own, so any length goes out as one write/repeated start/read transaction.
    pub fn read_buffer(
        &mut self,
        address: MemoryAddress,
        buffer: &mut [u8],
    ) -> Result<(), Error<I2C::Error>> {
        check_range(address, buffer.len())?;
        if buffer.is_empty() {
            return Ok(());
        }

        let device_address = self.device_address();
        self.i2c
            .write_read(device_address, &address.to_be_bytes(), buffer)
            .map_err(Error::from_bus)
    }

    /// Writes `data` into a single page and waits out the write cycle.
    ///
    /// `data` must fit between `address` and the end of its page; anything
    /// longer is rejected before the bus is touched.
    pub fn write_page_raw(
        &mut self,
        address: MemoryAddress,
        data: &[u8],
    ) -> Result<(), Error<I2C::Error>> {
        check_range(address, data.len())?;
        if (address as usize % PAGE_SIZE) + data.len() > PAGE_SIZE {
            return Err(Error::PageOverflow {
                address,
                len: data.len(),
            });
        }
        if data.is_empty() {
            return Ok(());
        }

        let mut buffer = [0u8; PAGE_SIZE + 2];
        buffer[..2].copy_from_slice(&address.to_be_bytes());
        buffer[2..data.len() + 2].copy_from_slice(data);

        let device_address = self.device_address();
        if let Err(error) = self.i2c.write(device_address, &buffer[..data.len() + 2]) {
            rprintln!("write error at {:#06x}: {:?}", address, error);
            return Err(Error::from_bus(error));
        }

        self.wait_ready()
    }

    /// Writes any length starting anywhere, one page write per touched page.
    pub fn write_buffer(
        &mut self,
        address: MemoryAddress,
        data: &[u8],
    ) -> Result<(), Error<I2C::Error>> {
        check_range(address, data.len())?;

        for (chunk_address, range) in PageChunks::new(address, data.len()) {
            self.write_page_raw(chunk_address, &data[range])?;
        }
        Ok(())
    }

    /// Like `write_buffer` but skips pages whose stored bytes already match.
    /// Returns the number of page writes issued.
    pub fn update_buffer(
        &mut self,
        address: MemoryAddress,
        data: &[u8],
    ) -> Result<usize, Error<I2C::Error>> {
        check_range(address, data.len())?;

        let mut page_writes = 0;
        let mut page = [0u8; PAGE_SIZE];
        for (chunk_address, range) in PageChunks::new(address, data.len()) {
            let chunk = &data[range];
            let stored = &mut page[..chunk.len()];
            self.read_buffer(chunk_address, stored)?;
            if *stored != *chunk {
                self.write_page_raw(chunk_address, chunk)?;
                page_writes += 1;
            }
        }
        Ok(page_writes)
    }

    pub fn read_byte(&mut self, address: MemoryAddress) -> Result<u8, Error<I2C::Error>> {
        let mut buffer = [0u8; 1];
        self.read_buffer(address, &mut buffer)?;
        Ok(buffer[0])
    }

    pub fn write_byte(&mut self, address: MemoryAddress, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_page_raw(address, &[value])
    }

    /// Only spends a write cycle when the stored value differs. Returns true if it wrote.
    pub fn update_byte(&mut self, address: MemoryAddress, value: u8) -> Result<bool, Error<I2C::Error>> {
        if self.read_byte(address)? == value {
            return Ok(false);
        }
        self.write_byte(address, value)?;
        Ok(true)
    }

    /// Probes every address on the bus this EEPROM sits on.
    pub fn scan_bus(&mut self) -> BusScan<'_, I2C> {
        scanner::scan(&mut self.i2c)
    }
}

fn check_range<E>(address: MemoryAddress, len: usize) -> Result<(), Error<E>> {
    if address as usize + len > CAPACITY {
        return Err(Error::OutOfRange { address, len });
    }
    Ok(())
}
