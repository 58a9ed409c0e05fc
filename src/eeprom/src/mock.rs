//! Simulated AT24C256 on an I2C bus, for host tests.
//!
//! Models what the driver has to get right: writes that run past the end of a
//! page wrap back to the start of that page, the device ignores its address for
//! a few polls after every write, and reads auto-increment across pages.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};

use crate::{BASE_ADDRESS, CAPACITY, PAGE_SIZE};

const BLANK: u8 = 0xFF;
const DEFAULT_BUSY_POLLS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Nack,
    ArbitrationLoss,
}

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockError::ArbitrationLoss => ErrorKind::ArbitrationLoss,
        }
    }
}

/// One bus write that carried data, as the device received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWrite {
    pub address: u16,
    pub data: Vec<u8>,
}

pub struct MockEeprom {
    memory: Vec<u8>,
    address: u8,
    pointer: usize,
    busy_polls: u32,
    busy_remaining: u32,
    failing_transfers: u32,
    other_devices: Vec<u8>,
    /// Every data carrying write, in order
    pub writes: Vec<PageWrite>,
    /// Every transaction attempted on the bus, whatever the address or outcome
    pub transactions: usize,
}

impl Default for MockEeprom {
    fn default() -> Self {
        MockEeprom::new()
    }
}

impl MockEeprom {
    /// Blank device at 0x50
    pub fn new() -> Self {
        MockEeprom {
            memory: vec![BLANK; CAPACITY],
            address: BASE_ADDRESS,
            pointer: 0,
            busy_polls: DEFAULT_BUSY_POLLS,
            busy_remaining: 0,
            failing_transfers: 0,
            other_devices: Vec::new(),
            writes: Vec::new(),
            transactions: 0,
        }
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Number of polls refused after each write cycle starts
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Another device that acknowledges on the same bus
    pub fn with_device(mut self, address: u8) -> Self {
        self.other_devices.push(address);
        self
    }

    /// The first write cycle never completes
    pub fn never_ready(self) -> Self {
        self.with_busy_polls(u32::MAX)
    }

    /// The next `count` data transfers fail with an arbitration loss
    pub fn fail_next_transfers(mut self, count: u32) -> Self {
        self.failing_transfers = count;
        self
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    pub fn is_busy(&self) -> bool {
        self.busy_remaining > 0
    }

    fn latch_write(&mut self, bytes: &[u8]) -> bool {
        match bytes {
            [] => false,
            [high] => {
                self.pointer = ((*high as usize) << 8 | (self.pointer & 0xFF)) % CAPACITY;
                false
            }
            [high, low, data @ ..] => {
                self.pointer = u16::from_be_bytes([*high, *low]) as usize % CAPACITY;
                if data.is_empty() {
                    return false;
                }

                // the page latch wraps, it never carries into the next page
                let page_start = self.pointer - self.pointer % PAGE_SIZE;
                for (i, byte) in data.iter().enumerate() {
                    let offset = (self.pointer % PAGE_SIZE + i) % PAGE_SIZE;
                    self.memory[page_start + offset] = *byte;
                }
                self.writes.push(PageWrite {
                    address: self.pointer as u16,
                    data: data.to_vec(),
                });
                true
            }
        }
    }

    fn sequential_read(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.memory[self.pointer];
            self.pointer = (self.pointer + 1) % CAPACITY;
        }
    }
}

impl ErrorType for MockEeprom {
    type Error = MockError;
}

impl embedded_hal::i2c::I2c<SevenBitAddress> for MockEeprom {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;

        if address != self.address {
            if !self.other_devices.contains(&address) {
                return Err(MockError::Nack);
            }
            for operation in operations.iter_mut() {
                if let Operation::Read(buffer) = operation {
                    buffer.fill(0);
                }
            }
            return Ok(());
        }

        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return Err(MockError::Nack);
        }

        let ready_poll = matches!(&*operations, [Operation::Write(bytes)] if bytes.len() <= 1);
        if !ready_poll && self.failing_transfers > 0 {
            self.failing_transfers -= 1;
            return Err(MockError::ArbitrationLoss);
        }

        let mut write_cycle = false;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => write_cycle |= self.latch_write(bytes),
                Operation::Read(buffer) => self.sequential_read(buffer),
            }
        }

        if write_cycle {
            self.busy_remaining = self.busy_polls;
        }
        Ok(())
    }
}

/// Records how long the driver asked to wait instead of waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub elapsed_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
