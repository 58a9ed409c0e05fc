use rtt_target::rprintln;
use util::{additive_checksum, copy_nul_padded, nul_terminated_len, str_from_utf8};

/// Marks a record that was written by `Settings::save`. Bump it whenever the
/// layout below changes so old records read back as invalid.
pub const MAGIC_CODE: u16 = 0xA55A;

pub const IDENTIFIER_LEN: usize = 32;

// big-endian layout: calibration | magic | identifier | level | checksum
const CALIBRATION_OFFSET: usize = 0;
const MAGIC_OFFSET: usize = 4;
const IDENTIFIER_OFFSET: usize = 6;
const LEVEL_OFFSET: usize = IDENTIFIER_OFFSET + IDENTIFIER_LEN;
const CHECKSUM_OFFSET: usize = LEVEL_OFFSET + 1;

pub const RECORD_SIZE: usize = CHECKSUM_OFFSET + 1;

const DEFAULT_IDENTIFIER: &str = "MyWifi";
const DEFAULT_LEVEL: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsRecord {
    /// Signed calibration offset, e.g. a motor position correction
    pub calibration: i32,
    pub magic: u16,
    /// NUL padded text, such as a network name
    pub identifier: [u8; IDENTIFIER_LEN],
    /// 0-100
    pub level: u8,
    pub checksum: u8,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        SettingsRecord::defaults()
    }
}

impl SettingsRecord {
    /// Record written to blank or corrupt storage
    pub fn defaults() -> Self {
        let mut record = SettingsRecord {
            calibration: 0,
            magic: MAGIC_CODE,
            identifier: [b'\0'; IDENTIFIER_LEN],
            level: DEFAULT_LEVEL,
            checksum: 0,
        };
        record.set_identifier(DEFAULT_IDENTIFIER);
        record.checksum = record.compute_checksum();
        record
    }

    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut calibration = [0u8; 4];
        calibration.copy_from_slice(&bytes[CALIBRATION_OFFSET..MAGIC_OFFSET]);
        let mut identifier = [0u8; IDENTIFIER_LEN];
        identifier.copy_from_slice(&bytes[IDENTIFIER_OFFSET..LEVEL_OFFSET]);

        SettingsRecord {
            calibration: i32::from_be_bytes(calibration),
            magic: u16::from_be_bytes([bytes[MAGIC_OFFSET], bytes[MAGIC_OFFSET + 1]]),
            identifier,
            level: bytes[LEVEL_OFFSET],
            checksum: bytes[CHECKSUM_OFFSET],
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[CALIBRATION_OFFSET..MAGIC_OFFSET].copy_from_slice(&self.calibration.to_be_bytes());
        bytes[MAGIC_OFFSET..IDENTIFIER_OFFSET].copy_from_slice(&self.magic.to_be_bytes());
        bytes[IDENTIFIER_OFFSET..LEVEL_OFFSET].copy_from_slice(&self.identifier);
        bytes[LEVEL_OFFSET] = self.level;
        bytes[CHECKSUM_OFFSET] = self.checksum;
        bytes
    }

    /// Sum of every encoded byte before the checksum, mod 256
    pub fn compute_checksum(&self) -> u8 {
        additive_checksum(&self.encode()[..CHECKSUM_OFFSET])
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC_CODE && self.checksum == self.compute_checksum()
    }

    /// Identifier bytes up to the first NUL
    pub fn identifier(&self) -> &[u8] {
        &self.identifier[..nul_terminated_len(&self.identifier)]
    }

    /// Longer text is cut at `IDENTIFIER_LEN` bytes
    pub fn set_identifier(&mut self, text: &str) {
        copy_nul_padded(&mut self.identifier, text.as_bytes());
    }

    pub fn log_dump(&self) {
        let mut identifier = self.identifier;
        let len = nul_terminated_len(&identifier);
        let text = str_from_utf8(&mut identifier[..len]).unwrap_or("");

        rprintln!("  Magic: 0x{:04X}", self.magic);
        rprintln!("  Calibration: {}", self.calibration);
        rprintln!("  Identifier: {}", text);
        rprintln!("  Level: {}", self.level);
        rprintln!("  Checksum: {}", self.checksum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size() {
        assert_eq!(40, RECORD_SIZE);
    }

    #[test]
    fn test_default_layout() {
        let bytes = SettingsRecord::defaults().encode();

        assert_eq!([0, 0, 0, 0], bytes[0..4]);
        assert_eq!([0xA5, 0x5A], bytes[4..6]);
        assert_eq!(b"MyWifi", &bytes[6..12]);
        assert!(bytes[12..38].iter().all(|b| *b == 0));
        assert_eq!(50, bytes[38]);
        // 0xA5 + 0x5A + "MyWifi" + 50 = 902
        assert_eq!(0x86, bytes[39]);
    }

    #[test]
    fn test_calibration_is_big_endian() {
        let mut record = SettingsRecord::defaults();
        record.calibration = -2;
        assert_eq!([0xFF, 0xFF, 0xFF, 0xFE], record.encode()[0..4]);

        record.calibration = 0x01020304;
        assert_eq!([1, 2, 3, 4], record.encode()[0..4]);
    }

    #[test]
    fn test_decode_reads_encoded_fields() {
        let mut record = SettingsRecord::defaults();
        record.calibration = -12345;
        record.level = 99;
        record.set_identifier("lab-bench");
        record.checksum = record.compute_checksum();

        let decoded = SettingsRecord::decode(&record.encode());
        assert_eq!(record, decoded);
        assert_eq!(b"lab-bench", decoded.identifier());
        assert_eq!(true, decoded.is_valid());
    }

    #[test]
    fn test_blank_storage_is_invalid() {
        let blank = SettingsRecord::decode(&[0xFF; RECORD_SIZE]);
        assert_eq!(false, blank.is_valid());

        let zeroed = SettingsRecord::decode(&[0; RECORD_SIZE]);
        assert_eq!(false, zeroed.is_valid());
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut bytes = SettingsRecord::defaults().encode();
        bytes[20] ^= 0x01;
        assert_eq!(false, SettingsRecord::decode(&bytes).is_valid());
    }

    #[test]
    fn test_identifier_truncates() {
        let mut record = SettingsRecord::defaults();
        record.set_identifier("0123456789abcdef0123456789abcdefXYZ");
        assert_eq!(IDENTIFIER_LEN, record.identifier().len());
        assert_eq!(b'f', record.identifier[IDENTIFIER_LEN - 1]);
    }
}
