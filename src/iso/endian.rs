// isosplice/src/iso/endian.rs
//! ISO9660 stores most 32-bit fields twice: little-endian followed by
//! big-endian.

/// Reverses the byte order of a 32-bit value.
pub fn change_endian(value: u32) -> u32 {
    value.swap_bytes()
}

/// A 32-bit value stored in both byte orders (8 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BothEndianU32(pub u32);

impl BothEndianU32 {
    /// Decodes from the little-endian half, which readers treat as authoritative.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0..4].copy_from_slice(&self.0.to_le_bytes());
        out[4..8].copy_from_slice(&self.0.to_be_bytes());
        out
    }
}

/// Byte order of a single-endian field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Interprets four raw bytes in this byte order.
    pub fn decode(self, raw: [u8; 4]) -> u32 {
        let le = u32::from_le_bytes(raw);
        match self {
            Endian::Little => le,
            Endian::Big => change_endian(le),
        }
    }

    pub fn encode(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => change_endian(value).to_le_bytes(),
        }
    }
}
