// isosplice/src/iso/image.rs
//! The whole disc image held in memory, addressed by absolute byte offset.

use crate::error::{Error, Result};
use crate::iso::endian::{BothEndianU32, Endian};
use crate::utils::{ISO_SECTOR_SIZE, sector_to_byte, sectors_for_bytes};

/// An ISO9660 image as one owned, resizable byte buffer.
///
/// All reads and writes are bounds-checked; an access past the end of the
/// buffer means the image does not describe itself consistently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsoImage {
    data: Vec<u8>,
}

impl IsoImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let start = usize::try_from(offset).ok();
        match start.and_then(|s| s.checked_add(len).map(|end| s..end)) {
            Some(range) if range.end <= self.data.len() => Ok(range),
            _ => Err(Error::unsupported(format!(
                "access of {} bytes at offset {:#x} runs past the end of the image ({} bytes)",
                len,
                offset,
                self.data.len()
            ))),
        }
    }

    pub fn read_bytes(&self, offset: u64, len: usize) -> Result<&[u8]> {
        let range = self.range(offset, len)?;
        Ok(&self.data[range])
    }

    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    fn read_array<const N: usize>(&self, offset: u64) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(offset, N)?);
        Ok(out)
    }

    pub fn read_u32(&self, offset: u64, endian: Endian) -> Result<u32> {
        Ok(endian.decode(self.read_array::<4>(offset)?))
    }

    pub fn read_u32_le(&self, offset: u64) -> Result<u32> {
        self.read_u32(offset, Endian::Little)
    }

    pub fn read_both_endian_u32(&self, offset: u64) -> Result<BothEndianU32> {
        Ok(BothEndianU32::from_bytes(self.read_array::<8>(offset)?))
    }

    pub fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let range = self.range(offset, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u32(&mut self, offset: u64, endian: Endian, value: u32) -> Result<()> {
        self.write_bytes(offset, &endian.encode(value))
    }

    /// Writes `value` little-endian at `offset` and big-endian at `offset + 4`.
    pub fn write_both_endian_u32(&mut self, offset: u64, value: u32) -> Result<()> {
        self.write_bytes(offset, &BothEndianU32(value).to_bytes())
    }

    /// Replaces the `old_sectors` sectors starting at `lba` with `payload`,
    /// zero-padded up to a sector boundary.
    ///
    /// An empty payload removes the old run without inserting anything.
    /// Returns the signed change in sector count.
    pub fn splice_sectors(&mut self, lba: u32, old_sectors: u32, payload: &[u8]) -> Result<i64> {
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            Error::unsupported(format!(
                "replacement of {} bytes exceeds the 4 GiB ISO9660 file limit",
                payload.len()
            ))
        })?;
        let new_sectors = sectors_for_bytes(payload_len);

        let start = sector_to_byte(lba);
        let old_len = old_sectors as usize * ISO_SECTOR_SIZE;
        let old_range = self.range(start, old_len)?;

        let padding = new_sectors as usize * ISO_SECTOR_SIZE - payload.len();
        let replacement = payload
            .iter()
            .copied()
            .chain(std::iter::repeat_n(0u8, padding));
        self.data.splice(old_range, replacement);

        Ok(new_sectors as i64 - old_sectors as i64)
    }
}

/// Applies a signed sector delta to an LBA or sector count.
pub fn shift_lba(lba: u32, sector_delta: i64) -> Result<u32> {
    u32::try_from(lba as i64 + sector_delta).map_err(|_| {
        Error::unsupported(format!(
            "shifting LBA {} by {} sectors leaves the 32-bit range",
            lba, sector_delta
        ))
    })
}
