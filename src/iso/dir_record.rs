// isosplice/src/iso/dir_record.rs
use crate::error::Result;
use crate::iso::image::IsoImage;
use crate::utils::{ISO_SECTOR_SIZE, sector_to_byte, sectors_for_bytes};

const DR_LBA_OFFSET: u64 = 2;
const DR_DATA_LENGTH_OFFSET: u64 = 10;
const DR_FLAGS_OFFSET: u64 = 25;
const DR_NAME_LEN_OFFSET: u64 = 32;
const DR_NAME_OFFSET: u64 = 33;

pub const FLAG_DIRECTORY: u8 = 0x02;

/// Location and byte length of a file or directory's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub lba: u32,
    pub length: u32,
}

impl Extent {
    pub fn sectors(&self) -> u32 {
        sectors_for_bytes(self.length)
    }
}

/// A directory record addressed by its absolute byte offset in the image.
///
/// The accessor holds no bytes itself, so it stays valid across writes to
/// other parts of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirRecord {
    offset: u64,
}

impl DirRecord {
    pub fn at(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn lba(&self, image: &IsoImage) -> Result<u32> {
        image.read_u32_le(self.offset + DR_LBA_OFFSET)
    }

    pub fn data_length(&self, image: &IsoImage) -> Result<u32> {
        image.read_u32_le(self.offset + DR_DATA_LENGTH_OFFSET)
    }

    pub fn extent(&self, image: &IsoImage) -> Result<Extent> {
        Ok(Extent {
            lba: self.lba(image)?,
            length: self.data_length(image)?,
        })
    }

    pub fn flags(&self, image: &IsoImage) -> Result<u8> {
        image.read_u8(self.offset + DR_FLAGS_OFFSET)
    }

    pub fn is_directory(&self, image: &IsoImage) -> Result<bool> {
        Ok(self.flags(image)? & FLAG_DIRECTORY != 0)
    }

    pub fn raw_name<'a>(&self, image: &'a IsoImage) -> Result<&'a [u8]> {
        let name_len = image.read_u8(self.offset + DR_NAME_LEN_OFFSET)?;
        image.read_bytes(self.offset + DR_NAME_OFFSET, name_len as usize)
    }

    /// `.` and `..` are stored as the single bytes 0x00 and 0x01.
    pub fn is_self_or_parent(&self, image: &IsoImage) -> Result<bool> {
        Ok(matches!(self.raw_name(image)?, [0] | [1]))
    }

    /// File identifier with any `;N` version suffix removed.
    pub fn name(&self, image: &IsoImage) -> Result<String> {
        let mut raw = self.raw_name(image)?;
        if raw.len() > 2 && raw[raw.len() - 2] == b';' {
            raw = &raw[..raw.len() - 2];
        }
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Rewrites both copies of the extent LBA.
    pub fn set_lba(&self, image: &mut IsoImage, lba: u32) -> Result<()> {
        image.write_both_endian_u32(self.offset + DR_LBA_OFFSET, lba)
    }

    /// Rewrites both copies of the data length.
    pub fn set_data_length(&self, image: &mut IsoImage, length: u32) -> Result<()> {
        image.write_both_endian_u32(self.offset + DR_DATA_LENGTH_OFFSET, length)
    }
}

/// Walks the records of one directory extent in on-disc order.
///
/// A zero length byte ends the current sector; a sector that starts past
/// the end of the image ends the walk.
#[derive(Debug)]
pub struct RecordCursor {
    extent: Extent,
    sector: u32,
    pos: u64,
}

impl RecordCursor {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            sector: 0,
            pos: 0,
        }
    }

    pub fn next_record(&mut self, image: &IsoImage) -> Result<Option<DirRecord>> {
        let sectors = self.extent.sectors();
        while self.sector < sectors {
            let sector_start = sector_to_byte(self.extent.lba) + sector_to_byte(self.sector);
            if sector_start >= image.len() {
                break;
            }

            let offset = sector_start + self.pos;
            if self.pos < ISO_SECTOR_SIZE as u64 && offset < image.len() {
                let record_len = image.read_u8(offset)?;
                if record_len != 0 {
                    self.pos += record_len as u64;
                    return Ok(Some(DirRecord::at(offset)));
                }
            }

            self.sector += 1;
            self.pos = 0;
        }
        self.sector = sectors;
        Ok(None)
    }
}
