// isosplice/src/iso/volume_descriptor.rs
use crate::error::{Error, Result};
use crate::iso::dir_record::DirRecord;
use crate::iso::endian::Endian;
use crate::iso::image::IsoImage;
use crate::utils::sector_to_byte;

pub const LBA_PVD: u32 = 16;
pub const ISO_VOLUME_DESCRIPTOR_PRIMARY: u8 = 1;
pub const ISO_ID: &[u8] = b"CD001";
pub const PVD_TOTAL_SECTORS_OFFSET: usize = 80;
pub const PVD_PATH_TABLE_SIZE_OFFSET: usize = 132;
pub const PVD_PATH_TABLE_LBA_OFFSET: usize = 140;
pub const PVD_ROOT_DIR_RECORD_OFFSET: usize = 156;

/// Number of path-table pointer slots in the primary descriptor.
pub const PATH_TABLE_SLOTS: usize = 4;
/// The one slot whose pointer and entries are read big-endian.
pub const BIG_ENDIAN_PATH_TABLE_SLOT: usize = 2;

fn pvd_field(offset: usize) -> u64 {
    sector_to_byte(LBA_PVD) + offset as u64
}

/// One of the four path-table pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTableSlot {
    pub index: usize,
    pub lba: u32,
    pub endian: Endian,
}

impl PathTableSlot {
    /// Absolute offset of the pointer field inside the descriptor.
    pub fn pointer_offset(&self) -> u64 {
        pvd_field(PVD_PATH_TABLE_LBA_OFFSET + 4 * self.index)
    }
}

/// The fields of the primary volume descriptor the patcher reads and rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryVolumeDescriptor {
    pub total_sectors: u32,
    pub root: DirRecord,
    pub path_table_len: u32,
    pub path_tables: Vec<PathTableSlot>,
}

impl PrimaryVolumeDescriptor {
    /// Reads the descriptor at sector 16, rejecting images without one.
    pub fn read(image: &IsoImage) -> Result<Self> {
        let header = image
            .read_bytes(pvd_field(0), 1 + ISO_ID.len())
            .map_err(|_| Error::unsupported("image is too small to hold a primary volume descriptor"))?;
        if header[0] != ISO_VOLUME_DESCRIPTOR_PRIMARY || &header[1..] != ISO_ID {
            return Err(Error::unsupported(format!(
                "no primary volume descriptor (type 1, CD001) at sector {}",
                LBA_PVD
            )));
        }

        let total_sectors = image.read_both_endian_u32(pvd_field(PVD_TOTAL_SECTORS_OFFSET))?.0;
        let path_table_len = image.read_u32_le(pvd_field(PVD_PATH_TABLE_SIZE_OFFSET))?;

        let mut path_tables = Vec::with_capacity(PATH_TABLE_SLOTS);
        for index in 0..PATH_TABLE_SLOTS {
            let endian = if index == BIG_ENDIAN_PATH_TABLE_SLOT {
                Endian::Big
            } else {
                Endian::Little
            };
            let raw = image.read_u32_le(pvd_field(PVD_PATH_TABLE_LBA_OFFSET + 4 * index))?;
            // An unused slot is zero in either byte order.
            if raw != 0 {
                path_tables.push(PathTableSlot {
                    index,
                    lba: endian.decode(raw.to_le_bytes()),
                    endian,
                });
            }
        }

        Ok(Self {
            total_sectors,
            root: DirRecord::at(pvd_field(PVD_ROOT_DIR_RECORD_OFFSET)),
            path_table_len,
            path_tables,
        })
    }
}

pub fn update_total_sectors_in_pvd(image: &mut IsoImage, total_sectors: u32) -> Result<()> {
    image.write_both_endian_u32(pvd_field(PVD_TOTAL_SECTORS_OFFSET), total_sectors)
}

pub fn update_path_table_pointer(image: &mut IsoImage, slot: &PathTableSlot, lba: u32) -> Result<()> {
    image.write_u32(slot.pointer_offset(), slot.endian, lba)
}
