// isosplice/src/iso/path_table.rs
//! Shifting path-table entries that point past an edit.
//!
//! Entry layout: name length (1), extended attribute length (1), directory
//! LBA (4, in the table's byte order), parent number (2), name, and one pad
//! byte when the name length is odd.

use tracing::debug;

use crate::error::Result;
use crate::iso::image::{IsoImage, shift_lba};
use crate::iso::volume_descriptor::{PathTableSlot, update_path_table_pointer};
use crate::utils::sector_to_byte;

const PT_LBA_OFFSET: u64 = 2;
const PT_HEADER_LEN: u64 = 8;

/// Adds `sector_delta` to every entry of one table whose LBA is strictly
/// greater than `old_lba`. `table_lba` is where the table currently lives.
///
/// Returns the number of entries rewritten.
pub fn shift_path_table(
    image: &mut IsoImage,
    slot: &PathTableSlot,
    table_lba: u32,
    table_len: u32,
    old_lba: u32,
    sector_delta: i64,
) -> Result<usize> {
    let base = sector_to_byte(table_lba);
    let mut shifted = 0;
    let mut pos: u64 = 0;

    while pos < table_len as u64 {
        let entry = base + pos;
        if entry >= image.len() {
            break;
        }
        let name_len = image.read_u8(entry)? as u64;
        if name_len == 0 {
            break;
        }

        let lba = image.read_u32(entry + PT_LBA_OFFSET, slot.endian)?;
        if lba > old_lba {
            let new_lba = shift_lba(lba, sector_delta)?;
            image.write_u32(entry + PT_LBA_OFFSET, slot.endian, new_lba)?;
            shifted += 1;
        }

        pos += PT_HEADER_LEN + name_len + (name_len & 1);
    }

    Ok(shifted)
}

/// Walks every used path-table slot and shifts entries past `old_lba`.
///
/// A table that itself sat after the edit has already been moved by the
/// splice; its pointer is shifted and the table is read at the new spot.
pub fn update_path_tables(
    image: &mut IsoImage,
    slots: &[PathTableSlot],
    table_len: u32,
    old_lba: u32,
    sector_delta: i64,
) -> Result<()> {
    for slot in slots {
        let mut table_lba = slot.lba;
        if table_lba > old_lba {
            table_lba = shift_lba(table_lba, sector_delta)?;
            update_path_table_pointer(image, slot, table_lba)?;
        }
        let shifted = shift_path_table(image, slot, table_lba, table_len, old_lba, sector_delta)?;
        debug!(slot = slot.index, table_lba, shifted, "updated path table");
    }
    Ok(())
}
