// isosplice/src/iso/toc.rs
use tracing::debug;

use crate::error::Result;
use crate::iso::dir_record::{DirRecord, Extent, RecordCursor};
use crate::iso::image::{IsoImage, shift_lba};
use crate::iso::search::check_depth;

/// The edit being propagated through the directory hierarchy.
#[derive(Debug, Clone, Copy)]
struct Shift {
    old_lba: u32,
    found: u64,
    sector_delta: i64,
}

impl Shift {
    /// Records sharing the replaced file's LBA (zero-length files) only move
    /// when they come after the replaced record.
    fn applies_to(&self, record: &DirRecord, lba: u32) -> bool {
        lba > self.old_lba || (lba == self.old_lba && record.offset() > self.found)
    }
}

/// Shifts the LBA of every directory record reachable from `root`,
/// `.` and `..` included, that points past the replaced file.
///
/// `root` and every directory extent are read where their sectors lie in
/// the already spliced image. `found` is the replaced file's record offset
/// in that same image. Returns the number of records rewritten.
pub fn update_toc(
    image: &mut IsoImage,
    root: Extent,
    found: u64,
    old_lba: u32,
    sector_delta: i64,
) -> Result<usize> {
    let shift = Shift {
        old_lba,
        found,
        sector_delta,
    };
    update_dir(image, root, &shift, 0)
}

fn update_dir(image: &mut IsoImage, extent: Extent, shift: &Shift, depth: usize) -> Result<usize> {
    check_depth(depth)?;

    let mut updated = 0;
    let mut cursor = RecordCursor::new(extent);
    while let Some(record) = cursor.next_record(image)? {
        let mut lba = record.lba(image)?;
        if shift.applies_to(&record, lba) {
            lba = shift_lba(lba, shift.sector_delta)?;
            record.set_lba(image, lba)?;
            updated += 1;
        }

        if !record.is_self_or_parent(image)? && record.is_directory(image)? {
            let length = record.data_length(image)?;
            updated += update_dir(image, Extent { lba, length }, shift, depth + 1)?;
        }
    }

    if updated > 0 {
        debug!(lba = extent.lba, updated, "shifted directory records");
    }
    Ok(updated)
}
