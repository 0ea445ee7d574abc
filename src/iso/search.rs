// isosplice/src/iso/search.rs
use tracing::debug;

use crate::error::{Error, Result};
use crate::iso::dir_record::{DirRecord, Extent, RecordCursor};
use crate::iso::image::IsoImage;

/// Nesting limit for directory walks. Well-formed images stay far below
/// it; a self-referencing directory on a damaged image hits it quickly.
pub const MAX_DIRECTORY_DEPTH: usize = 64;

pub(crate) fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DIRECTORY_DEPTH {
        return Err(Error::unsupported(format!(
            "directory hierarchy is nested deeper than {} levels",
            MAX_DIRECTORY_DEPTH
        )));
    }
    Ok(())
}

/// Finds the directory record of the file at `target`.
///
/// `target` must already be normalised (leading `/`, forward slashes).
/// Names are compared ASCII case-insensitively and the walk is depth-first,
/// so the first match in on-disc order wins. Directories are never matched.
pub fn find_record(image: &IsoImage, target: &str, root: Extent) -> Result<Option<DirRecord>> {
    search_dir(image, target, "", root, 0)
}

fn search_dir(
    image: &IsoImage,
    target: &str,
    path: &str,
    extent: Extent,
    depth: usize,
) -> Result<Option<DirRecord>> {
    check_depth(depth)?;

    let mut cursor = RecordCursor::new(extent);
    while let Some(record) = cursor.next_record(image)? {
        if record.is_self_or_parent(image)? {
            continue;
        }

        let candidate = format!("{}/{}", path, record.name(image)?);
        if record.is_directory(image)? {
            let found = search_dir(image, target, &candidate, record.extent(image)?, depth + 1)?;
            if found.is_some() {
                return Ok(found);
            }
        } else if candidate.eq_ignore_ascii_case(target) {
            debug!(path = %candidate, offset = record.offset(), "found directory record");
            return Ok(Some(record));
        }
    }

    Ok(None)
}
