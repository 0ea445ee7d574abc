// isosplice/src/iso/replace.rs
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::iso::dir_record::{DirRecord, Extent};
use crate::iso::image::{IsoImage, shift_lba};
use crate::iso::path_table::update_path_tables;
use crate::iso::search::find_record;
use crate::iso::toc::update_toc;
use crate::iso::volume_descriptor::{LBA_PVD, PrimaryVolumeDescriptor, update_total_sectors_in_pvd};
use crate::utils::{ISO_SECTOR_SIZE, normalize_image_path, sector_to_byte, sectors_for_bytes};

/// Outcome of one file replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacedFile {
    /// Normalised path inside the image.
    pub path: String,
    pub lba: u32,
    pub old_size: u32,
    pub new_size: u32,
    pub sector_delta: i64,
    pub payload_crc32: u32,
}

/// Summary of a whole patch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchReport {
    /// Final image length minus original image length, in bytes.
    pub byte_delta: i64,
    /// Set when the image length changed, so a cuesheet next to it may be stale.
    pub needs_cuesheet_update: bool,
    pub files: Vec<ReplacedFile>,
    pub image_crc32: u32,
}

/// Applies file replacements to an in-memory image, one after another.
///
/// Each replacement resolves its path against the image as left by the
/// previous one, so earlier LBA shifts are visible to later lookups.
///
/// A replacement that fails after its sectors were spliced leaves the image
/// half-patched; the patcher is then poisoned and rejects further calls to
/// [`replace`](Self::replace) and [`finish`](Self::finish).
#[derive(Debug)]
pub struct IsoPatcher {
    image: IsoImage,
    original_len: u64,
    replaced: Vec<ReplacedFile>,
    poisoned: bool,
}

impl IsoPatcher {
    pub fn new(image: IsoImage) -> Result<Self> {
        let pvd = PrimaryVolumeDescriptor::read(&image)?;
        debug!(
            total_sectors = pvd.total_sectors,
            path_tables = pvd.path_tables.len(),
            "read primary volume descriptor"
        );
        Ok(Self {
            original_len: image.len(),
            image,
            replaced: Vec::new(),
            poisoned: false,
        })
    }

    pub fn image(&self) -> &IsoImage {
        &self.image
    }

    /// Bytes gained (positive) or lost (negative) so far.
    pub fn byte_delta(&self) -> i64 {
        self.image.len() as i64 - self.original_len as i64
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            return Err(Error::unsupported(
                "an earlier replacement failed part-way and left the image inconsistent",
            ));
        }
        Ok(())
    }

    /// Replaces the contents of the file at `path` with `payload`.
    pub fn replace(&mut self, path: &str, payload: &[u8]) -> Result<&ReplacedFile> {
        self.check_poisoned()?;
        let target = normalize_image_path(path);
        info!("replacing file {}", target);

        let new_size = u32::try_from(payload.len()).map_err(|_| {
            Error::unsupported(format!(
                "replacement for {} is {} bytes, over the 4 GiB ISO9660 file limit",
                target,
                payload.len()
            ))
        })?;

        let pvd = PrimaryVolumeDescriptor::read(&self.image)?;
        let root = pvd.root.extent(&self.image)?;
        let record = find_record(&self.image, &target, root)?
            .ok_or_else(|| Error::TargetNotFound { path: target.clone() })?;

        let old = record.extent(&self.image)?;
        if old.lba <= LBA_PVD {
            return Err(Error::unsupported(format!(
                "{} has LBA {}, which overlaps the system area or volume descriptors",
                target, old.lba
            )));
        }
        let old_sectors = old.sectors();

        let sector_delta = self.image.splice_sectors(old.lba, old_sectors, payload)?;
        debug_assert_eq!(sector_delta, sectors_for_bytes(new_size) as i64 - old_sectors as i64);
        if let Err(e) = self.propagate(&pvd, record, old, new_size, sector_delta) {
            self.poisoned = true;
            return Err(e);
        }

        self.replaced.push(ReplacedFile {
            path: target,
            lba: old.lba,
            old_size: old.length,
            new_size,
            sector_delta,
            payload_crc32: crc32fast::hash(payload),
        });
        Ok(&self.replaced[self.replaced.len() - 1])
    }

    /// Rewrites every field that depends on the spliced file's size and
    /// position.
    fn propagate(
        &mut self,
        pvd: &PrimaryVolumeDescriptor,
        record: DirRecord,
        old: Extent,
        new_size: u32,
        sector_delta: i64,
    ) -> Result<()> {
        let record = relocate(record, old.lba, old.sectors(), sector_delta)?;

        if new_size != old.length {
            info!("updating file size");
            record.set_data_length(&mut self.image, new_size)?;
        }

        if sector_delta != 0 {
            info!("updating primary volume descriptor");
            let total_sectors = shift_lba(pvd.total_sectors, sector_delta)?;
            update_total_sectors_in_pvd(&mut self.image, total_sectors)?;
            let mut root = pvd.root.extent(&self.image)?;
            if root.lba > old.lba {
                root.lba = shift_lba(root.lba, sector_delta)?;
                pvd.root.set_lba(&mut self.image, root.lba)?;
            }

            info!("updating path tables");
            update_path_tables(
                &mut self.image,
                &pvd.path_tables,
                pvd.path_table_len,
                old.lba,
                sector_delta,
            )?;

            info!("updating entire TOCs");
            let shifted = update_toc(&mut self.image, root, record.offset(), old.lba, sector_delta)?;
            debug!(shifted, "directory records shifted");
        }
        Ok(())
    }

    /// Hands back the patched image and the run's report.
    pub fn finish(self) -> Result<(IsoImage, PatchReport)> {
        self.check_poisoned()?;
        let byte_delta = self.byte_delta();
        let report = PatchReport {
            byte_delta,
            needs_cuesheet_update: byte_delta != 0,
            files: self.replaced,
            image_crc32: crc32fast::hash(self.image.as_bytes()),
        };
        Ok((self.image, report))
    }
}

/// Where `record` lives after the splice: records stored past the replaced
/// run moved along with it.
fn relocate(record: DirRecord, lba: u32, old_sectors: u32, sector_delta: i64) -> Result<DirRecord> {
    let run_start = sector_to_byte(lba);
    let run_end = run_start + sector_to_byte(old_sectors);
    let offset = record.offset();

    if offset < run_start {
        return Ok(record);
    }
    if offset < run_end {
        return Err(Error::unsupported(format!(
            "directory record at {:#x} lies inside the data it describes",
            offset
        )));
    }
    let moved = offset as i64 + sector_delta * ISO_SECTOR_SIZE as i64;
    Ok(DirRecord::at(moved as u64))
}
