use std::path::Path;

use tracing::info;

pub mod cli;
pub mod error;
pub mod iso;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::iso::{IsoImage, IsoPatcher, PatchOptions, PatchReport, ReplacedFile, Replacement, WriteMode};

use crate::utils::{read_file_from_path, write_image};

/// Replaces files inside the ISO image at `iso_path` and writes the result
/// back over it.
///
/// The image and every payload are read fully into memory first; nothing
/// is written unless all replacements succeed.
pub fn patch_iso_file(
    iso_path: &Path,
    replacements: &[Replacement],
    options: &PatchOptions,
) -> Result<PatchReport> {
    info!("loading image {}", iso_path.display());
    let image = IsoImage::new(read_file_from_path(iso_path)?);
    let mut patcher = IsoPatcher::new(image)?;

    for replacement in replacements {
        let payload = read_file_from_path(&replacement.source)?;
        patcher.replace(&replacement.image_path, &payload)?;
    }

    let (image, report) = patcher.finish()?;
    info!("writing image {}", iso_path.display());
    write_image(iso_path, image.as_bytes(), options.write_mode)?;
    Ok(report)
}
