// isosplice/src/utils.rs

pub const ISO_SECTOR_SIZE: usize = 2048;

use crate::error::{Error, Result};
use crate::iso::WriteMode;
use regex::Regex;
use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::Path,
    sync::LazyLock,
};
use tempfile::NamedTempFile;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\\/]+").unwrap());

/// Reads the entire file from a specified path and returns its content.
///
/// The handle is dropped before returning.
pub fn read_file_from_path(file_path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(file_path).map_err(|e| Error::from_io(file_path, e))?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|e| Error::from_io(file_path, e))?;
    Ok(content)
}

/// Writes the patched image over `path`.
pub fn write_image(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<()> {
    let io_err = |e| Error::from_io(path, e);
    match mode {
        WriteMode::Replace => {
            fs::remove_file(path).map_err(io_err)?;
            let mut file = File::create(path).map_err(io_err)?;
            file.write_all(bytes).map_err(io_err)?;
            file.flush().map_err(io_err)?;
        }
        WriteMode::Atomic => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut temp = NamedTempFile::new_in(dir).map_err(|e| Error::from_io(dir, e))?;
            // The temp file starts out owner-only; keep the image's mode.
            match fs::metadata(path) {
                Ok(metadata) => temp
                    .as_file()
                    .set_permissions(metadata.permissions())
                    .map_err(io_err)?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_err(e)),
            }
            temp.write_all(bytes).map_err(io_err)?;
            temp.as_file().sync_all().map_err(io_err)?;
            temp.persist(path).map_err(|e| Error::from_io(path, e.error))?;
        }
    }
    Ok(())
}

/// Number of sectors needed to hold `byte_count` bytes.
pub fn sectors_for_bytes(byte_count: u32) -> u32 {
    byte_count.div_ceil(ISO_SECTOR_SIZE as u32)
}

/// Absolute byte offset of the start of sector `lba`.
pub fn sector_to_byte(lba: u32) -> u64 {
    lba as u64 * ISO_SECTOR_SIZE as u64
}

/// Strips double quotes from a command-line or batch argument.
pub fn strip_quotes(arg: &str) -> String {
    arg.replace('"', "")
}

/// Turns a user-supplied path into the form the directory search compares
/// against: forward slashes only, no repeated separators, one leading `/`.
pub fn normalize_image_path(path: &str) -> String {
    let unquoted = strip_quotes(path);
    let joined = SEPARATORS.replace_all(&unquoted, "/");
    if joined.starts_with('/') {
        joined.into_owned()
    } else {
        format!("/{}", joined)
    }
}
