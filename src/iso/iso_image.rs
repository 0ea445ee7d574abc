use std::path::PathBuf;

/// A file inside the image and the host file whose bytes replace it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replacement {
    /// Path inside the image; `/` or `\` separated, case-insensitive.
    pub image_path: String,
    pub source: PathBuf,
}

/// How the patched image is written back over the original.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Delete the original, then create and write the new image.
    /// A failure part-way through leaves no usable image on disk.
    #[default]
    Replace,
    /// Write a temporary file next to the image and rename it over the original.
    Atomic,
}

/// Configuration for one patch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchOptions {
    pub write_mode: WriteMode,
}
