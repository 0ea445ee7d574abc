// isosplice/src/iso/mod.rs
pub mod dir_record;
pub mod endian;
pub mod image;
pub mod iso_image;
pub mod path_table;
pub mod replace;
pub mod search;
pub mod toc;
pub mod volume_descriptor;

pub use self::image::IsoImage;
pub use self::iso_image::{PatchOptions, Replacement, WriteMode};
pub use self::replace::{IsoPatcher, PatchReport, ReplacedFile};
