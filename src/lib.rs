//! Read-only access to Macintosh File System (MFS) floppy volumes: the
//! flat, 400 KB-class filesystem used before HFS.
//!
//! Open a disk image with [`Volume::open`] (or [`Volume::open_with_resources`]
//! if you also have a way to read the Desktop file's resource fork, which
//! unlocks Finder comments and the synthesized folder tree), then walk
//! [`Volume::directory`] and read forks through [`Volume::open_fork`].

pub mod appledouble;
pub mod block;
pub mod comment;
pub mod directory;
pub mod error;
pub mod folder;
pub mod fork;
pub mod macroman;
pub mod mdb;
pub mod pascal;
pub mod path;
pub mod resource;
pub mod vabm;
pub mod volume;

pub use error::{Error, Result};
pub use fork::Fork;
pub use resource::ResourceSource;
pub use volume::Volume;

pub use mfs_types::{
    DirectoryRecord, FinderInfo, Folder, ForkMode, MasterDirectoryBlock, OpenFlags, PathInfo,
    SeekWhence,
};

use std::fs::File;
use std::io::BufReader;

/// Convenience constructor: open a volume directly from a path on disk,
/// buffering reads the way the demo binaries do.
pub fn open_file(path: impl AsRef<std::path::Path>, base_offset: u64, flags: OpenFlags) -> Result<Volume<BufReader<File>>> {
    let file = File::open(path).map_err(Error::NotOpenable)?;
    Volume::open(BufReader::new(file), base_offset, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn open_file_reports_missing_path_as_not_openable() {
        let err = open_file("/nonexistent/path/to/image.img", 0, OpenFlags::empty()).unwrap_err();
        assert!(matches!(err, Error::NotOpenable(_)));
    }

    #[test]
    fn rejects_truncated_image() {
        let err = Volume::open(Cursor::new(vec![0u8; 4]), 0, OpenFlags::empty()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
