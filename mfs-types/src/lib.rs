//! On-disk type and constant definitions for the Macintosh File System (MFS).
//!
//! These are plain data holders for already-decoded (host-endian) fields.
//! Byte-swapping and record walking live in the parsing crate; this crate
//! only says what a Master Directory Block, directory record, or folder
//! resource looks like once decoded.

#![allow(non_upper_case_globals)]

use bitflags::bitflags;

/// Expected value of `drSigWord` for an MFS volume.
pub const MFS_SIGNATURE: u16 = 0xD2D7;

/// Size in bytes of a logical block.
pub const LOGICAL_BLOCK_SIZE: u64 = 512;

/// Fixed portion of a directory record, before the Pascal name.
pub const DIRECTORY_RECORD_FIXED_SIZE: usize = 51;

/// Size of the reverse-engineered FOBJ (folder object) resource.
pub const FOBJ_RESOURCE_SIZE: usize = 40;

/// VABM entry meaning "this allocation block is unused".
pub const VABM_FREE: u16 = 0x0000;

/// VABM entry meaning "this allocation block is the last in its chain".
pub const VABM_LAST_IN_CHAIN: u16 = 0x0001;

/// VABM entry reserved for blocks occupied by the directory itself.
pub const VABM_RESERVED: u16 = 0x0FFF;

bitflags! {
    /// Flags accepted by `Volume::open`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Load the Desktop-derived folder hierarchy at open time.
        const LOAD_FOLDERS = 0b0000_0001;
    }
}

/// Decoded Master Directory Block (MDB), found at logical block 2.
#[derive(Clone, Debug)]
pub struct MasterDirectoryBlock {
    pub signature: u16,
    pub creation_date: u32,
    pub last_backup_date: u32,
    pub attributes: u16,
    pub file_count: u16,
    pub dir_start_block: u16,
    pub dir_length_blocks: u16,
    pub num_alloc_blocks: u16,
    pub alloc_block_size: u32,
    pub clump_size: u32,
    pub alloc_block_start: u16,
    pub next_free_file_num: u32,
    pub free_blocks: u16,
    /// Pascal-format volume name, length byte followed by up to 27 bytes.
    pub volume_name: Vec<u8>,
}

/// Finder info embedded in a directory record (`FInfo`, 16 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct FinderInfo {
    pub file_type: [u8; 4],
    pub creator: [u8; 4],
    pub flags: u16,
    pub location_v: i16,
    pub location_h: i16,
    pub folder_id: i16,
}

/// A single MFS flat-directory entry: one file with a data and resource fork.
#[derive(Clone, Debug)]
pub struct DirectoryRecord {
    pub used: bool,
    pub locked: bool,
    /// Raw `flFlags` byte as stored on disk, bit 7 = used, bit 0 = locked.
    pub flags: u8,
    pub version: i8,
    pub finder_info: FinderInfo,
    pub file_number: u32,
    pub data_first_block: u16,
    pub data_logical_eof: u32,
    pub data_physical_eof: u32,
    pub resource_first_block: u16,
    pub resource_logical_eof: u32,
    pub resource_physical_eof: u32,
    pub created: u32,
    pub modified: u32,
    /// Pascal-format file name, length byte followed by up to 63 bytes.
    pub name: Vec<u8>,
}

impl DirectoryRecord {
    pub fn has_resource_fork(&self) -> bool {
        self.resource_first_block != 0
    }

    pub fn name_bytes(&self) -> &[u8] {
        &self.name[1..1 + self.name[0] as usize]
    }
}

/// Folder metadata synthesized from a Desktop-file FOBJ resource.
#[derive(Clone, Debug)]
pub struct Folder {
    pub id: i16,
    pub parent_id: i16,
    pub subfolder_count: u16,
    pub created: u32,
    pub modified: u32,
    pub flags: u16,
    pub location_v: i16,
    pub location_h: i16,
    pub name: Vec<u8>,
}

impl Folder {
    pub const ROOT: i16 = 0;
    pub const EMPTY: i16 = -1;
    pub const DESKTOP: i16 = -2;
    pub const TRASH: i16 = -3;

    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }
}

/// Which fork a `Fork` handle was opened against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForkMode {
    Data,
    Resource,
    /// Resource fork prefixed with a synthesized AppleDouble header.
    AppleDouble,
}

/// `Fork::seek` origin, mirroring `std::io::SeekFrom` without pulling in `io::Seek`
/// (fork reads are `&self`, not `&mut self`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekWhence {
    Start,
    Current,
    End,
}

/// Result of resolving a colon-separated Mac path.
#[derive(Clone, Debug)]
pub enum PathInfo {
    File(u32),
    Folder(i16),
}
