//! Synthesizes an AppleDouble (".rsrc"-companion) header in memory so a
//! resource fork can be exposed, together with Finder metadata and an
//! optional comment, as a single virtual byte stream to hosts that have no
//! native notion of forks.
//!
//! Layout reference: AppleSingle/AppleDouble v1.

use mfs_types::FinderInfo;

pub const MAGIC: u32 = 0x0005_1607;
pub const VERSION: u32 = 0x0002_0000;

pub const HEADER_LENGTH: usize = 0x300;
pub const RESOURCE_FORK_OFFSET: usize = HEADER_LENGTH;
pub const FILE_INFO_OFFSET: usize = 0x70;
pub const FILE_INFO_LENGTH: usize = 0x10;
pub const FINDER_INFO_OFFSET: usize = 0x80;
pub const FINDER_INFO_LENGTH: usize = 0x20;
pub const REAL_NAME_OFFSET: usize = 0xA0;
pub const COMMENT_OFFSET: usize = 0x1A0;

const ENTRY_RESOURCE_FORK: u32 = 2;
const ENTRY_REAL_NAME: u32 = 3;
const ENTRY_COMMENT: u32 = 4;
const ENTRY_FILE_INFO: u32 = 7;
const ENTRY_FINDER_INFO: u32 = 9;

struct Entry {
    kind: u32,
    offset: u32,
    length: u32,
}

/// Everything needed to synthesize a header; `resource_fork_length` is
/// `None` for a folder's synthesized header (folders have no resource
/// fork of their own).
pub struct HeaderInput<'a> {
    pub real_name: &'a [u8],
    pub finder_info: [u8; 16],
    pub created: u32,
    pub modified: u32,
    /// Low 7 bits of the directory record's flags byte (locked bit etc.),
    /// zero for a folder's own synthesized header.
    pub attributes: u8,
    pub resource_fork_length: Option<u32>,
    pub comment: Option<&'a [u8]>,
}

pub fn finder_info_bytes(info: &FinderInfo) -> [u8; 16] {
    let mut buf = [0u8; 16];
    buf[0..4].copy_from_slice(&info.file_type);
    buf[4..8].copy_from_slice(&info.creator);
    buf[8..10].copy_from_slice(&info.flags.to_be_bytes());
    buf[10..12].copy_from_slice(&(info.location_v as u16).to_be_bytes());
    buf[12..14].copy_from_slice(&(info.location_h as u16).to_be_bytes());
    buf[14..16].copy_from_slice(&(info.folder_id as u16).to_be_bytes());
    buf
}

/// Build the fixed `HEADER_LENGTH`-byte AppleDouble header. The caller
/// splices the real resource fork bytes immediately after this buffer to
/// form the complete virtual stream.
pub fn build_header(input: &HeaderInput) -> Vec<u8> {
    let mut entries = Vec::with_capacity(5);
    if let Some(len) = input.resource_fork_length {
        entries.push(Entry { kind: ENTRY_RESOURCE_FORK, offset: RESOURCE_FORK_OFFSET as u32, length: len });
    }
    entries.push(Entry {
        kind: ENTRY_REAL_NAME,
        offset: REAL_NAME_OFFSET as u32,
        length: input.real_name.len() as u32,
    });
    entries.push(Entry {
        kind: ENTRY_FILE_INFO,
        offset: FILE_INFO_OFFSET as u32,
        length: FILE_INFO_LENGTH as u32,
    });
    entries.push(Entry {
        kind: ENTRY_FINDER_INFO,
        offset: FINDER_INFO_OFFSET as u32,
        length: FINDER_INFO_LENGTH as u32,
    });
    if let Some(comment) = input.comment {
        entries.push(Entry {
            kind: ENTRY_COMMENT,
            offset: COMMENT_OFFSET as u32,
            length: comment.len() as u32,
        });
    }

    let mut header = vec![0u8; HEADER_LENGTH];
    header[0..4].copy_from_slice(&MAGIC.to_be_bytes());
    header[4..8].copy_from_slice(&VERSION.to_be_bytes());
    header[8..24].copy_from_slice(b"Macintosh       ");
    header[24..26].copy_from_slice(&(entries.len() as u16).to_be_bytes());

    let mut entry_off = 26;
    for entry in &entries {
        header[entry_off..entry_off + 4].copy_from_slice(&entry.kind.to_be_bytes());
        header[entry_off + 4..entry_off + 8].copy_from_slice(&entry.offset.to_be_bytes());
        header[entry_off + 8..entry_off + 12].copy_from_slice(&entry.length.to_be_bytes());
        entry_off += 12;
    }

    header[FILE_INFO_OFFSET..FILE_INFO_OFFSET + 4].copy_from_slice(&input.created.to_be_bytes());
    header[FILE_INFO_OFFSET + 4..FILE_INFO_OFFSET + 8].copy_from_slice(&input.modified.to_be_bytes());
    // backupDate (bytes 8..12) stays zero.
    header[FILE_INFO_OFFSET + 12..FILE_INFO_OFFSET + 16]
        .copy_from_slice(&(input.attributes as u32).to_be_bytes());

    header[FINDER_INFO_OFFSET..FINDER_INFO_OFFSET + 16].copy_from_slice(&input.finder_info);

    let name_len = input.real_name.len().min(HEADER_LENGTH - REAL_NAME_OFFSET);
    header[REAL_NAME_OFFSET..REAL_NAME_OFFSET + name_len]
        .copy_from_slice(&input.real_name[..name_len]);

    if let Some(comment) = input.comment {
        let comment_len = comment.len().min(HEADER_LENGTH - COMMENT_OFFSET);
        header[COMMENT_OFFSET..COMMENT_OFFSET + comment_len]
            .copy_from_slice(&comment[..comment_len]);
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_fixed_length_and_magic() {
        let header = build_header(&HeaderInput {
            real_name: b"MacPaint",
            finder_info: [0u8; 16],
            created: 100,
            modified: 200,
            attributes: 0,
            resource_fork_length: Some(512),
            comment: None,
        });
        assert_eq!(header.len(), HEADER_LENGTH);
        assert_eq!(&header[0..4], &MAGIC.to_be_bytes());
        assert_eq!(&header[4..8], &VERSION.to_be_bytes());
        assert_eq!(&header[8..24], b"Macintosh       ");
        assert_eq!(u16::from_be_bytes([header[24], header[25]]), 4);
    }

    #[test]
    fn comment_entry_added_when_present() {
        let header = build_header(&HeaderInput {
            real_name: b"MacPaint",
            finder_info: [0u8; 16],
            created: 100,
            modified: 200,
            attributes: 0,
            resource_fork_length: Some(512),
            comment: Some(b"A comment"),
        });
        assert_eq!(u16::from_be_bytes([header[24], header[25]]), 5);
        assert_eq!(&header[COMMENT_OFFSET..COMMENT_OFFSET + 9], b"A comment");
    }

    #[test]
    fn folder_header_omits_resource_fork_entry() {
        let header = build_header(&HeaderInput {
            real_name: b"Games",
            finder_info: [0u8; 16],
            created: 1,
            modified: 2,
            attributes: 0,
            resource_fork_length: None,
            comment: None,
        });
        assert_eq!(u16::from_be_bytes([header[24], header[25]]), 3);
    }
}
