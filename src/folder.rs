//! Synthesized folder hierarchy, built from `FOBJ` resources in the
//! Desktop file. MFS itself has no subdirectories; folders are a Finder
//! fiction layered on top of the flat directory, so this module is the
//! only place that fiction is reconstructed.

use itertools::Itertools;
use mfs_types::{Folder, FOBJ_RESOURCE_SIZE};

use crate::error::{Error, Result};
use crate::macroman;

fn be16(buf: &[u8], off: usize) -> i16 {
    i16::from_be_bytes([buf[off], buf[off + 1]])
}

fn be32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

/// Longest C-string folder name the original allocates room for
/// (`fdCNam[65]`, null-terminated).
const FOLDER_NAME_MAX_LEN: usize = 64;

/// Decode a single FOBJ resource (40 bytes) plus the resource's own id
/// (which doubles as the folder's id) and the resource's name into a
/// `Folder`, leaving `subfolder_count` at zero for the caller to fill in.
pub fn decode_one(id: i16, name: &[u8], raw: &[u8]) -> Result<Folder> {
    if raw.len() < FOBJ_RESOURCE_SIZE {
        return Err(Error::BadFormat(format!(
            "FOBJ resource {id} is {} bytes, expected {FOBJ_RESOURCE_SIZE}",
            raw.len()
        )));
    }
    Ok(Folder {
        id,
        parent_id: be16(raw, 12),
        subfolder_count: 0,
        created: be32(raw, 26),
        modified: be32(raw, 30),
        flags: u16::from_be_bytes([raw[38], raw[39]]),
        location_v: be16(raw, 2),
        location_h: be16(raw, 4),
        name: name[..name.len().min(FOLDER_NAME_MAX_LEN)].to_vec(),
    })
}

/// Tally each folder's direct subfolder count from the now-complete list.
/// `id == Folder::DESKTOP` never resolves to a parent, matching
/// `folder_find`'s refusal to treat -2 as a real folder.
pub fn tally_subfolders(folders: &mut [Folder]) {
    let counts = folders
        .iter()
        .map(|f| f.parent_id)
        .filter(|&id| id != Folder::DESKTOP)
        .counts();
    for f in folders.iter_mut() {
        f.subfolder_count = counts.get(&f.id).copied().unwrap_or(0) as u16;
    }
}

pub fn find_by_id(folders: &[Folder], id: i16) -> Option<&Folder> {
    if id == Folder::DESKTOP {
        return None;
    }
    folders.iter().find(|f| f.id == id)
}

pub fn find_by_name<'a>(folders: &'a [Folder], name: &[u8]) -> Option<&'a Folder> {
    folders.iter().find(|f| macroman::names_equal(f.name_bytes(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fobj_bytes(parent: i16, created: u32, modified: u32, flags: u16) -> Vec<u8> {
        let mut buf = vec![0u8; FOBJ_RESOURCE_SIZE];
        buf[12..14].copy_from_slice(&parent.to_be_bytes());
        buf[26..30].copy_from_slice(&created.to_be_bytes());
        buf[30..34].copy_from_slice(&modified.to_be_bytes());
        buf[38..40].copy_from_slice(&flags.to_be_bytes());
        buf
    }

    #[test]
    fn tally_counts_direct_children_only() {
        let mut folders = vec![
            decode_one(0, b"Root Fake", &fobj_bytes(-2, 0, 0, 0)).unwrap(),
            decode_one(1, b"Apps", &fobj_bytes(0, 0, 0, 0)).unwrap(),
            decode_one(2, b"Games", &fobj_bytes(1, 0, 0, 0)).unwrap(),
            decode_one(3, b"Utilities", &fobj_bytes(1, 0, 0, 0)).unwrap(),
        ];
        tally_subfolders(&mut folders);
        assert_eq!(folders[0].subfolder_count, 1);
        assert_eq!(folders[1].subfolder_count, 2);
        assert_eq!(folders[2].subfolder_count, 0);
    }

    #[test]
    fn desktop_parent_never_resolves() {
        let mut folders = vec![decode_one(0, b"Root", &fobj_bytes(-2, 0, 0, 0)).unwrap()];
        tally_subfolders(&mut folders);
        assert_eq!(folders[0].subfolder_count, 0);
        assert!(find_by_id(&folders, -2).is_none());
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let folders = vec![decode_one(5, b"Games", &fobj_bytes(0, 0, 0, 0)).unwrap()];
        assert!(find_by_name(&folders, b"GAMES").is_some());
        assert!(find_by_name(&folders, b"Game").is_none());
    }

    #[test]
    fn name_is_truncated_to_64_bytes() {
        let long_name = vec![b'A'; 100];
        let folder = decode_one(0, &long_name, &fobj_bytes(-2, 0, 0, 0)).unwrap();
        assert_eq!(folder.name_bytes().len(), FOLDER_NAME_MAX_LEN);
    }
}
