//! Resolves colon-separated Mac paths (`Disk:Folder:Sub:File`) against the
//! flat directory and, if loaded, the synthesized folder tree.

use mfs_types::{DirectoryRecord, Folder, PathInfo};

use crate::error::{Error, Result};
use crate::{directory, folder};

/// Resolve `path` to either a file (by its file number) or a folder (by
/// its id). Without a loaded folder tree, only a bare filename can
/// resolve, and only to a file.
pub fn resolve(records: &[DirectoryRecord], folders: Option<&[Folder]>, path: &str) -> Result<PathInfo> {
    let path = path.strip_prefix(':').unwrap_or(path);
    if path.is_empty() {
        return Ok(PathInfo::Folder(Folder::ROOT));
    }

    let last_name = path.rsplit(':').next().unwrap_or(path);
    let rec = directory::find_by_name(records, last_name.as_bytes());

    let Some(folders) = folders else {
        return rec
            .map(|r| PathInfo::File(r.file_number))
            .ok_or_else(|| Error::NotFound(path.to_string()));
    };

    if folder::find_by_name(folders, last_name.as_bytes()).is_none() && rec.is_none() {
        return Err(Error::NotFound(path.to_string()));
    }

    let mut parent = folder::find_by_id(folders, Folder::ROOT).ok_or_else(|| {
        Error::BadFormat("folder tree has no root entry".to_string())
    })?;

    let components: Vec<&str> = path.split(':').collect();
    let last_index = components.len() - 1;
    let mut resolved_folder = None;

    for (i, item) in components.iter().enumerate() {
        let candidate = folder::find_by_name(folders, item.as_bytes());
        if i == last_index {
            match (rec, candidate) {
                (Some(r), _) if r.finder_info.folder_id != parent.id => {
                    return Err(Error::NotFound(path.to_string()))
                }
                (None, Some(f)) if f.parent_id != parent.id => {
                    return Err(Error::NotFound(path.to_string()))
                }
                (None, None) => return Err(Error::NotFound(path.to_string())),
                _ => {}
            }
            resolved_folder = candidate;
            break;
        }

        match candidate {
            Some(f) if f.parent_id == parent.id => parent = f,
            _ => return Err(Error::NotFound(path.to_string())),
        }
    }

    if let Some(r) = rec {
        Ok(PathInfo::File(r.file_number))
    } else if let Some(f) = resolved_folder {
        Ok(PathInfo::Folder(f.id))
    } else {
        Err(Error::NotFound(path.to_string()))
    }
}
