//! Fork I/O: turns a directory record's allocation chain into addressable
//! bytes, optionally spliced behind a synthesized AppleDouble header.

use std::cell::Cell;
use std::io::{Read, Seek};

use mfs_types::{DirectoryRecord, ForkMode, SeekWhence};

use crate::appledouble;
use crate::error::{Error, Result};
use crate::vabm;
use crate::volume::Volume;

/// Walk the VABM starting at `first_block` for `num_blocks` steps,
/// returning the ordered list of allocation block numbers. Empty forks
/// (`num_blocks == 0`) never touch the VABM at all.
pub(crate) fn materialize_chain(entries: &[u16], first_block: u16, num_blocks: u16) -> Result<Vec<u16>> {
    if num_blocks == 0 {
        return Ok(Vec::new());
    }

    let num_alloc_blocks = entries[0];
    let mut chain = Vec::with_capacity(num_blocks as usize);
    chain.push(first_block);
    for _ in 1..num_blocks {
        let last = *chain.last().unwrap();
        let next = *entries
            .get(last as usize)
            .ok_or(Error::CorruptChain(last))?;
        if !vabm::is_valid_successor(next, num_alloc_blocks) {
            return Err(Error::CorruptChain(last));
        }
        chain.push(next);
    }

    let last = *chain.last().unwrap();
    let terminator = *entries.get(last as usize).ok_or(Error::CorruptChain(last))?;
    if terminator != mfs_types::VABM_LAST_IN_CHAIN {
        return Err(Error::FileTooLarge {
            expected: num_blocks as usize,
            actual: chain.len(),
        });
    }

    Ok(chain)
}

/// A handle onto one fork (data, resource, or a synthesized AppleDouble
/// stream) of a directory record, or onto a folder's synthesized header.
pub struct Fork<'v, R: Read + Seek> {
    vol: &'v Volume<R>,
    mode: ForkMode,
    logical_len: u64,
    chain: Vec<u16>,
    appledouble_header: Option<Vec<u8>>,
    offset: Cell<u64>,
    closed: Cell<bool>,
}

impl<'v, R: Read + Seek> Fork<'v, R> {
    pub(crate) fn open(vol: &'v Volume<R>, rec: &DirectoryRecord, mode: ForkMode) -> Result<Self> {
        let is_resource = matches!(mode, ForkMode::Resource | ForkMode::AppleDouble);
        // Only a bare resource-fork open requires the fork to exist; an
        // AppleDouble open still succeeds with an empty resource fork so
        // a file's metadata/name/comment alone can still be read back.
        if mode == ForkMode::Resource && !rec.has_resource_fork() {
            return Err(Error::NotFound("resource fork".to_string()));
        }

        let physical_eof = if is_resource { rec.resource_physical_eof } else { rec.data_physical_eof };
        let logical_len = if is_resource { rec.resource_logical_eof } else { rec.data_logical_eof } as u64;
        let first_block = if is_resource { rec.resource_first_block } else { rec.data_first_block };
        let alloc_block_size = vol.alloc_block_size();
        let num_blocks = (physical_eof / alloc_block_size) as u16;

        let chain = materialize_chain(vol.vabm(), first_block, num_blocks)?;

        let appledouble_header = if mode == ForkMode::AppleDouble {
            let comment = vol.comment_for(rec);
            Some(appledouble::build_header(&appledouble::HeaderInput {
                real_name: rec.name_bytes(),
                finder_info: appledouble::finder_info_bytes(&rec.finder_info),
                created: rec.created,
                modified: rec.modified,
                attributes: rec.flags & 0x7F,
                resource_fork_length: if logical_len > 0 { Some(logical_len as u32) } else { None },
                comment: comment.as_deref(),
            }))
        } else {
            None
        };

        vol.mark_fork_opened();
        Ok(Fork {
            vol,
            mode,
            logical_len,
            chain,
            appledouble_header,
            offset: Cell::new(0),
            closed: Cell::new(false),
        })
    }

    pub(crate) fn open_folder_header(vol: &'v Volume<R>, folder: &mfs_types::Folder) -> Self {
        let comment = vol.comment_for_folder(folder);
        let header = appledouble::build_header(&appledouble::HeaderInput {
            real_name: folder.name_bytes(),
            finder_info: folder_finder_info(folder),
            created: folder.created,
            modified: folder.modified,
            attributes: 0,
            resource_fork_length: None,
            comment: comment.as_deref(),
        });

        vol.mark_fork_opened();
        Fork {
            vol,
            mode: ForkMode::AppleDouble,
            logical_len: 0,
            chain: Vec::new(),
            appledouble_header: Some(header),
            offset: Cell::new(0),
            closed: Cell::new(false),
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.get() {
            Err(Error::BadHandle)
        } else {
            Ok(())
        }
    }

    pub fn close(self) -> Result<()> {
        self.check_open()?;
        self.closed.set(true);
        self.vol.mark_fork_closed();
        Ok(())
    }

    pub fn tell(&self) -> u64 {
        self.offset.get()
    }

    fn total_virtual_len(&self) -> u64 {
        self.logical_len + if self.mode == ForkMode::AppleDouble { appledouble::HEADER_LENGTH as u64 } else { 0 }
    }

    pub fn seek(&self, offset: i64, whence: SeekWhence) -> Result<u64> {
        self.check_open()?;
        let base: i64 = match whence {
            SeekWhence::Start => 0,
            SeekWhence::Current => self.offset.get() as i64,
            SeekWhence::End => self.total_virtual_len() as i64,
        };
        let new_offset = base
            .checked_add(offset)
            .ok_or_else(|| Error::BadFormat("seek overflow".to_string()))?;
        if new_offset < 0 {
            return Err(Error::BadFormat("seek before start of fork".to_string()));
        }
        self.offset.set(new_offset as u64);
        Ok(new_offset as u64)
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let n = self.read_at(buf.len(), self.offset.get(), buf)?;
        self.offset.set(self.offset.get() + n as u64);
        Ok(n)
    }

    pub fn read_at(&self, size: usize, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        match self.mode {
            ForkMode::Data | ForkMode::Resource => self.read_at_real(size, offset, buf),
            ForkMode::AppleDouble => self.read_at_appledouble(size, offset, buf),
        }
    }

    fn read_at_real(&self, size: usize, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if size == 0 || offset >= self.logical_len {
            return Ok(0);
        }
        let size = size.min((self.logical_len - offset) as usize);
        let alloc_block_size = self.vol.alloc_block_size() as u64;

        let mut remaining = size;
        let mut dest = 0usize;
        let mut block_index = (offset / alloc_block_size) as usize;
        let mut block_offset = (offset % alloc_block_size) as usize;

        while remaining > 0 {
            let block_number = *self
                .chain
                .get(block_index)
                .ok_or_else(|| Error::BadFormat("read past materialized allocation chain".to_string()))?;
            let block = self.vol.read_alloc_block(block_number)?;
            let take = remaining.min(block.len() - block_offset);
            buf[dest..dest + take].copy_from_slice(&block[block_offset..block_offset + take]);
            dest += take;
            remaining -= take;
            block_index += 1;
            block_offset = 0;
        }

        Ok(size)
    }

    fn read_at_appledouble(&self, size: usize, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if size == 0 {
            return Ok(0);
        }
        let header = self.appledouble_header.as_ref().expect("AppleDouble fork missing header");
        let total_len = header.len() as u64 + self.logical_len;
        if offset >= total_len {
            return Ok(0);
        }
        let size = size.min((total_len - offset) as usize);

        if offset >= header.len() as u64 {
            return self.read_at_real(size, offset - header.len() as u64, buf);
        }

        let header_bytes_to_read = size.min(header.len() - offset as usize);
        buf[..header_bytes_to_read]
            .copy_from_slice(&header[offset as usize..offset as usize + header_bytes_to_read]);

        let remaining = size - header_bytes_to_read;
        if remaining > 0 {
            let fork_bytes = self.read_at_real(remaining, 0, &mut buf[header_bytes_to_read..size])?;
            Ok(header_bytes_to_read + fork_bytes)
        } else {
            Ok(size)
        }
    }
}

impl<'v, R: Read + Seek> Drop for Fork<'v, R> {
    fn drop(&mut self) {
        if !self.closed.get() {
            self.closed.set(true);
            self.vol.mark_fork_closed();
        }
    }
}

/// Finder info for a folder's own synthesized header: type/creator/folder
/// id stay zero (a folder isn't filed inside itself), only flags and icon
/// position carry over.
fn folder_finder_info(folder: &mfs_types::Folder) -> [u8; 16] {
    let mut buf = [0u8; 16];
    buf[8..10].copy_from_slice(&folder.flags.to_be_bytes());
    buf[10..12].copy_from_slice(&(folder.location_v as u16).to_be_bytes());
    buf[12..14].copy_from_slice(&(folder.location_h as u16).to_be_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fork_never_touches_vabm() {
        let entries = vec![3u16, 0x0FFF, 0, 0, 1];
        assert_eq!(materialize_chain(&entries, 0, 0).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn follows_chain_to_terminator() {
        // blocks: 2 -> 3 -> 4 (terminator)
        let entries = vec![3u16, 0x0FFF, 3, 4, 1];
        let chain = materialize_chain(&entries, 2, 3).unwrap();
        assert_eq!(chain, vec![2, 3, 4]);
    }

    #[test]
    fn rejects_chain_that_is_too_short() {
        let entries = vec![3u16, 0x0FFF, 3, 1, 0];
        assert!(matches!(
            materialize_chain(&entries, 2, 3),
            Err(Error::FileTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_chain_into_a_free_block() {
        let entries = vec![3u16, 0x0FFF, 3, 0, 1];
        assert!(matches!(materialize_chain(&entries, 2, 3), Err(Error::CorruptChain(_))));
    }
}
