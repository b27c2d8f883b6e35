//! Ties block I/O, the MDB/VABM/directory decoders, and the optional
//! folder bridge into a single handle representing one mounted volume.

use std::cell::{Cell, RefCell};
use std::io::{Read, Seek};

use log::{debug, trace, warn};
use mfs_types::{DirectoryRecord, FOBJ_RESOURCE_SIZE, Folder, ForkMode, MasterDirectoryBlock, OpenFlags, PathInfo};

use crate::block;
use crate::comment;
use crate::directory;
use crate::error::{Error, Result};
use crate::folder;
use crate::fork::Fork;
use crate::mdb;
use crate::path;
use crate::resource::ResourceSource;
use crate::vabm;

const MDB_BLOCK: u64 = 2;

/// A mounted MFS volume: the decoded directory, allocation map, and
/// (optionally) the synthesized folder tree, plus the backing store they
/// were read from.
pub struct Volume<R> {
    reader: RefCell<R>,
    base_offset: u64,
    alloc_base: u64,
    mdb: MasterDirectoryBlock,
    vabm: Vec<u16>,
    records: Vec<DirectoryRecord>,
    folders: Option<Vec<Folder>>,
    resources: Option<Box<dyn ResourceSource>>,
    open_forks: Cell<usize>,
}

impl<R> std::fmt::Debug for Volume<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("base_offset", &self.base_offset)
            .field("alloc_base", &self.alloc_base)
            .field("records", &self.records.len())
            .field("folders", &self.folders.is_some())
            .field("resources", &self.resources.is_some())
            .field("open_forks", &self.open_forks.get())
            .finish()
    }
}

impl<R: Read + Seek> Volume<R> {
    /// Open a volume with no Desktop resource-file bridge. `LOAD_FOLDERS`
    /// is ignored (logged, not an error) since folder metadata lives in
    /// the Desktop file's resource fork, which this constructor has no
    /// way to read.
    pub fn open(reader: R, base_offset: u64, flags: OpenFlags) -> Result<Self> {
        if flags.contains(OpenFlags::LOAD_FOLDERS) {
            warn!("LOAD_FOLDERS requested without a resource source; folders will not be loaded");
        }
        Self::open_inner(reader, base_offset, None)
    }

    /// Open a volume with a Desktop resource-file bridge, loading the
    /// folder tree from `FOBJ` resources when `LOAD_FOLDERS` is set.
    pub fn open_with_resources(
        reader: R,
        base_offset: u64,
        flags: OpenFlags,
        resources: Box<dyn ResourceSource>,
    ) -> Result<Self> {
        let mut vol = Self::open_inner(reader, base_offset, Some(resources))?;
        if flags.contains(OpenFlags::LOAD_FOLDERS) {
            vol.load_folders()?;
        }
        Ok(vol)
    }

    fn open_inner(mut reader: R, base_offset: u64, resources: Option<Box<dyn ResourceSource>>) -> Result<Self> {
        let mdb_block = block::read_logical_blocks(&mut reader, base_offset, MDB_BLOCK, 1)?;
        let mdb = mdb::decode(&mdb_block)?;
        debug!(
            "opened MFS volume {:?}: {} files, {} allocation blocks of {} bytes",
            String::from_utf8_lossy(crate::pascal::payload(&mdb.volume_name)),
            mdb.file_count,
            mdb.num_alloc_blocks,
            mdb.alloc_block_size
        );

        let vabm_span = 64 + vabm::packed_size(mdb.num_alloc_blocks);
        let vabm_blocks = (vabm_span as u64).div_ceil(block::LOGICAL_BLOCK_SIZE);
        let raw = block::read_logical_blocks(&mut reader, base_offset, MDB_BLOCK, vabm_blocks)?;
        let vabm = vabm::expand(&raw[64..], mdb.num_alloc_blocks);

        let dir_raw = block::read_logical_blocks(
            &mut reader,
            base_offset,
            mdb.dir_start_block as u64,
            mdb.dir_length_blocks as u64,
        )?;
        let records = directory::decode(&dir_raw, mdb.file_count)?;
        trace!("decoded {} directory records", records.len());

        let alloc_base = mdb.alloc_block_start as u64 * block::LOGICAL_BLOCK_SIZE
            - 2 * mdb.alloc_block_size as u64;

        Ok(Volume {
            reader: RefCell::new(reader),
            base_offset,
            alloc_base,
            mdb,
            vabm,
            records,
            folders: None,
            resources,
            open_forks: Cell::new(0),
        })
    }

    fn load_folders(&mut self) -> Result<()> {
        let Some(resources) = self.resources.as_ref() else {
            return Ok(());
        };
        let listing = resources.list(*b"FOBJ");
        let mut folders = Vec::with_capacity(listing.len());
        for (id, name) in listing {
            let mut buf = [0u8; FOBJ_RESOURCE_SIZE];
            match resources.read(*b"FOBJ", id, 0, &mut buf) {
                Some(n) if n == FOBJ_RESOURCE_SIZE => {
                    folders.push(folder::decode_one(id, &name, &buf)?);
                }
                _ => warn!("FOBJ resource {id} missing or truncated, skipping"),
            }
        }
        folder::tally_subfolders(&mut folders);
        debug!("loaded {} folders", folders.len());
        self.folders = Some(folders);
        Ok(())
    }

    /// Fail with `Busy` if any fork opened from this volume is still
    /// outstanding. The backing reader itself is released by `Drop` once
    /// the `Volume` goes out of scope.
    pub fn close(&self) -> Result<()> {
        let open = self.open_forks.get();
        if open > 0 {
            return Err(Error::Busy(open));
        }
        Ok(())
    }

    pub fn mdb(&self) -> &MasterDirectoryBlock {
        &self.mdb
    }

    pub fn directory(&self) -> &[DirectoryRecord] {
        &self.records
    }

    pub fn find_by_name(&self, name: &[u8]) -> Option<&DirectoryRecord> {
        directory::find_by_name(&self.records, name)
    }

    pub fn folder_by_id(&self, id: i16) -> Option<&Folder> {
        folder::find_by_id(self.folders.as_deref()?, id)
    }

    pub fn folder_by_name(&self, name: &[u8]) -> Option<&Folder> {
        folder::find_by_name(self.folders.as_deref()?, name)
    }

    pub fn path_info(&self, p: &str) -> Result<PathInfo> {
        path::resolve(&self.records, self.folders.as_deref(), p)
    }

    /// Look up a Finder comment. Pass `None` to fetch the volume's own
    /// comment (the Desktop stores it under the volume's name).
    pub fn comment(&self, record: Option<&DirectoryRecord>) -> Option<Vec<u8>> {
        match record {
            Some(r) => self.lookup_comment(r.name_bytes()),
            None => self.lookup_comment(crate::pascal::payload(&self.mdb.volume_name)),
        }
    }

    pub(crate) fn comment_for(&self, rec: &DirectoryRecord) -> Option<Vec<u8>> {
        self.lookup_comment(rec.name_bytes())
    }

    pub(crate) fn comment_for_folder(&self, folder: &Folder) -> Option<Vec<u8>> {
        self.lookup_comment(folder.name_bytes())
    }

    fn lookup_comment(&self, name: &[u8]) -> Option<Vec<u8>> {
        let resources = self.resources.as_ref()?;
        let id = comment::comment_id(name);
        let mut buf = [0u8; 256];
        let n = resources.read(*b"FCMT", id, 0, &mut buf)?;
        if n == 0 {
            return None;
        }
        let len = (buf[0] as usize).min(n.saturating_sub(1));
        Some(buf[1..1 + len].to_vec())
    }

    pub fn open_fork<'v>(&'v self, rec: &DirectoryRecord, mode: ForkMode) -> Result<Fork<'v, R>> {
        Fork::open(self, rec, mode)
    }

    pub fn open_folder_header<'v>(&'v self, folder: &Folder) -> Fork<'v, R> {
        Fork::open_folder_header(self, folder)
    }

    pub(crate) fn alloc_block_size(&self) -> u32 {
        self.mdb.alloc_block_size
    }

    pub(crate) fn vabm(&self) -> &[u16] {
        &self.vabm
    }

    pub(crate) fn read_alloc_block(&self, block_number: u16) -> Result<Vec<u8>> {
        let mut reader = self.reader.borrow_mut();
        block::read_allocation_blocks(
            &mut *reader,
            self.base_offset,
            self.alloc_base,
            self.mdb.alloc_block_size,
            block_number,
            1,
        )
    }

    pub(crate) fn mark_fork_opened(&self) {
        self.open_forks.set(self.open_forks.get() + 1);
    }

    pub(crate) fn mark_fork_closed(&self) {
        self.open_forks.set(self.open_forks.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SIG: u16 = mfs_types::MFS_SIGNATURE;

    /// Build a minimal in-memory volume: MDB + VABM in block 2, one
    /// directory block with a single zero-length file record, no data.
    fn synthetic_image() -> Vec<u8> {
        let mut image = vec![0u8; 512 * 8];

        let mdb = &mut image[1024..1536];
        mdb[0..2].copy_from_slice(&SIG.to_be_bytes());
        mdb[12..14].copy_from_slice(&1u16.to_be_bytes()); // file_count
        mdb[14..16].copy_from_slice(&4u16.to_be_bytes()); // dir_start_block (logical block 4)
        mdb[16..18].copy_from_slice(&1u16.to_be_bytes()); // dir_length_blocks
        mdb[18..20].copy_from_slice(&8u16.to_be_bytes()); // num_alloc_blocks
        mdb[20..24].copy_from_slice(&512u32.to_be_bytes()); // alloc_block_size
        mdb[28..30].copy_from_slice(&6u16.to_be_bytes()); // alloc_block_start (logical block 6)
        mdb[36] = 4;
        mdb[37..41].copy_from_slice(b"Test");
        // VABM entries 2..=9: all free except a one-block chain at 2->terminator.
        // entry 2 (index 0 in packed sequence) = 1 (terminator); rest 0.
        let vabm = &mut image[1024 + 64..1024 + 64 + 12];
        vabm[0] = 0x00;
        vabm[1] = 0x10; // high nibble of byte1 -> entry2 = 0x001
        vabm[2] = 0x00;

        let dir_block = &mut image[512 * 4..512 * 4 + 512];
        dir_block[0] = 0x80; // used
        dir_block[50] = 5; // name length
        dir_block[51..56].copy_from_slice(b"Hello");

        image
    }

    #[test]
    fn opens_and_decodes_directory() {
        let image = synthetic_image();
        let vol = Volume::open(Cursor::new(image), 0, OpenFlags::empty()).unwrap();
        assert_eq!(vol.directory().len(), 1);
        assert_eq!(vol.directory()[0].name_bytes(), b"Hello");
        assert!(vol.find_by_name(b"hello").is_some());
        assert!(vol.find_by_name(b"Goodbye").is_none());
    }

    #[test]
    fn close_succeeds_with_no_open_forks() {
        let vol = Volume::open(Cursor::new(synthetic_image()), 0, OpenFlags::empty()).unwrap();
        assert!(vol.close().is_ok());
    }

    #[test]
    fn close_fails_while_a_fork_is_open() {
        let vol = Volume::open(Cursor::new(synthetic_image()), 0, OpenFlags::empty()).unwrap();
        let rec = vol.find_by_name(b"Hello").unwrap().clone();
        let fork = vol.open_fork(&rec, ForkMode::Data).unwrap();
        assert!(matches!(vol.close(), Err(Error::Busy(1))));
        fork.close().unwrap();
        assert!(vol.close().is_ok());
    }

    #[test]
    fn appledouble_mode_succeeds_without_a_resource_fork() {
        let vol = Volume::open(Cursor::new(synthetic_image()), 0, OpenFlags::empty()).unwrap();
        let rec = vol.find_by_name(b"Hello").unwrap().clone();
        assert!(!rec.has_resource_fork());
        let fork = vol.open_fork(&rec, ForkMode::AppleDouble).unwrap();
        let mut buf = [0u8; 4];
        let n = fork.read_at(4, 0, &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(u32::from_be_bytes(buf), crate::appledouble::MAGIC);
        fork.close().unwrap();
    }

    #[test]
    fn resource_mode_rejects_missing_resource_fork() {
        let vol = Volume::open(Cursor::new(synthetic_image()), 0, OpenFlags::empty()).unwrap();
        let rec = vol.find_by_name(b"Hello").unwrap().clone();
        assert!(matches!(vol.open_fork(&rec, ForkMode::Resource), Err(Error::NotFound(_))));
    }

    #[test]
    fn rejects_bad_signature() {
        let mut image = synthetic_image();
        image[1024] = 0;
        assert!(matches!(
            Volume::open(Cursor::new(image), 0, OpenFlags::empty()),
            Err(Error::BadFormat(_))
        ));
    }
}
