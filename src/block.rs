//! Positioned reads of logical and allocation blocks. Never relies on a
//! persistent stream cursor: every call seeks first, so callers can freely
//! interleave reads for the MDB, VABM, directory, and fork data through the
//! same backing store.

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

pub const LOGICAL_BLOCK_SIZE: u64 = mfs_types::LOGICAL_BLOCK_SIZE;

/// Read `count` consecutive 512-byte logical blocks starting at
/// `first_block_index`, relative to `base_offset` (the byte offset of the
/// start of the volume within the backing store, to skip any disk-image
/// preamble).
pub fn read_logical_blocks<R: Read + Seek>(
    reader: &mut R,
    base_offset: u64,
    first_block_index: u64,
    count: u64,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; (count * LOGICAL_BLOCK_SIZE) as usize];
    reader.seek(SeekFrom::Start(base_offset + first_block_index * LOGICAL_BLOCK_SIZE))?;
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read `count` consecutive allocation blocks of `alloc_block_size` bytes
/// each, starting at allocation block `first_alloc_block`. `alloc_base`
/// is the byte offset of allocation block 0 within the backing store
/// (computed once at volume-open time as `drAlBlSt*512 - 2*drAlBlkSiz`,
/// since allocation block numbering starts at 2 to alias the MDB/VABM).
pub fn read_allocation_blocks<R: Read + Seek>(
    reader: &mut R,
    base_offset: u64,
    alloc_base: u64,
    alloc_block_size: u32,
    first_alloc_block: u16,
    count: u64,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; (count * alloc_block_size as u64) as usize];
    let offset = base_offset
        + alloc_base
        + first_alloc_block as u64 * alloc_block_size as u64;
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
