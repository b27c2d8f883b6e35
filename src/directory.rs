//! Variable-length MFS directory record decoding.

use mfs_types::{DirectoryRecord, FinderInfo, DIRECTORY_RECORD_FIXED_SIZE};

use crate::error::{Error, Result};
use crate::pascal;

fn be16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

fn be32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn decode_finder_info(buf: &[u8]) -> FinderInfo {
    FinderInfo {
        file_type: [buf[0], buf[1], buf[2], buf[3]],
        creator: [buf[4], buf[5], buf[6], buf[7]],
        flags: be16(buf, 8),
        location_v: be16(buf, 10) as i16,
        location_h: be16(buf, 12) as i16,
        folder_id: be16(buf, 14) as i16,
    }
}

/// Walk `dir_length_blocks` worth of raw directory bytes (already read from
/// logical blocks `dir_start_block..`), collecting up to `file_count`
/// records. A record whose flags byte is zero terminates the records in
/// its containing block; scanning resumes at the next block boundary.
pub fn decode(raw: &[u8], file_count: u16) -> Result<Vec<DirectoryRecord>> {
    const BLOCK: usize = 512;
    let mut records = Vec::with_capacity(file_count as usize);

    'blocks: for block in raw.chunks(BLOCK) {
        let mut off = 0usize;
        while off < block.len() {
            let flags = block[off];
            if flags == 0 {
                continue 'blocks;
            }

            let name_len = block[off + DIRECTORY_RECORD_FIXED_SIZE - 1] as usize;
            let record_len = DIRECTORY_RECORD_FIXED_SIZE + name_len;
            if off + record_len > block.len() {
                return Err(Error::BadFormat(format!(
                    "directory record at offset {off} overruns its logical block"
                )));
            }
            let rec = &block[off..off + record_len];

            records.push(DirectoryRecord {
                used: flags & 0x80 != 0,
                locked: flags & 0x01 != 0,
                flags,
                version: rec[1] as i8,
                finder_info: decode_finder_info(&rec[2..18]),
                file_number: be32(rec, 18),
                data_first_block: be16(rec, 22),
                data_logical_eof: be32(rec, 24),
                data_physical_eof: be32(rec, 28),
                resource_first_block: be16(rec, 32),
                resource_logical_eof: be32(rec, 34),
                resource_physical_eof: be32(rec, 38),
                created: be32(rec, 42),
                modified: be32(rec, 46),
                name: pascal::read_with_length_byte(rec, 50, 63),
            });

            if records.len() == file_count as usize {
                break 'blocks;
            }

            off += record_len;
            if record_len % 2 != 0 {
                off += 1; // pad to a 16-bit boundary
            }
        }
    }

    Ok(records)
}

/// Case-insensitive lookup by filename, matching MFS semantics.
pub fn find_by_name<'a>(records: &'a [DirectoryRecord], name: &[u8]) -> Option<&'a DirectoryRecord> {
    records.iter().find(|r| crate::macroman::names_equal(r.name_bytes(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_record(name: &[u8]) -> Vec<u8> {
        let mut rec = vec![0u8; DIRECTORY_RECORD_FIXED_SIZE + name.len()];
        rec[0] = 0x80; // used
        rec[50] = name.len() as u8;
        rec[51..51 + name.len()].copy_from_slice(name);
        rec
    }

    #[test]
    fn decodes_single_record_and_stops_at_sentinel() {
        let mut block = vec![0u8; 512];
        let rec = synthetic_record(b"Hello");
        block[..rec.len()].copy_from_slice(&rec);
        let records = decode(&block, 1).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].used);
        assert_eq!(records[0].name_bytes(), b"Hello");
    }

    #[test]
    fn pads_odd_length_records_to_even_boundary() {
        let mut block = vec![0u8; 512];
        let rec1 = synthetic_record(b"A"); // odd total length -> padded
        let rec2 = synthetic_record(b"BB");
        let mut off = 0;
        block[off..off + rec1.len()].copy_from_slice(&rec1);
        off += rec1.len() + if rec1.len() % 2 != 0 { 1 } else { 0 };
        block[off..off + rec2.len()].copy_from_slice(&rec2);

        let records = decode(&block, 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name_bytes(), b"A");
        assert_eq!(records[1].name_bytes(), b"BB");
    }
}
