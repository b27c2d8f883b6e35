//! Pascal-format strings: a length byte followed by that many bytes, no
//! terminator. MFS volume and file names are stored this way.

/// Extract the payload of a Pascal string stored in a fixed-size field,
/// where `buf[0]` is the length byte and `buf[1..]` is padding/garbage
/// beyond the declared length.
pub fn payload(buf: &[u8]) -> &[u8] {
    let len = buf[0] as usize;
    &buf[1..1 + len.min(buf.len().saturating_sub(1))]
}

/// Copy a length-prefixed Pascal string out of a byte stream at `offset`,
/// keeping the length byte (the representation `DirectoryRecord::name` and
/// `MasterDirectoryBlock::volume_name` use).
pub fn read_with_length_byte(buf: &[u8], offset: usize, max_payload: usize) -> Vec<u8> {
    let len = (buf[offset] as usize).min(max_payload);
    let mut out = Vec::with_capacity(len + 1);
    out.push(len as u8);
    out.extend_from_slice(&buf[offset + 1..offset + 1 + len]);
    out
}
