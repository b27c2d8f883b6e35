//! Finder-comment lookup. Comments live in `FCMT` resources of the Desktop
//! file, keyed by a 16-bit hash of the commented item's name (the Desktop
//! Manager calls this the "comment ID").

/// Hash a MacRoman name into the 16-bit id used to key its `FCMT` resource.
/// This is a straight port of the 68000 `ROR.W #1` rotate used by the
/// original Desktop Manager, including its sign-flip step.
pub fn comment_id(name: &[u8]) -> i16 {
    let mut hash: i16 = 0;
    for &byte in name {
        hash ^= byte as i16;
        hash = if hash & 1 != 0 {
            (hash >> 1) | i16::MIN
        } else {
            (hash >> 1) & 0x7FFF
        };
        if hash > 0 {
            hash = -hash;
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_never_positive() {
        for name in [&b"System"[..], b"Finder", b"", b"A Very Long Mac Filename Here"] {
            assert!(comment_id(name) <= 0);
        }
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(comment_id(b"README"), comment_id(b"README"));
        assert_ne!(comment_id(b"README"), comment_id(b"readme"));
    }
}
