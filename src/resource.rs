//! Seam between this crate and a Desktop resource-file reader. This crate
//! does not parse resource forks itself; callers that want Finder comments
//! or folder metadata supply an implementation that knows how to read
//! `FCMT`/`FOBJ` resources out of the Desktop file's resource fork.

/// A source of 4-byte-typed, 16-bit-id resources, as found in a classic Mac
/// resource fork. Implemented externally and injected via
/// `Volume::open_with_resources`.
pub trait ResourceSource {
    /// Read up to `buf.len()` bytes of resource `(kind, id)` starting at
    /// `offset` within that resource's data, returning the number of bytes
    /// copied, or `None` if no such resource exists.
    fn read(&self, kind: [u8; 4], id: i16, offset: usize, buf: &mut [u8]) -> Option<usize>;

    /// List every resource of a given 4-byte type, as `(id, name)` pairs,
    /// in whatever order the underlying resource map stores them. `name`
    /// is the resource's own name entry, not its data.
    fn list(&self, kind: [u8; 4]) -> Vec<(i16, Vec<u8>)>;
}
