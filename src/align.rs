//! Zero-padding helpers for 16-byte aligned records.

use bytes::{BufMut, BytesMut};

/// Round `len` up to the next multiple of `alignment`.
pub fn align_len(len: usize, alignment: usize) -> usize {
    debug_assert!(alignment > 0);
    len.div_ceil(alignment) * alignment
}

/// Right-pad `buf` with zero bytes until its length is a multiple of `alignment`.
pub fn align_block(buf: &mut BytesMut, alignment: usize) {
    let padding = align_len(buf.len(), alignment) - buf.len();
    buf.put_bytes(0, padding);
}
