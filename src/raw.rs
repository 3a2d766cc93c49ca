//! Little-endian record layouts shared by the command codecs.

use crate::constants::TAG;
use crate::error::SbError;
use std::mem::size_of;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Common 16-byte command header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawHeader {
    pub tag: U32,
    pub address: U32,
    pub length: U32,
    pub command_id: U32,
}

/// Header variant used by `LOAD_KEY_BLOB`, with narrower wrap-id and length fields.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawKeyBlobHeader {
    pub tag: U32,
    pub offset: U32,
    pub key_wrap_id: U16,
    pub length: U16,
    pub command_id: U32,
}

/// Section header; carries no tag and no command id.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawSectionHeader {
    pub section_uid: U32,
    pub section_type: U32,
    pub length: U32,
    pub reserved: U32,
}

/// Four-word parameter block trailing a header, e.g. `(memory_id, 0, 0, 0)`.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawBlock {
    pub words: [U32; 4],
}

impl RawBlock {
    pub fn new(words: [u32; 4]) -> Self {
        Self {
            words: words.map(U32::new),
        }
    }

    pub fn word(&self, index: usize) -> u32 {
        self.words[index].get()
    }

    /// Check that every word from `first` on is zero.
    pub fn expect_reserved_from(&self, first: usize, field: &'static str) -> Result<(), SbError> {
        for word in &self.words[first..] {
            expect_zero(field, word.get())?;
        }
        Ok(())
    }
}

/// Read a `T` located at `offset` inside `data`.
pub fn read_at<T: FromBytes>(data: &[u8], offset: usize) -> Result<T, SbError> {
    let insufficient = || SbError::InsufficientData {
        expected: offset.saturating_add(size_of::<T>()),
        actual: data.len(),
    };
    let tail = data.get(offset..).ok_or_else(insufficient)?;
    T::read_from_prefix(tail)
        .map(|(value, _)| value)
        .map_err(|_| insufficient())
}

/// Borrow `len` bytes starting at `offset`.
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], SbError> {
    let end = offset.checked_add(len).ok_or(SbError::InsufficientData {
        expected: usize::MAX,
        actual: data.len(),
    })?;
    data.get(offset..end).ok_or(SbError::InsufficientData {
        expected: end,
        actual: data.len(),
    })
}

pub fn check_tag(tag: u32) -> Result<(), SbError> {
    if tag != TAG {
        return Err(SbError::InvalidTag {
            expected: TAG,
            actual: tag,
        });
    }
    Ok(())
}

pub fn expect_zero(field: &'static str, value: u32) -> Result<(), SbError> {
    if value != 0 {
        return Err(SbError::NonZeroReserved { field, value });
    }
    Ok(())
}
