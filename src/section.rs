//! Section header: a plain 16-byte record opening a group of commands.

use crate::constants::{DEFAULT_SECTION_TYPE, DEFAULT_SECTION_UID, SECTION_HEADER_SIZE};
use crate::error::SbError;
use crate::header::Record;
use crate::raw::{RawSectionHeader, expect_zero, read_at};
use bytes::Bytes;
use std::fmt;
use zerocopy::IntoBytes;
use zerocopy::byteorder::little_endian::U32;

/// `(section_uid, section_type, length, reserved = 0)`; no tag, no command id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdSectionHeader {
    pub section_uid: u32,
    pub section_type: u32,
    /// Byte length of the section body that follows.
    pub length: u32,
}

impl CmdSectionHeader {
    pub fn new(length: u32) -> Self {
        Self::with_ids(length, DEFAULT_SECTION_UID, DEFAULT_SECTION_TYPE)
    }

    pub fn with_ids(length: u32, section_uid: u32, section_type: u32) -> Self {
        Self {
            section_uid,
            section_type,
            length,
        }
    }
}

impl Record for CmdSectionHeader {
    fn export(&self) -> Bytes {
        let raw = RawSectionHeader {
            section_uid: U32::new(self.section_uid),
            section_type: U32::new(self.section_type),
            length: U32::new(self.length),
            reserved: U32::new(0),
        };
        Bytes::copy_from_slice(raw.as_bytes())
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let raw: RawSectionHeader = read_at(data, offset)?;
        expect_zero("section header reserved", raw.reserved.get())?;
        Ok(Self::with_ids(raw.length.get(), raw.section_uid.get(), raw.section_type.get()))
    }

    fn size(&self) -> usize {
        SECTION_HEADER_SIZE
    }
}

impl fmt::Display for CmdSectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SECTION: UID={}, Type={}, Length={}",
            self.section_uid, self.section_type, self.length
        )
    }
}
