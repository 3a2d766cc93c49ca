//! The common 16-byte command header and the `Record` trait.

use crate::constants::{CommandId, HEADER_SIZE, TAG};
use crate::error::SbError;
use crate::raw::{RawHeader, check_tag, read_at};
use bytes::{Bytes, BytesMut};
use tracing::trace;
use zerocopy::IntoBytes;
use zerocopy::byteorder::little_endian::U32;

/// A record of the boot command stream.
///
/// `export` produces the 16-byte aligned wire form and `parse` reads it back
/// from `data` starting at `offset`. Both are pure.
pub trait Record: Sized {
    fn export(&self) -> Bytes;

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError>;

    /// Number of bytes `export` produces.
    fn size(&self) -> usize {
        self.export().len()
    }
}

/// Header fields shared by every tagged command.
///
/// `address` and `length` are raw header slots; several commands store other
/// values in them (memory id, counter id, firmware version).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseHeader {
    pub command_id: CommandId,
    pub address: u32,
    pub length: u32,
}

impl BaseHeader {
    pub fn new(command_id: CommandId, address: u32, length: u32) -> Self {
        Self {
            command_id,
            address,
            length,
        }
    }

    pub(crate) fn raw(&self) -> RawHeader {
        RawHeader {
            tag: U32::new(TAG),
            address: U32::new(self.address),
            length: U32::new(self.length),
            command_id: U32::new(self.command_id.into()),
        }
    }

    /// Append the header to `buf`.
    pub(crate) fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.raw().as_bytes());
    }

    /// Serialize as `(tag, address, length, command_id)`, little endian.
    pub fn export(&self) -> Bytes {
        Bytes::copy_from_slice(self.raw().as_bytes())
    }

    /// Decode a header at `offset`, checking the tag and that the command id
    /// equals `expected`. Returns the `(address, length)` slots.
    pub fn header_parse(data: &[u8], offset: usize, expected: CommandId) -> Result<(u32, u32), SbError> {
        let raw: RawHeader = read_at(data, offset)?;
        check_tag(raw.tag.get())?;
        let command_id = raw.command_id.get();
        if command_id != u32::from(expected) {
            return Err(SbError::CommandIdMismatch {
                expected,
                actual: command_id,
            });
        }
        trace!(
            offset,
            command = %expected,
            address = raw.address.get(),
            length = raw.length.get(),
            "decoded header"
        );
        Ok((raw.address.get(), raw.length.get()))
    }

    /// Decode a header without cross-checking the command id.
    pub fn parse_any(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let raw: RawHeader = read_at(data, offset)?;
        check_tag(raw.tag.get())?;
        let id = raw.command_id.get();
        let command_id = CommandId::try_from(id).map_err(|_| SbError::UnknownCommandId(id))?;
        Ok(Self {
            command_id,
            address: raw.address.get(),
            length: raw.length.get(),
        })
    }
}

const _: () = assert!(std::mem::size_of::<RawHeader>() == HEADER_SIZE);
