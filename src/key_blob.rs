//! `LOAD_KEY_BLOB`: a wrapped key delivered with its own narrow header
//! `(tag: u32, offset: u32, key_wrap_id: u16, length: u16, command_id: u32)`.

use crate::align::{align_block, align_len};
use crate::constants::{CommandId, HEADER_SIZE, KeyWrap, RECORD_ALIGNMENT, TAG};
use crate::error::SbError;
use crate::header::Record;
use crate::raw::{RawKeyBlobHeader, check_tag, read_at, slice_at};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::warn;
use zerocopy::IntoBytes;
use zerocopy::byteorder::little_endian::{U16, U32};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdLoadKeyBlob {
    pub offset: u32,
    pub key_wrap: KeyWrap,
    pub(crate) data: Bytes,
}

impl CmdLoadKeyBlob {
    pub const COMMAND_ID: CommandId = CommandId::LoadKeyBlob;

    /// The blob length must fit the 16-bit header field.
    pub fn new(offset: u32, key_wrap: KeyWrap, data: impl Into<Bytes>) -> Result<Self, SbError> {
        let data = data.into();
        Self::check_blob_len(data.len())?;
        Ok(Self { offset, key_wrap, data })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn length(&self) -> u16 {
        self.data.len() as u16
    }

    pub(crate) fn check_blob_len(len: usize) -> Result<u16, SbError> {
        u16::try_from(len).map_err(|_| SbError::ValueOutOfRange {
            field: "key blob length",
            value: len as u64,
            max: u16::MAX as u64,
        })
    }

    pub(crate) fn record_size(data_len: usize) -> usize {
        align_len(HEADER_SIZE + data_len, RECORD_ALIGNMENT)
    }
}

impl Record for CmdLoadKeyBlob {
    fn export(&self) -> Bytes {
        let header = RawKeyBlobHeader {
            tag: U32::new(TAG),
            offset: U32::new(self.offset),
            key_wrap_id: U16::new(self.key_wrap.into()),
            length: U16::new(self.length()),
            command_id: U32::new(Self::COMMAND_ID.into()),
        };
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_slice(header.as_bytes());
        buf.put_slice(&self.data);
        align_block(&mut buf, RECORD_ALIGNMENT);
        buf.freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let header: RawKeyBlobHeader = read_at(data, offset)?;
        check_tag(header.tag.get())?;
        let command_id = header.command_id.get();
        if command_id != u32::from(Self::COMMAND_ID) {
            return Err(SbError::CommandIdMismatch {
                expected: Self::COMMAND_ID,
                actual: command_id,
            });
        }

        let key_wrap = KeyWrap::from(header.key_wrap_id.get());
        if !key_wrap.is_known() {
            warn!(key_wrap_id = header.key_wrap_id.get(), "key blob uses an unknown key wrap id");
        }

        let blob = slice_at(data, offset + HEADER_SIZE, header.length.get() as usize)?;
        Ok(Self {
            offset: header.offset.get(),
            key_wrap,
            data: Bytes::copy_from_slice(blob),
        })
    }

    fn size(&self) -> usize {
        Self::record_size(self.data.len())
    }
}

impl fmt::Display for CmdLoadKeyBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LOAD_KEY_BLOB: Offset={:#010x}, Key wrap={} ({}), Length={}",
            self.offset,
            self.key_wrap,
            u16::from(self.key_wrap),
            self.length()
        )
    }
}
