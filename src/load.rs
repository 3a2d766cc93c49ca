//! Load-like commands: records carrying an opaque data payload.
//!
//! All of them share one codec, [`export_load`] / [`parse_load`], driven by a
//! [`LoadLayout`] that says whether a `(memory_id, 0, 0, 0)` block follows the
//! header and in which unit the header `length` is counted.

use crate::align::{align_block, align_len};
use crate::command::Command;
use crate::constants::{
    BLOCK_SIZE, CommandId, HASH_LOCKING_RESERVED_SIZE, HEADER_SIZE, KeyWrap, RECORD_ALIGNMENT, WORD_SIZE,
};
use crate::error::SbError;
use crate::header::{BaseHeader, Record};
use crate::key_blob::CmdLoadKeyBlob;
use crate::raw::{RawBlock, read_at, slice_at};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use zerocopy::IntoBytes;

/// Shape of a load-like record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLayout {
    /// A `(memory_id, 0, 0, 0)` block sits between header and data.
    pub has_memory_id_block: bool,
    /// Bytes per unit of the header `length` field.
    pub length_scale: usize,
}

impl LoadLayout {
    /// `LOAD`, `LOAD_CMAC`, `LOAD_HASH_LOCKING`
    pub const MEMORY: LoadLayout = LoadLayout {
        has_memory_id_block: true,
        length_scale: 1,
    };

    /// `PROGRAM_FUSES`, `PROGRAM_IFR`: no memory id, length counted in words
    pub const WORDS: LoadLayout = LoadLayout {
        has_memory_id_block: false,
        length_scale: WORD_SIZE,
    };

    /// Layout used by a command id, `None` for non-load commands and for
    /// `LOAD_KEY_BLOB`, which has its own header.
    pub fn for_command(command_id: CommandId) -> Option<LoadLayout> {
        match command_id {
            CommandId::Load | CommandId::LoadCmac | CommandId::LoadHashLocking => Some(Self::MEMORY),
            CommandId::ProgramFuses | CommandId::ProgramIfr => Some(Self::WORDS),
            _ => None,
        }
    }

    /// Header `length` value for a payload of `data_len` bytes.
    pub fn wire_length(&self, data_len: usize) -> Result<u32, SbError> {
        if data_len % self.length_scale != 0 {
            return Err(SbError::UnalignedWordData(data_len));
        }
        let units = data_len / self.length_scale;
        u32::try_from(units).map_err(|_| SbError::ValueOutOfRange {
            field: "length",
            value: units as u64,
            max: u32::MAX as u64,
        })
    }

    /// Exported size of a record with a `data_len` byte payload.
    pub fn record_size(&self, data_len: usize) -> usize {
        let block = if self.has_memory_id_block { BLOCK_SIZE } else { 0 };
        align_len(HEADER_SIZE + block + data_len, RECORD_ALIGNMENT)
    }
}

/// Fields recovered by [`parse_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFields {
    pub address: u32,
    pub memory_id: u32,
    pub data: Bytes,
}

/// Serialize a load-like record: header, optional memory id block, data, zero padding.
///
/// `data.len()` must already have been validated with [`LoadLayout::wire_length`].
pub fn export_load(command_id: CommandId, address: u32, memory_id: u32, data: &[u8], layout: LoadLayout) -> BytesMut {
    let length = (data.len() / layout.length_scale) as u32;
    let mut buf = BytesMut::with_capacity(layout.record_size(data.len()));
    BaseHeader::new(command_id, address, length).write_to(&mut buf);
    if layout.has_memory_id_block {
        buf.put_slice(RawBlock::new([memory_id, 0, 0, 0]).as_bytes());
    }
    buf.put_slice(data);
    align_block(&mut buf, RECORD_ALIGNMENT);
    buf
}

/// Decode a load-like record at `offset`, cross-checking its command id.
pub fn parse_load(data: &[u8], offset: usize, expected: CommandId, layout: LoadLayout) -> Result<LoadFields, SbError> {
    let (address, length) = BaseHeader::header_parse(data, offset, expected)?;
    let mut cursor = offset + HEADER_SIZE;

    let mut memory_id = 0;
    if layout.has_memory_id_block {
        let block: RawBlock = read_at(data, cursor)?;
        block.expect_reserved_from(1, "memory id block padding")?;
        memory_id = block.word(0);
        cursor += BLOCK_SIZE;
    }

    let byte_len = (length as usize)
        .checked_mul(layout.length_scale)
        .ok_or(SbError::ValueOutOfRange {
            field: "length",
            value: length as u64,
            max: (usize::MAX / layout.length_scale) as u64,
        })?;
    let payload = slice_at(data, cursor, byte_len)?;

    Ok(LoadFields {
        address,
        memory_id,
        data: Bytes::copy_from_slice(payload),
    })
}

/// Generic view over any load-like record, used to inspect a record before
/// choosing its concrete type.
///
/// For `LOAD_KEY_BLOB` records `address` holds the blob offset and
/// `memory_id` the key wrap id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdLoadBase {
    command_id: CommandId,
    address: u32,
    memory_id: u32,
    data: Bytes,
}

impl CmdLoadBase {
    pub fn new(command_id: CommandId, address: u32, data: impl Into<Bytes>, memory_id: u32) -> Result<Self, SbError> {
        if !command_id.is_load_like() {
            return Err(SbError::InvalidLoadCommandId(command_id));
        }
        let data = data.into();
        match LoadLayout::for_command(command_id) {
            Some(layout) => {
                layout.wire_length(data.len())?;
            }
            // Only the key blob has no shared layout.
            None => {
                if memory_id > u16::MAX as u32 {
                    return Err(SbError::ValueOutOfRange {
                        field: "key_wrap_id",
                        value: memory_id as u64,
                        max: u16::MAX as u64,
                    });
                }
                CmdLoadKeyBlob::check_blob_len(data.len())?;
            }
        }
        Ok(Self {
            command_id,
            address,
            memory_id,
            data,
        })
    }

    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn memory_id(&self) -> u32 {
        self.memory_id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn key_blob(&self) -> CmdLoadKeyBlob {
        CmdLoadKeyBlob {
            offset: self.address,
            key_wrap: KeyWrap::from(self.memory_id as u16),
            data: self.data.clone(),
        }
    }

    /// Convert into the concrete command this record describes.
    pub fn into_command(self) -> Result<Command, SbError> {
        let Self {
            command_id,
            address,
            memory_id,
            data,
        } = self;
        let command = match command_id {
            CommandId::Load => Command::Load(CmdLoad {
                address,
                memory_id,
                data,
            }),
            CommandId::LoadCmac => Command::LoadCmac(CmdLoadCmac {
                address,
                memory_id,
                data,
            }),
            CommandId::LoadHashLocking => Command::LoadHashLocking(CmdLoadHashLocking {
                address,
                memory_id,
                data,
            }),
            CommandId::ProgramFuses => Command::ProgramFuses(CmdProgFuses { address, data }),
            CommandId::ProgramIfr => Command::ProgramIfr(CmdProgIfr { address, data }),
            CommandId::LoadKeyBlob => Command::LoadKeyBlob(CmdLoadKeyBlob {
                offset: address,
                key_wrap: KeyWrap::from(memory_id as u16),
                data,
            }),
            other => return Err(SbError::InvalidLoadCommandId(other)),
        };
        Ok(command)
    }
}

impl Record for CmdLoadBase {
    fn export(&self) -> Bytes {
        match LoadLayout::for_command(self.command_id) {
            Some(layout) => {
                let mut buf = export_load(self.command_id, self.address, self.memory_id, &self.data, layout);
                if self.command_id == CommandId::LoadHashLocking {
                    buf.put_bytes(0, HASH_LOCKING_RESERVED_SIZE);
                }
                buf.freeze()
            }
            None => self.key_blob().export(),
        }
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let header = BaseHeader::parse_any(data, offset)?;
        let command_id = header.command_id;
        if !command_id.is_load_like() {
            return Err(SbError::InvalidLoadCommandId(command_id));
        }
        match LoadLayout::for_command(command_id) {
            Some(layout) => {
                let fields = parse_load(data, offset, command_id, layout)?;
                if command_id == CommandId::LoadHashLocking {
                    CmdLoadHashLocking::check_reserved_hash(data, offset, fields.data.len())?;
                }
                Ok(Self {
                    command_id,
                    address: fields.address,
                    memory_id: fields.memory_id,
                    data: fields.data,
                })
            }
            None => {
                let blob = CmdLoadKeyBlob::parse(data, offset)?;
                Ok(Self {
                    command_id,
                    address: blob.offset,
                    memory_id: u16::from(blob.key_wrap) as u32,
                    data: blob.data,
                })
            }
        }
    }

    fn size(&self) -> usize {
        match LoadLayout::for_command(self.command_id) {
            Some(layout) if self.command_id == CommandId::LoadHashLocking => {
                layout.record_size(self.data.len()) + HASH_LOCKING_RESERVED_SIZE
            }
            Some(layout) => layout.record_size(self.data.len()),
            None => CmdLoadKeyBlob::record_size(self.data.len()),
        }
    }
}

/// Load data into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdLoad {
    pub address: u32,
    pub memory_id: u32,
    data: Bytes,
}

impl CmdLoad {
    pub const COMMAND_ID: CommandId = CommandId::Load;

    pub fn new(address: u32, data: impl Into<Bytes>, memory_id: u32) -> Result<Self, SbError> {
        let data = data.into();
        LoadLayout::MEMORY.wire_length(data.len())?;
        Ok(Self {
            address,
            memory_id,
            data,
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Header `length` field (payload bytes).
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }
}

impl Record for CmdLoad {
    fn export(&self) -> Bytes {
        export_load(Self::COMMAND_ID, self.address, self.memory_id, &self.data, LoadLayout::MEMORY).freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let fields = parse_load(data, offset, Self::COMMAND_ID, LoadLayout::MEMORY)?;
        Ok(Self {
            address: fields.address,
            memory_id: fields.memory_id,
            data: fields.data,
        })
    }

    fn size(&self) -> usize {
        LoadLayout::MEMORY.record_size(self.data.len())
    }
}

/// Load data and have the bootloader compute its CMAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdLoadCmac {
    pub address: u32,
    pub memory_id: u32,
    data: Bytes,
}

impl CmdLoadCmac {
    pub const COMMAND_ID: CommandId = CommandId::LoadCmac;

    pub fn new(address: u32, data: impl Into<Bytes>, memory_id: u32) -> Result<Self, SbError> {
        let data = data.into();
        LoadLayout::MEMORY.wire_length(data.len())?;
        Ok(Self {
            address,
            memory_id,
            data,
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }
}

impl Record for CmdLoadCmac {
    fn export(&self) -> Bytes {
        export_load(Self::COMMAND_ID, self.address, self.memory_id, &self.data, LoadLayout::MEMORY).freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let fields = parse_load(data, offset, Self::COMMAND_ID, LoadLayout::MEMORY)?;
        Ok(Self {
            address: fields.address,
            memory_id: fields.memory_id,
            data: fields.data,
        })
    }

    fn size(&self) -> usize {
        LoadLayout::MEMORY.record_size(self.data.len())
    }
}

/// Load data, then lock it with a hash the hardware writes into the 64 reserved
/// bytes that follow the padded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdLoadHashLocking {
    pub address: u32,
    pub memory_id: u32,
    data: Bytes,
}

impl CmdLoadHashLocking {
    pub const COMMAND_ID: CommandId = CommandId::LoadHashLocking;

    pub fn new(address: u32, data: impl Into<Bytes>, memory_id: u32) -> Result<Self, SbError> {
        let data = data.into();
        LoadLayout::MEMORY.wire_length(data.len())?;
        Ok(Self {
            address,
            memory_id,
            data,
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }

    /// The reserved hash slot must be present after the payload.
    fn check_reserved_hash(data: &[u8], offset: usize, data_len: usize) -> Result<(), SbError> {
        let hash_offset = offset + LoadLayout::MEMORY.record_size(data_len);
        slice_at(data, hash_offset, HASH_LOCKING_RESERVED_SIZE).map(|_| ())
    }
}

impl Record for CmdLoadHashLocking {
    fn export(&self) -> Bytes {
        let mut buf = export_load(Self::COMMAND_ID, self.address, self.memory_id, &self.data, LoadLayout::MEMORY);
        buf.put_bytes(0, HASH_LOCKING_RESERVED_SIZE);
        buf.freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let fields = parse_load(data, offset, Self::COMMAND_ID, LoadLayout::MEMORY)?;
        Self::check_reserved_hash(data, offset, fields.data.len())?;
        Ok(Self {
            address: fields.address,
            memory_id: fields.memory_id,
            data: fields.data,
        })
    }

    fn size(&self) -> usize {
        LoadLayout::MEMORY.record_size(self.data.len()) + HASH_LOCKING_RESERVED_SIZE
    }
}

/// Program OTP fuses. The header `length` counts 32-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdProgFuses {
    pub address: u32,
    data: Bytes,
}

impl CmdProgFuses {
    pub const COMMAND_ID: CommandId = CommandId::ProgramFuses;

    /// `data.len()` must be a multiple of 4.
    pub fn new(address: u32, data: impl Into<Bytes>) -> Result<Self, SbError> {
        let data = data.into();
        LoadLayout::WORDS.wire_length(data.len())?;
        Ok(Self { address, data })
    }

    /// Build from fuse words, each stored little endian.
    pub fn from_words(address: u32, words: &[u32]) -> Result<Self, SbError> {
        Self::new(address, words_to_bytes(words))
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn words(&self) -> Vec<u32> {
        bytes_to_words(&self.data)
    }

    /// Header `length` field (word count).
    pub fn length(&self) -> u32 {
        (self.data.len() / WORD_SIZE) as u32
    }
}

impl Record for CmdProgFuses {
    fn export(&self) -> Bytes {
        export_load(Self::COMMAND_ID, self.address, 0, &self.data, LoadLayout::WORDS).freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let fields = parse_load(data, offset, Self::COMMAND_ID, LoadLayout::WORDS)?;
        Ok(Self {
            address: fields.address,
            data: fields.data,
        })
    }

    fn size(&self) -> usize {
        LoadLayout::WORDS.record_size(self.data.len())
    }
}

/// Program the IFR (information flash region). Same layout as [`CmdProgFuses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdProgIfr {
    pub address: u32,
    data: Bytes,
}

impl CmdProgIfr {
    pub const COMMAND_ID: CommandId = CommandId::ProgramIfr;

    pub fn new(address: u32, data: impl Into<Bytes>) -> Result<Self, SbError> {
        let data = data.into();
        LoadLayout::WORDS.wire_length(data.len())?;
        Ok(Self { address, data })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn length(&self) -> u32 {
        (self.data.len() / WORD_SIZE) as u32
    }
}

impl Record for CmdProgIfr {
    fn export(&self) -> Bytes {
        export_load(Self::COMMAND_ID, self.address, 0, &self.data, LoadLayout::WORDS).freeze()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let fields = parse_load(data, offset, Self::COMMAND_ID, LoadLayout::WORDS)?;
        Ok(Self {
            address: fields.address,
            data: fields.data,
        })
    }

    fn size(&self) -> usize {
        LoadLayout::WORDS.record_size(self.data.len())
    }
}

fn words_to_bytes(words: &[u32]) -> Bytes {
    let mut buf = vec![0u8; words.len() * WORD_SIZE];
    LittleEndian::write_u32_into(words, &mut buf);
    Bytes::from(buf)
}

fn bytes_to_words(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(WORD_SIZE).map(LittleEndian::read_u32).collect()
}

impl fmt::Display for CmdLoadBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Address={:#010x}, Length={}, Memory ID={}",
            self.command_id,
            self.address,
            self.data.len(),
            self.memory_id
        )
    }
}

impl fmt::Display for CmdLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LOAD: Address={:#010x}, Length={}, Memory ID={}",
            self.address,
            self.length(),
            self.memory_id
        )
    }
}

impl fmt::Display for CmdLoadCmac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LOAD_CMAC: Address={:#010x}, Length={}, Memory ID={}",
            self.address,
            self.length(),
            self.memory_id
        )
    }
}

impl fmt::Display for CmdLoadHashLocking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LOAD_HASH_LOCKING: Address={:#010x}, Length={}, Memory ID={}",
            self.address,
            self.length(),
            self.memory_id
        )
    }
}

impl fmt::Display for CmdProgFuses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PROGRAM_FUSES: Address={:#010x}, Words=[", self.address)?;
        for (i, word) in self.words().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{word:#010x}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for CmdProgIfr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PROGRAM_IFR: Address={:#010x}, Length={} words",
            self.address,
            self.length()
        )
    }
}
