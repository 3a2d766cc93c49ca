//! Fixed-shape commands: a header, optionally followed by one four-word block.

use crate::constants::{BLOCK_SIZE, CommandId, CounterId, HEADER_SIZE};
use crate::error::SbError;
use crate::header::{BaseHeader, Record};
use crate::raw::{RawBlock, expect_zero, read_at};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::warn;
use zerocopy::IntoBytes;

fn export_with_block(header: BaseHeader, block: [u32; 4]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + BLOCK_SIZE);
    header.write_to(&mut buf);
    buf.put_slice(RawBlock::new(block).as_bytes());
    buf.freeze()
}

/// Erase a memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdErase {
    pub address: u32,
    pub length: u32,
    pub memory_id: u32,
}

impl CmdErase {
    pub const COMMAND_ID: CommandId = CommandId::Erase;

    pub fn new(address: u32, length: u32, memory_id: u32) -> Self {
        Self {
            address,
            length,
            memory_id,
        }
    }
}

impl Record for CmdErase {
    fn export(&self) -> Bytes {
        export_with_block(
            BaseHeader::new(Self::COMMAND_ID, self.address, self.length),
            [self.memory_id, 0, 0, 0],
        )
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (address, length) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        let block: RawBlock = read_at(data, offset + HEADER_SIZE)?;
        block.expect_reserved_from(1, "erase padding")?;
        Ok(Self::new(address, length, block.word(0)))
    }

    fn size(&self) -> usize {
        HEADER_SIZE + BLOCK_SIZE
    }
}

/// Jump to `address`; does not return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdExecute {
    pub address: u32,
}

impl CmdExecute {
    pub const COMMAND_ID: CommandId = CommandId::Execute;

    pub fn new(address: u32) -> Self {
        Self { address }
    }
}

impl Record for CmdExecute {
    fn export(&self) -> Bytes {
        BaseHeader::new(Self::COMMAND_ID, self.address, 0).export()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (address, length) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        expect_zero("execute length", length)?;
        Ok(Self::new(address))
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

/// Call the function at `address` and continue with the next command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdCall {
    pub address: u32,
}

impl CmdCall {
    pub const COMMAND_ID: CommandId = CommandId::Call;

    pub fn new(address: u32) -> Self {
        Self { address }
    }
}

impl Record for CmdCall {
    fn export(&self) -> Bytes {
        BaseHeader::new(Self::COMMAND_ID, self.address, 0).export()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (address, length) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        expect_zero("call length", length)?;
        Ok(Self::new(address))
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

/// Copy `length` bytes from `address` in `memory_id_from` to
/// `destination_address` in `memory_id_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdCopy {
    pub address: u32,
    pub length: u32,
    pub destination_address: u32,
    pub memory_id_from: u32,
    pub memory_id_to: u32,
}

impl CmdCopy {
    pub const COMMAND_ID: CommandId = CommandId::Copy;

    pub fn new(address: u32, length: u32, destination_address: u32, memory_id_from: u32, memory_id_to: u32) -> Self {
        Self {
            address,
            length,
            destination_address,
            memory_id_from,
            memory_id_to,
        }
    }
}

impl Record for CmdCopy {
    fn export(&self) -> Bytes {
        export_with_block(
            BaseHeader::new(Self::COMMAND_ID, self.address, self.length),
            [self.destination_address, self.memory_id_from, self.memory_id_to, 0],
        )
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (address, length) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        let block: RawBlock = read_at(data, offset + HEADER_SIZE)?;
        block.expect_reserved_from(3, "copy padding")?;
        Ok(Self::new(address, length, block.word(0), block.word(1), block.word(2)))
    }

    fn size(&self) -> usize {
        HEADER_SIZE + BLOCK_SIZE
    }
}

/// Fill `length` bytes at `address` with a repeated 32-bit `pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdFillMemory {
    pub address: u32,
    pub length: u32,
    pub pattern: u32,
}

impl CmdFillMemory {
    pub const COMMAND_ID: CommandId = CommandId::FillMemory;

    pub fn new(address: u32, length: u32, pattern: u32) -> Self {
        Self {
            address,
            length,
            pattern,
        }
    }
}

impl Record for CmdFillMemory {
    fn export(&self) -> Bytes {
        export_with_block(
            BaseHeader::new(Self::COMMAND_ID, self.address, self.length),
            [self.pattern, 0, 0, 0],
        )
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (address, length) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        let block: RawBlock = read_at(data, offset + HEADER_SIZE)?;
        block.expect_reserved_from(1, "fill padding")?;
        Ok(Self::new(address, length, block.word(0)))
    }

    fn size(&self) -> usize {
        HEADER_SIZE + BLOCK_SIZE
    }
}

/// Configure an external memory from the configuration block at `address`.
///
/// On the wire the header address slot holds `memory_id` and the length slot
/// holds `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdConfigureMemory {
    pub address: u32,
    pub memory_id: u32,
}

impl CmdConfigureMemory {
    pub const COMMAND_ID: CommandId = CommandId::ConfigureMemory;

    pub fn new(address: u32, memory_id: u32) -> Self {
        Self { address, memory_id }
    }
}

impl Record for CmdConfigureMemory {
    fn export(&self) -> Bytes {
        BaseHeader::new(Self::COMMAND_ID, self.memory_id, self.address).export()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (memory_id, address) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        Ok(Self::new(address, memory_id))
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

/// Reject the image unless `value` is at least the monotonic counter `counter_id`.
///
/// The header address slot holds `value` and the length slot `counter_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdFwVersionCheck {
    pub value: u32,
    pub counter_id: CounterId,
}

impl CmdFwVersionCheck {
    pub const COMMAND_ID: CommandId = CommandId::FwVersionCheck;

    pub fn new(value: u32, counter_id: CounterId) -> Self {
        Self { value, counter_id }
    }
}

impl Record for CmdFwVersionCheck {
    fn export(&self) -> Bytes {
        BaseHeader::new(Self::COMMAND_ID, self.value, self.counter_id.into()).export()
    }

    fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let (value, counter) = BaseHeader::header_parse(data, offset, Self::COMMAND_ID)?;
        let counter_id = CounterId::from(counter);
        if !counter_id.is_known() {
            warn!(counter_id = counter, "version check uses an unknown counter id");
        }
        Ok(Self::new(value, counter_id))
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

impl fmt::Display for CmdErase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERASE: Address={:#010x}, Length={}, Memory ID={}",
            self.address, self.length, self.memory_id
        )
    }
}

impl fmt::Display for CmdExecute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EXECUTE: Address={:#010x}", self.address)
    }
}

impl fmt::Display for CmdCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CALL: Address={:#010x}", self.address)
    }
}

impl fmt::Display for CmdCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "COPY: Address={:#010x}, Length={}, Destination={:#010x}, Memory ID from={}, Memory ID to={}",
            self.address, self.length, self.destination_address, self.memory_id_from, self.memory_id_to
        )
    }
}

impl fmt::Display for CmdFillMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FILL_MEMORY: Address={:#010x}, Length={}, Pattern={:#010x}",
            self.address, self.length, self.pattern
        )
    }
}

impl fmt::Display for CmdConfigureMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CONFIGURE_MEMORY: Address={:#010x}, Memory ID={}",
            self.address, self.memory_id
        )
    }
}

impl fmt::Display for CmdFwVersionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FW_VERSION_CHECK: Value={}, Counter={}",
            self.value, self.counter_id
        )
    }
}
