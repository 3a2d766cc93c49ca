// Wire constants for SB3.1 boot command streams

use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

/// Magic tag opening every command record
pub const TAG: u32 = 0x55AA_AA55;

/// Size of the common command header (4 x u32)
pub const HEADER_SIZE: usize = 16;

/// Size of a trailing parameter block (4 x u32)
pub const BLOCK_SIZE: usize = 16;

/// Alignment of every exported record
pub const RECORD_ALIGNMENT: usize = 16;

/// Byte offset of the command id inside a header
pub const COMMAND_ID_OFFSET: usize = 12;

/// Size of the section header record
pub const SECTION_HEADER_SIZE: usize = 16;

/// Zeroed space reserved after a hash-locking load for the hardware-computed hash
pub const HASH_LOCKING_RESERVED_SIZE: usize = 64;

/// Size of one fuse/IFR word; wire lengths of those commands are counted in words
pub const WORD_SIZE: usize = 4;

/// Default section uid
pub const DEFAULT_SECTION_UID: u32 = 1;

/// Default section type
pub const DEFAULT_SECTION_TYPE: u32 = 1;

/// Command identifiers carried in the last header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, TryFromPrimitive, IntoPrimitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum CommandId {
    Erase = 0x01,
    Load = 0x02,
    Execute = 0x03,
    Call = 0x04,
    ProgramFuses = 0x05,
    ProgramIfr = 0x06,
    LoadCmac = 0x07,
    Copy = 0x08,
    LoadHashLocking = 0x09,
    LoadKeyBlob = 0x0A,
    ConfigureMemory = 0x0B,
    FillMemory = 0x0C,
    FwVersionCheck = 0x0D,
}

impl CommandId {
    /// Commands whose payload is an opaque data blob.
    pub const LOAD_LIKE: [CommandId; 6] = [
        CommandId::Load,
        CommandId::LoadCmac,
        CommandId::LoadHashLocking,
        CommandId::LoadKeyBlob,
        CommandId::ProgramFuses,
        CommandId::ProgramIfr,
    ];

    pub fn is_load_like(&self) -> bool {
        Self::LOAD_LIKE.contains(self)
    }
}

/// Key wrapping schemes accepted by `LOAD_KEY_BLOB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromPrimitive, IntoPrimitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum KeyWrap {
    NxpCustKekIntSk = 16,
    NxpCustKekExtSk = 17,

    #[num_enum(catch_all)]
    Unknown(u16),
}

impl KeyWrap {
    /// Look up a key wrap by its constant name, e.g. `NXP_CUST_KEK_EXT_SK`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NXP_CUST_KEK_INT_SK" => Some(KeyWrap::NxpCustKekIntSk),
            "NXP_CUST_KEK_EXT_SK" => Some(KeyWrap::NxpCustKekExtSk),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, KeyWrap::Unknown(_))
    }
}

/// Monotonic counters checked by `FW_VERSION_CHECK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromPrimitive, IntoPrimitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum CounterId {
    None = 0,
    Nonsecure = 1,
    Secure = 2,
    Radio = 3,
    Snt = 4,
    Bootloader = 5,

    #[num_enum(catch_all)]
    Unknown(u32),
}

impl CounterId {
    /// Look up a counter by its constant name, e.g. `SECURE`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(CounterId::None),
            "NONSECURE" => Some(CounterId::Nonsecure),
            "SECURE" => Some(CounterId::Secure),
            "RADIO" => Some(CounterId::Radio),
            "SNT" => Some(CounterId::Snt),
            "BOOTLOADER" => Some(CounterId::Bootloader),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CounterId::Unknown(_))
    }
}
