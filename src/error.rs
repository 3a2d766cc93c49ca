use crate::constants::CommandId;
use thiserror::Error;

/// The primary error type for the `sb31-lib` crate.
#[derive(Error, Debug)]
pub enum SbError {
    #[error("Invalid tag: expected {expected:#010x}, got {actual:#010x}")]
    InvalidTag { expected: u32, actual: u32 },

    #[error("Command id mismatch: expected {expected}, got {actual:#x}")]
    CommandIdMismatch { expected: CommandId, actual: u32 },

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Reserved field `{field}` must be zero, got {value:#x}")]
    NonZeroReserved { field: &'static str, value: u32 },

    #[error("Unknown command id: {0:#x}")]
    UnknownCommandId(u32),

    #[error("Command {0} is not a load-like command")]
    InvalidLoadCommandId(CommandId),

    #[error("Value of `{field}` out of range: {value} > {max}")]
    ValueOutOfRange { field: &'static str, value: u64, max: u64 },

    #[error("Data length {0} is not a multiple of the 4-byte word size")]
    UnalignedWordData(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}
