//! Codec for SB3.1 secure-boot command streams.
//!
//! Every record is exported 16-byte aligned and can be parsed back either
//! through its own type or through [`parse_command`], which dispatches on the
//! command id embedded in the header.

pub mod align;
pub mod command;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod key_blob;
pub mod load;
pub mod raw;
pub mod section;
pub mod stream;


pub use command::{Command, parse_command};
pub use commands::{CmdCall, CmdConfigureMemory, CmdCopy, CmdErase, CmdExecute, CmdFillMemory, CmdFwVersionCheck};
pub use constants::{CommandId, CounterId, KeyWrap};
pub use error::SbError;
pub use header::{BaseHeader, Record};
pub use key_blob::CmdLoadKeyBlob;
pub use load::{CmdLoad, CmdLoadBase, CmdLoadCmac, CmdLoadHashLocking, CmdProgFuses, CmdProgIfr, LoadLayout};
pub use section::CmdSectionHeader;
pub use stream::{CommandStream, SectionBlock};
