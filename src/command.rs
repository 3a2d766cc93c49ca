//! The closed set of command records and the id-based dispatcher.

use crate::commands::{CmdCall, CmdConfigureMemory, CmdCopy, CmdErase, CmdExecute, CmdFillMemory, CmdFwVersionCheck};
use crate::constants::CommandId;
use crate::error::SbError;
use crate::header::Record;
use crate::key_blob::CmdLoadKeyBlob;
use crate::load::{CmdLoad, CmdLoadCmac, CmdLoadHashLocking, CmdProgFuses, CmdProgIfr};
use crate::raw::{RawHeader, check_tag, read_at};
use bytes::Bytes;
use std::fmt;
use tracing::debug;

/// Any command record of a boot command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Erase(CmdErase),
    Load(CmdLoad),
    Execute(CmdExecute),
    Call(CmdCall),
    ProgramFuses(CmdProgFuses),
    ProgramIfr(CmdProgIfr),
    LoadCmac(CmdLoadCmac),
    Copy(CmdCopy),
    LoadHashLocking(CmdLoadHashLocking),
    LoadKeyBlob(CmdLoadKeyBlob),
    ConfigureMemory(CmdConfigureMemory),
    FillMemory(CmdFillMemory),
    FwVersionCheck(CmdFwVersionCheck),
}

impl Command {
    pub fn command_id(&self) -> CommandId {
        match self {
            Command::Erase(_) => CommandId::Erase,
            Command::Load(_) => CommandId::Load,
            Command::Execute(_) => CommandId::Execute,
            Command::Call(_) => CommandId::Call,
            Command::ProgramFuses(_) => CommandId::ProgramFuses,
            Command::ProgramIfr(_) => CommandId::ProgramIfr,
            Command::LoadCmac(_) => CommandId::LoadCmac,
            Command::Copy(_) => CommandId::Copy,
            Command::LoadHashLocking(_) => CommandId::LoadHashLocking,
            Command::LoadKeyBlob(_) => CommandId::LoadKeyBlob,
            Command::ConfigureMemory(_) => CommandId::ConfigureMemory,
            Command::FillMemory(_) => CommandId::FillMemory,
            Command::FwVersionCheck(_) => CommandId::FwVersionCheck,
        }
    }

    fn as_record(&self) -> &dyn RecordExport {
        match self {
            Command::Erase(cmd) => cmd,
            Command::Load(cmd) => cmd,
            Command::Execute(cmd) => cmd,
            Command::Call(cmd) => cmd,
            Command::ProgramFuses(cmd) => cmd,
            Command::ProgramIfr(cmd) => cmd,
            Command::LoadCmac(cmd) => cmd,
            Command::Copy(cmd) => cmd,
            Command::LoadHashLocking(cmd) => cmd,
            Command::LoadKeyBlob(cmd) => cmd,
            Command::ConfigureMemory(cmd) => cmd,
            Command::FillMemory(cmd) => cmd,
            Command::FwVersionCheck(cmd) => cmd,
        }
    }

    pub fn export(&self) -> Bytes {
        self.as_record().export_record()
    }

    pub fn size(&self) -> usize {
        self.as_record().record_size()
    }

    /// Parse the record at `offset`, whatever its kind.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        parse_command(data, offset)
    }
}

/// Object-safe half of [`Record`].
trait RecordExport: fmt::Display {
    fn export_record(&self) -> Bytes;
    fn record_size(&self) -> usize;
}

impl<T: Record + fmt::Display> RecordExport for T {
    fn export_record(&self) -> Bytes {
        self.export()
    }

    fn record_size(&self) -> usize {
        self.size()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_record(), f)
    }
}

macro_rules! impl_from_command {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(cmd: $ty) -> Self {
                    Command::$variant(cmd)
                }
            }
        )*
    };
}

impl_from_command!(
    Erase(CmdErase),
    Load(CmdLoad),
    Execute(CmdExecute),
    Call(CmdCall),
    ProgramFuses(CmdProgFuses),
    ProgramIfr(CmdProgIfr),
    LoadCmac(CmdLoadCmac),
    Copy(CmdCopy),
    LoadHashLocking(CmdLoadHashLocking),
    LoadKeyBlob(CmdLoadKeyBlob),
    ConfigureMemory(CmdConfigureMemory),
    FillMemory(CmdFillMemory),
    FwVersionCheck(CmdFwVersionCheck),
);

type ParseFn = fn(&[u8], usize) -> Result<Command, SbError>;

fn parse_as<T: Record + Into<Command>>(data: &[u8], offset: usize) -> Result<Command, SbError> {
    T::parse(data, offset).map(Into::into)
}

/// Command id to parser table.
static COMMAND_PARSERS: [(CommandId, ParseFn); 13] = [
    (CommandId::Erase, parse_as::<CmdErase>),
    (CommandId::Load, parse_as::<CmdLoad>),
    (CommandId::Execute, parse_as::<CmdExecute>),
    (CommandId::Call, parse_as::<CmdCall>),
    (CommandId::ProgramFuses, parse_as::<CmdProgFuses>),
    (CommandId::ProgramIfr, parse_as::<CmdProgIfr>),
    (CommandId::LoadCmac, parse_as::<CmdLoadCmac>),
    (CommandId::Copy, parse_as::<CmdCopy>),
    (CommandId::LoadHashLocking, parse_as::<CmdLoadHashLocking>),
    (CommandId::LoadKeyBlob, parse_as::<CmdLoadKeyBlob>),
    (CommandId::ConfigureMemory, parse_as::<CmdConfigureMemory>),
    (CommandId::FillMemory, parse_as::<CmdFillMemory>),
    (CommandId::FwVersionCheck, parse_as::<CmdFwVersionCheck>),
];

fn parser_for(id: u32) -> Option<ParseFn> {
    COMMAND_PARSERS
        .iter()
        .find(|(command_id, _)| u32::from(*command_id) == id)
        .map(|(_, parser)| *parser)
}

/// Parse one command record at `offset`, dispatching on the command id found
/// at byte 12 of its header.
pub fn parse_command(data: &[u8], offset: usize) -> Result<Command, SbError> {
    let header: RawHeader = read_at(data, offset)?;
    check_tag(header.tag.get())?;

    let id = header.command_id.get();
    let parser = parser_for(id).ok_or(SbError::UnknownCommandId(id))?;
    let command = parser(data, offset)?;
    debug!(offset, command = %command.command_id(), size = command.size(), "parsed command");
    Ok(command)
}
