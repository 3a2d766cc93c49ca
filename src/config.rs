//! JSON description of a command list.
//!
//! ```json
//! { "commands": [
//!     { "erase": { "address": 4096, "size": 8192, "memoryId": 1 } },
//!     { "load": { "address": 8192, "data": "41424344" } },
//!     { "execute": { "address": 8192 } }
//! ] }
//! ```
//!
//! Binary payloads are hex strings. Key wraps and counters are given by
//! constant name or by number.

use crate::command::Command;
use crate::commands::{CmdCall, CmdConfigureMemory, CmdCopy, CmdErase, CmdExecute, CmdFillMemory, CmdFwVersionCheck};
use crate::constants::{CounterId, KeyWrap};
use crate::error::SbError;
use crate::key_blob::CmdLoadKeyBlob;
use crate::load::{CmdLoad, CmdLoadCmac, CmdLoadHashLocking, CmdProgFuses, CmdProgIfr};
use crate::stream::CommandStream;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    pub commands: Vec<CommandSpec>,
}

impl CommandConfig {
    pub fn from_json(json: &str) -> Result<Self, SbError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SbError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build every described command, stopping at the first invalid one.
    pub fn into_stream(self) -> Result<CommandStream, SbError> {
        self.commands.iter().map(CommandSpec::build).collect()
    }

    /// Describe an existing stream.
    pub fn from_stream(stream: &CommandStream) -> Self {
        Self {
            commands: stream.iter().map(CommandSpec::from).collect(),
        }
    }
}

/// Named enumeration value: a constant name or its raw number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Name(String),
    Number(u32),
}

impl EnumValue {
    fn key_wrap(&self) -> Result<KeyWrap, SbError> {
        match self {
            EnumValue::Name(name) => {
                KeyWrap::from_name(name).ok_or_else(|| SbError::Config(format!("unknown key wrap `{name}`")))
            }
            EnumValue::Number(value) => u16::try_from(*value)
                .map(KeyWrap::from)
                .map_err(|_| SbError::Config(format!("key wrap id {value} does not fit in 16 bits"))),
        }
    }

    fn counter_id(&self) -> Result<CounterId, SbError> {
        match self {
            EnumValue::Name(name) => {
                CounterId::from_name(name).ok_or_else(|| SbError::Config(format!("unknown counter `{name}`")))
            }
            EnumValue::Number(value) => Ok(CounterId::from(*value)),
        }
    }
}

impl From<KeyWrap> for EnumValue {
    fn from(key_wrap: KeyWrap) -> Self {
        match key_wrap {
            KeyWrap::Unknown(value) => EnumValue::Number(value as u32),
            known => EnumValue::Name(known.to_string()),
        }
    }
}

impl From<CounterId> for EnumValue {
    fn from(counter_id: CounterId) -> Self {
        match counter_id {
            CounterId::Unknown(value) => EnumValue::Number(value),
            known => EnumValue::Name(known.to_string()),
        }
    }
}

/// One command, keyed by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandSpec {
    Erase {
        address: u32,
        size: u32,
        #[serde(default)]
        memory_id: u32,
    },
    Load {
        address: u32,
        data: String,
        #[serde(default)]
        memory_id: u32,
    },
    LoadCmac {
        address: u32,
        data: String,
        #[serde(default)]
        memory_id: u32,
    },
    LoadHashLocking {
        address: u32,
        data: String,
        #[serde(default)]
        memory_id: u32,
    },
    Execute {
        address: u32,
    },
    Call {
        address: u32,
    },
    ProgramFuses {
        address: u32,
        values: Vec<u32>,
    },
    ProgramIfr {
        address: u32,
        data: String,
    },
    Copy {
        address: u32,
        size: u32,
        destination_address: u32,
        #[serde(default)]
        memory_id_from: u32,
        #[serde(default)]
        memory_id_to: u32,
    },
    LoadKeyBlob {
        offset: u32,
        wrapping_key_id: EnumValue,
        data: String,
    },
    ConfigureMemory {
        address: u32,
        #[serde(default)]
        memory_id: u32,
    },
    FillMemory {
        address: u32,
        size: u32,
        pattern: u32,
    },
    FwVersionCheck {
        value: u32,
        counter_id: EnumValue,
    },
}

fn decode_hex(field: &str) -> Result<Vec<u8>, SbError> {
    let digits = field.strip_prefix("0x").unwrap_or(field);
    Ok(hex::decode(digits)?)
}

impl CommandSpec {
    pub fn build(&self) -> Result<Command, SbError> {
        let command = match self {
            CommandSpec::Erase {
                address,
                size,
                memory_id,
            } => CmdErase::new(*address, *size, *memory_id).into(),
            CommandSpec::Load {
                address,
                data,
                memory_id,
            } => CmdLoad::new(*address, decode_hex(data)?, *memory_id)?.into(),
            CommandSpec::LoadCmac {
                address,
                data,
                memory_id,
            } => CmdLoadCmac::new(*address, decode_hex(data)?, *memory_id)?.into(),
            CommandSpec::LoadHashLocking {
                address,
                data,
                memory_id,
            } => CmdLoadHashLocking::new(*address, decode_hex(data)?, *memory_id)?.into(),
            CommandSpec::Execute { address } => CmdExecute::new(*address).into(),
            CommandSpec::Call { address } => CmdCall::new(*address).into(),
            CommandSpec::ProgramFuses { address, values } => CmdProgFuses::from_words(*address, values)?.into(),
            CommandSpec::ProgramIfr { address, data } => CmdProgIfr::new(*address, decode_hex(data)?)?.into(),
            CommandSpec::Copy {
                address,
                size,
                destination_address,
                memory_id_from,
                memory_id_to,
            } => CmdCopy::new(*address, *size, *destination_address, *memory_id_from, *memory_id_to).into(),
            CommandSpec::LoadKeyBlob {
                offset,
                wrapping_key_id,
                data,
            } => CmdLoadKeyBlob::new(*offset, wrapping_key_id.key_wrap()?, decode_hex(data)?)?.into(),
            CommandSpec::ConfigureMemory { address, memory_id } => CmdConfigureMemory::new(*address, *memory_id).into(),
            CommandSpec::FillMemory {
                address,
                size,
                pattern,
            } => CmdFillMemory::new(*address, *size, *pattern).into(),
            CommandSpec::FwVersionCheck { value, counter_id } => {
                CmdFwVersionCheck::new(*value, counter_id.counter_id()?).into()
            }
        };
        Ok(command)
    }
}

impl From<&Command> for CommandSpec {
    fn from(command: &Command) -> Self {
        match command {
            Command::Erase(cmd) => CommandSpec::Erase {
                address: cmd.address,
                size: cmd.length,
                memory_id: cmd.memory_id,
            },
            Command::Load(cmd) => CommandSpec::Load {
                address: cmd.address,
                data: hex::encode(cmd.data()),
                memory_id: cmd.memory_id,
            },
            Command::LoadCmac(cmd) => CommandSpec::LoadCmac {
                address: cmd.address,
                data: hex::encode(cmd.data()),
                memory_id: cmd.memory_id,
            },
            Command::LoadHashLocking(cmd) => CommandSpec::LoadHashLocking {
                address: cmd.address,
                data: hex::encode(cmd.data()),
                memory_id: cmd.memory_id,
            },
            Command::Execute(cmd) => CommandSpec::Execute { address: cmd.address },
            Command::Call(cmd) => CommandSpec::Call { address: cmd.address },
            Command::ProgramFuses(cmd) => CommandSpec::ProgramFuses {
                address: cmd.address,
                values: cmd.words(),
            },
            Command::ProgramIfr(cmd) => CommandSpec::ProgramIfr {
                address: cmd.address,
                data: hex::encode(cmd.data()),
            },
            Command::Copy(cmd) => CommandSpec::Copy {
                address: cmd.address,
                size: cmd.length,
                destination_address: cmd.destination_address,
                memory_id_from: cmd.memory_id_from,
                memory_id_to: cmd.memory_id_to,
            },
            Command::LoadKeyBlob(cmd) => CommandSpec::LoadKeyBlob {
                offset: cmd.offset,
                wrapping_key_id: cmd.key_wrap.into(),
                data: hex::encode(cmd.data()),
            },
            Command::ConfigureMemory(cmd) => CommandSpec::ConfigureMemory {
                address: cmd.address,
                memory_id: cmd.memory_id,
            },
            Command::FillMemory(cmd) => CommandSpec::FillMemory {
                address: cmd.address,
                size: cmd.length,
                pattern: cmd.pattern,
            },
            Command::FwVersionCheck(cmd) => CommandSpec::FwVersionCheck {
                value: cmd.value,
                counter_id: cmd.counter_id.into(),
            },
        }
    }
}
