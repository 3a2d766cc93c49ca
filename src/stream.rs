//! Contiguous sequences of command records.

use crate::command::{Command, parse_command};
use crate::constants::SECTION_HEADER_SIZE;
use crate::error::SbError;
use crate::header::Record;
use crate::raw::slice_at;
use crate::section::CmdSectionHeader;
use bytes::{Bytes, BytesMut};
use std::fmt;
use tracing::debug;

/// Commands in execution order, exported back to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStream {
    pub commands: Vec<Command>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: impl Into<Command>) {
        self.commands.push(command.into());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Total exported size in bytes.
    pub fn size(&self) -> usize {
        self.commands.iter().map(Command::size).sum()
    }

    pub fn export(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size());
        for command in &self.commands {
            buf.extend_from_slice(&command.export());
        }
        buf.freeze()
    }

    /// Parse every record in `data`. The buffer must hold whole records only.
    pub fn parse(data: &[u8]) -> Result<Self, SbError> {
        let mut commands = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let command = parse_command(data, offset)?;
            let end = offset
                .checked_add(command.size())
                .filter(|end| *end <= data.len())
                .ok_or(SbError::InsufficientData {
                    expected: offset.saturating_add(command.size()),
                    actual: data.len(),
                })?;
            offset = end;
            commands.push(command);
        }
        debug!(count = commands.len(), bytes = data.len(), "parsed command stream");
        Ok(Self { commands })
    }
}

impl FromIterator<Command> for CommandStream {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandStream {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for CommandStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, command) in self.commands.iter().enumerate() {
            writeln!(f, "{index:>3}: {command}")?;
        }
        Ok(())
    }
}

/// A section header followed by the commands it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub section_uid: u32,
    pub section_type: u32,
    pub commands: CommandStream,
}

impl SectionBlock {
    pub fn new(section_uid: u32, section_type: u32, commands: CommandStream) -> Self {
        Self {
            section_uid,
            section_type,
            commands,
        }
    }

    /// Header describing the current commands.
    pub fn header(&self) -> Result<CmdSectionHeader, SbError> {
        let length = self.commands.size();
        let length = u32::try_from(length).map_err(|_| SbError::ValueOutOfRange {
            field: "section length",
            value: length as u64,
            max: u32::MAX as u64,
        })?;
        Ok(CmdSectionHeader::with_ids(length, self.section_uid, self.section_type))
    }

    pub fn export(&self) -> Result<Bytes, SbError> {
        let header = self.header()?;
        let mut buf = BytesMut::with_capacity(SECTION_HEADER_SIZE + header.length as usize);
        buf.extend_from_slice(&header.export());
        buf.extend_from_slice(&self.commands.export());
        Ok(buf.freeze())
    }

    /// Parse a section at `offset`; exactly `length` bytes of commands follow the header.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, SbError> {
        let header = CmdSectionHeader::parse(data, offset)?;
        let body = slice_at(data, offset + SECTION_HEADER_SIZE, header.length as usize)?;
        debug!(
            uid = header.section_uid,
            section_type = header.section_type,
            length = header.length,
            "parsing section"
        );
        Ok(Self {
            section_uid: header.section_uid,
            section_type: header.section_type,
            commands: CommandStream::parse(body)?,
        })
    }
}
