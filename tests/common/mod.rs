//! Common test utilities and shared imports

// Shared across test files; not every file uses every item.
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use sb31_lib::constants::{COMMAND_ID_OFFSET, CommandId, CounterId, KeyWrap, TAG};
#[allow(unused_imports)]
pub use sb31_lib::{
    CmdCall, CmdConfigureMemory, CmdCopy, CmdErase, CmdExecute, CmdFillMemory, CmdFwVersionCheck, CmdLoad,
    CmdLoadBase, CmdLoadCmac, CmdLoadHashLocking, CmdLoadKeyBlob, CmdProgFuses, CmdProgIfr, CmdSectionHeader,
    Command, CommandStream, Record, SbError, SectionBlock, parse_command,
};

/// Route library tracing to the test writer; honours `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// Overwrite the little-endian word at byte `offset`.
#[allow(dead_code)]
pub fn patch_word(bytes: &[u8], offset: usize, value: u32) -> Vec<u8> {
    let mut patched = bytes.to_vec();
    patched[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    patched
}

/// One instance of every command kind.
#[allow(dead_code)]
pub fn sample_commands() -> Vec<Command> {
    vec![
        CmdErase::new(0x1000, 0x2000, 1).into(),
        CmdLoad::new(0x2000, &b"ABCD"[..], 0).unwrap().into(),
        CmdExecute::new(0x2000).into(),
        CmdCall::new(0x2100).into(),
        CmdProgFuses::from_words(0x40, &[0xDEAD_BEEF, 0x0000_0001, 0xFFFF_FFFF]).unwrap().into(),
        CmdProgIfr::new(0x80, vec![0xA5u8; 16]).unwrap().into(),
        CmdLoadCmac::new(0x3000, vec![0x01u8; 33], 3).unwrap().into(),
        CmdCopy::new(0x1000, 0x400, 0x8000_0000, 0, 9).into(),
        CmdLoadHashLocking::new(0x4000, vec![0x77u8; 7], 4).unwrap().into(),
        CmdLoadKeyBlob::new(0x20, KeyWrap::NxpCustKekExtSk, vec![0xC3u8; 40]).unwrap().into(),
        CmdConfigureMemory::new(0x2000_1000, 9).into(),
        CmdFillMemory::new(0x5000, 0x100, 0x5A5A_5A5A).into(),
        CmdFwVersionCheck::new(12, CounterId::Nonsecure).into(),
    ]
}
