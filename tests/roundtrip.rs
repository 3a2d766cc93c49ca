//! Tests for export/parse round-trip integrity

mod common;

use common::*;

#[test]
fn test_every_command_roundtrips_through_its_own_parser() {
    init_tracing();
    for command in sample_commands() {
        let bytes = command.export();
        let parsed = match &command {
            Command::Erase(_) => CmdErase::parse(&bytes, 0).map(Command::from),
            Command::Load(_) => CmdLoad::parse(&bytes, 0).map(Command::from),
            Command::Execute(_) => CmdExecute::parse(&bytes, 0).map(Command::from),
            Command::Call(_) => CmdCall::parse(&bytes, 0).map(Command::from),
            Command::ProgramFuses(_) => CmdProgFuses::parse(&bytes, 0).map(Command::from),
            Command::ProgramIfr(_) => CmdProgIfr::parse(&bytes, 0).map(Command::from),
            Command::LoadCmac(_) => CmdLoadCmac::parse(&bytes, 0).map(Command::from),
            Command::Copy(_) => CmdCopy::parse(&bytes, 0).map(Command::from),
            Command::LoadHashLocking(_) => CmdLoadHashLocking::parse(&bytes, 0).map(Command::from),
            Command::LoadKeyBlob(_) => CmdLoadKeyBlob::parse(&bytes, 0).map(Command::from),
            Command::ConfigureMemory(_) => CmdConfigureMemory::parse(&bytes, 0).map(Command::from),
            Command::FillMemory(_) => CmdFillMemory::parse(&bytes, 0).map(Command::from),
            Command::FwVersionCheck(_) => CmdFwVersionCheck::parse(&bytes, 0).map(Command::from),
        }
        .unwrap_or_else(|e| panic!("{} failed to parse: {e}", command.command_id()));

        assert_eq!(parsed, command, "Round-trip changed {}", command.command_id());
    }
}

#[test]
fn test_every_command_roundtrips_through_dispatch() {
    for command in sample_commands() {
        let bytes = command.export();
        let parsed = parse_command(&bytes, 0).expect("Failed to dispatch record");
        assert_eq!(parsed, command);
        assert_eq!(parsed.export(), bytes, "Re-export should preserve bytes exactly");
    }
}

#[test]
fn test_every_export_is_16_byte_aligned() {
    for command in sample_commands() {
        let bytes = command.export();
        assert_eq!(bytes.len() % 16, 0, "{} exported {} bytes", command.command_id(), bytes.len());
        assert_eq!(command.size(), bytes.len(), "size() disagrees with export for {}", command.command_id());
    }
    assert_eq!(CmdSectionHeader::new(0).export().len(), 16);
}

#[test]
fn test_load_payload_lengths_around_alignment() {
    for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let load = CmdLoad::new(0x2000_0000, data.clone(), 5).unwrap();
        let bytes = load.export();
        assert_eq!(bytes.len() % 16, 0);
        let parsed = CmdLoad::parse(&bytes, 0).unwrap();
        assert_eq!(parsed.data().as_ref(), data.as_slice(), "payload of {len} bytes");
        assert_eq!(parsed.memory_id, 5);
    }
}

#[test]
fn test_fuse_scaling_on_wire() {
    let data: Vec<u8> = (0..12).collect();
    let fuses = CmdProgFuses::new(0x10, data.clone()).unwrap();
    let bytes = fuses.export();

    let wire_length = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    assert_eq!(wire_length, 3, "Header length must count words");

    let parsed = CmdProgFuses::parse(&bytes, 0).unwrap();
    assert_eq!(parsed.data().as_ref(), data.as_slice());

    let ifr = CmdProgIfr::new(0x10, data.clone()).unwrap();
    let ifr_bytes = ifr.export();
    assert_eq!(u32::from_le_bytes(ifr_bytes[8..12].try_into().unwrap()), 3);
    assert_eq!(CmdProgIfr::parse(&ifr_bytes, 0).unwrap().data().as_ref(), data.as_slice());
}

#[test]
fn test_section_header_roundtrip() {
    let header = CmdSectionHeader::with_ids(0x1234, 7, 2);
    assert_eq!(CmdSectionHeader::parse(&header.export(), 0).unwrap(), header);
}

#[test]
fn test_load_base_roundtrip_for_key_blob() {
    let blob = CmdLoadKeyBlob::new(0x30, KeyWrap::NxpCustKekIntSk, vec![9u8; 32]).unwrap();
    let bytes = blob.export();

    let base = CmdLoadBase::parse(&bytes, 0).unwrap();
    assert_eq!(base.command_id(), CommandId::LoadKeyBlob);
    assert_eq!(base.address(), 0x30);
    assert_eq!(base.memory_id(), 16);
    assert_eq!(base.export(), bytes);
    assert_eq!(base.into_command().unwrap(), Command::LoadKeyBlob(blob));
}

#[test]
fn test_known_wire_images() {
    let test_cases: Vec<(&str, Command, &str)> = vec![
        (
            "erase",
            CmdErase::new(0x1000, 0x2000, 1).into(),
            "55aaaa55001000000020000001000000\
             01000000000000000000000000000000",
        ),
        (
            "load",
            CmdLoad::new(0x2000, &b"ABCD"[..], 0).unwrap().into(),
            "55aaaa55002000000400000002000000\
             00000000000000000000000000000000\
             41424344000000000000000000000000",
        ),
        (
            "key blob",
            CmdLoadKeyBlob::new(0x20, KeyWrap::NxpCustKekExtSk, vec![0xC3u8; 4])
                .unwrap()
                .into(),
            "55aaaa5520000000110004000a000000\
             c3c3c3c3000000000000000000000000",
        ),
        (
            "fw version check",
            CmdFwVersionCheck::new(12, CounterId::Nonsecure).into(),
            "55aaaa550c000000010000000d000000",
        ),
    ];

    for (description, command, hex) in test_cases {
        let expected = hex_to_bytes(hex);
        assert_eq!(command.export().as_ref(), expected.as_slice(), "{description}");
        assert_eq!(parse_command(&expected, 0).unwrap(), command, "{description}");
    }
}
