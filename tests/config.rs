//! Tests for building commands from a JSON description

mod common;

use common::*;
use sb31_lib::config::{CommandConfig, CommandSpec, EnumValue};

const CONFIG: &str = r#"{
    "commands": [
        { "erase": { "address": 4096, "size": 8192, "memoryId": 1 } },
        { "load": { "address": 8192, "data": "41424344" } },
        { "programFuses": { "address": 64, "values": [1, 2] } },
        { "loadKeyBlob": { "offset": 0, "wrappingKeyId": "NXP_CUST_KEK_EXT_SK", "data": "0x00ff" } },
        { "fwVersionCheck": { "value": 3, "counterId": "SECURE" } },
        { "copy": { "address": 0, "size": 16, "destinationAddress": 4096, "memoryIdTo": 9 } },
        { "execute": { "address": 8192 } }
    ]
}"#;

#[test]
fn test_config_builds_stream() {
    let stream = CommandConfig::from_json(CONFIG).unwrap().into_stream().unwrap();
    let expected: CommandStream = vec![
        CmdErase::new(0x1000, 0x2000, 1).into(),
        CmdLoad::new(0x2000, &b"ABCD"[..], 0).unwrap().into(),
        CmdProgFuses::from_words(64, &[1, 2]).unwrap().into(),
        CmdLoadKeyBlob::new(0, KeyWrap::NxpCustKekExtSk, vec![0x00u8, 0xFF]).unwrap().into(),
        CmdFwVersionCheck::new(3, CounterId::Secure).into(),
        CmdCopy::new(0, 16, 0x1000, 0, 9).into(),
        CmdExecute::new(0x2000).into(),
    ]
    .into_iter()
    .collect();
    assert_eq!(stream, expected);
}

#[test]
fn test_config_from_stream_roundtrip() {
    let stream: CommandStream = sample_commands().into_iter().collect();
    let json = CommandConfig::from_stream(&stream).to_json().unwrap();
    let rebuilt = CommandConfig::from_json(&json).unwrap().into_stream().unwrap();
    assert_eq!(rebuilt, stream);
}

#[test]
fn test_numeric_enum_values() {
    let spec = CommandSpec::LoadKeyBlob {
        offset: 0,
        wrapping_key_id: EnumValue::Number(16),
        data: "aa".to_string(),
    };
    match spec.build().unwrap() {
        Command::LoadKeyBlob(blob) => assert_eq!(blob.key_wrap, KeyWrap::NxpCustKekIntSk),
        other => panic!("Expected LoadKeyBlob, got {:?}", other),
    }
}

#[test]
fn test_config_errors() {
    let unknown_wrap = r#"{ "commands": [ { "loadKeyBlob": { "offset": 0, "wrappingKeyId": "NOPE", "data": "" } } ] }"#;
    assert!(matches!(
        CommandConfig::from_json(unknown_wrap).unwrap().into_stream(),
        Err(SbError::Config(_))
    ));

    let bad_hex = r#"{ "commands": [ { "load": { "address": 0, "data": "zz" } } ] }"#;
    assert!(matches!(
        CommandConfig::from_json(bad_hex).unwrap().into_stream(),
        Err(SbError::Hex(_))
    ));

    let unknown_command = r#"{ "commands": [ { "reboot": { "address": 0 } } ] }"#;
    assert!(matches!(CommandConfig::from_json(unknown_command), Err(SbError::Json(_))));

    let odd_ifr = r#"{ "commands": [ { "programIfr": { "address": 0, "data": "010203" } } ] }"#;
    assert!(matches!(
        CommandConfig::from_json(odd_ifr).unwrap().into_stream(),
        Err(SbError::UnalignedWordData(3))
    ));
}
