//! Tests for whole command streams and sections

mod common;

use common::*;

#[test]
fn test_stream_roundtrip() {
    init_tracing();
    let stream: CommandStream = sample_commands().into_iter().collect();
    let bytes = stream.export();
    assert_eq!(bytes.len(), stream.size());
    assert_eq!(bytes.len() % 16, 0);

    let parsed = CommandStream::parse(&bytes).unwrap();
    assert_eq!(parsed.len(), sample_commands().len());
    assert_eq!(parsed, stream);
}

#[test]
fn test_empty_stream() {
    let stream = CommandStream::new();
    assert!(stream.export().is_empty());
    assert!(CommandStream::parse(&[]).unwrap().is_empty());
}

#[test]
fn test_stream_with_trailing_garbage_fails() {
    let mut stream = CommandStream::new();
    stream.push(CmdErase::new(0, 0x1000, 0));
    stream.push(CmdExecute::new(0));
    let mut bytes = stream.export().to_vec();
    bytes.extend_from_slice(&[0u8; 8]);

    assert!(matches!(
        CommandStream::parse(&bytes),
        Err(SbError::InsufficientData { .. })
    ));
}

#[test]
fn test_stream_with_truncated_padding_fails() {
    let mut stream = CommandStream::new();
    stream.push(CmdLoad::new(0x2000, &b"ABCD"[..], 0).unwrap());
    let bytes = stream.export();
    assert_eq!(bytes.len(), 48);

    // Payload ends at byte 36; the alignment padding is cut off.
    match CommandStream::parse(&bytes[..36]) {
        Err(SbError::InsufficientData { expected, actual }) => {
            assert_eq!(expected, 48);
            assert_eq!(actual, 36);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_stream_with_corrupted_record_fails() {
    let stream: CommandStream = sample_commands().into_iter().collect();
    let bytes = stream.export();
    let second = sample_commands()[0].size();
    let corrupted = patch_word(&bytes, second, 0);
    assert!(matches!(
        CommandStream::parse(&corrupted),
        Err(SbError::InvalidTag { .. })
    ));
}

#[test]
fn test_section_block_roundtrip() {
    let commands: CommandStream = sample_commands().into_iter().collect();
    let section = SectionBlock::new(1, 1, commands.clone());
    let bytes = section.export().unwrap();

    let header = CmdSectionHeader::parse(&bytes, 0).unwrap();
    assert_eq!(header.length as usize, commands.size());
    assert_eq!(bytes.len(), 16 + commands.size());

    let parsed = SectionBlock::parse(&bytes, 0).unwrap();
    assert_eq!(parsed, section);
}

#[test]
fn test_section_block_truncated_body() {
    let mut commands = CommandStream::new();
    commands.push(CmdExecute::new(0x100));
    let bytes = SectionBlock::new(2, 3, commands).export().unwrap();
    assert!(SectionBlock::parse(&bytes[..24], 0).is_err());
}

#[test]
fn test_stream_display_lists_commands() {
    let mut stream = CommandStream::new();
    stream.push(CmdExecute::new(0x100));
    let text = stream.to_string();
    assert!(text.contains("EXECUTE: Address=0x00000100"));
}

#[test]
fn test_section_length_cutting_into_padding_fails() {
    let mut commands = CommandStream::new();
    commands.push(CmdLoad::new(0x2000, &b"ABCD"[..], 0).unwrap());
    let bytes = SectionBlock::new(1, 1, commands).export().unwrap();
    assert_eq!(bytes.len(), 16 + 48);

    let short = patch_word(&bytes, 8, 36);
    assert!(matches!(
        SectionBlock::parse(&short, 0),
        Err(SbError::InsufficientData { expected: 48, actual: 36 })
    ));
}
