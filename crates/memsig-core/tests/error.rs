//! Tests for error handling

use std::io;
use std::path::PathBuf;

use memsig_core::error::{ErrorKind, MemError, Result};
use memsig_core::types::{AccessMode, Address};

#[test]
fn test_process_not_found_display()
{
    let error = MemError::ProcessNotFound("ffxiv_dx11.exe".to_string());
    let message = error.to_string();
    assert!(message.contains("Failed to find process"));
    assert!(message.contains("ffxiv_dx11.exe"));
    assert_eq!(error.kind(), ErrorKind::Process);
}

#[test]
fn test_segment_error_display()
{
    let error = MemError::Process("Could not locate .text section in memory".to_string());
    assert!(error.to_string().contains(".text"));
    assert_eq!(error.kind(), ErrorKind::Process);
}

#[test]
fn test_peek_and_poke_carry_hex_offset()
{
    let peek = MemError::Peek {
        offset: Address::new(0x7ff6_1234_abcd),
        message: "Input/output error".to_string(),
    };
    assert_eq!(
        peek.to_string(),
        "Failed to read process memory at offset 0x7FF61234ABCD: Input/output error"
    );

    let poke = MemError::Poke {
        offset: Address::new(0x10),
        message: "Bad address".to_string(),
    };
    assert!(poke.to_string().contains("0x10"));
    assert_eq!(poke.kind(), ErrorKind::Poke);
}

#[test]
fn test_channel_open_display()
{
    let error = MemError::ChannelOpen {
        path: PathBuf::from("/proc/42/mem"),
        mode: AccessMode::Poke,
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    };
    let message = error.to_string();
    assert!(message.contains("writing"));
    assert!(message.contains("/proc/42/mem"));
    assert_eq!(error.kind(), ErrorKind::Channel);
}

#[test]
fn test_io_error_conversion()
{
    let error: MemError = io::Error::from(io::ErrorKind::NotFound).into();
    assert!(matches!(error, MemError::Io(_)));
    assert_eq!(error.kind(), ErrorKind::Io);
}

#[test]
fn test_error_kind_display()
{
    assert_eq!(ErrorKind::Peek.to_string(), "peek");
    assert_eq!(ErrorKind::Parse.to_string(), "parse");
}

#[test]
fn test_result_type()
{
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(MemError::Logic("test".to_string()));
}
