//! Tests for signature decoding and scanning

use memsig_core::error::ErrorKind;
use memsig_core::signature::{Signature, MAX_SIGNATURE_LEN};

#[test]
fn test_noclip_signature()
{
    let sig: Signature = "F6 47 3B 02 ?? 3E 8D 83 83 C1 FF FF".parse().unwrap();
    assert_eq!(sig.len(), 12);
    assert_eq!(sig.bytes()[..4], [0xF6, 0x47, 0x3B, 0x02]);
    assert_eq!(sig.mask()[4], 0x00);
    assert!(sig.mask().iter().enumerate().all(|(i, &m)| i == 4 || m == 0xFF));

    let memory = [0xF6, 0x47, 0x3B, 0x02, 0x12, 0x3E, 0x8D, 0x83, 0x83, 0xC1, 0xFF, 0xFF];
    assert!(sig.matches(&memory));
}

#[test]
fn test_nibble_wildcards()
{
    let low = Signature::parse("?3").unwrap();
    assert!(low.matches(&[0x03]));
    assert!(low.matches(&[0xF3]));
    assert!(!low.matches(&[0x34]));

    let high = Signature::parse("A?").unwrap();
    assert!(high.matches(&[0xA0]));
    assert!(high.matches(&[0xAF]));
    assert!(!high.matches(&[0xBA]));
}

#[test]
fn test_single_character_tokens()
{
    // A single hex digit is the low nibble with a zero high nibble.
    let digit = Signature::parse("7").unwrap();
    assert_eq!((digit.bytes()[0], digit.mask()[0]), (0x07, 0xFF));

    // A lone `?` only frees the low nibble.
    let lone = Signature::parse("?").unwrap();
    assert_eq!((lone.bytes()[0], lone.mask()[0]), (0x00, 0xF0));
    assert!(!lone.matches(&[0x74]));
}

#[test]
fn test_short_data_does_not_match()
{
    let sig = Signature::parse("90 90").unwrap();
    assert!(!sig.matches(&[0x90]));
}

#[test]
fn test_errors()
{
    assert_eq!(Signature::parse("").unwrap_err().kind(), ErrorKind::Logic);
    assert_eq!(Signature::parse("F6 G7").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(Signature::parse("F6 ???").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(
        Signature::exact(&vec![0u8; MAX_SIGNATURE_LEN]).unwrap_err().kind(),
        ErrorKind::Logic
    );
}

#[test]
fn test_display_is_canonical()
{
    let sig = Signature::parse("f6 47 ?? a? ?3").unwrap();
    assert_eq!(sig.to_string(), "F6 47 ?? A? ?3");
    assert_eq!(sig.to_string().parse::<Signature>().unwrap(), sig);
}
