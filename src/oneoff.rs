//! One-off entry id encoding: a self-contained binary address descriptor for
//! a recipient not resolved against a directory.
//!
//! The output is write-only; nothing in this crate parses it back. Layout:
//! a zero version word, a 2-byte flags word, the constant 16-byte one-off
//! provider identifier, then display name / address-type string / email in
//! that order, each null-terminated, UTF-16LE or 8-bit per the unicode flag.

use uuid::Uuid;

use crate::address::{AddressType, MessageFormat};
use crate::error::MsgError;
use crate::property::value::utf16_le_bytes;

/// Provider identifier of the one-off recipient format.
pub const ONE_OFF_PROVIDER: Uuid = Uuid::from_u128(0xA41F2B81_A3BE_1910_9D6E_00DD010F5402);

const FLAG_NO_RICH_INFO: u16 = 0x0001;
const FLAG_CAN_LOOKUP: u16 = 0x1000;
const FLAG_UNICODE: u16 = 0x8000;

/// Encodes a one-off entry id for the given address.
///
/// Pure function: same inputs, same bytes. The total length is variable and
/// content-dependent; the strings are self-delimited by null terminators
/// whose unit width follows the unicode flag, so an interior NUL in any
/// input is malformed and rejected.
pub fn encode(
    email: &str,
    display_name: &str,
    address_type: AddressType,
    message_format: MessageFormat,
    can_lookup: bool,
) -> Result<Vec<u8>, MsgError> {
    for s in [display_name, email] {
        if s.contains('\0') {
            return Err(MsgError::Encoding(String::from(
                "one-off entry id strings must not contain NUL",
            )));
        }
    }

    let unicode = message_format == MessageFormat::Unicode;

    let mut flags = FLAG_NO_RICH_INFO;
    if unicode {
        flags |= FLAG_UNICODE;
    }
    if can_lookup {
        flags |= FLAG_CAN_LOOKUP;
    }

    let mut out = Vec::with_capacity(20 + (display_name.len() + email.len() + 8) * 2);
    out.extend_from_slice(&0u16.to_le_bytes()); // version
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&ONE_OFF_PROVIDER.to_bytes_le());

    for s in [display_name, address_type.as_str(), email] {
        if unicode {
            out.extend_from_slice(&utf16_le_bytes(s));
            out.extend_from_slice(&[0, 0]);
        } else {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_LEN: usize = 2 + 2 + 16;

    fn encode_ok(
        email: &str,
        display_name: &str,
        address_type: AddressType,
        message_format: MessageFormat,
        can_lookup: bool,
    ) -> Vec<u8> {
        encode(email, display_name, address_type, message_format, can_lookup).unwrap()
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_ok("a@b.com", "A", AddressType::Smtp, MessageFormat::Unicode, true);
        assert_eq!(&bytes[0..2], &[0, 0]); // zero version word
        let flags = u16::from_le_bytes(bytes[2..4].try_into().unwrap());
        assert_eq!(flags, FLAG_NO_RICH_INFO | FLAG_CAN_LOOKUP | FLAG_UNICODE);
        assert_eq!(&bytes[4..20], &ONE_OFF_PROVIDER.to_bytes_le());
    }

    #[test]
    fn test_unicode_body_is_double_the_ansi_body() {
        let unicode = encode_ok("a@b.com", "A", AddressType::Smtp, MessageFormat::Unicode, true);
        let ansi = encode_ok("a@b.com", "A", AddressType::Smtp, MessageFormat::Ansi, true);

        // Identical version word and provider id.
        assert_eq!(&unicode[0..2], &ansi[0..2]);
        assert_eq!(&unicode[4..20], &ansi[4..20]);

        // ASCII strings: every unit (including terminators) doubles in width.
        let unicode_body = &unicode[HEADER_LEN..];
        let ansi_body = &ansi[HEADER_LEN..];
        assert_eq!(unicode_body.len(), ansi_body.len() * 2);
    }

    #[test]
    fn test_ansi_strings_in_order() {
        let bytes = encode_ok("a@b.com", "A", AddressType::Smtp, MessageFormat::Ansi, false);
        let body = &bytes[HEADER_LEN..];
        assert_eq!(body, b"A\0SMTP\0a@b.com\0");
        let flags = u16::from_le_bytes(bytes[2..4].try_into().unwrap());
        assert_eq!(flags & FLAG_CAN_LOOKUP, 0);
        assert_eq!(flags & FLAG_UNICODE, 0);
    }

    #[test]
    fn test_unknown_address_type_empty_string() {
        let bytes = encode_ok("a@b.com", "A", AddressType::Unknown, MessageFormat::Ansi, true);
        let body = &bytes[HEADER_LEN..];
        // Empty address-type string still gets its terminator.
        assert_eq!(body, b"A\0\0a@b.com\0");
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let err = encode("a@b.com", "A\0B", AddressType::Smtp, MessageFormat::Ansi, true)
            .unwrap_err();
        assert!(matches!(err, crate::error::MsgError::Encoding(_)));
    }
}
