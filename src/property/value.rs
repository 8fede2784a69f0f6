//! Typed property values and their binary encodings.
//!
//! A value either fits inline in the 8-byte slot of a fixed property row or
//! is written verbatim into its own stream. The store decides which; this
//! module only knows how to render each kind.

use uuid::Uuid;

use crate::property::types::PropertyType;

/// Tagged union over every value kind a property store accepts.
///
/// The runtime kind must equal the tag's declared [`PropertyType`]; the store
/// rejects mismatches at insertion.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    /// 64-bit tick count (100ns intervals since 1601-01-01 UTC).
    FileTime(u64),
    /// 16-byte identifier, stored by reference in a companion stream.
    Guid(Uuid),
    /// 8-bit string; written without terminator.
    String8(String),
    /// UTF-16 string; written as raw little-endian code units, no terminator.
    Unicode(String),
    Binary(Vec<u8>),
    /// Homogeneous sequence of scalar values.
    Multiple(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Returns true if this value's runtime kind equals `kind`.
    ///
    /// A `Multiple` value matches a multi-valued kind when every element is a
    /// scalar matching the element kind.
    pub fn matches_type(&self, kind: PropertyType) -> bool {
        match self {
            Self::Boolean(_) => kind == PropertyType::Boolean,
            Self::Int16(_) => kind == PropertyType::Integer16,
            Self::Int32(_) => kind == PropertyType::Integer32,
            Self::Int64(_) => kind == PropertyType::Integer64,
            Self::Float64(_) => kind == PropertyType::Floating64,
            Self::FileTime(_) => kind == PropertyType::Time,
            Self::Guid(_) => kind == PropertyType::Guid,
            Self::String8(_) => kind == PropertyType::String8,
            Self::Unicode(_) => kind == PropertyType::Unicode,
            Self::Binary(_) => kind == PropertyType::Binary,
            Self::Multiple(elements) => {
                kind.is_multi_valued()
                    && elements.iter().all(|e| {
                        !matches!(e, Self::Multiple(_)) && e.matches_type(kind.element_type())
                    })
            }
        }
    }

    /// Renders this value into the 8-byte inline slot of a fixed row.
    ///
    /// Returns `None` for kinds that do not encode in 8 bytes (strings,
    /// binary, multi-valued, and the 16-byte identifier).
    pub(crate) fn inline_bits(&self) -> Option<u64> {
        match self {
            Self::Boolean(v) => Some(u64::from(*v)),
            Self::Int16(v) => Some(u64::from(*v as u16)),
            Self::Int32(v) => Some(u64::from(*v as u32)),
            Self::Int64(v) => Some(*v as u64),
            Self::Float64(v) => Some(v.to_bits()),
            Self::FileTime(ticks) => Some(*ticks),
            _ => None,
        }
    }

    /// Renders a scalar value as a stream payload.
    ///
    /// `Multiple` is handled by the store (index stream plus one sub-stream
    /// per element) and is not a single payload; callers must not pass it.
    pub(crate) fn stream_bytes(&self) -> Vec<u8> {
        match self {
            Self::Boolean(v) => vec![u8::from(*v)],
            Self::Int16(v) => v.to_le_bytes().to_vec(),
            Self::Int32(v) => v.to_le_bytes().to_vec(),
            Self::Int64(v) => v.to_le_bytes().to_vec(),
            Self::Float64(v) => v.to_le_bytes().to_vec(),
            Self::FileTime(ticks) => ticks.to_le_bytes().to_vec(),
            // Windows GUID layout: first three fields little-endian.
            Self::Guid(g) => g.to_bytes_le().to_vec(),
            Self::String8(s) => s.as_bytes().to_vec(),
            Self::Unicode(s) => utf16_le_bytes(s),
            Self::Binary(b) => b.clone(),
            Self::Multiple(_) => Vec::new(),
        }
    }
}

/// Encodes a string as raw UTF-16LE code units, no terminator.
pub(crate) fn utf16_le_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

#[cfg(feature = "chrono")]
mod chrono_support {
    use super::PropertyValue;
    use chrono_v0_4::{DateTime, Utc};

    /// Seconds between 1601-01-01 and the Unix epoch.
    const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;

    impl PropertyValue {
        /// Builds a `FileTime` value from a chrono datetime.
        ///
        /// Datetimes before 1601-01-01 clamp to zero ticks.
        pub fn filetime_from(dt: &DateTime<Utc>) -> PropertyValue {
            let secs = dt.timestamp().saturating_add(FILETIME_UNIX_OFFSET_SECS);
            let ticks = if secs <= 0 {
                0
            } else {
                (secs as u64) * 10_000_000 + u64::from(dt.timestamp_subsec_nanos()) / 100
            };
            PropertyValue::FileTime(ticks)
        }
    }
}
