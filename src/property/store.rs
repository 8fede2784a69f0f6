//! The central mutable (tag -> typed value) collection and its one-shot
//! serialization.
//!
//! Entries live in a map keyed by property id, so the fixed-row buffer comes
//! out in strictly ascending id order for free. Because identity is
//! (id, type) and one id carries exactly one type, the fixed/variable
//! partition never produces ties.

use std::collections::BTreeMap;

use crate::error::MsgError;
use crate::property::types::{PropertyFlags, PropertyTag, PropertyType};
use crate::property::value::PropertyValue;

/// Width of one fixed property row: {id:u16, type:u16, flags:u32, value:u64}.
pub const FIXED_ROW_WIDTH: usize = 16;

struct Entry {
    kind: PropertyType,
    flags: PropertyFlags,
    value: PropertyValue,
}

/// One serialized stream produced by [`PropertyStore::finalize`].
///
/// `element` is `None` for scalar payloads and for a multi-valued entry's
/// index stream, and `Some(i)` for the i-th element sub-stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStream {
    pub tag: PropertyTag,
    pub element: Option<u32>,
    pub data: Vec<u8>,
}

/// Output of the one-shot finalize: the fixed-row buffer plus every
/// stream-backed payload, ready for the storage tree builder.
#[derive(Debug, Default)]
pub struct PropertyStreams {
    /// Concatenated 16-byte rows, ascending property id.
    pub rows: Vec<u8>,
    pub streams: Vec<PropertyStream>,
}

/// Central mutable property collection for one document.
///
/// Mutation is allowed until [`freeze`](Self::freeze) or
/// [`finalize`](Self::finalize); both are one-way.
#[derive(Default)]
pub struct PropertyStore {
    entries: BTreeMap<u16, Entry>,
    frozen: bool,
    finalized: bool,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks the store read-only. Called by the owning document at save time;
    /// there is no reverse transition.
    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Inserts or overwrites the entry for `tag`.
    ///
    /// Fails with a validation error when the value's runtime kind
    /// contradicts the tag, or when an existing entry under the same id
    /// declares a different type. Fails with a state error once the owning
    /// document is saved.
    pub fn add_or_replace(
        &mut self,
        tag: PropertyTag,
        value: PropertyValue,
        flags: PropertyFlags,
    ) -> Result<(), MsgError> {
        if self.frozen || self.finalized {
            return Err(MsgError::State(String::from(
                "property store is frozen; the document was already saved",
            )));
        }
        if !value.matches_type(tag.kind) {
            return Err(MsgError::Validation(format!(
                "value kind does not match declared type {:#06x} for property {:#06x}",
                tag.kind.code(),
                tag.id
            )));
        }
        if let Some(existing) = self.entries.get(&tag.id)
            && existing.kind != tag.kind
        {
            return Err(MsgError::Validation(format!(
                "property {:#06x} already declared with type {:#06x}, got {:#06x}",
                tag.id,
                existing.kind.code(),
                tag.kind.code()
            )));
        }
        self.entries.insert(
            tag.id,
            Entry {
                kind: tag.kind,
                flags,
                value,
            },
        );
        Ok(())
    }

    /// Serializes every entry exactly once.
    ///
    /// Fixed-representable entries (scalars encoding in <= 8 bytes, plus the
    /// 16-byte identifier by reference) each emit one row into the fixed
    /// buffer; everything else emits one stream per payload. Stream-backed
    /// byte lengths accumulate into `size_accumulator`.
    ///
    /// A second call fails with a state error.
    pub fn finalize(&mut self, size_accumulator: &mut u64) -> Result<PropertyStreams, MsgError> {
        if self.finalized {
            return Err(MsgError::State(String::from(
                "property store already finalized",
            )));
        }
        self.finalized = true;

        let mut out = PropertyStreams {
            rows: Vec::with_capacity(self.entries.len() * FIXED_ROW_WIDTH),
            streams: Vec::new(),
        };

        for (&id, entry) in &self.entries {
            let tag = PropertyTag::new(id, entry.kind);
            if let Some(bits) = entry.value.inline_bits() {
                push_row(&mut out.rows, tag, entry.flags, bits);
            } else if entry.kind == PropertyType::Guid {
                // Identifier by reference: a row whose value slot records the
                // payload length, plus a companion stream with the raw bytes.
                let data = entry.value.stream_bytes();
                push_row(&mut out.rows, tag, entry.flags, data.len() as u64);
                out.streams.push(PropertyStream {
                    tag,
                    element: None,
                    data,
                });
            } else if let PropertyValue::Multiple(elements) = &entry.value {
                // Index stream: count plus per-element byte sizes, then one
                // sub-stream per element.
                let payloads: Vec<Vec<u8>> =
                    elements.iter().map(PropertyValue::stream_bytes).collect();
                let mut index = Vec::with_capacity(4 + payloads.len() * 4);
                index.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
                for payload in &payloads {
                    index.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                }
                *size_accumulator += index.len() as u64;
                out.streams.push(PropertyStream {
                    tag,
                    element: None,
                    data: index,
                });
                for (i, payload) in payloads.into_iter().enumerate() {
                    *size_accumulator += payload.len() as u64;
                    out.streams.push(PropertyStream {
                        tag,
                        element: Some(i as u32),
                        data: payload,
                    });
                }
            } else {
                let data = entry.value.stream_bytes();
                *size_accumulator += data.len() as u64;
                out.streams.push(PropertyStream {
                    tag,
                    element: None,
                    data,
                });
            }
        }

        log::debug!(
            "property store finalized: {} entries, {} rows bytes, {} streams",
            self.entries.len(),
            out.rows.len(),
            out.streams.len()
        );
        Ok(out)
    }
}

fn push_row(rows: &mut Vec<u8>, tag: PropertyTag, flags: PropertyFlags, value: u64) {
    rows.extend_from_slice(&tag.id.to_le_bytes());
    rows.extend_from_slice(&tag.kind.code().to_le_bytes());
    rows.extend_from_slice(&flags.bits().to_le_bytes());
    rows.extend_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(u16, PropertyType, PropertyValue)]) -> PropertyStore {
        let mut store = PropertyStore::new();
        for (id, kind, value) in entries {
            store
                .add_or_replace(
                    PropertyTag::new(*id, *kind),
                    value.clone(),
                    PropertyFlags::default(),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_rows_ascend_by_id() {
        let mut store = store_with(&[
            (5, PropertyType::Integer32, PropertyValue::Int32(50)),
            (3, PropertyType::Integer32, PropertyValue::Int32(30)),
            (9, PropertyType::Integer32, PropertyValue::Int32(90)),
        ]);
        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();

        assert_eq!(out.rows.len(), 3 * FIXED_ROW_WIDTH);
        let ids: Vec<u16> = out
            .rows
            .chunks(FIXED_ROW_WIDTH)
            .map(|row| u16::from_le_bytes(row[0..2].try_into().unwrap()))
            .collect();
        assert_eq!(ids, vec![3, 5, 9]);
        assert_eq!(acc, 0);
    }

    #[test]
    fn test_row_layout() {
        let mut store = store_with(&[(0x0E07, PropertyType::Integer32, PropertyValue::Int32(1))]);
        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();

        let row = &out.rows[..FIXED_ROW_WIDTH];
        assert_eq!(u16::from_le_bytes(row[0..2].try_into().unwrap()), 0x0E07);
        assert_eq!(u16::from_le_bytes(row[2..4].try_into().unwrap()), 0x0003);
        assert_eq!(u32::from_le_bytes(row[4..8].try_into().unwrap()), 0x6);
        assert_eq!(u64::from_le_bytes(row[8..16].try_into().unwrap()), 1);
    }

    #[test]
    fn test_type_mismatch_on_insert() {
        let mut store = PropertyStore::new();
        let err = store
            .add_or_replace(
                PropertyTag::new(0x0037, PropertyType::Unicode),
                PropertyValue::Int32(1),
                PropertyFlags::default(),
            )
            .unwrap_err();
        assert!(matches!(err, MsgError::Validation(_)));
    }

    #[test]
    fn test_type_mismatch_on_redeclared_id() {
        let mut store = store_with(&[(0x0037, PropertyType::Unicode, PropertyValue::Unicode(
            "a".into(),
        ))]);
        let err = store
            .add_or_replace(
                PropertyTag::new(0x0037, PropertyType::Binary),
                PropertyValue::Binary(vec![1]),
                PropertyFlags::default(),
            )
            .unwrap_err();
        assert!(matches!(err, MsgError::Validation(_)));
    }

    #[test]
    fn test_replace_same_type_keeps_one_entry() {
        let mut store = store_with(&[(0x0037, PropertyType::Unicode, PropertyValue::Unicode(
            "a".into(),
        ))]);
        store
            .add_or_replace(
                PropertyTag::new(0x0037, PropertyType::Unicode),
                PropertyValue::Unicode("b".into()),
                PropertyFlags::default(),
            )
            .unwrap();
        assert_eq!(store.len(), 1);

        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();
        assert_eq!(out.streams[0].data, vec![0x62, 0x00]);
    }

    #[test]
    fn test_stream_backed_accumulates_size() {
        let mut store = store_with(&[
            (0x0037, PropertyType::Unicode, PropertyValue::Unicode("hi".into())),
            (0x1001, PropertyType::Binary, PropertyValue::Binary(vec![0; 7])),
        ]);
        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();
        assert_eq!(out.rows.len(), 0);
        assert_eq!(out.streams.len(), 2);
        assert_eq!(acc, 4 + 7);
    }

    #[test]
    fn test_guid_by_reference() {
        let g = uuid::Uuid::from_u128(1);
        let mut store = store_with(&[(0x0FFF, PropertyType::Guid, PropertyValue::Guid(g))]);
        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();

        // One row whose value slot holds the payload length, plus the stream.
        assert_eq!(out.rows.len(), FIXED_ROW_WIDTH);
        assert_eq!(
            u64::from_le_bytes(out.rows[8..16].try_into().unwrap()),
            16
        );
        assert_eq!(out.streams.len(), 1);
        assert_eq!(out.streams[0].data.len(), 16);
        // The identifier is fixed-representable; not counted as stream-backed.
        assert_eq!(acc, 0);
    }

    #[test]
    fn test_multi_valued_index_and_elements() {
        let mut store = store_with(&[(
            0x1234,
            PropertyType::MultipleBinary,
            PropertyValue::Multiple(vec![
                PropertyValue::Binary(vec![1, 2, 3]),
                PropertyValue::Binary(vec![4]),
            ]),
        )]);
        let mut acc = 0u64;
        let out = store.finalize(&mut acc).unwrap();

        assert_eq!(out.streams.len(), 3);
        let index = &out.streams[0];
        assert_eq!(index.element, None);
        assert_eq!(u32::from_le_bytes(index.data[0..4].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(index.data[4..8].try_into().unwrap()), 3);
        assert_eq!(u32::from_le_bytes(index.data[8..12].try_into().unwrap()), 1);
        assert_eq!(out.streams[1].element, Some(0));
        assert_eq!(out.streams[1].data, vec![1, 2, 3]);
        assert_eq!(out.streams[2].element, Some(1));
        assert_eq!(out.streams[2].data, vec![4]);
        assert_eq!(acc, 12 + 3 + 1);
    }

    #[test]
    fn test_double_finalize_fails() {
        let mut store = store_with(&[(3, PropertyType::Integer32, PropertyValue::Int32(1))]);
        let mut acc = 0u64;
        store.finalize(&mut acc).unwrap();
        let err = store.finalize(&mut acc).unwrap_err();
        assert!(matches!(err, MsgError::State(_)));
    }

    #[test]
    fn test_frozen_store_rejects_mutation() {
        let mut store = PropertyStore::new();
        store.freeze();
        let err = store
            .add_or_replace(
                PropertyTag::new(3, PropertyType::Integer32),
                PropertyValue::Int32(1),
                PropertyFlags::default(),
            )
            .unwrap_err();
        assert!(matches!(err, MsgError::State(_)));
    }
}
