//! Resolution of named properties onto transient numeric ids.
//!
//! A named property is identified by (property-set id, numeric-id-or-name)
//! rather than a fixed numeric id. Per store, the first occurrence of a key
//! allocates the next id from 0x8000 and the mapping never changes
//! thereafter. The resolver accumulates three companion tables as it goes —
//! entry records, deduplicated property-set ids, and UTF-16 name strings —
//! each a growing arena with stable indices, serialized once at save time.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::MsgError;
use crate::property::value::utf16_le_bytes;

/// First assignable id. The usable range is [0x8000, 0xFFFF).
pub const FIRST_NAMED_ID: u16 = 0x8000;

/// Maximum number of distinct keys one resolver can hold.
pub const MAX_NAMED_IDS: usize = 0x7FFF;

/// How a named property is distinguished within its property set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameDiscriminator {
    /// Numeric id, stored verbatim in the entry record.
    Id(u32),
    /// UTF-16 name, stored in the string table.
    Name(String),
}

/// Key of one named property: property-set id plus discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedPropertyKey {
    pub set: Uuid,
    pub discriminator: NameDiscriminator,
}

impl NamedPropertyKey {
    pub fn numeric(set: Uuid, id: u32) -> Self {
        Self {
            set,
            discriminator: NameDiscriminator::Id(id),
        }
    }

    pub fn named(set: Uuid, name: impl Into<String>) -> Self {
        Self {
            set,
            discriminator: NameDiscriminator::Name(name.into()),
        }
    }
}

/// The three serialized tables, ready for the storage tree builder.
#[derive(Debug, Default, PartialEq)]
pub struct NamedPropertyTables {
    /// One 8-byte record per assigned id, allocation order.
    pub entries: Vec<u8>,
    /// 16 bytes per distinct property-set id, first-seen order.
    pub guids: Vec<u8>,
    /// Length-prefixed UTF-16 names, each entry 4-byte aligned.
    pub strings: Vec<u8>,
}

/// Bidirectional map from named-property keys to assigned 16-bit ids.
#[derive(Default)]
pub struct NamedPropertyResolver {
    assigned: HashMap<NamedPropertyKey, u16>,
    /// First-seen property-set ids; position + 1 is the stored set index.
    sets: Vec<Uuid>,
    entries: Vec<u8>,
    strings: Vec<u8>,
    finalized: bool,
}

impl NamedPropertyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys resolved so far.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Returns the id assigned to `key`, allocating the next one on first
    /// sight. Repeat calls with an identical key are idempotent: same id,
    /// no table growth.
    pub fn resolve(&mut self, key: &NamedPropertyKey) -> Result<u16, MsgError> {
        if self.finalized {
            return Err(MsgError::State(String::from(
                "named property resolver already finalized",
            )));
        }
        if let Some(&id) = self.assigned.get(key) {
            return Ok(id);
        }
        if self.assigned.len() >= MAX_NAMED_IDS {
            return Err(MsgError::Capacity(format!(
                "named property id space exhausted ({} distinct keys)",
                MAX_NAMED_IDS
            )));
        }

        let sequence = self.assigned.len() as u16;
        let id = FIRST_NAMED_ID + sequence;

        // Nil set means "no set" (index 0); anything else is deduplicated
        // into the guid table and referenced by 1-based index.
        let set_index = if key.set.is_nil() {
            0u16
        } else {
            match self.sets.iter().position(|s| *s == key.set) {
                Some(pos) => pos as u16 + 1,
                None => {
                    self.sets.push(key.set);
                    self.sets.len() as u16
                }
            }
        };

        let (discriminator, name_bit) = match &key.discriminator {
            NameDiscriminator::Id(n) => (*n, 0u16),
            NameDiscriminator::Name(name) => (self.push_name(name), 1u16),
        };

        // 8-byte entry record: discriminator, set-index/kind word, sequence.
        self.entries.extend_from_slice(&discriminator.to_le_bytes());
        self.entries
            .extend_from_slice(&((set_index << 1) | name_bit).to_le_bytes());
        self.entries.extend_from_slice(&sequence.to_le_bytes());

        self.assigned.insert(key.clone(), id);
        Ok(id)
    }

    /// Appends a length-prefixed UTF-16 name to the string table and returns
    /// the byte offset of the entry's start. The table is zero-padded to a
    /// 4-byte boundary between entries, so every stored offset is aligned.
    fn push_name(&mut self, name: &str) -> u32 {
        let offset = self.strings.len() as u32;
        let encoded = utf16_le_bytes(name);
        self.strings
            .extend_from_slice(&(encoded.len() as u32).to_le_bytes());
        self.strings.extend_from_slice(&encoded);
        while self.strings.len() % 4 != 0 {
            self.strings.push(0);
        }
        offset
    }

    /// Serializes the three tables exactly once. A second call fails with a
    /// state error.
    pub fn finalize(&mut self) -> Result<NamedPropertyTables, MsgError> {
        if self.finalized {
            return Err(MsgError::State(String::from(
                "named property resolver already finalized",
            )));
        }
        self.finalized = true;

        let mut guids = Vec::with_capacity(self.sets.len() * 16);
        for set in &self.sets {
            guids.extend_from_slice(&set.to_bytes_le());
        }

        log::debug!(
            "named property tables finalized: {} entries, {} sets, {} string bytes",
            self.assigned.len(),
            self.sets.len(),
            self.strings.len()
        );
        Ok(NamedPropertyTables {
            entries: std::mem::take(&mut self.entries),
            guids,
            strings: std::mem::take(&mut self.strings),
        })
    }
}
