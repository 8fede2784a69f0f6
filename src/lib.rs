//! Binary builder for structured message documents.
//!
//! This crate builds the on-disk representation of a message document: a
//! tree of typed property values — some inline in a fixed-row buffer, some
//! in their own byte streams — plus the side tables mapping named
//! (property-set id + name) properties onto transient numeric ids.
//!
//! The hierarchical storage container itself is an external collaborator:
//! this crate produces deterministically named (path, bytes) pairs and hands
//! them to anything implementing [`MessageContainer`].
//!
//! # Example
//!
//! ```rust
//! use msgbuild::{
//!     AddressType, AddressValue, Document, MemoryContainer, MessageClass,
//!     PropertyValue, tags,
//! };
//!
//! # fn main() -> Result<(), msgbuild::MsgError> {
//! let mut doc = Document::new(MessageClass::Note);
//! doc.add_property(tags::SUBJECT, PropertyValue::Unicode("hello".into()))?;
//! doc.set_sender(&AddressValue::new("a@b.com", None, AddressType::Smtp))?;
//!
//! let mut container = MemoryContainer::new();
//! doc.save(&mut container)?;
//! assert!(container.stream("__properties_version1.0").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Everything is single-threaded and synchronous: each document exclusively
//! owns its property store and resolver, and the only guard is the
//! irreversible Open/Saved tag checked at every mutating entry point.

pub(crate) mod address;
pub(crate) mod document;
pub(crate) mod error;
pub(crate) mod named;
pub mod oneoff;
pub mod property;
pub(crate) mod storage;

pub use address::{AddressType, AddressValue, MessageFormat, apply_representing, apply_sender};
pub use document::{Document, MessageClass};
pub use error::MsgError;
pub use named::{
    FIRST_NAMED_ID, MAX_NAMED_IDS, NameDiscriminator, NamedPropertyKey, NamedPropertyResolver,
    NamedPropertyTables,
};
pub use property::{
    FIXED_ROW_WIDTH, PropertyFlags, PropertyStore, PropertyStream, PropertyStreams, PropertyTag,
    PropertyType, PropertyValue, tags,
};
pub use storage::{
    MemoryContainer, MessageContainer, NAMEID_ENTRY_STREAM, NAMEID_GUID_STREAM, NAMEID_STORAGE,
    NAMEID_STRING_STREAM, PROPERTIES_STREAM, PropertiesKind, SUBSTG_PREFIX, TreeNode, build_tree,
    stream_name, write_tree,
};
