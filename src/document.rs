//! The aggregate root: one property store, one named-property resolver, a
//! message class, and the Open -> Saved state machine.

use crate::address::{self, AddressValue};
use crate::error::MsgError;
use crate::named::{NamedPropertyKey, NamedPropertyResolver};
use crate::property::store::PropertyStore;
use crate::property::types::{PropertyFlags, PropertyTag, tags};
use crate::property::value::PropertyValue;
use crate::storage::{self, MessageContainer, PropertiesKind};

/// Closed enumeration of message classes this crate can stamp on a document.
///
/// The class-to-string mapping is static data; `Unset` is the explicit error
/// entry hit at save time when no class was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageClass {
    #[default]
    Unset,
    Note,
    NoteSmime,
    NoteSmimeMultipartSigned,
    Appointment,
    Contact,
    Task,
    StickyNote,
}

impl MessageClass {
    /// Returns the class string, or a validation error for `Unset`.
    pub fn as_str(self) -> Result<&'static str, MsgError> {
        match self {
            Self::Unset => Err(MsgError::Validation(String::from(
                "message class is unset",
            ))),
            Self::Note => Ok("IPM.Note"),
            Self::NoteSmime => Ok("IPM.Note.SMIME"),
            Self::NoteSmimeMultipartSigned => Ok("IPM.Note.SMIME.MultipartSigned"),
            Self::Appointment => Ok("IPM.Appointment"),
            Self::Contact => Ok("IPM.Contact"),
            Self::Task => Ok("IPM.Task"),
            Self::StickyNote => Ok("IPM.StickyNote"),
        }
    }
}

/// Two-state lifecycle tag. Saved is terminal; there is no reverse
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentState {
    Open,
    Saved,
}

/// A message document being built.
///
/// Property entries and named-property registrations accumulate while the
/// document is Open; [`save`](Self::save) serializes everything exactly once
/// and freezes the document. Every mutating entry point checks the state
/// tag first.
pub struct Document {
    store: PropertyStore,
    resolver: NamedPropertyResolver,
    class: MessageClass,
    payload_size: u64,
    state: DocumentState,
}

impl Document {
    pub fn new(class: MessageClass) -> Self {
        Self {
            store: PropertyStore::new(),
            resolver: NamedPropertyResolver::new(),
            class,
            payload_size: 0,
            state: DocumentState::Open,
        }
    }

    pub fn message_class(&self) -> MessageClass {
        self.class
    }

    /// Total byte length of stream-backed payloads, accumulated at save.
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    pub fn is_saved(&self) -> bool {
        self.state == DocumentState::Saved
    }

    fn check_open(&self) -> Result<(), MsgError> {
        match self.state {
            DocumentState::Open => Ok(()),
            DocumentState::Saved => Err(MsgError::State(String::from(
                "document already saved; no further mutation",
            ))),
        }
    }

    /// Replaces the message class while the document is open.
    pub fn set_message_class(&mut self, class: MessageClass) -> Result<(), MsgError> {
        self.check_open()?;
        self.class = class;
        Ok(())
    }

    /// Inserts or overwrites one property with default flags.
    pub fn add_property(&mut self, tag: PropertyTag, value: PropertyValue) -> Result<(), MsgError> {
        self.add_property_with_flags(tag, value, PropertyFlags::default())
    }

    pub fn add_property_with_flags(
        &mut self,
        tag: PropertyTag,
        value: PropertyValue,
        flags: PropertyFlags,
    ) -> Result<(), MsgError> {
        self.check_open()?;
        self.store.add_or_replace(tag, value, flags)
    }

    /// Resolves a named-property key to its assigned id, allocating on first
    /// sight.
    pub fn resolve_named(&mut self, key: &NamedPropertyKey) -> Result<u16, MsgError> {
        self.check_open()?;
        self.resolver.resolve(key)
    }

    /// Writes the sender role's property set from an address value.
    pub fn set_sender(&mut self, address: &AddressValue) -> Result<(), MsgError> {
        self.check_open()?;
        address::apply_sender(&mut self.store, address)
    }

    /// Writes the representing role's property set from an address value.
    pub fn set_representing(&mut self, address: &AddressValue) -> Result<(), MsgError> {
        self.check_open()?;
        address::apply_representing(&mut self.store, address)
    }

    /// Serializes the property store and named-property tables and hands the
    /// resulting tree to the container. Exactly once: the document
    /// transitions to Saved and any further mutation or save fails.
    pub fn save(&mut self, container: &mut dyn MessageContainer) -> Result<(), MsgError> {
        self.check_open()?;

        let class = self.class.as_str()?;
        self.store.add_or_replace(
            tags::MESSAGE_CLASS,
            PropertyValue::Unicode(class.to_string()),
            PropertyFlags::default(),
        )?;

        let properties = self.store.finalize(&mut self.payload_size)?;
        let named = self.resolver.finalize()?;
        let nodes = storage::build_tree(PropertiesKind::TopLevel, &properties, &named);
        storage::write_tree(container, &nodes)?;

        self.store.freeze();
        self.state = DocumentState::Saved;
        log::info!(
            "document saved: class {}, {} streams, {} payload bytes",
            class,
            nodes.len(),
            self.payload_size
        );
        Ok(())
    }
}
