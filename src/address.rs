//! Immutable address values and the per-role property emitters.
//!
//! Roles (sender, representing) differ only in which property ids they
//! populate, so each role is a free function reading one [`AddressValue`]
//! and writing its fixed property set into a store.

use crate::error::MsgError;
use crate::oneoff;
use crate::property::store::PropertyStore;
use crate::property::types::{PropertyFlags, tags};
use crate::property::value::PropertyValue;

/// Kind of messaging address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    Unknown,
    Ex,
    Smtp,
    Fax,
    Mhs,
    Profs,
    X400,
}

impl AddressType {
    /// Fixed text per kind; empty for `Unknown`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Ex => "EX",
            Self::Smtp => "SMTP",
            Self::Fax => "FAX",
            Self::Mhs => "MHS",
            Self::Profs => "PROFS",
            Self::X400 => "X400",
        }
    }
}

/// String width used when encoding one-off entry ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// 8-bit strings.
    Ansi,
    /// UTF-16 strings.
    Unicode,
}

/// Immutable (email, display name, address kind) tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressValue {
    email: String,
    display_name: Option<String>,
    address_type: AddressType,
}

impl AddressValue {
    pub fn new(
        email: impl Into<String>,
        display_name: Option<String>,
        address_type: AddressType,
    ) -> Self {
        Self {
            email: email.into(),
            display_name,
            address_type,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// The email for SMTP addresses, the display name otherwise (falling
    /// back to the email when no display name was given).
    pub fn original_display_name(&self) -> &str {
        match self.address_type {
            AddressType::Smtp => &self.email,
            _ => self.display_name.as_deref().unwrap_or(&self.email),
        }
    }

    /// Directory search key: "TYPE:EMAIL" uppercased, null-terminated.
    fn search_key(&self) -> Vec<u8> {
        let mut key = format!("{}:{}", self.address_type.as_str(), self.email)
            .to_uppercase()
            .into_bytes();
        key.push(0);
        key
    }
}

/// Writes the sender role's fixed property set.
pub fn apply_sender(store: &mut PropertyStore, address: &AddressValue) -> Result<(), MsgError> {
    apply_role(
        store,
        address,
        RoleTags {
            name: tags::SENDER_NAME,
            email: tags::SENDER_EMAIL_ADDRESS,
            address_type: tags::SENDER_ADDRESS_TYPE,
            entry_id: tags::SENDER_ENTRY_ID,
            search_key: tags::SENDER_SEARCH_KEY,
        },
    )
}

/// Writes the representing role's fixed property set.
pub fn apply_representing(
    store: &mut PropertyStore,
    address: &AddressValue,
) -> Result<(), MsgError> {
    apply_role(
        store,
        address,
        RoleTags {
            name: tags::REPRESENTING_NAME,
            email: tags::REPRESENTING_EMAIL_ADDRESS,
            address_type: tags::REPRESENTING_ADDRESS_TYPE,
            entry_id: tags::REPRESENTING_ENTRY_ID,
            search_key: tags::REPRESENTING_SEARCH_KEY,
        },
    )
}

struct RoleTags {
    name: crate::property::types::PropertyTag,
    email: crate::property::types::PropertyTag,
    address_type: crate::property::types::PropertyTag,
    entry_id: crate::property::types::PropertyTag,
    search_key: crate::property::types::PropertyTag,
}

fn apply_role(
    store: &mut PropertyStore,
    address: &AddressValue,
    role: RoleTags,
) -> Result<(), MsgError> {
    let flags = PropertyFlags::default();
    store.add_or_replace(
        role.name,
        PropertyValue::Unicode(address.original_display_name().to_string()),
        flags,
    )?;
    store.add_or_replace(
        role.email,
        PropertyValue::Unicode(address.email.clone()),
        flags,
    )?;
    store.add_or_replace(
        role.address_type,
        PropertyValue::Unicode(address.address_type.as_str().to_string()),
        flags,
    )?;
    store.add_or_replace(
        role.entry_id,
        PropertyValue::Binary(oneoff::encode(
            &address.email,
            address.original_display_name(),
            address.address_type,
            MessageFormat::Unicode,
            true,
        )?),
        flags,
    )?;
    store.add_or_replace(
        role.search_key,
        PropertyValue::Binary(address.search_key()),
        flags,
    )?;
    Ok(())
}
