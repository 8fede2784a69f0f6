//! Property tags: the (id, type) identity of every entry in a property store.

/// Wire code for each property value kind.
///
/// The codes are the standard 16-bit type identifiers of the message property
/// format. Multi-valued kinds are the scalar code with bit 12 (0x1000) set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PropertyType {
    Integer16 = 0x0002,
    Integer32 = 0x0003,
    Floating64 = 0x0005,
    Boolean = 0x000B,
    Integer64 = 0x0014,
    /// 8-bit string.
    String8 = 0x001E,
    /// UTF-16 string.
    Unicode = 0x001F,
    /// 64-bit tick count (FILETIME).
    Time = 0x0040,
    /// 16-byte identifier.
    Guid = 0x0048,
    Binary = 0x0102,
    MultipleInteger16 = 0x1002,
    MultipleInteger32 = 0x1003,
    MultipleFloating64 = 0x1005,
    MultipleInteger64 = 0x1014,
    MultipleString8 = 0x101E,
    MultipleUnicode = 0x101F,
    MultipleTime = 0x1040,
    MultipleGuid = 0x1048,
    MultipleBinary = 0x1102,
}

impl PropertyType {
    /// Returns the 16-bit wire code for this type.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Returns true for multi-valued kinds (scalar code with bit 0x1000 set).
    pub fn is_multi_valued(self) -> bool {
        self.code() & 0x1000 != 0
    }

    /// Returns the scalar kind underlying a multi-valued kind, or `self` for
    /// scalar kinds.
    pub fn element_type(self) -> PropertyType {
        match self {
            Self::MultipleInteger16 => Self::Integer16,
            Self::MultipleInteger32 => Self::Integer32,
            Self::MultipleFloating64 => Self::Floating64,
            Self::MultipleInteger64 => Self::Integer64,
            Self::MultipleString8 => Self::String8,
            Self::MultipleUnicode => Self::Unicode,
            Self::MultipleTime => Self::Time,
            Self::MultipleGuid => Self::Guid,
            Self::MultipleBinary => Self::Binary,
            other => other,
        }
    }
}

/// Identity of one property: numeric id plus declared value kind.
///
/// Two entries sharing an id within one store must share a type; the store
/// enforces this at insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyTag {
    pub id: u16,
    pub kind: PropertyType,
}

impl PropertyTag {
    pub const fn new(id: u16, kind: PropertyType) -> Self {
        Self { id, kind }
    }
}

/// Per-entry attribute flags stored in the fixed property row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFlags(pub u32);

impl PropertyFlags {
    pub const MANDATORY: PropertyFlags = PropertyFlags(0x1);
    pub const READABLE: PropertyFlags = PropertyFlags(0x2);
    pub const WRITEABLE: PropertyFlags = PropertyFlags(0x4);

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for PropertyFlags {
    /// Readable and writeable, the default for ordinary entries.
    fn default() -> Self {
        PropertyFlags(Self::READABLE.0 | Self::WRITEABLE.0)
    }
}

impl std::ops::BitOr for PropertyFlags {
    type Output = PropertyFlags;

    fn bitor(self, rhs: Self) -> Self {
        PropertyFlags(self.0 | rhs.0)
    }
}

/// Well-known tags used by this crate itself. The full standard catalog is
/// the caller's lookup table, not ours.
pub mod tags {
    use super::{PropertyTag, PropertyType};

    pub const MESSAGE_CLASS: PropertyTag = PropertyTag::new(0x001A, PropertyType::Unicode);
    pub const SUBJECT: PropertyTag = PropertyTag::new(0x0037, PropertyType::Unicode);
    pub const BODY: PropertyTag = PropertyTag::new(0x1000, PropertyType::Unicode);

    pub const SENDER_ENTRY_ID: PropertyTag = PropertyTag::new(0x0C19, PropertyType::Binary);
    pub const SENDER_NAME: PropertyTag = PropertyTag::new(0x0C1A, PropertyType::Unicode);
    pub const SENDER_SEARCH_KEY: PropertyTag = PropertyTag::new(0x0C1D, PropertyType::Binary);
    pub const SENDER_ADDRESS_TYPE: PropertyTag = PropertyTag::new(0x0C1E, PropertyType::Unicode);
    pub const SENDER_EMAIL_ADDRESS: PropertyTag = PropertyTag::new(0x0C1F, PropertyType::Unicode);

    pub const REPRESENTING_ENTRY_ID: PropertyTag = PropertyTag::new(0x0041, PropertyType::Binary);
    pub const REPRESENTING_NAME: PropertyTag = PropertyTag::new(0x0042, PropertyType::Unicode);
    pub const REPRESENTING_SEARCH_KEY: PropertyTag =
        PropertyTag::new(0x003B, PropertyType::Binary);
    pub const REPRESENTING_ADDRESS_TYPE: PropertyTag =
        PropertyTag::new(0x0064, PropertyType::Unicode);
    pub const REPRESENTING_EMAIL_ADDRESS: PropertyTag =
        PropertyTag::new(0x0065, PropertyType::Unicode);
}
