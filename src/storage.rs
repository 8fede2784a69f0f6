//! Deterministic naming and layout of the finalized outputs.
//!
//! The tree builder translates a finalized property store and named-property
//! tables into (path, bytes) pairs for the external container. It performs no
//! allocation logic; everything here is a fixed grammar over well-known
//! names.

use std::collections::BTreeMap;
use std::io;

use crate::error::MsgError;
use crate::named::NamedPropertyTables;
use crate::property::store::PropertyStreams;
use crate::property::types::PropertyTag;

/// Well-known stream holding the fixed property rows.
pub const PROPERTIES_STREAM: &str = "__properties_version1.0";

/// Prefix of every stream-backed property stream.
pub const SUBSTG_PREFIX: &str = "__substg1.0_";

/// Well-known sub-storage holding the named-property tables.
pub const NAMEID_STORAGE: &str = "__nameid_version1.0";

/// Guid table stream (under [`NAMEID_STORAGE`]).
pub const NAMEID_GUID_STREAM: &str = "__substg1.0_00020102";
/// Entry table stream (under [`NAMEID_STORAGE`]).
pub const NAMEID_ENTRY_STREAM: &str = "__substg1.0_00030102";
/// String table stream (under [`NAMEID_STORAGE`]).
pub const NAMEID_STRING_STREAM: &str = "__substg1.0_00040102";

/// Required header size of the fixed-row stream: a policy owned by the
/// caller, not by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesKind {
    /// Top-level document: 32-byte zeroed header.
    TopLevel,
    /// Embedded sub-entity: 24-byte zeroed header.
    Embedded,
}

impl PropertiesKind {
    pub fn header_len(self) -> usize {
        match self {
            Self::TopLevel => 32,
            Self::Embedded => 24,
        }
    }
}

/// Name of a stream-backed property stream: fixed prefix, property id and
/// type code as 4 upper-hex digits each, and for a multi-valued element
/// sub-stream the element index as 8 hex digits.
pub fn stream_name(tag: PropertyTag, element: Option<u32>) -> String {
    match element {
        None => format!("{}{:04X}{:04X}", SUBSTG_PREFIX, tag.id, tag.kind.code()),
        Some(i) => format!(
            "{}{:04X}{:04X}-{:08X}",
            SUBSTG_PREFIX,
            tag.id,
            tag.kind.code(),
            i
        ),
    }
}

/// One stream to be written: path components then contents. Intermediate
/// path components name storages the container creates or reuses.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub path: Vec<String>,
    pub data: Vec<u8>,
}

/// Translates finalized outputs into named nodes. Pure: no allocation
/// decisions, no I/O.
pub fn build_tree(
    kind: PropertiesKind,
    properties: &PropertyStreams,
    named: &NamedPropertyTables,
) -> Vec<TreeNode> {
    let mut nodes = Vec::with_capacity(properties.streams.len() + 4);

    let mut fixed = vec![0u8; kind.header_len()];
    fixed.extend_from_slice(&properties.rows);
    nodes.push(TreeNode {
        path: vec![PROPERTIES_STREAM.to_string()],
        data: fixed,
    });

    for stream in &properties.streams {
        nodes.push(TreeNode {
            path: vec![stream_name(stream.tag, stream.element)],
            data: stream.data.clone(),
        });
    }

    for (name, table) in [
        (NAMEID_GUID_STREAM, &named.guids),
        (NAMEID_ENTRY_STREAM, &named.entries),
        (NAMEID_STRING_STREAM, &named.strings),
    ] {
        nodes.push(TreeNode {
            path: vec![NAMEID_STORAGE.to_string(), name.to_string()],
            data: table.clone(),
        });
    }

    nodes
}

/// Minimal surface the external hierarchical container must expose.
///
/// Intermediate path components are create-or-get storages; the final
/// component is a stream whose complete contents are set in one call.
/// I/O failures pass through unmodified.
pub trait MessageContainer {
    fn write_stream(&mut self, path: &[&str], data: &[u8]) -> io::Result<()>;
}

/// Writes every node into the container, converting container failures into
/// the distinct I/O error category.
pub fn write_tree(
    container: &mut dyn MessageContainer,
    nodes: &[TreeNode],
) -> Result<(), MsgError> {
    for node in nodes {
        let path: Vec<&str> = node.path.iter().map(String::as_str).collect();
        container.write_stream(&path, &node.data)?;
    }
    Ok(())
}

/// In-memory container keyed by `/`-joined paths. Useful for tests and for
/// callers that post-process the tree before persisting it.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    streams: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(&self, path: &str) -> Option<&[u8]> {
        self.streams.get(path).map(Vec::as_slice)
    }

    pub fn stream_paths(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl MessageContainer for MemoryContainer {
    fn write_stream(&mut self, path: &[&str], data: &[u8]) -> io::Result<()> {
        if path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty stream path",
            ));
        }
        self.streams.insert(path.join("/"), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::store::PropertyStream;
    use crate::property::types::{PropertyTag, PropertyType};

    #[test]
    fn test_stream_name_grammar() {
        let tag = PropertyTag::new(0x8000, PropertyType::Unicode);
        assert_eq!(stream_name(tag, None), "__substg1.0_8000001F");

        let multi = PropertyTag::new(0x1234, PropertyType::MultipleBinary);
        assert_eq!(stream_name(multi, Some(1)), "__substg1.0_12341102-00000001");
    }

    #[test]
    fn test_header_len_policy() {
        assert_eq!(PropertiesKind::TopLevel.header_len(), 32);
        assert_eq!(PropertiesKind::Embedded.header_len(), 24);
    }

    #[test]
    fn test_build_tree_prepends_zero_header() {
        let props = PropertyStreams {
            rows: vec![0xAA; 16],
            streams: vec![PropertyStream {
                tag: PropertyTag::new(0x0037, PropertyType::Unicode),
                element: None,
                data: vec![0x41, 0x00],
            }],
        };
        let nodes = build_tree(PropertiesKind::TopLevel, &props, &NamedPropertyTables::default());

        let fixed = &nodes[0];
        assert_eq!(fixed.path, vec![PROPERTIES_STREAM.to_string()]);
        assert_eq!(fixed.data.len(), 32 + 16);
        assert!(fixed.data[..32].iter().all(|&b| b == 0));
        assert_eq!(&fixed.data[32..], &[0xAA; 16]);

        assert_eq!(nodes[1].path, vec!["__substg1.0_0037001F".to_string()]);

        // Named tables always present under the fixed sub-storage.
        assert_eq!(
            nodes[2].path,
            vec![NAMEID_STORAGE.to_string(), NAMEID_GUID_STREAM.to_string()]
        );
    }

    #[test]
    fn test_memory_container_round_trip() {
        let mut container = MemoryContainer::new();
        container
            .write_stream(&[NAMEID_STORAGE, NAMEID_ENTRY_STREAM], &[1, 2, 3])
            .unwrap();
        assert_eq!(
            container.stream("__nameid_version1.0/__substg1.0_00030102"),
            Some(&[1u8, 2, 3][..])
        );
        assert!(container.write_stream(&[], &[]).is_err());
    }
}
