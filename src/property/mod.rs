//! Typed property model: tags, values, and the central store.

pub(crate) mod store;
pub(crate) mod types;
pub(crate) mod value;

pub use store::{FIXED_ROW_WIDTH, PropertyStore, PropertyStream, PropertyStreams};
pub use types::{PropertyFlags, PropertyTag, PropertyType, tags};
pub use value::PropertyValue;
