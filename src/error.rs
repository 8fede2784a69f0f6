use std::io;

/// Error type covering every fallible operation in this crate.
///
/// All variants are detected synchronously at the triggering call; nothing is
/// retried internally. Container I/O failures pass through as [`MsgError::Io`]
/// and are never reinterpreted as one of the other categories.
#[derive(Debug)]
pub enum MsgError {
    /// A value's runtime kind contradicts its tag, or an input is otherwise
    /// invalid (e.g. saving a document whose message class is unset).
    Validation(String),
    /// A mutation or finalize arrived after the owning document was saved,
    /// or a single-shot operation was invoked twice.
    State(String),
    /// The named-property id space [0x8000, 0xFFFF) is exhausted.
    Capacity(String),
    /// Malformed input to a fixed-width encoder.
    Encoding(String),
    /// I/O error reported by the external container.
    Io(io::Error),
}

impl std::fmt::Display for MsgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::State(msg) => write!(f, "State error: {}", msg),
            Self::Capacity(msg) => write!(f, "Capacity error: {}", msg),
            Self::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for MsgError {}

impl From<io::Error> for MsgError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_message() {
        let err = MsgError::Validation(String::from("tag 0x0037 declares Unicode"));
        assert!(format!("{}", err).contains("0x0037"));

        let err = MsgError::State(String::from("document already saved"));
        assert!(format!("{}", err).contains("saved"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "stream missing");
        let err: MsgError = io_err.into();
        match err {
            MsgError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            _ => panic!("Expected Io variant"),
        }
    }
}
