use std::{fmt, str};

/// A first-party restriction clause, e.g. `status = student`.
///
/// The predicate is kept as the raw bytes that were signed; whether it reads
/// as text only matters once the signature has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caveat {
    predicate: Vec<u8>,
}

impl Caveat {
    pub fn new(predicate: impl Into<Vec<u8>>) -> Self {
        Self {
            predicate: predicate.into(),
        }
    }

    #[must_use]
    pub fn predicate(&self) -> &[u8] {
        &self.predicate
    }

    /// The predicate as text, `None` if it is not valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        str::from_utf8(&self.predicate).ok()
    }
}

impl fmt::Display for Caveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.predicate))
    }
}
