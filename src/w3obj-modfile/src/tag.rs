use std::fmt;

use smartstring::alias::String;

/// A four-character identifier for objects and their fields.
///
/// In memory, a tag holds arbitrary text so that edited values survive
/// until they are written. On the wire it is always exactly
/// [`Tag::WIRE_SIZE`] bytes of ASCII; see [`Tag::to_wire`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// The encoded size of a tag in bytes.
    pub const WIRE_SIZE: usize = 4;

    /// Creates a new tag from the given text.
    #[inline]
    pub fn new(v: &str) -> Self {
        Self(v.into())
    }

    /// Decodes a tag from its wire bytes.
    ///
    /// Bytes outside the ASCII range are replaced by `?`.
    pub fn from_wire(raw: [u8; Self::WIRE_SIZE]) -> Self {
        Self(
            raw.iter()
                .map(|&b| if b.is_ascii() { b as char } else { '?' })
                .collect(),
        )
    }

    /// Encodes the tag into its wire representation.
    ///
    /// Shorter tags are padded with spaces and longer ones are cut
    /// after four characters. Non-ASCII characters become `?`.
    pub fn to_wire(&self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [b' '; Self::WIRE_SIZE];
        for (slot, c) in out.iter_mut().zip(self.0.chars()) {
            *slot = if c.is_ascii() { c as u8 } else { b'?' };
        }
        out
    }

    /// Whether the tag encodes without padding, truncation or
    /// character replacement.
    pub fn is_wire_exact(&self) -> bool {
        self.0.len() == Self::WIRE_SIZE && self.0.is_ascii()
    }

    /// Gets the tag text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(v: &str) -> Self {
        Self::new(v)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
