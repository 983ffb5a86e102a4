use std::{fmt, str::FromStr};

use crate::{Tag, Value, ValueType};

/// The text shown in place of the new ID for [`Source::Original`] rows.
pub const BASE_NEW_ID: &str = "(base)";

/// Which section of the file an object belongs to.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Modifications to an object shipped with the game.
    Original,
    /// A new object derived from an existing one.
    Custom,
}

impl Source {
    /// All sources in the order their sections appear in files.
    pub const ALL: [Source; 2] = [Source::Original, Source::Custom];

    /// Gets the textual name of the source.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for text that does not name a [`Source`].
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown object source '{0}'")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSource(s.to_owned()))
    }
}

/// Identity of an object within its section.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// The ID of the object this one is based on.
    pub original_id: Tag,
    /// The ID of the object itself.
    pub new_id: Tag,
}

impl ObjectKey {
    /// Creates a new key from its two IDs.
    pub fn new(original_id: impl Into<Tag>, new_id: impl Into<Tag>) -> Self {
        Self {
            original_id: original_id.into(),
            new_id: new_id.into(),
        }
    }

    /// Creates the key for an unmodified base object, whose new ID
    /// equals the original one.
    pub fn base(original_id: impl Into<Tag>) -> Self {
        let original_id = original_id.into();
        Self {
            new_id: original_id.clone(),
            original_id,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.original_id, self.new_id)
    }
}

/// A single field modification of an object.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    /// The section the object belongs to.
    pub source: Source,
    /// The ID of the object this one is based on.
    pub original_id: Tag,
    /// The ID of the object itself.
    ///
    /// For [`Source::Original`] records this is the identity tag and
    /// always written as [`ObjectRecord::original_id`]; see
    /// [`ObjectRecord::display_new_id`] for the presentation form.
    pub new_id: Tag,
    /// The ID of the modified field.
    pub field_id: Tag,
    /// The declared type of [`ObjectRecord::value`].
    pub value_type: ValueType,
    /// The new field value.
    pub value: Value,
    /// The ability level the modification applies to.
    ///
    /// Only encoded by the ability file variant.
    pub level: i32,
    /// The data column the modification applies to.
    ///
    /// Only encoded by the ability file variant.
    pub data_pointer: i32,
}

impl ObjectRecord {
    /// Creates a record with level and data pointer set to `0`.
    ///
    /// The value type is derived from the kind of `value`.
    pub fn new(source: Source, key: ObjectKey, field_id: impl Into<Tag>, value: Value) -> Self {
        let value_type = match &value {
            Value::Int(_) => ValueType::Int,
            Value::Real(_) => ValueType::Real,
            Value::Str(_) => ValueType::String,
        };
        let new_id = match source {
            Source::Original => key.original_id.clone(),
            Source::Custom => key.new_id,
        };

        Self {
            source,
            original_id: key.original_id,
            new_id,
            field_id: field_id.into(),
            value_type,
            value,
            level: 0,
            data_pointer: 0,
        }
    }

    /// Overrides the declared value type.
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the ability level and data pointer.
    pub fn with_level(mut self, level: i32, data_pointer: i32) -> Self {
        self.level = level;
        self.data_pointer = data_pointer;
        self
    }

    /// Gets the key of the object this record modifies.
    ///
    /// Original records are keyed by their original ID alone.
    pub fn key(&self) -> ObjectKey {
        match self.source {
            Source::Original => ObjectKey::base(self.original_id.clone()),
            Source::Custom => ObjectKey::new(self.original_id.clone(), self.new_id.clone()),
        }
    }

    /// Gets the new ID as presented to users.
    pub fn display_new_id(&self) -> &str {
        match self.source {
            Source::Original => BASE_NEW_ID,
            Source::Custom => self.new_id.as_str(),
        }
    }
}
