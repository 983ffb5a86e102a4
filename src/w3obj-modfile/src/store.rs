use indexmap::{IndexMap, IndexSet};

use crate::{ObjectKey, ObjectRecord, Source};

/// Column layout carried by a [`RecordStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    /// Whether the level and data pointer columns are part of
    /// tabular exports.
    pub level_columns: bool,
}

impl Schema {
    /// Only the six base columns.
    pub const BASIC: Self = Self {
        level_columns: false,
    };

    /// The base columns plus level and data pointer.
    pub const FULL: Self = Self {
        level_columns: true,
    };
}

impl Default for Schema {
    fn default() -> Self {
        Self::FULL
    }
}

/// The modifications of one object, in insertion order.
#[derive(Clone, Debug)]
pub struct ObjectGroup<'a> {
    /// The identity of the object.
    pub key: ObjectKey,
    /// The records belonging to the object.
    pub records: Vec<&'a ObjectRecord>,
}

/// An ordered collection of [`ObjectRecord`]s.
///
/// Insertion order is significant: it determines the order in which
/// objects and their modifications are written back.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordStore {
    #[cfg_attr(feature = "serde", serde(skip))]
    schema: Schema,
    records: Vec<ObjectRecord>,
}

impl RecordStore {
    /// Creates an empty store with the full [`Schema`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Gets the column schema of the store.
    #[inline]
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Gets the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRecord> {
        self.records.iter()
    }

    /// Gets all records as a slice.
    #[inline]
    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    /// Appends one record.
    pub fn push(&mut self, record: ObjectRecord) {
        self.records.push(record);
    }

    /// Replaces all records, keeping the schema.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = ObjectRecord>) {
        self.records.clear();
        self.records.extend(records);
    }

    /// Iterates over the records from one section.
    pub fn by_source(&self, source: Source) -> impl Iterator<Item = &ObjectRecord> + '_ {
        self.records.iter().filter(move |r| r.source == source)
    }

    /// Groups the records of one section by object.
    ///
    /// Objects appear in the order they were first seen, and so do
    /// the modifications inside each object.
    pub fn objects(&self, source: Source) -> Vec<ObjectGroup<'_>> {
        let mut groups: IndexMap<ObjectKey, Vec<&ObjectRecord>> = IndexMap::new();
        for record in self.by_source(source) {
            groups.entry(record.key()).or_default().push(record);
        }

        groups
            .into_iter()
            .map(|(key, records)| ObjectGroup { key, records })
            .collect()
    }

    /// Gets the keys of all objects across both sections, in order
    /// of first appearance.
    pub fn object_keys(&self) -> Vec<(Source, ObjectKey)> {
        let keys: IndexSet<(Source, ObjectKey)> =
            self.records.iter().map(|r| (r.source, r.key())).collect();
        keys.into_iter().collect()
    }
}

impl Extend<ObjectRecord> for RecordStore {
    fn extend<T: IntoIterator<Item = ObjectRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl FromIterator<ObjectRecord> for RecordStore {
    fn from_iter<T: IntoIterator<Item = ObjectRecord>>(iter: T) -> Self {
        Self {
            schema: Schema::default(),
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a ObjectRecord;
    type IntoIter = std::slice::Iter<'a, ObjectRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
