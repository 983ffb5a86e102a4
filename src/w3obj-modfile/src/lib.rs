//! Crate for parsing and writing Warcraft III object modification files.
//!
//! These files store the differences a map makes to the game's object
//! data: changed fields of stock objects and fully custom objects
//! derived from them. The four variants ([`FormatVariant`]) share one
//! layout, with ability files additionally carrying a level and data
//! pointer per modification.
//!
//! Decoding is tolerant of truncated input. When the data ends in the
//! middle of a record, everything read up to that point is kept and
//! [`ModFile::truncated`] is set instead of failing.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use w3obj_utils::{binary, ByteCursor, Truncated};

mod record;
pub use record::*;

mod store;
pub use store::*;

mod tag;
pub use tag::Tag;

pub mod value;
pub use value::{UnknownTypePolicy, Value, ValueType};

mod variant;
pub use variant::FormatVariant;

/// Value written after every modification.
const END_MARKER: i32 = 0;

/// Errors that may occur when working with object modification files.
#[derive(Debug, Error)]
pub enum ModFileError {
    /// An I/O operation on the underlying file failed.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The path does not name one of the known file variants.
    #[error("'{}' is not a .w3u, .w3t, .w3h or .w3a file", .0.display())]
    UnknownVariant(PathBuf),

    /// The file contents could not be interpreted.
    #[error("{0}")]
    Format(#[from] FormatError),
}

/// Irregularities in file contents that abort decoding.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// A modification declared a value type outside the documented
    /// ones while decoding with [`UnknownTypePolicy::Reject`].
    #[error("unknown value type code {code} at offset {offset}")]
    UnknownTypeCode { code: i32, offset: usize },
}

/// Configuration for [`ModFile::decode`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeOptions {
    /// How to treat undocumented value type codes.
    pub unknown_types: UnknownTypePolicy,
}

/// Representation of an object modification file.
#[derive(Clone, Debug, PartialEq)]
pub struct ModFile {
    /// The format version read from the file header.
    ///
    /// Not interpreted; files are always written with
    /// [`ModFile::VERSION`].
    pub version: i32,
    /// The variant the data is encoded in.
    pub variant: FormatVariant,
    /// All object modifications in file order.
    pub records: RecordStore,
    /// Whether decoding stopped early because the data ended in the
    /// middle of a record.
    pub truncated: bool,
}

enum ReadError {
    Truncated(Truncated),
    Format(FormatError),
}

impl From<Truncated> for ReadError {
    fn from(e: Truncated) -> Self {
        Self::Truncated(e)
    }
}

impl ModFile {
    /// The format version emitted by the writer.
    pub const VERSION: i32 = 1;

    /// Creates a new file from the given records.
    pub fn new(variant: FormatVariant, records: RecordStore) -> Self {
        Self {
            version: Self::VERSION,
            variant,
            records,
            truncated: false,
        }
    }

    /// Decodes a file from its raw bytes.
    ///
    /// Only fails for undocumented value types under
    /// [`UnknownTypePolicy::Reject`]; truncated input yields the
    /// records read so far.
    pub fn decode(
        data: &[u8],
        variant: FormatVariant,
        options: DecodeOptions,
    ) -> Result<Self, FormatError> {
        let mut cur = ByteCursor::new(data);
        let mut this = Self::new(variant, RecordStore::new());

        log::debug!(
            "Decoding {} bytes as .{} data with {:?}",
            data.len(),
            variant.extension(),
            options
        );

        match cur.int32() {
            Ok(version) => this.version = version,
            Err(e) => {
                log::warn!("Input is too short for a file header ({e})");
                this.truncated = true;
                return Ok(this);
            }
        }

        for source in Source::ALL {
            let before = this.records.len();
            match this.read_section(&mut cur, source, options) {
                Ok(()) => {}

                Err(ReadError::Truncated(e)) => {
                    log::warn!(
                        "{source} section is truncated ({e}); keeping {} of its records",
                        this.records.len() - before
                    );
                    this.truncated = true;
                    break;
                }

                Err(ReadError::Format(e)) => return Err(e),
            }
        }

        if !this.truncated && !cur.is_empty() {
            log::debug!("Ignoring {} trailing bytes", cur.remaining());
        }

        Ok(this)
    }

    /// Attempts to parse a file from a given [`Read`][io::Read]er.
    pub fn parse<R: io::Read>(
        mut reader: R,
        variant: FormatVariant,
        options: DecodeOptions,
    ) -> Result<Self, ModFileError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::decode(&data, variant, options).map_err(Into::into)
    }

    /// Reads and decodes the file at `path`.
    ///
    /// The variant is determined from the file extension.
    pub fn read_path<P: AsRef<Path>>(path: P, options: DecodeOptions) -> Result<Self, ModFileError> {
        let path = path.as_ref();
        let variant = FormatVariant::from_path(path)
            .ok_or_else(|| ModFileError::UnknownVariant(path.to_owned()))?;

        let data = fs::read(path)?;
        Self::decode(&data, variant, options).map_err(Into::into)
    }

    fn read_section(
        &mut self,
        cur: &mut ByteCursor<'_>,
        source: Source,
        options: DecodeOptions,
    ) -> Result<(), ReadError> {
        let object_count = cur.int32()?;
        log::debug!("Reading {object_count} objects from {source} section");

        for _ in 0..object_count {
            let original_id = Tag::from_wire(cur.array()?);
            let new_id = Tag::from_wire(cur.array()?);
            let new_id = match source {
                Source::Original => original_id.clone(),
                Source::Custom => new_id,
            };

            let mod_count = cur.int32()?;
            log::trace!("Object {original_id}:{new_id} has {mod_count} modifications");

            for _ in 0..mod_count {
                let record =
                    self.read_modification(cur, source, &original_id, &new_id, options)?;
                self.records.push(record);
            }
        }

        Ok(())
    }

    fn read_modification(
        &self,
        cur: &mut ByteCursor<'_>,
        source: Source,
        original_id: &Tag,
        new_id: &Tag,
        options: DecodeOptions,
    ) -> Result<ObjectRecord, ReadError> {
        let field_id = Tag::from_wire(cur.array()?);

        let type_offset = cur.position();
        let value_type = ValueType::from_code(cur.int32()?);

        let (level, data_pointer) = if self.variant.has_level_pointer() {
            (cur.int32()?, cur.int32()?)
        } else {
            (0, 0)
        };

        let value = value::read_payload(cur, value_type, options.unknown_types).map_err(
            |e| match e {
                value::PayloadError::Truncated(e) => ReadError::Truncated(e),
                value::PayloadError::Rejected(code) => {
                    ReadError::Format(FormatError::UnknownTypeCode {
                        code,
                        offset: type_offset,
                    })
                }
            },
        )?;

        // The end marker is not validated.
        cur.int32()?;

        Ok(ObjectRecord {
            source,
            original_id: original_id.clone(),
            new_id: new_id.clone(),
            field_id,
            value_type,
            value,
            level,
            data_pointer,
        })
    }

    /// Encodes the file into a new buffer.
    ///
    /// Fails when a section or object holds more entries than an
    /// `i32` count can express.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    /// Writes the file data to the given [`Write`]r.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_records(&mut writer, &self.records, self.variant)
    }

    /// Encodes the file and writes it to `path`.
    ///
    /// The variant is determined from the file extension and takes
    /// precedence over [`ModFile::variant`].
    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ModFileError> {
        let path = path.as_ref();
        let variant = FormatVariant::from_path(path)
            .ok_or_else(|| ModFileError::UnknownVariant(path.to_owned()))?;

        let mut writer = BufWriter::new(fs::File::create(path)?);
        write_records(&mut writer, &self.records, variant)?;
        writer.flush()?;

        Ok(())
    }
}

fn write_records<W: Write>(
    writer: &mut W,
    records: &RecordStore,
    variant: FormatVariant,
) -> io::Result<()> {
    binary::write_int32(writer, ModFile::VERSION)?;

    for source in Source::ALL {
        let objects = records.objects(source);
        log::debug!("Writing {} objects to {source} section", objects.len());

        binary::write_seq(writer, true, &objects, |w, object| {
            binary::write_tag(w, wire_tag(&object.key.original_id))?;
            binary::write_tag(w, wire_tag(&object.key.new_id))?;
            binary::write_seq(w, true, &object.records, |w, record| {
                write_modification(w, record, variant)
            })
        })?;
    }

    Ok(())
}

fn wire_tag(tag: &Tag) -> [u8; Tag::WIRE_SIZE] {
    let wire = tag.to_wire();
    if !tag.is_wire_exact() {
        log::warn!(
            "Tag '{tag}' is not 4 ASCII characters; writing it as '{}'",
            String::from_utf8_lossy(&wire)
        );
    }
    wire
}

fn write_modification<W: Write>(
    w: &mut W,
    record: &ObjectRecord,
    variant: FormatVariant,
) -> io::Result<()> {
    // `Unknown` may wrap one of the documented codes.
    let value_type = ValueType::from_code(record.value_type.code());
    if !value_type.is_known() {
        log::debug!(
            "Writing {} of {} as an opaque 4-byte integer",
            value_type,
            record.key()
        );
    }

    binary::write_tag(w, wire_tag(&record.field_id))?;
    binary::write_int32(w, value_type.code())?;
    if variant.has_level_pointer() {
        binary::write_int32(w, record.level)?;
        binary::write_int32(w, record.data_pointer)?;
    }
    value::write_payload(w, value_type, &record.value)?;
    binary::write_int32(w, END_MARKER)
}
