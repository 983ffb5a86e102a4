//! Editable CSV representation of object modification records.
//!
//! Each row holds one modification:
//!
//! ```text
//! Source,OriginalID,NewID,FieldID,Type,Value,Level,DataPointer
//! Original,hfoo,(base),uhpm,int,450,0,0
//! Custom,hfoo,h000,unam,string,"Footman, Elite",0,0
//! ```
//!
//! The reader is lenient. Quoted fields may span several lines, and
//! rows which lack a source or type are skipped rather than rejected.
//! The writer only quotes fields where needed and replaces newlines in
//! values with a literal `\n`, which the reader leaves as is.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use thiserror::Error;
use w3obj_modfile::RecordStore;

mod reader;
pub use reader::*;

mod writer;
pub use writer::*;

/// The columns every CSV file has.
pub const BASE_COLUMNS: [&str; 6] = ["Source", "OriginalID", "NewID", "FieldID", "Type", "Value"];

/// The extra columns for stores with [`Schema::FULL`][w3obj_modfile::Schema::FULL].
pub const LEVEL_COLUMNS: [&str; 2] = ["Level", "DataPointer"];

/// Errors that may occur when reading or writing CSV files.
#[derive(Debug, Error)]
pub enum CsvError {
    /// An I/O operation on the underlying file failed.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Reads the CSV file at `path` into a new store.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<RecordStore, CsvError> {
    let data = fs::read(path)?;
    Ok(decode(&String::from_utf8_lossy(&data)))
}

/// Writes all records of `store` as a CSV file to `path`.
pub fn write_path<P: AsRef<Path>>(
    store: &RecordStore,
    path: P,
    options: EncodeOptions,
) -> Result<(), CsvError> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    write(store, &mut writer, options)?;
    writer.flush()?;

    Ok(())
}
