use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use clap::Args;
use eyre::Context;
use w3obj_csv::EncodeOptions;
use w3obj_modfile::{DecodeOptions, FormatVariant, ModFile, ObjectKey, RecordStore, BASE_NEW_ID};

use super::Command;
use crate::{cli::UnknownTypes, utils};

pub const W3OBJ_UNKNOWN_TYPES: &str = "W3OBJ_UNKNOWN_TYPES";

/// Converts between the binary, CSV and JSON representations.
#[derive(Debug, Args)]
pub struct Convert {
    /// Path to the file to convert.
    ///
    /// Either a `.w3u`, `.w3t`, `.w3h` or `.w3a` file, or a `.csv`
    /// file previously produced by this tool.
    input: PathBuf,

    /// Path to the file to create.
    ///
    /// Binary inputs may be written as `.csv` or `.json`; CSV inputs
    /// as one of the binary variants or `.json`.
    output: PathBuf,

    /// How to decode value types outside the documented ones.
    #[clap(long, value_enum, default_value_t, env = W3OBJ_UNKNOWN_TYPES)]
    unknown_types: UnknownTypes,

    /// Prefixes CSV output with a UTF-8 byte order mark.
    #[clap(long)]
    bom: bool,

    /// Restricts CSV output to the given objects.
    ///
    /// Takes the original ID alone for modified stock objects, or
    /// `ORIG:NEW` for custom objects. May be repeated.
    #[clap(long, value_name = "ORIG[:NEW]", value_parser = parse_object_key)]
    only: Vec<ObjectKey>,
}

/// The representation of a file, as told by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Binary(FormatVariant),
    Csv,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> eyre::Result<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        if ext.eq_ignore_ascii_case("csv") {
            Ok(Self::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if let Some(variant) = FormatVariant::from_extension(ext) {
            Ok(Self::Binary(variant))
        } else {
            Err(eyre::eyre!(
                "unsupported file type '{}'; expected .w3u, .w3t, .w3h, .w3a, .csv or .json",
                path.display()
            ))
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(variant) => write!(f, ".{}", variant.extension()),
            Self::Csv => f.write_str(".csv"),
            Self::Json => f.write_str(".json"),
        }
    }
}

/// Ensures that `from` can be converted into `to`.
fn check_conversion(from: Format, to: Format) -> eyre::Result<()> {
    match (from, to) {
        (Format::Binary(_), Format::Csv | Format::Json) => Ok(()),
        (Format::Csv, Format::Binary(_) | Format::Json) => Ok(()),
        (from, to) => Err(eyre::eyre!("cannot convert {from} files to {to}")),
    }
}

/// Parses an object selection of the form `ORIG` or `ORIG:NEW`.
fn parse_object_key(s: &str) -> Result<ObjectKey, String> {
    let (original, new) = match s.split_once(':') {
        Some((original, new)) => (original.trim(), Some(new.trim())),
        None => (s.trim(), None),
    };

    if original.is_empty() || new.is_some_and(str::is_empty) {
        return Err(format!("'{s}' is not of the form ORIG or ORIG:NEW"));
    }

    Ok(match new {
        Some(new) if new != BASE_NEW_ID => ObjectKey::new(original, new),
        _ => ObjectKey::base(original),
    })
}

impl Convert {
    fn read(&self, format: Format) -> eyre::Result<RecordStore> {
        let path = &self.input;
        match format {
            Format::Binary(_) => {
                let options = DecodeOptions {
                    unknown_types: self.unknown_types.into(),
                };
                let file = ModFile::read_path(path, options)
                    .with_context(|| format!("failed to read '{}'", path.display()))?;

                if file.truncated {
                    log::warn!(
                        "'{}' ends in the middle of a record; converting the {} complete ones",
                        path.display(),
                        file.records.len()
                    );
                }
                Ok(file.records)
            }

            Format::Csv => w3obj_csv::read_path(path)
                .with_context(|| format!("failed to read '{}'", path.display())),

            Format::Json => Err(eyre::eyre!(
                "'{}' cannot be read; JSON is an output format only",
                path.display()
            )),
        }
    }

    fn write(&self, format: Format, records: RecordStore) -> eyre::Result<()> {
        let path = &self.output;
        if !self.only.is_empty() && format != Format::Csv {
            log::warn!("Object selection only applies to CSV output; writing all records");
        }

        match format {
            Format::Binary(variant) => ModFile::new(variant, records)
                .write_path(path)
                .with_context(|| format!("failed to write '{}'", path.display())),

            Format::Csv => {
                let options = EncodeOptions {
                    byte_order_mark: self.bom,
                };

                if self.only.is_empty() {
                    w3obj_csv::write_path(&records, path, options)
                        .with_context(|| format!("failed to write '{}'", path.display()))
                } else {
                    let text = w3obj_csv::export_objects(&records, &self.only, options);
                    fs::write(path, text)
                        .with_context(|| format!("failed to write '{}'", path.display()))
                }
            }

            Format::Json => utils::write_json(path, &records),
        }
    }
}

impl Command for Convert {
    fn handle(self) -> eyre::Result<()> {
        let from = Format::from_path(&self.input)?;
        let to = Format::from_path(&self.output)?;
        check_conversion(from, to)?;

        let records = self.read(from)?;
        log::info!(
            "Converting {} records of {} objects from '{}' to '{}'",
            records.len(),
            records.object_keys().len(),
            self.input.display(),
            self.output.display()
        );

        self.write(to, records)
    }
}
