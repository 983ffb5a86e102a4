use std::{
    borrow::Cow,
    io::{self, Write},
};

use w3obj_modfile::{ObjectKey, ObjectRecord, RecordStore, Schema, BASE_NEW_ID};

use crate::{BASE_COLUMNS, LEVEL_COLUMNS};

/// Source column text for placeholder rows of missing objects.
const UNKNOWN_SOURCE: &str = "Unknown";

/// Configuration for the CSV writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeOptions {
    /// Prefixes the output with a UTF-8 byte order mark.
    ///
    /// Some spreadsheet applications need this to detect the
    /// encoding.
    pub byte_order_mark: bool,
}

/// Quotes a field if it contains a comma, quote or line break.
///
/// Quotes inside quoted fields are doubled.
pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

struct CsvWriter {
    out: String,
    schema: Schema,
}

impl CsvWriter {
    fn new(schema: Schema, options: EncodeOptions) -> Self {
        let mut out = String::new();
        if options.byte_order_mark {
            out.push('\u{feff}');
        }

        let mut header = BASE_COLUMNS.to_vec();
        if schema.level_columns {
            header.extend(LEVEL_COLUMNS);
        }

        let mut this = Self { out, schema };
        this.line(header.into_iter().map(Cow::Borrowed));
        this
    }

    fn line<'a>(&mut self, fields: impl Iterator<Item = Cow<'a, str>>) {
        for (idx, field) in fields.enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            self.out.push_str(&field);
        }
        self.out.push('\n');
    }

    fn record(&mut self, record: &ObjectRecord) {
        // Newlines in values are kept on one line as a literal `\n`.
        let value = record.value.to_string().replace('\n', "\\n");

        let mut fields = vec![
            escape(record.source.name()).into_owned(),
            escape(record.original_id.as_str()).into_owned(),
            escape(record.display_new_id()).into_owned(),
            escape(record.field_id.as_str()).into_owned(),
            escape(&record.value_type.name()).into_owned(),
            escape(&value).into_owned(),
        ];
        if self.schema.level_columns {
            fields.push(record.level.to_string());
            fields.push(record.data_pointer.to_string());
        }

        self.line(fields.into_iter().map(Cow::Owned));
    }

    fn placeholder(&mut self, key: &ObjectKey) {
        let new_id = if key.original_id == key.new_id {
            BASE_NEW_ID
        } else {
            key.new_id.as_str()
        };

        let mut fields = vec![
            Cow::Borrowed(UNKNOWN_SOURCE),
            escape(key.original_id.as_str()),
            escape(new_id),
            Cow::Borrowed(""),
            Cow::Borrowed(""),
            Cow::Borrowed(""),
        ];
        if self.schema.level_columns {
            fields.extend([Cow::Borrowed(""), Cow::Borrowed("")]);
        }

        self.line(fields.into_iter());
    }
}

/// Encodes all records of `store` as CSV text.
///
/// The level columns are included when the store's schema has them.
pub fn encode(store: &RecordStore, options: EncodeOptions) -> String {
    let mut writer = CsvWriter::new(store.schema(), options);
    for record in store {
        writer.record(record);
    }
    writer.out
}

/// Encodes all records of `store` to the given [`Write`]r.
pub fn write<W: Write>(
    store: &RecordStore,
    mut writer: W,
    options: EncodeOptions,
) -> io::Result<()> {
    writer.write_all(encode(store, options).as_bytes())
}

/// Encodes only the records of the selected objects.
///
/// Objects are written in the order of `keys`. A key without any
/// records produces a single `Unknown` row carrying only the IDs so
/// the selection stays visible; such rows are skipped when the text
/// is decoded again.
pub fn export_objects(store: &RecordStore, keys: &[ObjectKey], options: EncodeOptions) -> String {
    let mut writer = CsvWriter::new(store.schema(), options);
    for key in keys {
        let mut found = false;
        for record in store.iter().filter(|r| r.key() == *key) {
            writer.record(record);
            found = true;
        }

        if !found {
            log::warn!("No records for object {key}");
            writer.placeholder(key);
        }
    }
    writer.out
}
