use std::{mem, str::Lines};

use w3obj_modfile::{ObjectRecord, RecordStore, Source, Tag, Value, ValueType};

/// The fewest fields a row needs to be considered.
const MIN_FIELDS: usize = 6;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// An iterator over the logical lines of CSV text.
///
/// Physical lines are joined with `\n` for as long as the joined text
/// has an odd number of quote characters, i.e. while a quoted field is
/// still open. An unterminated field at the end of the input is
/// discarded.
pub struct LogicalLines<'a> {
    lines: Lines<'a>,
    buf: String,
    quotes: usize,
}

impl<'a> LogicalLines<'a> {
    /// Creates an iterator over the lines of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            buf: String::new(),
            quotes: 0,
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for line in self.lines.by_ref() {
            self.buf.push_str(line);
            self.buf.push('\n');
            self.quotes += line.matches('"').count();

            if self.quotes % 2 == 0 {
                let mut out = mem::take(&mut self.buf);
                self.quotes = 0;

                let len = out.trim_end_matches(|c: char| c == '\r' || c == '\n').len();
                out.truncate(len);
                return Some(out);
            }
        }

        if !self.buf.is_empty() {
            log::debug!("Discarding unterminated quoted field at end of input");
            self.buf.clear();
            self.quotes = 0;
        }

        None
    }
}

/// Splits a logical line into its fields.
///
/// A quote toggles between quoted and unquoted mode, two quotes in a
/// row inside a quoted region produce one literal quote, and commas
/// only separate fields outside of quotes.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Whether a split row carries enough data to become a record.
fn is_acceptable(fields: &[String]) -> bool {
    fields.len() >= MIN_FIELDS && !fields[0].trim().is_empty() && !fields[4].trim().is_empty()
}

/// Parses CSV text into its raw rows.
///
/// The first line is a header and skipped. Rows with fewer than six
/// fields or a blank source or type are dropped silently.
pub fn parse_rows(text: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let body = match text.split_once('\n') {
        Some((_header, body)) => body,
        None => "",
    };

    LogicalLines::new(body)
        .map(|line| split_fields(&line))
        .filter(|fields| is_acceptable(fields))
}

/// Converts an accepted raw row into a record.
///
/// Returns [`None`] for rows that [`parse_rows`] would drop and for
/// rows whose source is neither `Original` nor `Custom`. Values that
/// do not parse as their declared type become zero, and missing or
/// invalid level columns become `0`.
pub fn record_from_row(fields: &[String]) -> Option<ObjectRecord> {
    if !is_acceptable(fields) {
        return None;
    }

    let source = match fields[0].parse::<Source>() {
        Ok(source) => source,
        Err(e) => {
            log::debug!("Skipping row: {e}");
            return None;
        }
    };

    let original_id = Tag::new(&fields[1]);
    let new_id = match source {
        Source::Original => original_id.clone(),
        Source::Custom => Tag::new(&fields[2]),
    };

    let value_type = ValueType::from_name(&fields[4]);
    let value = match fields[5].trim() {
        "" => "",
        _ => fields[5].as_str(),
    };

    let int_column = |idx: usize| -> i32 {
        fields
            .get(idx)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    };

    Some(ObjectRecord {
        source,
        original_id,
        new_id,
        field_id: Tag::new(&fields[3]),
        value_type,
        value: Value::parse_lossy(value_type, value),
        level: int_column(6),
        data_pointer: int_column(7),
    })
}

/// Decodes CSV text into a new store.
pub fn decode(text: &str) -> RecordStore {
    let mut store = RecordStore::new();
    decode_into(&mut store, text);
    store
}

/// Decodes CSV text and appends the records to an existing store.
///
/// Returns the number of records added.
pub fn decode_into(store: &mut RecordStore, text: &str) -> usize {
    let before = store.len();
    store.extend(parse_rows(text).filter_map(|row| record_from_row(&row)));

    let added = store.len() - before;
    log::debug!("Read {added} records from CSV input");
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_open_quotes() {
        let lines: Vec<_> = LogicalLines::new("a,\"b\nc\",d\r\ne,f\n\"g").collect();
        assert_eq!(lines, ["a,\"b\nc\",d", "e,f"]);
    }

    #[test]
    fn splits_quoted_fields() {
        assert_eq!(split_fields("a,\"b,c\",d"), ["a", "b,c", "d"]);
        assert_eq!(split_fields("\"say \"\"hi\"\"\",x"), ["say \"hi\"", "x"]);
        assert_eq!(split_fields(",,"), ["", "", ""]);
        assert_eq!(split_fields("a\"b\"c"), ["abc"]);
        assert_eq!(split_fields(""), [""]);
    }

    #[test]
    fn acceptance() {
        let row = |s: &str| split_fields(s);
        assert!(is_acceptable(&row("Custom,a,b,c,int,")));
        assert!(!is_acceptable(&row("Custom,a,b,c,int")));
        assert!(!is_acceptable(&row(" ,a,b,c,int,1")));
        assert!(!is_acceptable(&row("Custom,a,b,c,  ,1")));
    }

    #[test]
    fn short_rows_make_no_record() {
        assert_eq!(record_from_row(&["Custom".to_owned()]), None);
        assert_eq!(record_from_row(&[]), None);
        assert_eq!(record_from_row(&split_fields("Custom,hfoo,h000,uhpm,int")), None);
        assert_eq!(record_from_row(&split_fields("Custom,hfoo,h000,uhpm,,5")), None);

        let record = record_from_row(&split_fields("Custom,hfoo,h000,uhpm,int,5")).unwrap();
        assert_eq!(record.value, Value::Int(5));
    }
}
