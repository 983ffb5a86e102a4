use std::fs;

use tempfile::tempdir;

use w3obj_csv::*;
use w3obj_modfile::{
    DecodeOptions, ModFile, ObjectKey, ObjectRecord, RecordStore, Schema, Source,
    Value, ValueType,
};

const UNITS: &str = "../w3obj-modfile/tests/data/units.w3u";
const ABILITIES: &str = "../w3obj-modfile/tests/data/abilities.w3a";

fn store(records: impl IntoIterator<Item = ObjectRecord>) -> RecordStore {
    records.into_iter().collect()
}

#[test]
fn binary_fixture_as_csv() -> Result<(), Box<dyn std::error::Error>> {
    let file = ModFile::read_path(UNITS, DecodeOptions::default())?;
    let text = encode(&file.records, EncodeOptions::default());

    assert_eq!(
        text,
        "Source,OriginalID,NewID,FieldID,Type,Value,Level,DataPointer\n\
         Original,hfoo,(base),uhpm,int,450,0,0\n\
         Original,hfoo,(base),unam,string,\"Footman, Elite \"\"Guard\"\"\",0,0\n\
         Custom,hfoo,h000,umvs,real,2.5,0,0\n"
    );

    Ok(())
}

#[test]
fn binary_survives_csv() -> Result<(), Box<dyn std::error::Error>> {
    for path in [UNITS, ABILITIES] {
        let data = fs::read(path)?;
        let file = ModFile::read_path(path, DecodeOptions::default())?;

        let text = encode(&file.records, EncodeOptions::default());
        let records = decode(&text);
        assert_eq!(records, file.records, "{path} records differ");

        let rebuilt = ModFile::new(file.variant, records).encode().unwrap();
        assert_eq!(rebuilt, data, "{path} did not survive CSV");
    }

    Ok(())
}

#[test]
fn commas_and_quotes_round_trip() {
    let records = store([ObjectRecord::new(
        Source::Custom,
        ObjectKey::new("hfoo", "h000"),
        "unam",
        Value::Str("Knight, \"the\" Brave".into()),
    )]);

    let text = encode(&records, EncodeOptions::default());
    assert_eq!(decode(&text), records);
}

#[test]
fn newlines_in_values_become_literal() {
    let records = store([ObjectRecord::new(
        Source::Custom,
        ObjectKey::new("hfoo", "h000"),
        "utub",
        Value::Str("line one\nline two".into()),
    )]);

    let text = encode(&records, EncodeOptions::default());
    assert!(text.contains(",line one\\nline two,"));

    let decoded = decode(&text);
    assert_eq!(
        decoded.records()[0].value,
        Value::Str("line one\\nline two".into())
    );
}

#[test]
fn quoted_fields_span_lines() {
    let text = "Source,OriginalID,NewID,FieldID,Type,Value\n\
                Custom,hfoo,h000,utub,string,\"first\r\nsecond, \"\"third\"\"\"\n\
                Custom,hfoo,h000,uhpm,int,5\n";

    let records = decode(text);
    assert_eq!(records.len(), 2);
    assert_eq!(
        records.records()[0].value,
        Value::Str("first\nsecond, \"third\"".into())
    );
    assert_eq!(records.records()[1].value, Value::Int(5));
}

#[test]
fn malformed_rows_are_skipped() {
    let text = "Source,OriginalID,NewID,FieldID,Type,Value,Level,DataPointer\n\
                Custom,hfoo,h000,uhpm,int\n\
                ,hfoo,h000,uhpm,int,1\n\
                Custom,hfoo,h000,uhpm,,1\n\
                Unknown,hkni,h001,,,\n\
                \n\
                Custom,hfoo,h000,umvs,real,fast,x,\n\
                original,hpea,(base),uhpm,int,7\n";

    let records = decode(text);
    let rows: Vec<_> = records
        .iter()
        .map(|r| (r.source, r.key(), r.value.clone(), r.level, r.data_pointer))
        .collect();

    assert_eq!(
        rows,
        [
            (
                Source::Custom,
                ObjectKey::new("hfoo", "h000"),
                Value::Real(0.0),
                0,
                0
            ),
            (Source::Original, ObjectKey::base("hpea"), Value::Int(7), 0, 0),
        ]
    );
}

#[test]
fn unknown_types_keep_their_code() {
    let text = "header\nCustom,hfoo,h000,uxxx,type7,9\nCustom,hfoo,h000,uyyy,bool,1\n";
    let records = decode(text);

    let types: Vec<_> = records.iter().map(|r| r.value_type).collect();
    assert_eq!(types, [ValueType::Unknown(7), ValueType::Int]);
}

#[test]
fn header_only_and_empty_input() {
    assert!(decode("").is_empty());
    assert!(decode("Source,OriginalID,NewID,FieldID,Type,Value").is_empty());
    assert!(decode("Custom,hfoo,h000,uhpm,int,5").is_empty());
}

#[test]
fn decode_into_appends() {
    let mut records = store([ObjectRecord::new(
        Source::Original,
        ObjectKey::base("hpea"),
        "uhpm",
        Value::Int(1),
    )]);

    let added = decode_into(
        &mut records,
        "header\nCustom,hfoo,h000,uhpm,int,2\nCustom,hfoo,h000,umvs,real,3\n",
    );

    assert_eq!(added, 2);
    assert_eq!(records.len(), 3);
    assert_eq!(records.records()[0].value, Value::Int(1));
    assert_eq!(records.records()[2].value, Value::Real(3.0));
}

#[test]
fn byte_order_mark() {
    let records = store([ObjectRecord::new(
        Source::Original,
        ObjectKey::base("hpea"),
        "uhpm",
        Value::Int(1),
    )]);

    let text = encode(
        &records,
        EncodeOptions {
            byte_order_mark: true,
        },
    );
    assert!(text.starts_with("\u{feff}Source,"));
    assert_eq!(decode(&text), records);

    let plain = encode(&records, EncodeOptions::default());
    assert!(plain.starts_with("Source,"));
}

#[test]
fn basic_schema_omits_level_columns() {
    let mut records = RecordStore::with_schema(Schema::BASIC);
    records.push(
        ObjectRecord::new(
            Source::Custom,
            ObjectKey::new("AHbz", "A000"),
            "Hbz1",
            Value::Int(4),
        )
        .with_level(3, 1),
    );

    let text = encode(&records, EncodeOptions::default());
    assert_eq!(
        text,
        "Source,OriginalID,NewID,FieldID,Type,Value\nCustom,AHbz,A000,Hbz1,int,4\n"
    );
}

#[test]
fn level_columns_are_read() {
    let text = "header\nCustom,AHbz,A000,Hbz1,unreal,0.5,2, 5 \n";
    let records = decode(text);
    let record = &records.records()[0];

    assert_eq!(record.value_type, ValueType::Unreal);
    assert_eq!((record.level, record.data_pointer), (2, 5));
}

#[test]
fn selective_export() {
    let base = ObjectKey::base("hpea");
    let custom = ObjectKey::new("hfoo", "h000");
    let records = store([
        ObjectRecord::new(Source::Custom, custom.clone(), "uhpm", Value::Int(1)),
        ObjectRecord::new(Source::Original, base.clone(), "uhpm", Value::Int(2)),
        ObjectRecord::new(Source::Custom, custom.clone(), "umvs", Value::Int(3)),
    ]);
    let missing = ObjectKey::new("hkni", "h001");
    let missing_base = ObjectKey::base("hkni");

    let text = export_objects(
        &records,
        &[base, missing, custom, missing_base],
        EncodeOptions::default(),
    );
    assert_eq!(
        text,
        "Source,OriginalID,NewID,FieldID,Type,Value,Level,DataPointer\n\
         Original,hpea,(base),uhpm,int,2,0,0\n\
         Unknown,hkni,h001,,,,,\n\
         Custom,hfoo,h000,uhpm,int,1,0,0\n\
         Custom,hfoo,h000,umvs,int,3,0,0\n\
         Unknown,hkni,(base),,,,,\n"
    );

    assert_eq!(decode(&text).len(), 3);
}

#[test]
fn files_on_disk() -> Result<(), CsvError> {
    let records = store([ObjectRecord::new(
        Source::Custom,
        ObjectKey::new("hfoo", "h000"),
        "unam",
        Value::Str("Ritter".into()),
    )]);

    let dir = tempdir()?;
    let path = dir.path().join("units.csv");

    write_path(&records, &path, EncodeOptions::default())?;
    assert_eq!(read_path(&path)?, records);
    Ok(())
}
