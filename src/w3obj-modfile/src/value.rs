//! Typed modification values and their binary and textual encodings.

use std::{
    borrow::Cow,
    fmt,
    io::{self, Write},
    num::{ParseFloatError, ParseIntError},
};

use thiserror::Error;
use w3obj_utils::{binary, ByteCursor, Truncated};

/// Correspondence between known type codes and their textual names.
///
/// Any other code is named `type<N>`.
const TYPE_NAMES: [(i32, &str); 4] = [(0, "int"), (1, "real"), (2, "unreal"), (3, "string")];

/// Prefix of the textual form for type codes outside [`TYPE_NAMES`].
const UNKNOWN_TYPE_PREFIX: &str = "type";

/// The declared type of a modification value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A 32-bit signed integer.
    Int,
    /// A 32-bit float.
    Real,
    /// A 32-bit float with values restricted to `[0, 1]` by the game.
    Unreal,
    /// A null-terminated UTF-8 string.
    String,
    /// Any other type code.
    ///
    /// Never holds one of the known codes when created through
    /// [`ValueType::from_code`].
    Unknown(i32),
}

impl ValueType {
    /// Maps a binary type code to its [`ValueType`].
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Int,
            1 => Self::Real,
            2 => Self::Unreal,
            3 => Self::String,
            c => Self::Unknown(c),
        }
    }

    /// Gets the binary type code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Int => 0,
            Self::Real => 1,
            Self::Unreal => 2,
            Self::String => 3,
            Self::Unknown(c) => c,
        }
    }

    /// Whether this is one of the four documented types.
    pub const fn is_known(self) -> bool {
        !matches!(Self::from_code(self.code()), Self::Unknown(_))
    }

    /// Gets the textual name of the type.
    pub fn name(self) -> Cow<'static, str> {
        let code = self.code();
        match TYPE_NAMES.iter().find(|(c, _)| *c == code) {
            Some((_, name)) => Cow::Borrowed(name),
            None => Cow::Owned(format!("{UNKNOWN_TYPE_PREFIX}{code}")),
        }
    }

    /// Maps a textual type name back to its [`ValueType`].
    ///
    /// Accepts the names from the type table and `type<N>` for any
    /// numeric code. Everything else falls back to [`ValueType::Int`].
    pub fn from_name(name: &str) -> Self {
        if let Some((code, _)) = TYPE_NAMES.iter().find(|(_, n)| *n == name) {
            return Self::from_code(*code);
        }

        match name
            .strip_prefix(UNKNOWN_TYPE_PREFIX)
            .and_then(|code| code.parse().ok())
        {
            Some(code) => Self::from_code(code),
            None => {
                log::debug!("Unrecognized type name '{name}'; assuming int");
                Self::Int
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValueType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Errors from interpreting text as a typed value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValueParseError {
    #[error("invalid integer '{text}': {source}")]
    Int { text: String, source: ParseIntError },

    #[error("invalid float '{text}': {source}")]
    Float {
        text: String,
        source: ParseFloatError,
    },
}

/// A modification value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An integer, also used for opaque payloads of unknown types.
    Int(i32),
    /// A float for both real and unreal types.
    Real(f32),
    /// A string, or a placeholder for undecodable payloads.
    Str(String),
}

impl Value {
    /// Gets the zero value for the given type.
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Real | ValueType::Unreal => Self::Real(0.0),
            ValueType::String => Self::Str(String::new()),
            ValueType::Int | ValueType::Unknown(_) => Self::Int(0),
        }
    }

    /// Parses text into a value of the given type.
    pub fn parse(ty: ValueType, text: &str) -> Result<Self, ValueParseError> {
        match ty {
            ValueType::Int | ValueType::Unknown(_) => parse_int(text).map(Self::Int),
            ValueType::Real | ValueType::Unreal => parse_float(text).map(Self::Real),
            ValueType::String => Ok(Self::Str(text.to_owned())),
        }
    }

    /// Parses text into a value of the given type, substituting
    /// [`Value::zero`] when the text is not a valid number.
    pub fn parse_lossy(ty: ValueType, text: &str) -> Self {
        Self::parse(ty, text).unwrap_or_else(|e| {
            log::debug!("{e}; using zero instead");
            Self::zero(ty)
        })
    }

    /// Interprets the value as an integer.
    ///
    /// Values of other kinds go through their textual form, so `3.0`
    /// yields `3` and anything unparseable yields `0`.
    pub fn to_int_lossy(&self) -> i32 {
        match self {
            Self::Int(v) => *v,
            other => parse_int(&other.to_string()).unwrap_or_else(|e| {
                log::debug!("{e}; writing 0 instead");
                0
            }),
        }
    }

    /// Interprets the value as a float.
    ///
    /// Values of other kinds go through their textual form and
    /// anything unparseable yields `0.0`.
    pub fn to_float_lossy(&self) -> f32 {
        match self {
            Self::Real(v) => *v,
            other => parse_float(&other.to_string()).unwrap_or_else(|e| {
                log::debug!("{e}; writing 0.0 instead");
                0.0
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

fn parse_int(text: &str) -> Result<i32, ValueParseError> {
    text.trim().parse().map_err(|source| ValueParseError::Int {
        text: text.to_owned(),
        source,
    })
}

fn parse_float(text: &str) -> Result<f32, ValueParseError> {
    text.trim().parse().map_err(|source| ValueParseError::Float {
        text: text.to_owned(),
        source,
    })
}

/// How the decoder treats type codes outside the documented four.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Every unknown code carries a 4-byte integer payload which is
    /// kept as [`Value::Int`] and written back unchanged.
    #[default]
    Opaque,
    /// Codes above 100 carry a 4-byte integer payload; all other
    /// unknown codes are assumed to carry no payload and decode to
    /// a `[type:<code>]` placeholder string.
    ///
    /// The zero-width assumption may desynchronize the rest of the
    /// section when it does not hold.
    Placeholder,
    /// Any unknown code aborts decoding.
    Reject,
}

/// Type codes above this value are always treated as opaque
/// fixed-width numbers.
const NUMERIC_EXTENSION_FLOOR: i32 = 100;

/// Outcome of reading a value payload that did not produce a value.
#[derive(Debug)]
pub(crate) enum PayloadError {
    Truncated(Truncated),
    Rejected(i32),
}

impl From<Truncated> for PayloadError {
    fn from(e: Truncated) -> Self {
        Self::Truncated(e)
    }
}

/// Reads the value payload for a modification of type `ty`.
pub(crate) fn read_payload(
    cur: &mut ByteCursor<'_>,
    ty: ValueType,
    policy: UnknownTypePolicy,
) -> Result<Value, PayloadError> {
    Ok(match ty {
        ValueType::Int => Value::Int(cur.int32()?),
        ValueType::Real | ValueType::Unreal => Value::Real(cur.float32()?),
        ValueType::String => Value::Str(String::from_utf8_lossy(cur.cstr()?).into_owned()),

        ValueType::Unknown(code) => match policy {
            UnknownTypePolicy::Opaque => Value::Int(cur.int32()?),
            UnknownTypePolicy::Placeholder if code > NUMERIC_EXTENSION_FLOOR => {
                Value::Int(cur.int32()?)
            }
            UnknownTypePolicy::Placeholder => {
                log::warn!(
                    "Type code {code} at offset {} has no known payload size; reading on may misalign",
                    cur.position()
                );
                Value::Str(format!("[type:{code}]"))
            }
            UnknownTypePolicy::Reject => return Err(PayloadError::Rejected(code)),
        },
    })
}

/// Writes the value payload for a modification of type `ty`.
///
/// Unknown types always get a 4-byte integer payload.
pub(crate) fn write_payload<W: Write>(out: &mut W, ty: ValueType, value: &Value) -> io::Result<()> {
    match ty {
        ValueType::Int | ValueType::Unknown(_) => binary::write_int32(out, value.to_int_lossy()),
        ValueType::Real | ValueType::Unreal => binary::write_float32(out, value.to_float_lossy()),
        ValueType::String => {
            let text = value.to_string();
            let bytes = text.as_bytes();
            let bytes = match bytes.iter().position(|&b| b == 0) {
                Some(nul) => {
                    log::warn!("Cutting string value at embedded null byte: {text:?}");
                    &bytes[..nul]
                }
                None => bytes,
            };
            binary::write_cstr(out, bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_table() {
        for (code, name) in TYPE_NAMES {
            let ty = ValueType::from_code(code);
            assert!(ty.is_known());
            assert_eq!(ty.name(), name);
            assert_eq!(ValueType::from_name(name), ty);
        }
    }

    #[test]
    fn unknown_type_names() {
        assert_eq!(ValueType::from_code(7).name(), "type7");
        assert_eq!(ValueType::from_name("type7"), ValueType::Unknown(7));
        assert_eq!(ValueType::from_name("type101"), ValueType::Unknown(101));
        assert_eq!(ValueType::from_name("type3"), ValueType::String);
        assert_eq!(ValueType::from_name("type-2"), ValueType::Unknown(-2));
    }

    #[test]
    fn fallback_is_int() {
        assert_eq!(ValueType::from_name(""), ValueType::Int);
        assert_eq!(ValueType::from_name("bool"), ValueType::Int);
        assert_eq!(ValueType::from_name("typeX"), ValueType::Int);
        assert_eq!(ValueType::from_name("INT"), ValueType::Int);
        assert_eq!(ValueType::from_name("Real"), ValueType::Int);
    }

    #[test]
    fn lossy_parsing() {
        assert_eq!(Value::parse_lossy(ValueType::Int, " 42 "), Value::Int(42));
        assert_eq!(Value::parse_lossy(ValueType::Int, "4.2"), Value::Int(0));
        assert_eq!(Value::parse_lossy(ValueType::Unreal, "0.25"), Value::Real(0.25));
        assert_eq!(Value::parse_lossy(ValueType::Real, "fast"), Value::Real(0.0));
        assert_eq!(
            Value::parse_lossy(ValueType::String, " x "),
            Value::Str(" x ".into())
        );
        assert!(Value::parse(ValueType::Int, "abc").is_err());
    }

    #[test]
    fn cross_kind_coercion() {
        assert_eq!(Value::Real(3.0).to_int_lossy(), 3);
        assert_eq!(Value::Real(3.5).to_int_lossy(), 0);
        assert_eq!(Value::Str("12".into()).to_int_lossy(), 12);
        assert_eq!(Value::Int(2).to_float_lossy(), 2.0);
        assert_eq!(Value::Str("[type:7]".into()).to_int_lossy(), 0);
    }

    #[test]
    fn float_text_round_trips() {
        for v in [3.5f32, 0.1, 1.0, -0.75, 1e-7, 123456.79] {
            let text = Value::Real(v).to_string();
            assert_eq!(Value::parse(ValueType::Real, &text), Ok(Value::Real(v)));
        }
    }

    #[test]
    fn payload_encodings() -> io::Result<()> {
        let mut out = Vec::new();
        write_payload(&mut out, ValueType::Int, &Value::Str("42".into()))?;
        assert_eq!(out, 42i32.to_le_bytes());

        for ty in [ValueType::Real, ValueType::Unreal] {
            out.clear();
            write_payload(&mut out, ty, &Value::Str("3.5".into()))?;
            assert_eq!(out, 3.5f32.to_le_bytes());
        }

        out.clear();
        write_payload(&mut out, ValueType::String, &Value::Str("ab\0cd".into()))?;
        assert_eq!(out, b"ab\0");

        out.clear();
        write_payload(&mut out, ValueType::Unknown(7), &Value::Int(-1))?;
        assert_eq!(out, [0xFF; 4]);

        Ok(())
    }

    #[test]
    fn unknown_payload_policies() {
        let data = 9i32.to_le_bytes();

        let mut cur = ByteCursor::new(&data);
        let v = read_payload(&mut cur, ValueType::Unknown(7), UnknownTypePolicy::Opaque).unwrap();
        assert_eq!(v, Value::Int(9));
        assert!(cur.is_empty());

        let mut cur = ByteCursor::new(&data);
        let v =
            read_payload(&mut cur, ValueType::Unknown(7), UnknownTypePolicy::Placeholder).unwrap();
        assert_eq!(v, Value::Str("[type:7]".into()));
        assert_eq!(cur.position(), 0);

        let mut cur = ByteCursor::new(&data);
        let v = read_payload(&mut cur, ValueType::Unknown(101), UnknownTypePolicy::Placeholder)
            .unwrap();
        assert_eq!(v, Value::Int(9));

        let mut cur = ByteCursor::new(&data);
        assert!(matches!(
            read_payload(&mut cur, ValueType::Unknown(7), UnknownTypePolicy::Reject),
            Err(PayloadError::Rejected(7))
        ));
    }
}
