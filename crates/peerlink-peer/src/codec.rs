//! JSON text encoding for exchanged records.
//!
//! Values go over the channel as UTF-8 JSON with `", "` and `": "`
//! separators (`{"a": 1}`); empty values are withdrawn rather than written.

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;

/// Raw text treated as "no record".
pub const EMPTY_RECORD: &str = "{}";

/// Compact JSON with a space after each separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Empty values: null, false, zero, "", [] and {}.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Serialize a value to wire text. Struct fields keep declaration order.
pub fn to_text<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::with_capacity(64);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Wire text for a record, or `None` when the value should be withdrawn.
///
/// Non-finite floats have no JSON form and serialize as `null`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Option<String>> {
    if is_empty_value(&serde_json::to_value(value)?) {
        return Ok(None);
    }
    to_text(value).map(Some)
}

/// Decode wire text; empty text decodes as an empty mapping.
pub fn decode(raw: &str) -> serde_json::Result<Value> {
    if raw.trim().is_empty() {
        return Ok(empty_record());
    }
    serde_json::from_str(raw)
}

pub fn empty_record() -> Value {
    Value::Object(Map::new())
}
