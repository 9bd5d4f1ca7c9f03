//! JSON rendering of value trees.
//!
//! Plain JSON covers null, booleans, signed integers, finite doubles,
//! strings, arrays and objects. Everything else is a single-key object
//! whose key starts with `$`:
//!
//! | Value      | JSON                                              |
//! |------------|---------------------------------------------------|
//! | UINT64     | `{"$uint64": 18446744073709551615}`               |
//! | DOUBLE     | `{"$double": "nan"}` (non-finite only)            |
//! | DATA       | `{"$data": "0a0b0c"}`                             |
//! | UUID       | `{"$uuid": "00112233-4455-6677-8899-aabbccddeeff"}` |
//! | FD         | `{"$fd": {"name": 3, "disposition": 19}}`         |
//! | SEND_PORT  | `{"$send_port": {...}}`                           |
//! | RECV_PORT  | `{"$recv_port": {...}}`                           |
//!
//! Duplicate dictionary keys collapse to the last occurrence.

use cpxwire_value::{Array, Dictionary, Port, Value};
use serde_json::{json, Map, Number, Value as Json};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("top-level JSON must be an object")]
    NotAnObject,

    #[error("number {0} is not representable")]
    BadNumber(Number),

    #[error("unknown tagged value '{0}'")]
    UnknownTag(String),

    #[error("invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },
}

/// Render a value as JSON.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::Uint64(v) => json!({ "$uint64": v }),
        Value::Int64(v) => Json::from(*v),
        Value::Double(v) => match Number::from_f64(*v) {
            Some(n) => Json::Number(n),
            None => json!({ "$double": non_finite_name(*v) }),
        },
        Value::String(v) => Json::String(v.clone()),
        Value::Data(v) => json!({ "$data": to_hex(v) }),
        Value::Uuid(v) => json!({ "$uuid": v.hyphenated().to_string() }),
        Value::Array(array) => Json::Array(array.iter().map(to_json).collect()),
        Value::Dictionary(dict) => Json::Object(dictionary_to_json(dict)),
        Value::Fd(port) => json!({ "$fd": port }),
        Value::SendPort(port) => json!({ "$send_port": port }),
        Value::RecvPort(port) => json!({ "$recv_port": port }),
    }
}

pub fn dictionary_to_json(dict: &Dictionary) -> Map<String, Json> {
    dict.iter()
        .map(|(key, value)| (key.to_string(), to_json(value)))
        .collect()
}

/// Parse a top-level JSON object into message content.
pub fn dictionary_from_json(json: &Json) -> Result<Dictionary, JsonError> {
    match json {
        Json::Object(map) if !is_tagged(map) => object_to_dictionary(map),
        _ => Err(JsonError::NotAnObject),
    }
}

/// Parse a JSON rendering back into a value.
pub fn from_json(json: &Json) -> Result<Value, JsonError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(v) => Ok(Value::Bool(*v)),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<Result<Array, _>>()
            .map(Value::Array),
        Json::Object(map) if is_tagged(map) => tagged_to_value(map),
        Json::Object(map) => object_to_dictionary(map).map(Value::Dictionary),
    }
}

fn object_to_dictionary(map: &Map<String, Json>) -> Result<Dictionary, JsonError> {
    let mut dict = Dictionary::with_capacity(map.len());
    for (key, value) in map {
        dict.push(key.clone(), from_json(value)?);
    }
    Ok(dict)
}

fn is_tagged(map: &Map<String, Json>) -> bool {
    map.len() == 1 && map.keys().all(|key| key.starts_with('$'))
}

fn number_to_value(n: &Number) -> Result<Value, JsonError> {
    if let Some(v) = n.as_i64() {
        Ok(Value::Int64(v))
    } else if let Some(v) = n.as_u64() {
        Ok(Value::Uint64(v))
    } else if let Some(v) = n.as_f64() {
        Ok(Value::Double(v))
    } else {
        Err(JsonError::BadNumber(n.clone()))
    }
}

fn tagged_to_value(map: &Map<String, Json>) -> Result<Value, JsonError> {
    let Some((tag, inner)) = map.iter().next() else {
        return Err(JsonError::UnknownTag(String::new()));
    };
    match tag.as_str() {
        "$uint64" => inner
            .as_u64()
            .map(Value::Uint64)
            .ok_or_else(|| invalid("$uint64", "expected an unsigned integer")),
        "$double" => match inner {
            Json::Number(n) => n
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| invalid("$double", "expected a number")),
            Json::String(name) => parse_non_finite(name).map(Value::Double),
            _ => Err(invalid("$double", "expected a number or nan/inf/-inf")),
        },
        "$data" => inner
            .as_str()
            .ok_or_else(|| invalid("$data", "expected a hex string"))
            .and_then(from_hex)
            .map(Value::from),
        "$uuid" => inner
            .as_str()
            .ok_or_else(|| invalid("$uuid", "expected a string"))
            .and_then(|s| Uuid::parse_str(s).map_err(|err| invalid("$uuid", err.to_string())))
            .map(Value::Uuid),
        "$fd" => parse_port("$fd", inner).map(Value::Fd),
        "$send_port" => parse_port("$send_port", inner).map(Value::SendPort),
        "$recv_port" => parse_port("$recv_port", inner).map(Value::RecvPort),
        other => Err(JsonError::UnknownTag(other.to_string())),
    }
}

fn parse_port(what: &'static str, json: &Json) -> Result<Port, JsonError> {
    serde_json::from_value(json.clone()).map_err(|err| invalid(what, err.to_string()))
}

fn invalid(what: &'static str, reason: impl Into<String>) -> JsonError {
    JsonError::Invalid {
        what,
        reason: reason.into(),
    }
}

fn non_finite_name(v: f64) -> &'static str {
    if v.is_nan() {
        "nan"
    } else if v.is_sign_positive() {
        "inf"
    } else {
        "-inf"
    }
}

fn parse_non_finite(name: &str) -> Result<f64, JsonError> {
    match name {
        "nan" => Ok(f64::NAN),
        "inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        _ => Err(invalid("$double", format!("unknown value '{name}'"))),
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Result<Vec<u8>, JsonError> {
    if s.len() % 2 != 0 {
        return Err(invalid("$data", "odd number of hex digits"));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| invalid("$data", format!("bad hex digits at {i}")))
        })
        .collect()
}
