//! Conversions between JSON values and `google.protobuf.Struct`.
//!
//! Free-form payloads cross the wire as `Struct`/`Value`. Protobuf numbers
//! are doubles, so integral values come back as JSON integers.

use prost_types::value::Kind;
use serde_json::{Map, Number, Value};
use tonic::Status;

pub fn json_to_value(value: Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.into_iter().map(json_to_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(map_to_struct(map)),
    };
    prost_types::Value { kind: Some(kind) }
}

pub fn value_to_json(value: prost_types::Value) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::NumberValue(n)) => number_to_json(n),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::StructValue(s)) => Value::Object(struct_to_map(s)),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
    }
}

pub fn map_to_struct(map: Map<String, Value>) -> prost_types::Struct {
    prost_types::Struct {
        fields: map
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect(),
    }
}

pub fn struct_to_map(s: prost_types::Struct) -> Map<String, Value> {
    s.fields
        .into_iter()
        .map(|(key, value)| (key, value_to_json(value)))
        .collect()
}

/// A JSON object as a `Struct`. `null` becomes an empty struct.
pub fn object_to_struct(value: Value) -> Result<prost_types::Struct, Status> {
    match value {
        Value::Object(map) => Ok(map_to_struct(map)),
        Value::Null => Ok(prost_types::Struct::default()),
        other => Err(Status::invalid_argument(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Optional `Struct` reply field as a JSON object.
pub fn struct_to_object(s: Option<prost_types::Struct>) -> Value {
    Value::Object(s.map(struct_to_map).unwrap_or_default())
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
