//! Conversion between attribute values and API JSON payloads
//!
//! Attribute names map onto wire fields through the wire names declared in
//! each family's schema; the same mapping is applied in both directions, so
//! a resource module never writes field-by-field translation code.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use vela_core::resource::{Resource, Value};
use vela_core::schema::ResourceSchema;

use crate::api::ApiError;

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Bool(b) => Json::Bool(*b),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

pub fn json_to_value(json: &Json) -> Option<Value> {
    match json {
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(|f| Value::Int(f as i64))),
        Json::Array(items) => Some(Value::List(items.iter().filter_map(json_to_value).collect())),
        Json::Object(fields) => Some(Value::Map(
            fields
                .iter()
                .filter_map(|(k, v)| json_to_value(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        Json::Null => None,
    }
}

/// Build a wire spec from declared attributes
///
/// Only attributes with a wire name participate; read-only attributes are
/// never sent.
pub fn spec_from_attributes<T: DeserializeOwned>(
    schema: &ResourceSchema,
    resource: &Resource,
) -> Result<T, ApiError> {
    let mut payload = Map::new();
    for (name, attr) in &schema.attributes {
        if attr.read_only {
            continue;
        }
        let Some(wire_name) = &attr.wire_name else {
            continue;
        };
        if let Some(value) = resource.attributes.get(name) {
            payload.insert(wire_name.clone(), value_to_json(value));
        }
    }
    serde_json::from_value(Json::Object(payload))
        .map_err(|e| ApiError::Decode(format!("building {} spec: {}", schema.kind, e)))
}

/// Map a wire spec back onto attributes
pub fn attributes_from_spec<S: Serialize>(
    schema: &ResourceSchema,
    spec: &S,
) -> Result<HashMap<String, Value>, ApiError> {
    let json = serde_json::to_value(spec)?;
    let mut attributes = HashMap::new();
    if let Json::Object(fields) = json {
        for (name, attr) in &schema.attributes {
            let Some(wire_name) = &attr.wire_name else {
                continue;
            };
            if let Some(field) = fields.get(wire_name)
                && let Some(value) = json_to_value(field)
            {
                attributes.insert(name.clone(), value);
            }
        }
    }
    Ok(attributes)
}
