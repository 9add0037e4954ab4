//! # Property Codec
//!
//! Converts property maps to and from flat JSON objects.
//!
//! - Values pass through as JSON scalars or `null`
//! - Unset properties are absent, never null-filled
//! - Nested objects and arrays are rejected as `MalformedBody`
//! - Keys starting with `_` are reserved for adapter metadata

use crate::primitives::{MAX_NAME_LENGTH, MAX_TEXT_VALUE_LENGTH, RESERVED_KEY_PREFIX};
use crate::{GraphError, PropertyMap, PropertyValue};
use serde_json::{Map, Number, Value};

/// Stateless JSON codec for property maps.
pub struct PropertyCodec;

impl PropertyCodec {
    /// Parse a request body as JSON.
    ///
    /// Fails with `GraphError::MalformedBody` if the bytes are not valid JSON.
    pub fn parse(body: &[u8]) -> Result<Value, GraphError> {
        serde_json::from_slice(body).map_err(|e| GraphError::MalformedBody(e.to_string()))
    }

    /// Encode a property map as a JSON object with one key per property.
    #[must_use]
    pub fn encode(properties: &PropertyMap) -> Map<String, Value> {
        properties
            .iter()
            .map(|(name, value)| (name.clone(), Self::to_json(value)))
            .collect()
    }

    /// Decode a flat JSON object of scalars into a property map.
    pub fn decode(json: &Value) -> Result<PropertyMap, GraphError> {
        let Value::Object(object) = json else {
            return Err(GraphError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        };

        object
            .iter()
            .map(|(name, value)| {
                Self::validate_key(name)?;
                Ok((name.clone(), Self::from_json(value)?))
            })
            .collect()
    }

    /// Encode one property as `{name: value}`, or `{}` when it is unset.
    #[must_use]
    pub fn encode_single(name: &str, value: Option<&PropertyValue>) -> Value {
        let mut object = Map::new();
        if let Some(value) = value {
            object.insert(name.to_string(), Self::to_json(value));
        }
        Value::Object(object)
    }

    /// Decode a one-key object `{name: value}`.
    pub fn decode_single(json: &Value) -> Result<(String, PropertyValue), GraphError> {
        let mut properties = Self::decode(json)?;
        if properties.len() != 1 {
            return Err(GraphError::MalformedBody(format!(
                "expected exactly one property, got {}",
                properties.len()
            )));
        }
        properties
            .pop_first()
            .ok_or_else(|| GraphError::MalformedBody("expected one property".to_string()))
    }

    /// Convert a stored value to JSON.
    #[must_use]
    pub fn to_json(value: &PropertyValue) -> Value {
        match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Bool(b) => Value::Bool(*b),
            PropertyValue::Int(i) => Value::Number((*i).into()),
            PropertyValue::UInt(u) => Value::Number((*u).into()),
            PropertyValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            PropertyValue::Text(s) => Value::String(s.clone()),
        }
    }

    /// Convert a JSON scalar to a stored value.
    pub fn from_json(value: &Value) -> Result<PropertyValue, GraphError> {
        match value {
            Value::Null => Ok(PropertyValue::Null),
            Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(PropertyValue::Int)
                .or_else(|| n.as_u64().map(PropertyValue::UInt))
                .or_else(|| n.as_f64().map(PropertyValue::Float))
                .ok_or_else(|| GraphError::MalformedBody(format!("unsupported number {}", n))),
            Value::String(s) if s.len() > MAX_TEXT_VALUE_LENGTH => Err(GraphError::MalformedBody(
                format!(
                    "value length {} exceeds maximum {} bytes",
                    s.len(),
                    MAX_TEXT_VALUE_LENGTH
                ),
            )),
            Value::String(s) => Ok(PropertyValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(GraphError::MalformedBody(
                "nested values are not supported as properties".to_string(),
            )),
        }
    }

    fn validate_key(name: &str) -> Result<(), GraphError> {
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(GraphError::MalformedBody(format!(
                "invalid property name '{}'",
                name
            )));
        }
        if name.starts_with(RESERVED_KEY_PREFIX) {
            return Err(GraphError::MalformedBody(format!(
                "property name '{}' is reserved",
                name
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
