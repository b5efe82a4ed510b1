use serde::{
    Deserialize,
    Deserializer,
    de::{Error as DeserializerError},
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeserializationError(pub &'static str);

/// Parses object json value and returns its ID as string
pub fn object_to_id(
    object: &Value,
) -> Result<String, DeserializationError> {
    let object_id = match object {
        Value::String(string) => string.to_owned(),
        Value::Object(_) => {
            object["id"].as_str()
                .ok_or(DeserializationError("missing 'id' property"))?
                .to_owned()
        },
        _ => return Err(DeserializationError("unexpected value type")),
    };
    Ok(object_id)
}

pub fn deserialize_into_object_id<'de, D>(
    deserializer: D,
) -> Result<String, D::Error>
    where D: Deserializer<'de>
{
    let value = Value::deserialize(deserializer)?;
    let object_id = object_to_id(&value)
        .map_err(DeserializerError::custom)?;
    Ok(object_id)
}

/// Transforms arbitrary property value into array of object IDs
pub fn parse_into_id_array(
    value: &Value,
) -> Result<Vec<String>, DeserializationError> {
    let result = match value {
        Value::Null => vec![],
        Value::String(_) | Value::Object(_) => {
            let object_id = object_to_id(value)?;
            vec![object_id]
        },
        Value::Array(array) => {
            let mut results = vec![];
            for value in array {
                let object_id = object_to_id(value)?;
                results.push(object_id);
            };
            results
        },
        _ => return Err(DeserializationError("unexpected value type")),
    };
    Ok(result)
}

/// Parses link object and returns its "href"
pub fn link_to_href(
    link: &Value,
) -> Result<String, DeserializationError> {
    let href = match link {
        Value::String(string) => string.to_owned(),
        Value::Object(_) => {
            link["href"].as_str()
                .or(link["url"].as_str())
                .ok_or(DeserializationError("missing href property"))?
                .to_string()
        },
        Value::Array(array) => {
            let first = array.first()
                .ok_or(DeserializationError("empty array"))?;
            link_to_href(first)?
        },
        _ => return Err(DeserializationError("unexpected value type")),
    };
    Ok(href)
}
