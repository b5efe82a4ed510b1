//! ActivityStreams document model.
//!
//! A [`Document`] wraps one JSON-LD node. Nested properties such as
//! `actor` or `object` are returned as documents too, and may be either
//! embedded objects or bare references (URIs) that need to be loaded
//! through the activity cache.
use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue};

use crate::{
    constants::AP_PUBLIC,
    deserialization::{link_to_href, object_to_id, parse_into_id_array},
};

const AUDIENCE_PROPERTIES: [&str; 5] = ["to", "cc", "bto", "bcc", "audience"];

/// Returns `true` if the value is one of the representations
/// of the public collection
pub fn is_public_address(value: &str) -> bool {
    value == AP_PUBLIC || value == "as:Public" || value == "Public"
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    value: JsonValue,
}

impl Document {
    pub fn new(value: JsonValue) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    pub fn into_value(self) -> JsonValue {
        self.value
    }

    /// Absent property
    pub fn is_empty(&self) -> bool {
        self.value.is_null()
    }

    /// Returns `true` if document is a bare URI
    pub fn is_reference(&self) -> bool {
        self.value.is_string()
    }

    pub fn id(&self) -> Option<String> {
        object_to_id(&self.value).ok()
    }

    pub fn document_type(&self) -> Option<&str> {
        match &self.value["type"] {
            JsonValue::String(value) => Some(value),
            // Use first type if there are several
            JsonValue::Array(values) => values.first().and_then(|value| value.as_str()),
            _ => None,
        }
    }

    fn property(&self, name: &str) -> Document {
        match &self.value {
            JsonValue::Object(_) => Document::new(self.value[name].clone()),
            _ => Document::new(JsonValue::Null),
        }
    }

    fn string_property(&self, name: &str) -> Option<&str> {
        self.value[name].as_str()
    }

    pub fn actor(&self) -> Document {
        self.property("actor")
    }

    pub fn object(&self) -> Document {
        self.property("object")
    }

    pub fn target(&self) -> Document {
        self.property("target")
    }

    pub fn attributed_to(&self) -> Document {
        match &self.value["attributedTo"] {
            // Use first attribution if there are several
            JsonValue::Array(values) => {
                let value = values.first().cloned().unwrap_or_default();
                Document::new(value)
            },
            _ => self.property("attributedTo"),
        }
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.string_property("published")
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|value| value.with_timezone(&Utc))
    }

    pub fn name(&self) -> Option<&str> {
        self.string_property("name")
            .or(self.string_property("preferredUsername"))
    }

    pub fn content(&self) -> Option<&str> {
        self.string_property("content")
    }

    pub fn media_type(&self) -> Option<&str> {
        self.string_property("mediaType")
    }

    pub fn encoding(&self) -> Option<&str> {
        self.string_property("encoding")
    }

    /// Returns `url` property, or ID if it is not present
    pub fn url(&self) -> Option<String> {
        link_to_href(&self.value["url"]).ok()
            .or_else(|| self.id())
    }

    pub fn inbox(&self) -> Option<&str> {
        self.string_property("inbox")
    }

    pub fn shared_inbox(&self) -> Option<&str> {
        self.value["endpoints"]["sharedInbox"].as_str()
    }

    pub fn icon_url(&self) -> Option<String> {
        link_to_href(&self.value["icon"]).ok()
    }

    pub fn also_known_as(&self) -> Vec<String> {
        parse_into_id_array(&self.value["alsoKnownAs"])
            .unwrap_or_default()
    }

    /// Returns all addressees of the document
    pub fn recipients(&self) -> Vec<String> {
        let mut recipients = vec![];
        for property in AUDIENCE_PROPERTIES {
            match parse_into_id_array(&self.value[property]) {
                Ok(values) => recipients.extend(values),
                Err(_) => log::warn!("invalid '{property}' property"),
            };
        };
        recipients
    }

    pub fn is_public(&self) -> bool {
        self.recipients().iter().any(|value| is_public_address(value))
    }

    /// Returns a copy of this document with the given property replaced
    pub fn with_property(&self, name: &str, value: JsonValue) -> Document {
        let mut document = self.value.clone();
        if let JsonValue::Object(ref mut map) = document {
            map.insert(name.to_string(), value);
        };
        Document::new(document)
    }
}

impl From<JsonValue> for Document {
    fn from(value: JsonValue) -> Self {
        Self::new(value)
    }
}
