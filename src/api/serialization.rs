//! Media type negotiation and the XML / JSON content serializer.
//!
//! DTOs carry quick-xml naming (`@attr`, `$text`). For JSON the serialized
//! tree is rewritten: attribute prefixes are stripped, the namespace
//! attribute dropped and element text moved under `value`. Incoming JSON is
//! rewritten the other way so the same derives read both encodings.

use crate::error::SerializationError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Xml,
    Json,
}

impl MediaType {
    pub fn content_type(&self) -> &'static str {
        match self {
            MediaType::Xml => "application/xml; charset=utf-8",
            MediaType::Json => "application/json; charset=utf-8",
        }
    }

    /// Recognize a single media range such as `application/json;q=0.9`.
    pub fn parse(value: &str) -> Option<Self> {
        let essence = value.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" | "text/json" => Some(MediaType::Json),
            "application/xml" | "text/xml" => Some(MediaType::Xml),
            _ if essence.ends_with("+json") => Some(MediaType::Json),
            _ if essence.ends_with("+xml") => Some(MediaType::Xml),
            _ => None,
        }
    }

    /// Pick the first supported entry of an `Accept` header, XML when the
    /// header is absent or names nothing we produce.
    pub fn from_accept(accept: Option<&str>) -> Self {
        accept
            .into_iter()
            .flat_map(|header| header.split(','))
            .find_map(Self::parse)
            .unwrap_or_default()
    }

    /// Media type of a request body; unknown or missing types read as XML.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        content_type.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Xml => f.write_str("xml"),
            MediaType::Json => f.write_str("json"),
        }
    }
}

pub struct HttpContentSerializer;

impl HttpContentSerializer {
    pub fn serialize<T>(value: &T, media_type: MediaType) -> Result<Vec<u8>, SerializationError>
    where
        T: Serialize + ?Sized,
    {
        match media_type {
            MediaType::Xml => {
                let body = quick_xml::se::to_string(value)
                    .map_err(|e| SerializationError::Xml(e.to_string()))?;
                Ok(format!("{}{}", XML_DECLARATION, body).into_bytes())
            }
            MediaType::Json => {
                let tree =
                    serde_json::to_value(value).map_err(|e| SerializationError::Json(e.to_string()))?;
                serde_json::to_vec(&json_from_xml_names(tree))
                    .map_err(|e| SerializationError::Json(e.to_string()))
            }
        }
    }

    pub fn deserialize<T>(bytes: &[u8], media_type: MediaType) -> Result<T, SerializationError>
    where
        T: DeserializeOwned,
    {
        match media_type {
            MediaType::Xml => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| SerializationError::Xml(e.to_string()))?;
                quick_xml::de::from_str(text).map_err(|e| SerializationError::Xml(e.to_string()))
            }
            MediaType::Json => {
                let tree: Value = serde_json::from_slice(bytes)
                    .map_err(|e| SerializationError::Json(e.to_string()))?;
                serde_json::from_value(xml_names_from_json(tree))
                    .map_err(|e| SerializationError::Json(e.to_string()))
            }
        }
    }
}

fn json_from_xml_names(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut renamed = Map::with_capacity(map.len());
            for (key, child) in map {
                if key == "@xmlns" {
                    continue;
                }
                let key = match key.as_str() {
                    "$text" | "$value" => "value".to_string(),
                    other => other.strip_prefix('@').unwrap_or(other).to_string(),
                };
                renamed.insert(key, json_from_xml_names(child));
            }
            Value::Object(renamed)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(json_from_xml_names).collect()),
        other => other,
    }
}

// Request DTOs only carry scalars as attributes, so every scalar member of
// an incoming JSON object maps to an `@` field.
fn xml_names_from_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| match child {
                    Value::Object(_) | Value::Array(_) => (key, xml_names_from_json(child)),
                    scalar => (format!("@{}", key), scalar),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(xml_names_from_json).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ProjectRequest, ProjectRequestType};

    #[test]
    fn test_media_type_from_accept() {
        assert_eq!(MediaType::from_accept(None), MediaType::Xml);
        assert_eq!(
            MediaType::from_accept(Some("application/json")),
            MediaType::Json
        );
        assert_eq!(
            MediaType::from_accept(Some("text/html, application/json;q=0.9")),
            MediaType::Json
        );
        assert_eq!(
            MediaType::from_accept(Some("application/xml, application/json")),
            MediaType::Xml
        );
        assert_eq!(MediaType::from_accept(Some("*/*")), MediaType::Xml);
    }

    #[test]
    fn test_request_reads_from_xml_and_json() {
        let xml = br#"<tsRequest><project name="Finance" description="Money"/></tsRequest>"#;
        let from_xml: ProjectRequest =
            HttpContentSerializer::deserialize(xml, MediaType::Xml).expect("xml request");

        let json = br#"{"project": {"name": "Finance", "description": "Money"}}"#;
        let from_json: ProjectRequest =
            HttpContentSerializer::deserialize(json, MediaType::Json).expect("json request");

        assert_eq!(from_xml, from_json);
        assert_eq!(from_xml.project.name.as_deref(), Some("Finance"));
    }

    #[test]
    fn test_json_output_strips_attribute_prefix() {
        let request = ProjectRequest {
            project: ProjectRequestType {
                name: Some("Ops".to_string()),
                ..Default::default()
            },
        };
        let bytes = HttpContentSerializer::serialize(&request, MediaType::Json).expect("json");
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["project"]["name"], "Ops");
    }

    #[test]
    fn test_xml_output_has_declaration() {
        let request = ProjectRequest::default();
        let bytes = HttpContentSerializer::serialize(&request, MediaType::Xml).expect("xml");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<tsRequest"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<ProjectRequest, _> =
            HttpContentSerializer::deserialize(b"{not json", MediaType::Json);
        assert!(matches!(result, Err(SerializationError::Json(_))));
    }
}
