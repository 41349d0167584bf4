use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

use crate::model::RouteKey;

/// A parsed API description: the resource tree the mock server is built from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    #[serde(rename = "relativeUri")]
    pub relative_uri: String,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    /// Nested resources; their URIs are relative to this one
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodDef {
    pub method: String,
    #[serde(default)]
    pub responses: Option<IndexMap<ResponseCode, ResponseDef>>,
}

impl MethodDef {
    /// Responses in document order; empty when the method defines none
    pub fn responses(&self) -> impl Iterator<Item = (&ResponseCode, &ResponseDef)> {
        self.responses.iter().flat_map(|responses| responses.iter())
    }

    pub fn has_responses(&self) -> bool {
        self.responses
            .as_ref()
            .is_some_and(|responses| !responses.is_empty())
    }

    pub fn response(&self, code: &str) -> Option<&ResponseDef> {
        self.responses.as_ref().and_then(|responses| responses.get(code))
    }
}

/// Bodies of one response code, keyed by content type in document order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponseDef {
    #[serde(default)]
    pub body: IndexMap<String, BodySchema>,
}

/// HTTP response code as written in the description.
///
/// Descriptions written in YAML commonly use bare integers as map keys, and
/// control clients may send numbers, so both strings and integers decode to
/// the same decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseCode(String);

impl ResponseCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResponseCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawCode {
            Text(String),
            Number(u64),
        }

        Ok(match RawCode::deserialize(deserializer)? {
            RawCode::Text(text) => ResponseCode::new(text),
            RawCode::Number(number) => ResponseCode::new(number.to_string()),
        })
    }
}

/// The shape of one response body.
///
/// Named examples take precedence over property declarations; a body with
/// neither cannot be rendered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBodySchema")]
pub enum BodySchema {
    Examples(Vec<Example>),
    Properties(Vec<Property>),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "structuredValue", default)]
    pub structured_value: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "enum", default)]
    pub allowed_values: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawBodySchema {
    #[serde(default)]
    examples: Option<Vec<Example>>,
    #[serde(default)]
    properties: Option<RawProperties>,
}

// Properties arrive either as a list or as a map keyed by property name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProperties {
    List(Vec<Property>),
    Map(IndexMap<String, RawProperty>),
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "enum", default)]
    allowed_values: Option<Vec<Value>>,
}

impl From<RawBodySchema> for BodySchema {
    fn from(raw: RawBodySchema) -> Self {
        match (raw.examples, raw.properties) {
            (Some(examples), _) if !examples.is_empty() => BodySchema::Examples(examples),
            (_, Some(RawProperties::List(properties))) => BodySchema::Properties(properties),
            (_, Some(RawProperties::Map(properties))) => BodySchema::Properties(
                properties
                    .into_iter()
                    .map(|(key, property)| Property {
                        name: property.name.unwrap_or(key),
                        allowed_values: property.allowed_values,
                    })
                    .collect(),
            ),
            _ => BodySchema::Empty,
        }
    }
}

/// One (method, full path) pair of the description, flattened out of the
/// resource tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub key: RouteKey,
    pub path: String,
    pub method: MethodDef,
}

impl Description {
    /// Flatten the resource tree into operations, in document order.
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();
        for resource in &self.resources {
            collect_operations(resource, "", &mut operations);
        }
        operations
    }
}

fn collect_operations(resource: &Resource, parent: &str, operations: &mut Vec<Operation>) {
    let path = format!("{}{}", parent.trim_end_matches('/'), resource.relative_uri);
    for method in &resource.methods {
        operations.push(Operation {
            key: RouteKey::new(&method.method, &path),
            path: path.clone(),
            method: method.clone(),
        });
    }
    for child in &resource.resources {
        collect_operations(child, &path, operations);
    }
}
