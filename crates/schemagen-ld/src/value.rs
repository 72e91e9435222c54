// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decoders for polymorphically shaped JSON-LD fields.
//!
//! Each decoder tries its shapes in a fixed order and takes the first that
//! fits. Encoding picks the most compact shape that preserves the value, so
//! `decode(encode(x)) == x` holds for everything a decoder can produce.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShapeError;
use crate::graph::NodeId;

const ID_KEY: &str = "@id";
const VALUE_KEY: &str = "@value";
const LANGUAGE_KEY: &str = "@language";

// ─── Identifier references ───────────────────────────────────────────────────

/// Raw, not-yet-interpreted reference to one or more nodes.
///
/// Extraction is lazy: a malformed reference only fails when [`IdRef::ids`]
/// is called, which lets relations that are never consulted stay opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdRef {
    raw: Value,
}

/// The shape an [`IdRef`] was classified into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdRefShape {
    /// `{"@id": "x"}`
    Object(NodeId),
    /// `[{"@id": "x"}, {"@id": "y"}]`
    Objects(Vec<NodeId>),
    /// `["x", "y"]`
    Bare(Vec<NodeId>),
}

impl IdRefShape {
    /// Normalized identifier list.
    pub fn into_ids(self) -> Vec<NodeId> {
        match self {
            Self::Object(id) => vec![id],
            Self::Objects(ids) | Self::Bare(ids) => ids,
        }
    }
}

impl IdRef {
    /// Wrap raw JSON without inspecting it.
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Build a reference in the canonical JSON-LD shape: a single object for
    /// one identifier, an array of objects otherwise.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut objects: Vec<Value> = ids.into_iter().map(id_object).collect();
        let raw = if objects.len() == 1 {
            objects.remove(0)
        } else {
            Value::Array(objects)
        };
        Self { raw }
    }

    /// The undecoded JSON.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Classify the raw JSON. Order: single object, array of objects, array
    /// of bare strings.
    pub fn shape(&self) -> Result<IdRefShape, ShapeError> {
        if let Some(id) = object_id(&self.raw) {
            return Ok(IdRefShape::Object(id));
        }
        if let Value::Array(items) = &self.raw {
            if let Some(ids) = items.iter().map(object_id).collect::<Option<Vec<_>>>() {
                return Ok(IdRefShape::Objects(ids));
            }
            if let Some(ids) = items
                .iter()
                .map(|item| item.as_str().map(NodeId::from))
                .collect::<Option<Vec<_>>>()
            {
                return Ok(IdRefShape::Bare(ids));
            }
        }
        Err(ShapeError::InvalidReferenceShape(self.raw.to_string()))
    }

    /// Extract the normalized identifier list.
    pub fn ids(&self) -> Result<Vec<NodeId>, ShapeError> {
        self.shape().map(IdRefShape::into_ids)
    }
}

fn object_id(value: &Value) -> Option<NodeId> {
    value.as_object()?.get(ID_KEY)?.as_str().map(NodeId::from)
}

fn id_object(id: NodeId) -> Value {
    let mut map = Map::new();
    map.insert(ID_KEY.to_owned(), Value::String(id.into_string()));
    Value::Object(map)
}

// ─── String sets ─────────────────────────────────────────────────────────────

/// A string or a list of strings, normalized to a non-empty ordered list.
///
/// Encodes as a bare string when it holds exactly one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringSet {
    values: Vec<String>,
}

impl StringSet {
    /// A set holding one value.
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Build from a list; `None` when the list is empty.
    pub fn new(values: Vec<String>) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self { values })
        }
    }

    /// Decode from JSON. Order: bare string, then array of strings.
    pub fn from_json(value: &Value) -> Result<Self, ShapeError> {
        match value {
            Value::String(s) => return Ok(Self::single(s.clone())),
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>();
                if let Some(set) = values.and_then(Self::new) {
                    return Ok(set);
                }
            }
            _ => {}
        }
        Err(ShapeError::InvalidStringShape(value.to_string()))
    }

    /// All values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First value.
    pub fn first(&self) -> &str {
        self.values.first().map_or("", String::as_str)
    }

    /// Whether `value` is one of the entries.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Number of values (never zero).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for StringSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.values.as_slice() {
            [one] => serializer.serialize_str(one),
            many => many.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

// ─── Localized text ──────────────────────────────────────────────────────────

/// A string optionally tagged with a language code. An empty `language`
/// means untagged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocalizedText {
    /// Text content.
    pub value: String,
    /// BCP 47 language tag, or empty.
    pub language: String,
}

impl LocalizedText {
    /// Untagged text.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: String::new(),
        }
    }

    /// Text tagged with a language.
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: language.into(),
        }
    }

    /// Decode from JSON. Order: bare string, then `@value`/`@language` object.
    pub fn from_json(value: &Value) -> Result<Self, ShapeError> {
        match value {
            Value::String(s) => return Ok(Self::plain(s.clone())),
            Value::Object(map) => {
                let text = map.get(VALUE_KEY).and_then(Value::as_str);
                let language = match map.get(LANGUAGE_KEY) {
                    None | Some(Value::Null) => Some(""),
                    Some(other) => other.as_str(),
                };
                if let (Some(text), Some(language)) = (text, language) {
                    return Ok(Self::tagged(text, language));
                }
            }
            _ => {}
        }
        Err(ShapeError::InvalidLocalizedTextShape(value.to_string()))
    }

    /// Whether both value and language are empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.language.is_empty()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.language.is_empty() {
            return serializer.serialize_str(&self.value);
        }
        let mut obj = serializer.serialize_struct("LocalizedText", 2)?;
        obj.serialize_field(VALUE_KEY, &self.value)?;
        obj.serialize_field(LANGUAGE_KEY, &self.language)?;
        obj.end()
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}
