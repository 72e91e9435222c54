// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ontology graph: node arena plus a build-once identifier index.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, warn};

use crate::error::GraphError;
use crate::value::{IdRef, LocalizedText, StringSet};

/// Compact, namespaced node identifier (e.g. `schema:Person`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the identifier text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Relation keys a node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `rdfs:subPropertyOf`
    SubPropertyOf,
    /// `schema:domainIncludes`
    DomainIncludes,
    /// `schema:rangeIncludes`
    RangeIncludes,
    /// `rdfs:subClassOf`
    SubClassOf,
    /// `schema:inverseOf` (filter only)
    InverseOf,
    /// `schema:supersededBy` (filter only)
    SupersededBy,
}

impl Relation {
    /// JSON-LD key of the relation.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SubPropertyOf => "rdfs:subPropertyOf",
            Self::DomainIncludes => "schema:domainIncludes",
            Self::RangeIncludes => "schema:rangeIncludes",
            Self::SubClassOf => "rdfs:subClassOf",
            Self::InverseOf => "schema:inverseOf",
            Self::SupersededBy => "schema:supersededBy",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered, duplicate-free list of child identifiers.
///
/// Populated only by the resolver; each entry becomes a field on the node's
/// generated declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Childs {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl Childs {
    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: NodeId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Entries in insertion order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.order
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.order.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<'a> IntoIterator for &'a Childs {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Childs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

/// One ontology node; becomes one generated declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier.
    #[serde(rename = "@id")]
    pub id: NodeId,
    /// Declared type(s).
    #[serde(rename = "@type")]
    pub types: StringSet,
    /// Human-readable description; becomes the declaration's doc comment.
    #[serde(
        rename = "rdfs:comment",
        default,
        skip_serializing_if = "LocalizedText::is_empty"
    )]
    pub comment: LocalizedText,
    /// Human-readable name.
    #[serde(
        rename = "rdfs:label",
        default,
        skip_serializing_if = "LocalizedText::is_empty"
    )]
    pub label: LocalizedText,

    /// Filter only.
    #[serde(
        rename = "schema:inverseOf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inverse_of: Option<IdRef>,
    /// Filter only.
    #[serde(
        rename = "schema:supersededBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub superseded_by: Option<IdRef>,

    /// Parent properties.
    #[serde(
        rename = "rdfs:subPropertyOf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_property_of: Option<IdRef>,
    /// Types this property belongs to.
    #[serde(
        rename = "schema:domainIncludes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub domain_includes: Option<IdRef>,
    /// Types this property's values may take.
    #[serde(
        rename = "schema:rangeIncludes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub range_includes: Option<IdRef>,
    /// Parent classes.
    #[serde(
        rename = "rdfs:subClassOf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_class_of: Option<IdRef>,

    /// Resolved children. Never read from the source document.
    #[serde(default, skip_deserializing)]
    pub childs: Childs,
}

impl GraphNode {
    /// A node with no relations, typed `rdfs:Class`.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            types: StringSet::single("rdfs:Class"),
            comment: LocalizedText::default(),
            label: LocalizedText::default(),
            inverse_of: None,
            superseded_by: None,
            sub_property_of: None,
            domain_includes: None,
            range_includes: None,
            sub_class_of: None,
            childs: Childs::default(),
        }
    }

    /// Raw reference stored under `relation`, if any.
    pub fn relation(&self, relation: Relation) -> Option<&IdRef> {
        match relation {
            Relation::SubPropertyOf => self.sub_property_of.as_ref(),
            Relation::DomainIncludes => self.domain_includes.as_ref(),
            Relation::RangeIncludes => self.range_includes.as_ref(),
            Relation::SubClassOf => self.sub_class_of.as_ref(),
            Relation::InverseOf => self.inverse_of.as_ref(),
            Relation::SupersededBy => self.superseded_by.as_ref(),
        }
    }

    /// Mutable slot for `relation`.
    pub fn relation_mut(&mut self, relation: Relation) -> &mut Option<IdRef> {
        match relation {
            Relation::SubPropertyOf => &mut self.sub_property_of,
            Relation::DomainIncludes => &mut self.domain_includes,
            Relation::RangeIncludes => &mut self.range_includes,
            Relation::SubClassOf => &mut self.sub_class_of,
            Relation::InverseOf => &mut self.inverse_of,
            Relation::SupersededBy => &mut self.superseded_by,
        }
    }

    /// Builder-style setter for a relation.
    pub fn with_relation<I>(mut self, relation: Relation, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        *self.relation_mut(relation) = Some(IdRef::from_ids(ids.into_iter().map(Into::into)));
        self
    }

    /// Builder-style setter for the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = LocalizedText::plain(comment);
        self
    }

    /// Identifiers referenced by `relation`; empty when the relation is absent.
    pub fn relation_ids(&self, relation: Relation) -> Result<Vec<NodeId>, GraphError> {
        let Some(reference) = self.relation(relation) else {
            return Ok(Vec::new());
        };
        reference.ids().map_err(|source| GraphError::Shape {
            id: self.id.clone(),
            relation,
            source,
        })
    }
}

/// Graph construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Fail on duplicate identifiers instead of letting the last one win.
    pub reject_duplicates: bool,
}

#[derive(Deserialize)]
struct Document {
    #[serde(rename = "@context", default)]
    context: BTreeMap<String, String>,
    #[serde(rename = "@graph")]
    graph: Vec<GraphNode>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    #[serde(rename = "@context")]
    context: &'a BTreeMap<String, String>,
    #[serde(rename = "@graph")]
    graph: &'a [GraphNode],
}

/// The full node collection plus an identifier index.
///
/// Nodes live in a flat arena; the index maps each identifier to the arena
/// slot that owns it. With duplicates, earlier slots stay in the arena but are
/// shadowed in the index.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    context: BTreeMap<String, String>,
    pub(crate) nodes: Vec<GraphNode>,
    index: HashMap<NodeId, usize>,
}

impl Graph {
    /// Decode a JSON-LD document from a reader and index it.
    pub fn from_reader<R: Read>(reader: R, options: GraphOptions) -> Result<Self, GraphError> {
        let doc: Document = serde_json::from_reader(reader)?;
        Self::from_nodes(doc.context, doc.graph, options)
    }

    /// Decode a JSON-LD document from bytes and index it.
    pub fn from_slice(bytes: &[u8], options: GraphOptions) -> Result<Self, GraphError> {
        let doc: Document = serde_json::from_slice(bytes)?;
        Self::from_nodes(doc.context, doc.graph, options)
    }

    /// Index already-decoded nodes in one pass.
    pub fn from_nodes(
        context: BTreeMap<String, String>,
        nodes: Vec<GraphNode>,
        options: GraphOptions,
    ) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if let Some(previous) = index.insert(node.id.clone(), slot) {
                if options.reject_duplicates {
                    return Err(GraphError::DuplicateIdentifier(node.id.clone()));
                }
                warn!(id = %node.id, previous, slot, "duplicate identifier, last occurrence wins");
            }
        }
        info!(nodes = nodes.len(), indexed = index.len(), "indexed ontology graph");
        Ok(Self {
            context,
            nodes,
            index,
        })
    }

    /// Pass-through `@context` prefix map.
    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Every node in document order, shadowed duplicates included.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Nodes that own their identifier in the index, in document order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(slot, node)| self.index.get(&node.id) == Some(slot))
            .map(|(_, node)| node)
    }

    /// Arena slot owning `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Node at an arena slot.
    pub fn node(&self, slot: usize) -> Option<&GraphNode> {
        self.nodes.get(slot)
    }

    /// Node owning `id`.
    pub fn find(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|slot| &self.nodes[slot])
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Diagnostic dump of the graph, resolved children included. Not a
    /// stable format.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&DocumentRef {
            context: &self.context,
            graph: &self.nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    const DOC: &str = r#"{
        "@context": {"schema": "https://schema.org/", "rdfs": "http://www.w3.org/2000/01/rdf-schema#"},
        "@graph": [
            {
                "@id": "schema:Person",
                "@type": "rdfs:Class",
                "rdfs:comment": "A person (alive, dead, undead, or fictional).",
                "rdfs:label": "Person",
                "owl:equivalentClass": {"@id": "foaf:Person"}
            },
            {
                "@id": "schema:name",
                "@type": "rdf:Property",
                "rdfs:label": {"@value": "name", "@language": "en"},
                "schema:domainIncludes": [{"@id": "schema:Person"}],
                "schema:rangeIncludes": {"@id": "schema:Text"}
            }
        ]
    }"#;

    #[test]
    fn decodes_and_indexes_document() {
        let graph = Graph::from_slice(DOC.as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.context()["schema"], "https://schema.org/");

        let person = graph.find("schema:Person").unwrap();
        assert_eq!(person.types.first(), "rdfs:Class");
        assert_eq!(person.label.to_string(), "Person");
        assert!(person.childs.is_empty());

        let name = graph.find("schema:name").unwrap();
        assert_eq!(name.label.language, "en");
        assert_eq!(
            name.relation_ids(Relation::DomainIncludes).unwrap(),
            vec![NodeId::from("schema:Person")]
        );
        assert!(name.relation_ids(Relation::SubClassOf).unwrap().is_empty());
        assert!(graph.find("schema:Text").is_none());
    }

    #[test]
    fn reader_and_slice_decode_alike() {
        let graph = Graph::from_reader(DOC.as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.index_of("schema:name"), Some(1));
        assert_eq!(graph.node(1).unwrap().id.as_str(), "schema:name");
        assert!(graph.node(2).is_none());

        let err = Graph::from_reader(&b"{\"@context\": {}}"[..], GraphOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));
    }

    #[test]
    fn rejects_malformed_document() {
        let err = Graph::from_slice(b"{\"@graph\": [", GraphOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));

        let bad_type = r#"{"@graph": [{"@id": "a", "@type": 3}]}"#;
        let err = Graph::from_slice(bad_type.as_bytes(), GraphOptions::default()).unwrap_err();
        assert!(err.to_string().contains("invalid string shape"));
    }

    #[test]
    fn relation_shape_errors_name_the_node() {
        let doc = r#"{"@graph": [{"@id": "a", "@type": "rdf:Property", "rdfs:subPropertyOf": "b"}]}"#;
        let graph = Graph::from_slice(doc.as_bytes(), GraphOptions::default()).unwrap();
        let err = graph.nodes()[0]
            .relation_ids(Relation::SubPropertyOf)
            .unwrap_err();
        assert_eq!(err.to_string(), "node a: rdfs:subPropertyOf: invalid reference shape: \"b\"");
    }

    #[test]
    fn duplicate_identifier_last_wins_by_default() {
        let nodes = vec![
            GraphNode::new("a").with_comment("first"),
            GraphNode::new("b"),
            GraphNode::new("a").with_comment("second"),
        ];
        let graph = Graph::from_nodes(BTreeMap::new(), nodes, GraphOptions::default()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.index_of("a"), Some(2));
        assert_eq!(graph.find("a").unwrap().comment.value, "second");

        let visible: Vec<_> = graph.visible_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(visible, ["b", "a"]);
    }

    #[test]
    fn duplicate_identifier_can_be_rejected() {
        let nodes = vec![GraphNode::new("a"), GraphNode::new("a")];
        let err = Graph::from_nodes(
            BTreeMap::new(),
            nodes,
            GraphOptions {
                reject_duplicates: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateIdentifier(id) if id.as_str() == "a"));
    }

    #[test]
    fn childs_keep_insertion_order_without_duplicates() {
        let mut childs = Childs::default();
        assert!(childs.insert("b".into()));
        assert!(childs.insert("a".into()));
        assert!(!childs.insert("b".into()));
        assert_eq!(childs.as_slice(), [NodeId::from("b"), NodeId::from("a")]);
        assert!(childs.contains("a"));
    }

    #[test]
    fn dump_includes_resolved_childs() {
        let mut graph = Graph::from_slice(DOC.as_bytes(), GraphOptions::default()).unwrap();
        graph.nodes[0].childs.insert("schema:name".into());
        let dump: serde_json::Value = serde_json::from_str(&graph.to_pretty_json().unwrap()).unwrap();
        assert_eq!(dump["@graph"][0]["childs"], serde_json::json!(["schema:name"]));
        assert_eq!(dump["@graph"][1]["rdfs:label"]["@language"], "en");
        assert_eq!(dump["@context"]["schema"], "https://schema.org/");
    }
}
