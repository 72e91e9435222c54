// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error kinds for decoding and resolving an ontology graph.

use thiserror::Error;

use crate::graph::{NodeId, Relation};

/// A field's raw JSON matched none of its supported shapes.
///
/// Each variant carries the offending JSON text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// Not `{"@id": ..}`, `[{"@id": ..}, ..]`, or `["..", ..]`.
    #[error("invalid reference shape: {0}")]
    InvalidReferenceShape(String),
    /// Not a string or a non-empty list of strings.
    #[error("invalid string shape: {0}")]
    InvalidStringShape(String),
    /// Not a string or an `{"@value": .., "@language": ..}` object.
    #[error("invalid localized text shape: {0}")]
    InvalidLocalizedTextShape(String),
}

/// Errors produced while building or resolving a [`crate::Graph`].
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed top-level JSON, or a node field that failed to decode.
    #[error("failed to decode JSON-LD document: {0}")]
    Decode(#[from] serde_json::Error),
    /// A relation reference on a node could not be extracted.
    #[error("node {id}: {relation}: {source}")]
    Shape {
        /// Node carrying the reference.
        id: NodeId,
        /// Relation key the reference was stored under.
        relation: Relation,
        /// Underlying shape failure.
        source: ShapeError,
    },
    /// Two nodes share an identifier and duplicates are rejected.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(NodeId),
}
