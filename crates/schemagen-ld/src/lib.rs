// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON-LD ontology graph used by schemagen.
//!
//! Pipeline: decode ([`Graph::from_reader`]) → resolve ([`resolve`]) → read-only
//! projection by the code generator. Field values whose JSON shape varies
//! (scalar, object, or array of either) are normalized by the decoders in
//! [`value`].

pub mod error;
pub mod graph;
pub mod naming;
pub mod resolve;
pub mod value;

pub use error::{GraphError, ShapeError};
pub use graph::{Childs, Graph, GraphNode, GraphOptions, NodeId, Relation};
pub use naming::type_name;
pub use resolve::{resolve, resolve_inheritance, resolve_members, ResolveOptions, ResolveStats};
pub use value::{IdRef, IdRefShape, LocalizedText, StringSet};
