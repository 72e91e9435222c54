// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Relation resolution: turns raw relation references into each node's
//! [`Childs`](crate::Childs) list.
//!
//! Two phases with a global barrier between them:
//!
//! 1. Members ([`resolve_members`]): `rdfs:subPropertyOf` and
//!    `schema:domainIncludes` attach the node to each target's children;
//!    `schema:rangeIncludes` adds each target to the node's own children.
//! 2. Inheritance ([`resolve_inheritance`]): `rdfs:subClassOf` copies each
//!    parent's children into the node.
//!
//! Phase 2 must only start once phase 1 has run over the whole graph,
//! otherwise inherited sets depend on document order. Targets missing from the
//! graph are skipped: ontologies routinely point at external vocabularies.

use tracing::{debug, info};

use crate::error::GraphError;
use crate::graph::{Graph, GraphNode, NodeId, Relation};

/// Filters applied while resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Nodes carrying `schema:supersededBy` do not attach themselves to
    /// their super-properties or domains.
    pub skip_superseded: bool,
    /// Nodes carrying `schema:inverseOf` do not attach themselves to their
    /// super-properties or domains.
    pub skip_inverse: bool,
}

/// Counters reported by a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Children added through `rdfs:subPropertyOf` / `schema:domainIncludes`.
    pub attached: usize,
    /// Children added through `schema:rangeIncludes`.
    pub ranged: usize,
    /// Children copied from parents through `rdfs:subClassOf`.
    pub inherited: usize,
    /// References whose target is not in the graph.
    pub dangling: usize,
    /// Nodes whose member relations were filtered out.
    pub filtered: usize,
}

impl ResolveStats {
    fn merge(self, other: Self) -> Self {
        Self {
            attached: self.attached + other.attached,
            ranged: self.ranged + other.ranged,
            inherited: self.inherited + other.inherited,
            dangling: self.dangling + other.dangling,
            filtered: self.filtered + other.filtered,
        }
    }
}

/// Run both phases over the whole graph.
///
/// A reference with no valid shape aborts the run; the graph may then hold
/// partially resolved children and should be discarded.
pub fn resolve(graph: &mut Graph, options: &ResolveOptions) -> Result<ResolveStats, GraphError> {
    let members = resolve_members(graph, options)?;
    let inherited = resolve_inheritance(graph)?;
    let stats = members.merge(inherited);
    info!(
        attached = stats.attached,
        ranged = stats.ranged,
        inherited = stats.inherited,
        dangling = stats.dangling,
        filtered = stats.filtered,
        "resolved ontology relations"
    );
    Ok(stats)
}

/// Phase 1: sub-property, domain and range relations.
pub fn resolve_members(
    graph: &mut Graph,
    options: &ResolveOptions,
) -> Result<ResolveStats, GraphError> {
    let mut stats = ResolveStats::default();
    for slot in 0..graph.nodes.len() {
        let node = &graph.nodes[slot];
        let id = node.id.clone();

        let mut parents = Vec::new();
        if is_filtered(node, options)? {
            stats.filtered += 1;
        } else {
            parents.extend(node.relation_ids(Relation::SubPropertyOf)?);
            parents.extend(node.relation_ids(Relation::DomainIncludes)?);
        }
        let ranges = node.relation_ids(Relation::RangeIncludes)?;

        for parent in parents {
            let Some(target) = graph.index_of(parent.as_str()) else {
                note_dangling(&id, &parent, &mut stats);
                continue;
            };
            if graph.nodes[target].childs.insert(id.clone()) {
                stats.attached += 1;
            }
        }

        for range in ranges {
            if graph.index_of(range.as_str()).is_none() {
                note_dangling(&id, &range, &mut stats);
                continue;
            }
            if graph.nodes[slot].childs.insert(range) {
                stats.ranged += 1;
            }
        }
    }
    Ok(stats)
}

/// Phase 2: copy parent children along `rdfs:subClassOf`.
///
/// Nodes are visited in document order and copy the parent's list as it is
/// at that moment, so a parent visited earlier passes on what it inherited
/// itself. Cycles terminate: lists are copied, never recursed into.
pub fn resolve_inheritance(graph: &mut Graph) -> Result<ResolveStats, GraphError> {
    let mut stats = ResolveStats::default();
    for slot in 0..graph.nodes.len() {
        let id = graph.nodes[slot].id.clone();
        for parent in graph.nodes[slot].relation_ids(Relation::SubClassOf)? {
            let Some(source) = graph.index_of(parent.as_str()) else {
                note_dangling(&id, &parent, &mut stats);
                continue;
            };
            if source == slot {
                continue;
            }
            let inherited: Vec<NodeId> = graph.nodes[source].childs.iter().cloned().collect();
            let childs = &mut graph.nodes[slot].childs;
            for child in inherited {
                if childs.insert(child) {
                    stats.inherited += 1;
                }
            }
        }
    }
    Ok(stats)
}

fn is_filtered(node: &GraphNode, options: &ResolveOptions) -> Result<bool, GraphError> {
    let mut filtered = false;
    if options.skip_superseded {
        filtered |= !node.relation_ids(Relation::SupersededBy)?.is_empty();
    }
    if options.skip_inverse {
        filtered |= !node.relation_ids(Relation::InverseOf)?.is_empty();
    }
    Ok(filtered)
}

fn note_dangling(id: &NodeId, target: &NodeId, stats: &mut ResolveStats) {
    debug!(%id, %target, "skipping reference to unknown node");
    stats.dangling += 1;
}
