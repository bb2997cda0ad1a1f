//! Evolution graphs.
//!
//! The remote catalog serves an evolution chain as a recursive document:
//! each link names a species and nests the links it evolves into. That shape
//! is awkward to persist and to repair, so it is flattened into an explicit
//! node list plus edge list keyed by stable integer ids. Persistence and
//! dependency repair operate only on the flat form.

use crate::ModelError;
use crate::ids::PokemonId;
use crate::pokemon::NamedResource;
use serde::{Deserialize, Serialize};

/// One species appearing in an evolution graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub id: PokemonId,
    pub name: String,
}

/// A directed evolution edge with its trigger conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEdge {
    pub from: PokemonId,
    pub to: PokemonId,
    pub min_level: Option<i64>,
    pub trigger: Option<String>,
}

/// A flattened evolution graph: every species in the chain plus every
/// directed edge between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionGraph {
    pub nodes: Vec<EvolutionNode>,
    pub edges: Vec<EvolutionEdge>,
}

impl EvolutionGraph {
    /// Flattens a remote chain document with a pre-order walk, extracting
    /// each species id from its resource URL.
    pub fn from_chain(doc: &EvolutionChainDocument) -> Result<Self, ModelError> {
        let mut graph = Self::default();
        flatten_link(&doc.chain, &mut graph)?;
        Ok(graph)
    }

    /// The distinct ids referenced by the graph, in first-visit order.
    /// These are the endpoints an edge write depends on.
    #[must_use]
    pub fn node_ids(&self) -> Vec<PokemonId> {
        let mut seen = Vec::new();
        for node in &self.nodes {
            if !seen.contains(&node.id) {
                seen.push(node.id);
            }
        }
        seen
    }

    /// Whether the graph carries no edges (a single-stage species).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn flatten_link(link: &ChainLink, graph: &mut EvolutionGraph) -> Result<(), ModelError> {
    let from = id_from_resource_url(&link.species.url)?;
    graph.nodes.push(EvolutionNode {
        id: from,
        name: link.species.name.clone(),
    });

    for next in &link.evolves_to {
        let to = id_from_resource_url(&next.species.url)?;
        // The catalog can list several alternative trigger conditions for
        // one edge; the first is the canonical one.
        let detail = next.evolution_details.first();
        graph.edges.push(EvolutionEdge {
            from,
            to,
            min_level: detail.and_then(|d| d.min_level),
            trigger: detail.and_then(|d| d.trigger.as_ref().map(|t| t.name.clone())),
        });
        flatten_link(next, graph)?;
    }
    Ok(())
}

/// Extracts the trailing numeric id from a catalog resource URL such as
/// `https://example.org/api/v2/pokemon-species/25/`.
pub fn id_from_resource_url(url: &str) -> Result<PokemonId, ModelError> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<i64>().ok())
        .map(PokemonId::new)
        .ok_or_else(|| ModelError::MalformedResourceUrl(url.to_string()))
}

// ── Remote chain document ────────────────────────────────────

/// The evolution chain document as the remote catalog serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChainDocument {
    pub id: i64,
    pub chain: ChainLink,
}

/// One recursive link of the remote chain document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// Trigger conditions for one evolution step. Only the fields this engine
/// persists are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionDetail {
    #[serde(default)]
    pub min_level: Option<i64>,
    #[serde(default)]
    pub trigger: Option<NamedResource>,
}
