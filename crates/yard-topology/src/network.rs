//! Yard road network representation and builder.
//!
//! # Data layout
//!
//! Nodes and segments are stored in insertion order and addressed internally
//! by dense indices; string identifiers are resolved once through hash maps.
//! Traversal uses **Compressed Sparse Row (CSR)** arcs.  A two-way segment
//! contributes two arcs (one per direction) that share the segment index; a
//! one-way segment contributes a single `from → to` arc.  The outgoing arcs
//! of node `n` occupy:
//!
//! ```text
//! arc_to[ arc_start[n] .. arc_start[n+1] ]
//! ```
//!
//! Arcs are sorted by source node with a **stable** sort, so each node's arcs
//! keep segment insertion order.  Breadth-first search therefore visits
//! neighbours in the order segments were declared in the map file.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use yard_core::{NodeId, SegmentId};

use crate::{TopologyError, TopologyResult};

// ── Node / Segment ────────────────────────────────────────────────────────────

/// What a node is used for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Yard storage position, served by yard cranes.
    Bay,
    /// Shipside position, served by quay cranes.
    Quay,
    Road,
    Intersection,
    Parking,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Bay          => "BAY",
            NodeType::Quay         => "QUAY",
            NodeType::Road         => "ROAD",
            NodeType::Intersection => "INTERSECTION",
            NodeType::Parking      => "PARKING",
        }
    }
}

impl FromStr for NodeType {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BAY"          => Ok(NodeType::Bay),
            "QUAY"         => Ok(NodeType::Quay),
            "ROAD"         => Ok(NodeType::Road),
            "INTERSECTION" => Ok(NodeType::Intersection),
            "PARKING"      => Ok(NodeType::Parking),
            other          => Err(TopologyError::UnknownNodeType(other.to_owned())),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position in the yard.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id:        NodeId,
    pub node_type: NodeType,
    pub x:         f64,
    pub y:         f64,
    pub name:      Option<String>,
}

/// A road segment between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id:        SegmentId,
    pub from:      NodeId,
    pub to:        NodeId,
    /// Length in metres.
    pub length:    f64,
    /// Speed limit in m/s, if the map declares one.
    pub max_speed: Option<f64>,
    pub one_way:   bool,
}

// ── YardMap ───────────────────────────────────────────────────────────────────

/// Read-only yard topology.  Build with [`YardMapBuilder`] or load with
/// [`load_map_json`](crate::load_map_json).
#[derive(Debug)]
pub struct YardMap {
    pub map_id: String,

    nodes:         Vec<Node>,
    node_index:    HashMap<NodeId, usize>,
    segments:      Vec<Segment>,
    segment_index: HashMap<SegmentId, usize>,

    // ── CSR arcs ──────────────────────────────────────────────────────────
    /// Outgoing arcs of node `n` are `arc_start[n] .. arc_start[n+1]`.
    arc_start:   Vec<u32>,
    /// Target node index of each arc.
    arc_to:      Vec<usize>,
    /// Segment index each arc travels along.
    arc_segment: Vec<usize>,
}

impl YardMap {
    /// A map with no nodes.  Every route query against it fails.
    pub fn empty() -> Self {
        YardMap {
            map_id:        String::new(),
            nodes:         Vec::new(),
            node_index:    HashMap::new(),
            segments:      Vec::new(),
            segment_index: HashMap::new(),
            arc_start:     vec![0],
            arc_to:        Vec::new(),
            arc_segment:   Vec::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_type(&self, id: &NodeId) -> Option<NodeType> {
        self.node(id).map(|n| n.node_type)
    }

    pub fn segment(&self, id: &SegmentId) -> Option<&Segment> {
        self.segment_index.get(id).map(|&i| &self.segments[i])
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All segments in declaration order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Nodes of the given type, in declaration order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    /// Sum of segment lengths along `path`.  Unknown segment ids count as zero.
    pub fn path_length(&self, path: &[SegmentId]) -> f64 {
        path.iter()
            .filter_map(|s| self.segment(s))
            .map(|s| s.length)
            .sum()
    }

    // ── Traversal (crate-internal, index based) ───────────────────────────

    pub(crate) fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub(crate) fn node_at(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub(crate) fn segment_at(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    /// `(neighbour index, segment index)` for every outgoing arc of `node`,
    /// in segment declaration order.
    #[inline]
    pub(crate) fn out_arcs(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let start = self.arc_start[node] as usize;
        let end   = self.arc_start[node + 1] as usize;
        (start..end).map(|a| (self.arc_to[a], self.arc_segment[a]))
    }

    /// Number of outgoing arcs from `id` (0 for unknown nodes).
    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.index_of(id)
            .map(|n| (self.arc_start[n + 1] - self.arc_start[n]) as usize)
            .unwrap_or(0)
    }
}

// ── YardMapBuilder ────────────────────────────────────────────────────────────

/// Construct a [`YardMap`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be unique; segments may be added in any order but every
/// endpoint must exist by the time `build()` runs.
///
/// # Example
///
/// ```
/// use yard_topology::{NodeType, YardMapBuilder};
///
/// let mut b = YardMapBuilder::new("demo");
/// b.add_node("Q1", NodeType::Quay, 0.0, 0.0);
/// b.add_node("B1", NodeType::Bay, 100.0, 0.0);
/// b.add_segment("S1", "Q1", "B1", 100.0);
/// let map = b.build().unwrap();
/// assert_eq!(map.node_count(), 2);
/// assert_eq!(map.out_degree(&"B1".into()), 1); // two-way
/// ```
pub struct YardMapBuilder {
    map_id:   String,
    nodes:    Vec<Node>,
    segments: Vec<Segment>,
}

impl YardMapBuilder {
    pub fn new(map_id: impl Into<String>) -> Self {
        Self { map_id: map_id.into(), nodes: Vec::new(), segments: Vec::new() }
    }

    /// Add a node with no display name.
    pub fn add_node(&mut self, id: impl Into<NodeId>, node_type: NodeType, x: f64, y: f64) -> &mut Self {
        self.push_node(Node { id: id.into(), node_type, x, y, name: None })
    }

    pub fn push_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Add a **two-way** segment with no speed limit.
    pub fn add_segment(
        &mut self,
        id:     impl Into<SegmentId>,
        from:   impl Into<NodeId>,
        to:     impl Into<NodeId>,
        length: f64,
    ) -> &mut Self {
        self.push_segment(Segment {
            id:        id.into(),
            from:      from.into(),
            to:        to.into(),
            length,
            max_speed: None,
            one_way:   false,
        })
    }

    /// Add a **one-way** `from → to` segment with no speed limit.
    pub fn add_one_way(
        &mut self,
        id:     impl Into<SegmentId>,
        from:   impl Into<NodeId>,
        to:     impl Into<NodeId>,
        length: f64,
    ) -> &mut Self {
        self.push_segment(Segment {
            id:        id.into(),
            from:      from.into(),
            to:        to.into(),
            length,
            max_speed: None,
            one_way:   true,
        })
    }

    pub fn push_segment(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    /// Validate references and build the CSR arrays.
    ///
    /// # Errors
    ///
    /// Duplicate node/segment ids, segments with missing endpoints and
    /// negative lengths are rejected.
    pub fn build(self) -> TopologyResult<YardMap> {
        let mut node_index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node_index.insert(node.id.clone(), i).is_some() {
                return Err(TopologyError::DuplicateNode(node.id.clone()));
            }
        }

        let mut segment_index = HashMap::with_capacity(self.segments.len());
        // (source, target, segment) per arc, in segment declaration order.
        let mut arcs: Vec<(usize, usize, usize)> = Vec::with_capacity(self.segments.len() * 2);
        for (i, seg) in self.segments.iter().enumerate() {
            if segment_index.insert(seg.id.clone(), i).is_some() {
                return Err(TopologyError::DuplicateSegment(seg.id.clone()));
            }
            if !seg.length.is_finite() || seg.length < 0.0 {
                return Err(TopologyError::InvalidLength(seg.id.clone()));
            }
            let endpoint = |n: &NodeId| {
                node_index.get(n).copied().ok_or_else(|| TopologyError::DanglingSegment {
                    segment: seg.id.clone(),
                    node:    n.clone(),
                })
            };
            let from = endpoint(&seg.from)?;
            let to   = endpoint(&seg.to)?;
            arcs.push((from, to, i));
            if !seg.one_way {
                arcs.push((to, from, i));
            }
        }

        // Stable: keeps declaration order within each source node.
        arcs.sort_by_key(|&(from, _, _)| from);

        let node_count = self.nodes.len();
        let mut arc_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &arcs {
            arc_start[from + 1] += 1;
        }
        for i in 1..=node_count {
            arc_start[i] += arc_start[i - 1];
        }
        debug_assert_eq!(arc_start[node_count] as usize, arcs.len());

        Ok(YardMap {
            map_id:      self.map_id,
            nodes:       self.nodes,
            node_index,
            segments:    self.segments,
            segment_index,
            arc_start,
            arc_to:      arcs.iter().map(|&(_, to, _)| to).collect(),
            arc_segment: arcs.iter().map(|&(_, _, s)| s).collect(),
        })
    }
}
