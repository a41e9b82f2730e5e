//! Route planning trait and the default breadth-first planner.
//!
//! # Pluggability
//!
//! The scheduler asks for routes through the [`RoutePlanner`] trait, so a
//! length-weighted or congestion-aware planner can be dropped in without
//! touching the kernel.  The default [`BfsRoutePlanner`] minimises hop count.

use std::collections::VecDeque;

use yard_core::{NodeId, SegmentId};

use crate::network::YardMap;
use crate::TopologyError;

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered list of segments from an origin to a destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    /// Segments to traverse, origin first.
    pub segments: Vec<SegmentId>,
    /// Nodes visited, origin and destination included.  Empty when
    /// `segments` is empty.
    pub nodes:    Vec<NodeId>,
    /// Sum of segment lengths in metres.
    pub length_m: f64,
}

impl Route {
    /// `true` if there is nothing to traverse (same node, or no path).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.segments.len()
    }
}

// ── RoutePlanner trait ────────────────────────────────────────────────────────

/// Pluggable path search.
pub trait RoutePlanner {
    /// Find a route from `from` to `to`.
    ///
    /// Returns an empty route when `from == to` or when no path exists; the
    /// caller tells the two apart by comparing the endpoints.
    ///
    /// # Errors
    ///
    /// [`TopologyError::NodeNotFound`] if either endpoint is not in `map`.
    fn search_route(
        &self,
        map:  &YardMap,
        from: &NodeId,
        to:   &NodeId,
    ) -> Result<Route, TopologyError>;
}

// ── BfsRoutePlanner ───────────────────────────────────────────────────────────

/// Breadth-first search over the segment graph.
///
/// Two-way segments are traversed in both directions, one-way segments only
/// from `from` to `to`.  The result has the fewest hops.  When several
/// shortest paths exist the one returned is the first discovered, which
/// follows segment declaration order in the map; it is not otherwise unique.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsRoutePlanner;

impl RoutePlanner for BfsRoutePlanner {
    fn search_route(
        &self,
        map:  &YardMap,
        from: &NodeId,
        to:   &NodeId,
    ) -> Result<Route, TopologyError> {
        bfs(map, from, to)
    }
}

// ── BFS internals ─────────────────────────────────────────────────────────────

/// Sentinel for "not reached".
const UNVISITED: usize = usize::MAX;

fn bfs(map: &YardMap, from: &NodeId, to: &NodeId) -> Result<Route, TopologyError> {
    let src = map.index_of(from).ok_or_else(|| TopologyError::NodeNotFound(from.clone()))?;
    let dst = map.index_of(to).ok_or_else(|| TopologyError::NodeNotFound(to.clone()))?;

    if src == dst {
        return Ok(Route::default());
    }

    let n = map.node_count();
    // prev[v] = (predecessor node, segment) on the BFS tree.
    let mut prev    = vec![(UNVISITED, UNVISITED); n];
    let mut visited = vec![false; n];
    let mut queue   = VecDeque::new();

    visited[src] = true;
    queue.push_back(src);

    while let Some(node) = queue.pop_front() {
        for (next, segment) in map.out_arcs(node) {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            prev[next] = (node, segment);
            if next == dst {
                return Ok(reconstruct(map, &prev, src, dst));
            }
            queue.push_back(next);
        }
    }

    tracing::debug!(%from, %to, "no route");
    Ok(Route::default())
}

fn reconstruct(map: &YardMap, prev: &[(usize, usize)], src: usize, dst: usize) -> Route {
    let mut segments = Vec::new();
    let mut nodes    = vec![map.node_at(dst).id.clone()];
    let mut length_m = 0.0;

    let mut cur = dst;
    while cur != src {
        let (p, s) = prev[cur];
        let seg = map.segment_at(s);
        segments.push(seg.id.clone());
        length_m += seg.length;
        nodes.push(map.node_at(p).id.clone());
        cur = p;
    }
    segments.reverse();
    nodes.reverse();

    Route { segments, nodes, length_m }
}
