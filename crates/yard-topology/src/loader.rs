//! JSON map loader.
//!
//! # File format
//!
//! ```json
//! {
//!   "mapId": "terminal-1",
//!   "nodes": [
//!     { "id": "Q1",  "type": "QUAY", "x": 0.0,   "y": 0.0, "name": "Berth 1" },
//!     { "id": "B1",  "type": "BAY",  "x": 120.0, "y": 0.0 }
//!   ],
//!   "segments": [
//!     { "id": "S1", "from": "Q1", "to": "B1", "length": 120.0, "maxSpeed": 8.0, "isOneWay": false }
//!   ]
//! }
//! ```
//!
//! An unknown node `type` or a segment endpoint that names no node is a
//! fatal error.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::network::{Node, NodeType, Segment, YardMap, YardMapBuilder};
use crate::TopologyResult;

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRecord {
    map_id:   String,
    nodes:    Vec<NodeRecord>,
    #[serde(default)]
    segments: Vec<SegmentRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    id:     String,
    #[serde(rename = "type")]
    kind:   String,
    x:      f64,
    y:      f64,
    #[serde(default)]
    name:   Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRecord {
    id:          String,
    from:        String,
    to:          String,
    length:      f64,
    #[serde(default)]
    max_speed:   Option<f64>,
    #[serde(default)]
    is_one_way:  bool,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`YardMap`] from a JSON file.
pub fn load_map_json(path: &Path) -> TopologyResult<YardMap> {
    let file = std::fs::File::open(path)?;
    load_map_reader(std::io::BufReader::new(file))
}

/// Like [`load_map_json`] but accepts any `Read` source.
pub fn load_map_reader<R: Read>(reader: R) -> TopologyResult<YardMap> {
    let record: MapRecord = serde_json::from_reader(reader)?;

    let mut b = YardMapBuilder::new(record.map_id);
    for n in record.nodes {
        let node_type: NodeType = n.kind.parse()?;
        b.push_node(Node { id: n.id.into(), node_type, x: n.x, y: n.y, name: n.name });
    }
    for s in record.segments {
        b.push_segment(Segment {
            id:        s.id.into(),
            from:      s.from.into(),
            to:        s.to.into(),
            length:    s.length,
            max_speed: s.max_speed,
            one_way:   s.is_one_way,
        });
    }

    let map = b.build()?;
    tracing::info!(
        map_id = %map.map_id,
        nodes = map.node_count(),
        segments = map.segment_count(),
        "map loaded"
    );
    Ok(map)
}
