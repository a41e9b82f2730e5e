//! `yard-topology` — yard road network, map loading, and route planning.
//!
//! The kernel treats the topology as a read-only collaborator: it asks for
//! node types, segment lengths, and routes, and never mutates the graph.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `YardMap` (CSR adjacency), `YardMapBuilder`, `Node`, `Segment` |
//! | [`router`]  | `RoutePlanner` trait, `Route`, `BfsRoutePlanner`             |
//! | [`loader`]  | `load_map_json`, `load_map_reader`                           |
//! | [`error`]   | `TopologyError`, `TopologyResult<T>`                         |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{TopologyError, TopologyResult};
pub use loader::{load_map_json, load_map_reader};
pub use network::{Node, NodeType, Segment, YardMap, YardMapBuilder};
pub use router::{BfsRoutePlanner, Route, RoutePlanner};
