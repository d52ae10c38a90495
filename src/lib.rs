//! # Planrep
//!
//! Planrep keeps mutable *planarized copies* of an immutable graph: every
//! original node and edge is represented by nodes and paths of a working
//! [`graph::Graph`], and crossings are materialized as dummy nodes of degree
//! four. A rotation system on the working graph fixes its embedding, and a
//! [`embedding::CombinatorialEmbedding`] can keep the faces of that embedding
//! up to date while paths are inserted and removed.
//!
//! Three copies of increasing power are provided:
//!
//! - [`copy::simple::GraphCopySimple`]: nodes and edges correspond one to
//!   one.
//! - [`copy::chain::GraphCopy`]: an original edge is a chain of copy edges.
//! - [`expansion::PlanRepExpansion`]: in addition an original node may be
//!   expanded into several copies joined by node splits, so that edges can
//!   be routed through a node instead of around it.

pub mod typed_vec;

pub mod config;
pub mod copy;
pub mod embedding;
pub mod error;
pub mod expansion;
pub mod graph;
pub mod list;
pub mod planarity;

pub use config::ExpansionConfig;
pub use copy::{chain::GraphCopy, simple::GraphCopySimple, PlanarizedCopy};
pub use embedding::{CombinatorialEmbedding, Face};
pub use error::{ConsistencyError, EmbeddingError};
pub use expansion::{Crossing, NodeSplitId, PathEnd, PathOwner, PlanRepExpansion};
pub use graph::{AdjEntry, Edge, EdgeEnd, Graph, Node};
