use thiserror::Error;

use crate::{
    embedding::Face,
    expansion::NodeSplitId,
    graph::{AdjEntry, Edge, Node},
};

/// A face structure that no longer matches the rotation system it was
/// computed from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbeddingError {
    #[error("Adjacency entry {0} has no face")]
    MissingFace(AdjEntry),
    #[error("Adjacency entries {0} and {1} lie on one traced face but carry different faces")]
    TornFace(AdjEntry, AdjEntry),
    #[error("Face {0} covers more than one traced face")]
    MergedFace(Face),
    #[error("Face {face} records {stored} entries, tracing finds {traced}")]
    FaceSize {
        face: Face,
        stored: usize,
        traced: usize,
    },
    #[error("First entry of face {0} belongs to another face")]
    FaceFirst(Face),
    #[error("Expected {expected} faces, found {found}")]
    FaceCount { expected: usize, found: usize },
    #[error("External face {0} is not a face of the embedding")]
    ExternalFace(Face),
}

/// A broken invariant of a planarized copy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("Copy node {0} is not listed in the copies of its original")]
    NodeMap(Node),
    #[error("Copies of original node {0} do not map back to it")]
    Expansion(Node),
    #[error("Copy edge {0} has no role")]
    DanglingEdge(Edge),
    #[error("Copy edge {0} is not found where its role places it")]
    EdgeRole(Edge),
    #[error("Chain of original edge {0} is not a directed path")]
    ChainBroken(Edge),
    #[error("Chain of original edge {0} does not join copies of its endpoints")]
    ChainEndpoints(Edge),
    #[error("Path of node split {0} is not a directed path")]
    SplitBroken(NodeSplitId),
    #[error("Node split {0} does not join two copies of one original")]
    SplitEndpoints(NodeSplitId),
    #[error("Node split {0} runs through {1}, which is neither a dummy nor a copy of its original")]
    SplitInterior(NodeSplitId, Node),
    #[error("Splittable flag of copy node {0} differs from its original")]
    Splittable(Node),
    #[error("Rotation of copy node {0} is corrupt")]
    Rotation(Node),
    #[error("EmbeddingError: {0}")]
    Embedding(#[from] EmbeddingError),
}
