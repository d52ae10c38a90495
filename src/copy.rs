//! # Planarized copies
//!
//! A planarized copy is a mutable [`Graph`] that stands for an immutable
//! original graph. An original edge is represented by a *path* of copy edges
//! that runs through crossing dummies; the copies in this crate differ in
//! what else a path can stand for.
//!
//! [`PlanarizedCopy`] is the seam the path surgery is written against:
//! implementors say how one path edge is subdivided, merged, registered and
//! forgotten, and get threading a new path through a list of crossed edges
//! ([`PlanarizedCopy::thread_path`]) and taking a path out again
//! ([`PlanarizedCopy::unthread_path`]) for free.

use indexmap::IndexSet;
use std::fmt::Debug;
use tracing::trace;

use crate::{
    embedding::{CombinatorialEmbedding, Face},
    graph::{AdjEntry, Edge, EdgeEnd, Graph, Node},
};

pub mod chain;
pub mod simple;

/// What is left behind when a path is taken out of a copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unthreaded {
    pub source: Option<Node>,
    pub target: Option<Node>,
    /// Faces produced by joining, when the copy was embedded.
    pub faces: Vec<Face>,
}

pub trait PlanarizedCopy {
    /// Identifies the owner of a path.
    type PathId: Copy + Eq + Debug;

    fn graph(&self) -> &Graph;

    fn graph_mut(&mut self) -> &mut Graph;

    /// Whether `v` has no original node.
    fn is_dummy(&self, v: Node) -> bool;

    /// Subdivides `e`; the new edge joins the path of `e` directly behind it.
    fn split_in_place(&mut self, e: Edge, emb: Option<&mut CombinatorialEmbedding>) -> Edge;

    /// Merges two consecutive edges of one path through their degree two
    /// middle node.
    fn unsplit_in_place(
        &mut self,
        e_in: Edge,
        e_out: Edge,
        emb: Option<&mut CombinatorialEmbedding>,
    );

    fn path_edges(&self, id: Self::PathId) -> Vec<Edge>;

    /// The path `e` lies on, if any.
    fn path_of(&self, e: Edge) -> Option<Self::PathId>;

    /// Appends `e` to the path of `id`.
    fn push_path_edge(&mut self, id: Self::PathId, e: Edge);

    /// Drops `e` from the path of `id` without touching the graph.
    fn forget_path_edge(&mut self, id: Self::PathId, e: Edge);

    /// Threads a new path for `id` from `start` to `end`, crossing the edges
    /// of `crossed` in order.
    ///
    /// A crossed entry `adj` is passed from its left face into its right
    /// face. Every crossing splits the crossed edge; the two path edges at the
    /// new dummy alternate with the two halves of the crossed edge. With an
    /// embedding, `start` and `end` must be [`EdgeEnd::After`] entries on the
    /// faces the path leaves and enters, and faces are split along the way.
    fn thread_path(
        &mut self,
        id: Self::PathId,
        mut emb: Option<&mut CombinatorialEmbedding>,
        start: EdgeEnd,
        crossed: &[AdjEntry],
        end: EdgeEnd,
    ) -> Vec<Edge> {
        let mut from = start;
        let mut added = Vec::with_capacity(crossed.len() + 1);
        for &adj in crossed {
            let e = adj.edge();
            let e2 = self.split_in_place(e, emb.as_deref_mut());
            let (adj_tgt, next_src) = if adj.is_source() {
                (e.adj_target(), e2.adj_source())
            } else {
                (e2.adj_source(), e.adj_target())
            };
            let new = connect(self.graph_mut(), emb.as_deref_mut(), from, EdgeEnd::After(adj_tgt));
            self.push_path_edge(id, new);
            added.push(new);
            from = EdgeEnd::After(next_src);
        }
        let new = connect(self.graph_mut(), emb.as_deref_mut(), from, end);
        self.push_path_edge(id, new);
        added.push(new);
        trace!(?id, crossings = crossed.len(), "threaded path");
        added
    }

    /// Deletes the path of `id`. Crossing dummies left with one incoming and
    /// one outgoing edge of a common path are merged away.
    fn unthread_path(
        &mut self,
        id: Self::PathId,
        mut emb: Option<&mut CombinatorialEmbedding>,
    ) -> Unthreaded {
        let edges = self.path_edges(id);
        let (Some(&first), Some(&last)) = (edges.first(), edges.last()) else {
            return Unthreaded::default();
        };
        let source = Some(self.graph().source(first));
        let target = Some(self.graph().target(last));
        let interior: Vec<Node> = edges[1..].iter().map(|&e| self.graph().source(e)).collect();

        let mut faces = IndexSet::new();
        for &e in &edges {
            self.forget_path_edge(id, e);
            match emb.as_deref_mut() {
                Some(emb) => {
                    faces.insert(emb.join_faces(self.graph_mut(), e));
                }
                None => self.graph_mut().del_edge(e),
            }
        }

        for u in interior {
            let graph = self.graph();
            if !graph.is_alive_node(u)
                || !self.is_dummy(u)
                || graph.indeg(u) != 1
                || graph.outdeg(u) != 1
            {
                continue;
            }
            let mut e_in = None;
            let mut e_out = None;
            for adj in graph.adj_entries(u) {
                if adj.is_source() {
                    e_out = Some(adj.edge());
                } else {
                    e_in = Some(adj.edge());
                }
            }
            if let (Some(e_in), Some(e_out)) = (e_in, e_out) {
                if self.path_of(e_in).is_some() && self.path_of(e_in) == self.path_of(e_out) {
                    self.unsplit_in_place(e_in, e_out, emb.as_deref_mut());
                }
            }
        }

        let faces = match emb {
            Some(emb) => faces.into_iter().filter(|f| emb.is_alive_face(*f)).collect(),
            None => Vec::new(),
        };
        trace!(?id, removed = edges.len(), "unthreaded path");
        Unthreaded {
            source,
            target,
            faces,
        }
    }
}

/// A new edge between two rotation slots, splitting their common face when
/// embedded.
pub(crate) fn connect(
    graph: &mut Graph,
    emb: Option<&mut CombinatorialEmbedding>,
    from: EdgeEnd,
    to: EdgeEnd,
) -> Edge {
    match (emb, from, to) {
        (Some(emb), EdgeEnd::After(a), EdgeEnd::After(b)) => emb.split_face(graph, a, b),
        (Some(_), from, to) => {
            panic!("embedded paths attach behind adjacency entries, got {from:?} and {to:?}")
        }
        (None, from, to) => graph.new_edge_placed(from, to),
    }
}
