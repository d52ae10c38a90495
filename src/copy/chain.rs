//! Copies in which an original edge is a chain of copy edges.

use tracing::{debug, trace};

use super::{PlanarizedCopy, Unthreaded};
use crate::{
    embedding::{CombinatorialEmbedding, Face},
    error::ConsistencyError,
    graph::{AdjEntry, CcInfo, Edge, EdgeEnd, EdgeVec, Graph, Node, NodeVec},
    list::{List, ListIter, ListPool, ListPos},
};

/// A copy with one copy per original node and a chain of copy edges per
/// original edge. Chains run head to tail from the copy of the source to the
/// copy of the target; their inner nodes are crossing dummies.
#[derive(Clone, Debug)]
pub struct GraphCopy<'a> {
    original: &'a Graph,
    graph: Graph,
    v_orig: NodeVec<Option<Node>>,
    v_copy: NodeVec<Option<Node>>,
    e_orig: EdgeVec<Option<Edge>>,
    e_pos: EdgeVec<Option<ListPos>>,
    chains: EdgeVec<List>,
    pool: ListPool<Edge>,
}

impl<'a> GraphCopy<'a> {
    /// An empty copy of `original`; fill it with one of the `init_*` methods.
    pub fn empty(original: &'a Graph) -> Self {
        GraphCopy {
            original,
            graph: Graph::new(),
            v_orig: NodeVec::new(),
            v_copy: NodeVec::filled(original.node_bound(), None),
            e_orig: EdgeVec::new(),
            e_pos: EdgeVec::new(),
            chains: EdgeVec::filled(original.edge_bound(), List::new()),
            pool: ListPool::new(),
        }
    }

    /// Copies all of `original`, keeping its rotations.
    pub fn new(original: &'a Graph) -> Self {
        let mut copy = Self::empty(original);
        let nodes: Vec<Node> = original.nodes().collect();
        let edges: Vec<Edge> = original.edges().collect();
        copy.init(&nodes, &edges);
        copy
    }

    /// Rebuilds the copy from the connected component `cc` of `info`.
    pub fn init_by_cc(&mut self, info: &CcInfo, cc: usize) {
        self.init(info.nodes(cc), info.edges(cc));
    }

    /// Rebuilds the copy from the subgraph of the original induced by
    /// `nodes`.
    pub fn init_by_nodes(&mut self, nodes: &[Node]) {
        let mut inside = NodeVec::filled(self.original.node_bound(), false);
        for &v in nodes {
            inside[v] = true;
        }
        let edges: Vec<Edge> = self
            .original
            .edges()
            .filter(|&e| inside[self.original.source(e)] && inside[self.original.target(e)])
            .collect();
        self.init(nodes, &edges);
    }

    fn init(&mut self, nodes: &[Node], edges: &[Edge]) {
        let induced = self.original.copy_induced(nodes, edges);
        self.graph = induced.graph;
        self.v_copy = induced.node_map;
        self.v_orig = NodeVec::filled(self.graph.node_bound(), None);
        self.e_orig = EdgeVec::filled(self.graph.edge_bound(), None);
        self.e_pos = EdgeVec::filled(self.graph.edge_bound(), None);
        self.chains = EdgeVec::filled(self.original.edge_bound(), List::new());
        self.pool = ListPool::new();

        for &v in nodes {
            if let Some(c) = self.v_copy[v] {
                self.v_orig[c] = Some(v);
            }
        }
        for &e in edges {
            if let Some(c) = induced.edge_map[e] {
                self.e_orig[c] = Some(e);
                self.e_pos[c] = Some(self.pool.push_back(&mut self.chains[e], c));
            }
        }
        debug!(
            nodes = self.graph.number_of_nodes(),
            edges = self.graph.number_of_edges(),
            "initialized chain copy"
        );
    }

    fn track_edge(&mut self, e: Edge) {
        self.e_orig.ensure(e, None);
        self.e_pos.ensure(e, None);
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn original_graph(&self) -> &'a Graph {
        self.original
    }

    pub fn copy(&self, v: Node) -> Option<Node> {
        self.v_copy.get(v).copied().flatten()
    }

    /// First edge of the chain of `e`.
    pub fn copy_edge(&self, e: Edge) -> Option<Edge> {
        self.pool.front(&self.chains[e])
    }

    pub fn original(&self, v: Node) -> Option<Node> {
        self.v_orig.get(v).copied().flatten()
    }

    pub fn original_edge(&self, e: Edge) -> Option<Edge> {
        self.e_orig.get(e).copied().flatten()
    }

    pub fn chain(&self, e: Edge) -> ListIter<'_, Edge> {
        self.pool.iter(&self.chains[e])
    }

    pub fn chain_len(&self, e: Edge) -> usize {
        self.chains[e].len()
    }

    pub fn is_dummy(&self, v: Node) -> bool {
        self.original(v).is_none()
    }

    /// Whether the chain of `e` starts at the copy of the target of `e`.
    pub fn is_reversed(&self, e: Edge) -> bool {
        self.copy_edge(e).is_some_and(|c| {
            self.original(self.graph.source(c)) != Some(self.original.source(e))
        })
    }

    /// Dummies where two chains cross.
    pub fn number_of_crossings(&self) -> usize {
        self.graph
            .nodes()
            .filter(|&v| self.is_dummy(v) && self.graph.degree(v) == 4)
            .count()
    }

    // --------------------------------------------------------------------------------------------
    // Edits
    // --------------------------------------------------------------------------------------------

    /// Subdivides `e` by a dummy; the new rear half is returned and follows
    /// `e` in its chain.
    pub fn split(&mut self, e: Edge) -> Edge {
        self.split_in_place(e, None)
    }

    pub fn split_embedded(&mut self, emb: &mut CombinatorialEmbedding, e: Edge) -> Edge {
        self.split_in_place(e, Some(emb))
    }

    /// Inverse of [`GraphCopy::split`]; the middle node must be a dummy with
    /// one incoming and one outgoing edge.
    pub fn unsplit(&mut self, e_in: Edge, e_out: Edge) {
        self.unsplit_in_place(e_in, e_out, None);
    }

    pub fn unsplit_embedded(&mut self, emb: &mut CombinatorialEmbedding, e_in: Edge, e_out: Edge) {
        self.unsplit_in_place(e_in, e_out, Some(emb));
    }

    /// A one edge chain for `orig`, appended to the rotations of the copies
    /// of its endpoints.
    pub fn new_edge(&mut self, orig: Edge) -> Edge {
        debug_assert!(self.chains[orig].is_empty(), "{orig} is already routed");
        let (s, t) = self.endpoint_copies(orig);
        let e = self.graph.new_edge(s, t);
        self.track_edge(e);
        self.push_path_edge(orig, e);
        e
    }

    /// Deletes the copy edge `e`, dropping it from its chain.
    pub fn del_edge(&mut self, e: Edge) {
        if let Some(orig) = self.original_edge(e) {
            self.forget_path_edge(orig, e);
        }
        self.graph.del_edge(e);
    }

    fn endpoint_copies(&self, orig: Edge) -> (Node, Node) {
        match (
            self.copy(self.original.source(orig)),
            self.copy(self.original.target(orig)),
        ) {
            (Some(s), Some(t)) => (s, t),
            _ => panic!("endpoints of {orig} are not in the copy"),
        }
    }

    /// Routes `orig`, whose chain must be empty, across the edges of
    /// `crossed`. The new chain is appended to the rotations at its ends.
    pub fn insert_edge_path(&mut self, orig: Edge, crossed: &[AdjEntry]) {
        debug_assert!(self.chains[orig].is_empty(), "{orig} is already routed");
        let (s, t) = self.endpoint_copies(orig);
        self.thread_path(orig, None, EdgeEnd::Append(s), crossed, EdgeEnd::Append(t));
    }

    /// Routes `orig` through the embedding. `crossed` starts with an entry at
    /// the copy of the source, behind which the chain leaves, ends with an
    /// entry at the copy of the target, and lists the crossed edges in
    /// between.
    pub fn insert_edge_path_embedded(
        &mut self,
        orig: Edge,
        emb: &mut CombinatorialEmbedding,
        crossed: &[AdjEntry],
    ) {
        debug_assert!(self.chains[orig].is_empty(), "{orig} is already routed");
        let [first, middle @ .., last] = crossed else {
            panic!("an embedded path needs entries at both ends");
        };
        let (s, t) = self.endpoint_copies(orig);
        debug_assert_eq!(self.graph.node_of(*first), s);
        debug_assert_eq!(self.graph.node_of(*last), t);
        self.thread_path(
            orig,
            Some(emb),
            EdgeEnd::After(*first),
            middle,
            EdgeEnd::After(*last),
        );
    }

    /// Deletes the chain of `orig`.
    pub fn remove_edge_path(&mut self, orig: Edge) {
        self.unthread_path(orig, None);
    }

    /// Deletes the chain of `orig` and returns the faces that were joined.
    pub fn remove_edge_path_embedded(
        &mut self,
        emb: &mut CombinatorialEmbedding,
        orig: Edge,
    ) -> Vec<Face> {
        let Unthreaded { faces, .. } = self.unthread_path(orig, Some(emb));
        faces
    }

    /// Lets `crossing` pass through a new dummy subdividing `crossed`. The
    /// crossing edge keeps its front part up to the dummy, its rear part
    /// follows it in its chain. With `right_to_left`, the crossing passes the
    /// source end of `crossed` on its left at the dummy. Returns the rear half
    /// of `crossed`.
    pub fn insert_crossing(&mut self, crossing: Edge, crossed: Edge, right_to_left: bool) -> Edge {
        let d2 = self.split(crossed);
        let u = self.graph.target(crossed);
        let t = self.graph.target(crossing);
        let c2 = self.graph.new_edge_placed(
            EdgeEnd::Append(u),
            EdgeEnd::After(crossing.adj_target()),
        );
        self.track_edge(c2);
        self.graph.move_target(crossing, EdgeEnd::Append(u));
        debug_assert_eq!(self.graph.target(c2), t);

        let c_in = crossing.adj_target();
        let c_out = c2.adj_source();
        let order = if right_to_left {
            [d2.adj_source(), c_out, crossed.adj_target(), c_in]
        } else {
            [d2.adj_source(), c_in, crossed.adj_target(), c_out]
        };
        self.graph.set_rotation(u, &order);

        if let Some(orig) = self.original_edge(crossing) {
            self.e_orig[c2] = Some(orig);
            if let Some(pos) = self.e_pos[crossing] {
                self.e_pos[c2] = Some(self.pool.insert_after(&mut self.chains[orig], pos, c2));
            }
        }
        trace!(%crossing, %crossed, dummy = %u, "inserted crossing");
        d2
    }

    pub fn consistency_check(&self) -> Result<(), ConsistencyError> {
        for v in self.graph.nodes() {
            if self.graph.adj_entries(v).count() != self.graph.degree(v) {
                return Err(ConsistencyError::Rotation(v));
            }
            if let Some(orig) = self.original(v) {
                if self.copy(orig) != Some(v) {
                    return Err(ConsistencyError::NodeMap(v));
                }
            }
        }
        for e in self.graph.edges() {
            if self.original_edge(e).is_none() {
                return Err(ConsistencyError::DanglingEdge(e));
            }
            match self.e_pos[e] {
                Some(pos) if self.pool.get(pos) == e => {}
                _ => return Err(ConsistencyError::EdgeRole(e)),
            }
        }
        for orig in self.original.edges() {
            let chain: Vec<Edge> = self.chain(orig).collect();
            let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
                continue;
            };
            if chain.iter().any(|&e| self.original_edge(e) != Some(orig)) {
                return Err(ConsistencyError::EdgeRole(first));
            }
            for w in chain.windows(2) {
                let mid = self.graph.target(w[0]);
                if mid != self.graph.source(w[1]) || !self.is_dummy(mid) {
                    return Err(ConsistencyError::ChainBroken(orig));
                }
            }
            if self.original(self.graph.source(first)) != Some(self.original.source(orig))
                || self.original(self.graph.target(last)) != Some(self.original.target(orig))
            {
                return Err(ConsistencyError::ChainEndpoints(orig));
            }
        }
        Ok(())
    }
}

impl PlanarizedCopy for GraphCopy<'_> {
    type PathId = Edge;

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    fn is_dummy(&self, v: Node) -> bool {
        self.original(v).is_none()
    }

    fn split_in_place(&mut self, e: Edge, emb: Option<&mut CombinatorialEmbedding>) -> Edge {
        let e2 = match emb {
            Some(emb) => emb.split(&mut self.graph, e),
            None => self.graph.split(e),
        };
        self.track_edge(e2);
        self.v_orig.ensure(self.graph.target(e), None);
        if let (Some(orig), Some(pos)) = (self.e_orig[e], self.e_pos[e]) {
            self.e_orig[e2] = Some(orig);
            self.e_pos[e2] = Some(self.pool.insert_after(&mut self.chains[orig], pos, e2));
        }
        e2
    }

    fn unsplit_in_place(
        &mut self,
        e_in: Edge,
        e_out: Edge,
        emb: Option<&mut CombinatorialEmbedding>,
    ) {
        debug_assert!(
            self.is_dummy(self.graph.target(e_in)),
            "only dummies can be unsplit"
        );
        debug_assert_eq!(self.e_orig[e_in], self.e_orig[e_out]);
        if let (Some(orig), Some(pos)) = (self.e_orig[e_out], self.e_pos[e_out].take()) {
            self.pool.remove(&mut self.chains[orig], pos);
        }
        self.e_orig[e_out] = None;
        match emb {
            Some(emb) => emb.unsplit(&mut self.graph, e_in, e_out),
            None => self.graph.unsplit(e_in, e_out),
        }
    }

    fn path_edges(&self, id: Edge) -> Vec<Edge> {
        self.pool.to_vec(&self.chains[id])
    }

    fn path_of(&self, e: Edge) -> Option<Edge> {
        self.e_orig.get(e).copied().flatten()
    }

    fn push_path_edge(&mut self, id: Edge, e: Edge) {
        self.track_edge(e);
        self.e_orig[e] = Some(id);
        self.e_pos[e] = Some(self.pool.push_back(&mut self.chains[id], e));
    }

    fn forget_path_edge(&mut self, id: Edge, e: Edge) {
        if let Some(pos) = self.e_pos[e].take() {
            self.pool.remove(&mut self.chains[id], pos);
        }
        self.e_orig[e] = None;
    }
}

#[cfg(test)]
mod tests;
