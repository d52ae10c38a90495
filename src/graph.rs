//! # Graphs with rotation systems
//!
//! [`Graph`] is an arena graph: nodes and edges are addressed by [`Node`] and
//! [`Edge`] handles that are never reused, so a handle to a deleted element
//! can be detected with [`Graph::is_alive_node`]/[`Graph::is_alive_edge`]
//! instead of aliasing a newer element.
//!
//! Every edge `e` owns two adjacency entries, [`Edge::adj_source`]
//! (`AdjEntry(2e)`) and [`Edge::adj_target`] (`AdjEntry(2e + 1)`), related by
//! [`AdjEntry::twin`]. Each node keeps its entries in a circular doubly
//! linked list, the *rotation* of the node. The rotations of all nodes define
//! the combinatorial embedding traced by [`crate::embedding`].

use bitvec::vec::BitVec;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::VecDeque;

crate::define_indexed_vec!(
    /// Handle of a node.
    pub struct Node;
    /// Dense per-node storage.
    pub struct NodeVec;
);

crate::define_indexed_vec!(
    /// Handle of an edge.
    pub struct Edge;
    /// Dense per-edge storage.
    pub struct EdgeVec;
);

crate::define_indexed_vec!(
    /// One end of an edge, as seen from the node it is attached to.
    pub struct AdjEntry;
    /// Dense per-adjacency-entry storage.
    pub struct AdjVec;
);

impl Edge {
    /// The entry of this edge at its source node.
    pub fn adj_source(self) -> AdjEntry {
        AdjEntry(2 * self.0)
    }

    /// The entry of this edge at its target node.
    pub fn adj_target(self) -> AdjEntry {
        AdjEntry(2 * self.0 + 1)
    }
}

impl AdjEntry {
    /// The entry at the other end of the same edge.
    pub fn twin(self) -> AdjEntry {
        AdjEntry(self.0 ^ 1)
    }

    pub fn edge(self) -> Edge {
        Edge(self.0 >> 1)
    }

    /// Whether this is the source end of its edge.
    pub fn is_source(self) -> bool {
        self.0 & 1 == 0
    }
}

/// Where a new edge end is attached in the rotation of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEnd {
    /// Directly behind the given entry, at the entry's node.
    After(AdjEntry),
    /// Directly in front of the given entry, at the entry's node. In front
    /// of the first entry, the new end becomes the first entry.
    Before(AdjEntry),
    /// At the end of the rotation of the node.
    Append(Node),
}

#[derive(Clone, Debug)]
struct NodeRecord {
    first: Option<AdjEntry>,
    degree: usize,
    indeg: usize,
    outdeg: usize,
    alive: bool,
}

#[derive(Clone, Debug)]
struct EdgeRecord {
    source: Node,
    target: Node,
    alive: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: NodeVec<NodeRecord>,
    edges: EdgeVec<EdgeRecord>,
    adj_node: AdjVec<Node>,
    adj_next: AdjVec<AdjEntry>,
    adj_prev: AdjVec<AdjEntry>,
    n_nodes: usize,
    n_edges: usize,
}

/// A copy of part of a graph together with the maps from the source graph.
#[derive(Clone, Debug)]
pub struct InducedCopy {
    pub graph: Graph,
    pub node_map: NodeVec<Option<Node>>,
    pub edge_map: EdgeVec<Option<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with `n_nodes` nodes and `n_edges` edges between random
    /// distinct endpoints; parallel edges may occur.
    pub fn random(n_nodes: usize, n_edges: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut graph = Graph::new();
        let nodes: Vec<Node> = (0..n_nodes).map(|_| graph.new_node()).collect();
        if n_nodes < 2 {
            return graph;
        }
        for _ in 0..n_edges {
            let s = rng.gen_range(0..n_nodes);
            let mut t = rng.gen_range(0..n_nodes - 1);
            if t >= s {
                t += 1;
            }
            graph.new_edge(nodes[s], nodes[t]);
        }
        graph
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    pub fn number_of_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn number_of_edges(&self) -> usize {
        self.n_edges
    }

    /// One past the largest node handle ever handed out.
    pub fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    /// One past the largest edge handle ever handed out.
    pub fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    pub fn is_alive_node(&self, v: Node) -> bool {
        self.nodes.get(v).is_some_and(|r| r.alive)
    }

    pub fn is_alive_edge(&self, e: Edge) -> bool {
        self.edges.get(e).is_some_and(|r| r.alive)
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes.iter().filter(|(_, r)| r.alive).map(|(v, _)| v)
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().filter(|(_, r)| r.alive).map(|(e, _)| e)
    }

    pub fn source(&self, e: Edge) -> Node {
        self.edges[e].source
    }

    pub fn target(&self, e: Edge) -> Node {
        self.edges[e].target
    }

    /// The endpoint of `e` that is not `v`.
    pub fn opposite(&self, e: Edge, v: Node) -> Node {
        let EdgeRecord { source, target, .. } = self.edges[e];
        debug_assert!(v == source || v == target);
        if v == source {
            target
        } else {
            source
        }
    }

    pub fn is_self_loop(&self, e: Edge) -> bool {
        self.source(e) == self.target(e)
    }

    /// A node shared by `e1` and `e2`, if any.
    pub fn common_node(&self, e1: Edge, e2: Edge) -> Option<Node> {
        let (s1, t1) = (self.source(e1), self.target(e1));
        let (s2, t2) = (self.source(e2), self.target(e2));
        if s1 == s2 || s1 == t2 {
            Some(s1)
        } else if t1 == s2 || t1 == t2 {
            Some(t1)
        } else {
            None
        }
    }

    pub fn node_of(&self, adj: AdjEntry) -> Node {
        self.adj_node[adj]
    }

    /// The adjacency entry of `e` at `v`.
    pub fn adj_at(&self, e: Edge, v: Node) -> AdjEntry {
        if self.source(e) == v {
            e.adj_source()
        } else {
            debug_assert_eq!(self.target(e), v);
            e.adj_target()
        }
    }

    pub fn cyclic_succ(&self, adj: AdjEntry) -> AdjEntry {
        self.adj_next[adj]
    }

    pub fn cyclic_pred(&self, adj: AdjEntry) -> AdjEntry {
        self.adj_prev[adj]
    }

    pub fn first_adj(&self, v: Node) -> Option<AdjEntry> {
        self.nodes[v].first
    }

    pub fn last_adj(&self, v: Node) -> Option<AdjEntry> {
        self.nodes[v].first.map(|f| self.adj_prev[f])
    }

    pub fn degree(&self, v: Node) -> usize {
        self.nodes[v].degree
    }

    pub fn indeg(&self, v: Node) -> usize {
        self.nodes[v].indeg
    }

    pub fn outdeg(&self, v: Node) -> usize {
        self.nodes[v].outdeg
    }

    /// The rotation of `v`, starting at its first entry.
    pub fn adj_entries(&self, v: Node) -> AdjIter<'_> {
        AdjIter {
            graph: self,
            start: self.nodes[v].first,
            current: self.nodes[v].first,
        }
    }

    pub fn search_edge(&self, v: Node, w: Node) -> Option<Edge> {
        self.adj_entries(v)
            .find(|a| self.node_of(a.twin()) == w)
            .map(AdjEntry::edge)
    }

    // --------------------------------------------------------------------------------------------
    // Rotation primitives
    // --------------------------------------------------------------------------------------------

    fn link(&mut self, adj: AdjEntry, v: Node, at: EdgeEnd) {
        self.adj_node[adj] = v;
        match at {
            EdgeEnd::Append(_) => match self.nodes[v].first {
                None => {
                    self.adj_next[adj] = adj;
                    self.adj_prev[adj] = adj;
                    self.nodes[v].first = Some(adj);
                }
                Some(first) => {
                    let last = self.adj_prev[first];
                    self.splice_between(adj, last, first);
                }
            },
            EdgeEnd::After(anchor) => {
                debug_assert_eq!(self.adj_node[anchor], v);
                let next = self.adj_next[anchor];
                self.splice_between(adj, anchor, next);
            }
            EdgeEnd::Before(anchor) => {
                debug_assert_eq!(self.adj_node[anchor], v);
                let prev = self.adj_prev[anchor];
                self.splice_between(adj, prev, anchor);
                if self.nodes[v].first == Some(anchor) {
                    self.nodes[v].first = Some(adj);
                }
            }
        }
        let record = &mut self.nodes[v];
        record.degree += 1;
        if adj.is_source() {
            record.outdeg += 1;
        } else {
            record.indeg += 1;
        }
    }

    fn splice_between(&mut self, adj: AdjEntry, prev: AdjEntry, next: AdjEntry) {
        self.adj_prev[adj] = prev;
        self.adj_next[adj] = next;
        self.adj_next[prev] = adj;
        self.adj_prev[next] = adj;
    }

    fn unlink(&mut self, adj: AdjEntry) {
        let v = self.adj_node[adj];
        let next = self.adj_next[adj];
        let prev = self.adj_prev[adj];
        if next == adj {
            self.nodes[v].first = None;
        } else {
            self.adj_next[prev] = next;
            self.adj_prev[next] = prev;
            if self.nodes[v].first == Some(adj) {
                self.nodes[v].first = Some(next);
            }
        }
        self.adj_next[adj] = adj;
        self.adj_prev[adj] = adj;
        let record = &mut self.nodes[v];
        record.degree -= 1;
        if adj.is_source() {
            record.outdeg -= 1;
        } else {
            record.indeg -= 1;
        }
    }

    /// Puts `new` at the rotation slot of `old`; `old` is left detached.
    /// Both entries must be ends of the same kind (source or target).
    fn replace_adj(&mut self, old: AdjEntry, new: AdjEntry) {
        debug_assert_eq!(old.is_source(), new.is_source());
        let v = self.adj_node[old];
        self.adj_node[new] = v;
        if self.adj_next[old] == old {
            self.adj_next[new] = new;
            self.adj_prev[new] = new;
        } else {
            let (next, prev) = (self.adj_next[old], self.adj_prev[old]);
            self.splice_between(new, prev, next);
        }
        if self.nodes[v].first == Some(old) {
            self.nodes[v].first = Some(new);
        }
        self.adj_next[old] = old;
        self.adj_prev[old] = old;
    }

    fn end_node(&self, at: EdgeEnd) -> Node {
        match at {
            EdgeEnd::After(a) | EdgeEnd::Before(a) => self.adj_node[a],
            EdgeEnd::Append(v) => v,
        }
    }

    fn push_edge_record(&mut self, source: Node, target: Node) -> Edge {
        let e = self.edges.push(EdgeRecord {
            source,
            target,
            alive: true,
        });
        for adj in [e.adj_source(), e.adj_target()] {
            self.adj_node.push(source);
            self.adj_next.push(adj);
            self.adj_prev.push(adj);
        }
        self.n_edges += 1;
        e
    }

    // --------------------------------------------------------------------------------------------
    // Mutators
    // --------------------------------------------------------------------------------------------

    pub fn new_node(&mut self) -> Node {
        self.n_nodes += 1;
        self.nodes.push(NodeRecord {
            first: None,
            degree: 0,
            indeg: 0,
            outdeg: 0,
            alive: true,
        })
    }

    /// A new edge `v -> w`, appended to both rotations.
    pub fn new_edge(&mut self, v: Node, w: Node) -> Edge {
        self.new_edge_placed(EdgeEnd::Append(v), EdgeEnd::Append(w))
    }

    /// A new edge whose ends are attached at the given rotation slots.
    pub fn new_edge_placed(&mut self, source: EdgeEnd, target: EdgeEnd) -> Edge {
        let v = self.end_node(source);
        let w = self.end_node(target);
        debug_assert!(self.is_alive_node(v) && self.is_alive_node(w));
        let e = self.push_edge_record(v, w);
        self.link(e.adj_source(), v, source);
        self.link(e.adj_target(), w, target);
        e
    }

    /// Subdivides `e = (s, t)` by a new node `u`: afterwards `e = (s, u)` and
    /// the returned edge is `(u, t)`. The rotation of `u` is
    /// `[e.adj_target(), new.adj_source()]` and `t` keeps its order.
    pub fn split(&mut self, e: Edge) -> Edge {
        let t = self.target(e);
        let u = self.new_node();
        let e2 = self.push_edge_record(u, t);
        // the slot at t changes hands, its counters stay as they are
        self.replace_adj(e.adj_target(), e2.adj_target());
        self.edges[e].target = u;
        self.link(e.adj_target(), u, EdgeEnd::Append(u));
        self.link(e2.adj_source(), u, EdgeEnd::Append(u));
        e2
    }

    /// Inverse of [`Graph::split`]: `e_in = (s, u)` and `e_out = (u, t)` with
    /// `u` of degree two become `e_in = (s, t)`; `u` and `e_out` are deleted.
    pub fn unsplit(&mut self, e_in: Edge, e_out: Edge) {
        let u = self.target(e_in);
        debug_assert_eq!(self.source(e_out), u, "edges do not meet at a subdivision node");
        debug_assert_eq!(self.indeg(u), 1);
        debug_assert_eq!(self.outdeg(u), 1);
        let t = self.target(e_out);

        self.unlink(e_in.adj_target());
        self.unlink(e_out.adj_source());
        self.replace_adj(e_out.adj_target(), e_in.adj_target());
        self.edges[e_in].target = t;

        self.edges[e_out].alive = false;
        self.n_edges -= 1;
        self.nodes[u].alive = false;
        self.n_nodes -= 1;
    }

    pub fn del_edge(&mut self, e: Edge) {
        debug_assert!(self.is_alive_edge(e));
        self.unlink(e.adj_source());
        self.unlink(e.adj_target());
        self.edges[e].alive = false;
        self.n_edges -= 1;
    }

    /// Deletes `v` together with all incident edges.
    pub fn del_node(&mut self, v: Node) {
        let incident: Vec<Edge> = self.adj_entries(v).map(AdjEntry::edge).collect();
        for e in incident {
            if self.is_alive_edge(e) {
                self.del_edge(e);
            }
        }
        self.nodes[v].alive = false;
        self.n_nodes -= 1;
    }

    /// Swaps source and target of `e`; both rotations keep their order.
    pub fn reverse_edge(&mut self, e: Edge) {
        let (s, t) = (self.source(e), self.target(e));
        if s == t {
            let order: Vec<AdjEntry> = self
                .adj_entries(s)
                .map(|a| if a.edge() == e { a.twin() } else { a })
                .collect();
            self.set_rotation(s, &order);
            return;
        }
        let (a_s, a_t) = (e.adj_source(), e.adj_target());
        let anchor_s = (self.degree(s) > 1).then(|| self.adj_prev[a_s]);
        let anchor_t = (self.degree(t) > 1).then(|| self.adj_prev[a_t]);
        let first_s = self.nodes[s].first == Some(a_s);
        let first_t = self.nodes[t].first == Some(a_t);

        self.unlink(a_s);
        self.unlink(a_t);
        self.edges[e].source = t;
        self.edges[e].target = s;
        self.link(a_s, t, anchor_t.map_or(EdgeEnd::Append(t), EdgeEnd::After));
        self.link(a_t, s, anchor_s.map_or(EdgeEnd::Append(s), EdgeEnd::After));
        if first_s {
            self.nodes[s].first = Some(a_t);
        }
        if first_t {
            self.nodes[t].first = Some(a_s);
        }
    }

    /// Moves the source end of `e` to the slot `to`.
    pub fn move_source(&mut self, e: Edge, to: EdgeEnd) {
        debug_assert!(to != EdgeEnd::After(e.adj_source()) && to != EdgeEnd::Before(e.adj_source()));
        let v = self.end_node(to);
        self.unlink(e.adj_source());
        self.edges[e].source = v;
        self.link(e.adj_source(), v, to);
    }

    /// Moves the target end of `e` to the slot `to`.
    pub fn move_target(&mut self, e: Edge, to: EdgeEnd) {
        debug_assert!(to != EdgeEnd::After(e.adj_target()) && to != EdgeEnd::Before(e.adj_target()));
        let v = self.end_node(to);
        self.unlink(e.adj_target());
        self.edges[e].target = v;
        self.link(e.adj_target(), v, to);
    }

    /// Moves the end `adj` (of whichever kind) to the slot `to`.
    pub fn move_adj(&mut self, adj: AdjEntry, to: EdgeEnd) {
        if adj.is_source() {
            self.move_source(adj.edge(), to);
        } else {
            self.move_target(adj.edge(), to);
        }
    }

    /// Reorders the rotation of one node: `adj` is moved behind `after`.
    pub fn move_adj_after(&mut self, adj: AdjEntry, after: AdjEntry) {
        debug_assert_eq!(self.node_of(adj), self.node_of(after));
        if adj == after {
            return;
        }
        let v = self.node_of(adj);
        self.unlink(adj);
        self.link(adj, v, EdgeEnd::After(after));
    }

    /// Contracts `e = (v, w)` into `v`. The rotation of `w`, read from the
    /// entry after `e`, takes the slot of `e` in the rotation of `v`, so faces
    /// not bounded by `e` are preserved. Returns `v`.
    pub fn contract(&mut self, e: Edge) -> Node {
        let (v, w) = (self.source(e), self.target(e));
        debug_assert_ne!(v, w, "cannot contract a self-loop");
        let a_v = e.adj_source();
        let a_w = e.adj_target();

        let mut moved = Vec::with_capacity(self.degree(w));
        let mut cur = self.adj_next[a_w];
        while cur != a_w {
            moved.push(cur);
            cur = self.adj_next[cur];
        }

        let mut anchor = a_v;
        for adj in moved {
            self.unlink(adj);
            if adj.is_source() {
                self.edges[adj.edge()].source = v;
            } else {
                self.edges[adj.edge()].target = v;
            }
            self.link(adj, v, EdgeEnd::After(anchor));
            anchor = adj;
        }

        self.unlink(a_v);
        self.unlink(a_w);
        self.edges[e].alive = false;
        self.n_edges -= 1;
        self.nodes[w].alive = false;
        self.n_nodes -= 1;
        v
    }

    /// Rewrites the rotation of `v`; `order` must be a permutation of the
    /// current entries of `v`.
    pub fn set_rotation(&mut self, v: Node, order: &[AdjEntry]) {
        debug_assert_eq!(order.len(), self.degree(v));
        debug_assert!(order.iter().all(|a| self.adj_node[*a] == v));
        let n = order.len();
        for (i, adj) in order.iter().enumerate() {
            self.adj_next[*adj] = order[(i + 1) % n];
            self.adj_prev[*adj] = order[(i + n - 1) % n];
        }
        self.nodes[v].first = order.first().copied();
    }

    /// Copies `nodes` and `edges` (whose endpoints must be among `nodes`)
    /// into a fresh graph, keeping the relative rotation order.
    pub fn copy_induced(&self, nodes: &[Node], edges: &[Edge]) -> InducedCopy {
        let mut graph = Graph::new();
        let mut node_map = NodeVec::filled(self.node_bound(), None);
        let mut edge_map = EdgeVec::filled(self.edge_bound(), None);

        for &v in nodes {
            node_map[v] = Some(graph.new_node());
        }
        for &e in edges {
            let (Some(s), Some(t)) = (node_map[self.source(e)], node_map[self.target(e)]) else {
                panic!("edge {e} leaves the copied node set");
            };
            edge_map[e] = Some(graph.new_edge(s, t));
        }
        for &v in nodes {
            let order: Vec<AdjEntry> = self
                .adj_entries(v)
                .filter_map(|a| {
                    edge_map[a.edge()].map(|c| {
                        if a.is_source() {
                            c.adj_source()
                        } else {
                            c.adj_target()
                        }
                    })
                })
                .collect();
            if let Some(c) = node_map[v] {
                graph.set_rotation(c, &order);
            }
        }

        InducedCopy {
            graph,
            node_map,
            edge_map,
        }
    }
}

/// Iterator over the rotation of a node.
#[derive(Clone)]
pub struct AdjIter<'a> {
    graph: &'a Graph,
    start: Option<AdjEntry>,
    current: Option<AdjEntry>,
}

impl Iterator for AdjIter<'_> {
    type Item = AdjEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.current?;
        let next = self.graph.adj_next[cur];
        self.current = if Some(next) == self.start {
            None
        } else {
            Some(next)
        };
        Some(cur)
    }
}

/// Connected components of a graph.
#[derive(Clone, Debug, Default)]
pub struct CcInfo {
    nodes: Vec<Vec<Node>>,
    edges: Vec<Vec<Edge>>,
    component: NodeVec<Option<usize>>,
}

impl CcInfo {
    /// Components are numbered in the order of their smallest node handle;
    /// nodes of a component are listed in breadth-first order.
    pub fn new(graph: &Graph) -> Self {
        let mut component = NodeVec::filled(graph.node_bound(), None);
        let mut seen: BitVec = BitVec::repeat(false, graph.node_bound());
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        for root in graph.nodes() {
            if seen[root.0] {
                continue;
            }
            let index = nodes.len();
            let mut cc_nodes = Vec::new();
            let mut cc_edges = Vec::new();
            let mut queue = VecDeque::from([root]);
            seen.set(root.0, true);
            while let Some(v) = queue.pop_front() {
                component[v] = Some(index);
                cc_nodes.push(v);
                for adj in graph.adj_entries(v) {
                    if adj.is_source() {
                        cc_edges.push(adj.edge());
                    }
                    let w = graph.node_of(adj.twin());
                    if !seen[w.0] {
                        seen.set(w.0, true);
                        queue.push_back(w);
                    }
                }
            }
            nodes.push(cc_nodes);
            edges.push(cc_edges);
        }

        CcInfo {
            nodes,
            edges,
            component,
        }
    }

    pub fn number_of_ccs(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self, cc: usize) -> &[Node] {
        &self.nodes[cc]
    }

    pub fn edges(&self, cc: usize) -> &[Edge] {
        &self.edges[cc]
    }

    pub fn component(&self, v: Node) -> Option<usize> {
        self.component.get(v).copied().flatten()
    }
}

#[cfg(test)]
mod tests;
