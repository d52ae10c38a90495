use crate::{
    error::ConsistencyError,
    graph::{Edge, EdgeVec, Graph, Node, NodeVec},
};

/// A copy with a one to one correspondence of nodes and edges. Nodes and
/// edges added without an original are dummies.
#[derive(Clone, Debug)]
pub struct GraphCopySimple<'a> {
    original: &'a Graph,
    graph: Graph,
    v_orig: NodeVec<Option<Node>>,
    e_orig: EdgeVec<Option<Edge>>,
    v_copy: NodeVec<Option<Node>>,
    e_copy: EdgeVec<Option<Edge>>,
}

impl<'a> GraphCopySimple<'a> {
    /// Copies all of `original`, keeping its rotations.
    pub fn new(original: &'a Graph) -> Self {
        let nodes: Vec<Node> = original.nodes().collect();
        let edges: Vec<Edge> = original.edges().collect();
        let induced = original.copy_induced(&nodes, &edges);

        let mut v_orig = NodeVec::filled(induced.graph.node_bound(), None);
        let mut e_orig = EdgeVec::filled(induced.graph.edge_bound(), None);
        for &v in &nodes {
            if let Some(c) = induced.node_map[v] {
                v_orig[c] = Some(v);
            }
        }
        for &e in &edges {
            if let Some(c) = induced.edge_map[e] {
                e_orig[c] = Some(e);
            }
        }

        GraphCopySimple {
            original,
            graph: induced.graph,
            v_orig,
            e_orig,
            v_copy: induced.node_map,
            e_copy: induced.edge_map,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn original_graph(&self) -> &'a Graph {
        self.original
    }

    pub fn copy(&self, v: Node) -> Option<Node> {
        self.v_copy.get(v).copied().flatten()
    }

    pub fn copy_edge(&self, e: Edge) -> Option<Edge> {
        self.e_copy.get(e).copied().flatten()
    }

    pub fn original(&self, v: Node) -> Option<Node> {
        self.v_orig.get(v).copied().flatten()
    }

    pub fn original_edge(&self, e: Edge) -> Option<Edge> {
        self.e_orig.get(e).copied().flatten()
    }

    pub fn is_dummy(&self, v: Node) -> bool {
        self.original(v).is_none()
    }

    pub fn is_dummy_edge(&self, e: Edge) -> bool {
        self.original_edge(e).is_none()
    }

    /// Adds a copy of the original node `orig`, which must not have one.
    pub fn new_node(&mut self, orig: Node) -> Node {
        debug_assert!(self.copy(orig).is_none(), "{orig} already has a copy");
        let v = self.new_dummy_node();
        self.v_orig[v] = Some(orig);
        self.v_copy.ensure(orig, None);
        self.v_copy[orig] = Some(v);
        v
    }

    pub fn new_dummy_node(&mut self) -> Node {
        let v = self.graph.new_node();
        self.v_orig.ensure(v, None);
        v
    }

    /// Adds a copy of the original edge `orig` between the copies of its
    /// endpoints, appended to both rotations.
    pub fn new_edge(&mut self, orig: Edge) -> Edge {
        debug_assert!(self.copy_edge(orig).is_none(), "{orig} already has a copy");
        let (Some(s), Some(t)) = (
            self.copy(self.original.source(orig)),
            self.copy(self.original.target(orig)),
        ) else {
            panic!("endpoints of {orig} are not copied");
        };
        let e = self.new_dummy_edge(s, t);
        self.e_orig[e] = Some(orig);
        self.e_copy.ensure(orig, None);
        self.e_copy[orig] = Some(e);
        e
    }

    pub fn new_dummy_edge(&mut self, v: Node, w: Node) -> Edge {
        let e = self.graph.new_edge(v, w);
        self.e_orig.ensure(e, None);
        e
    }

    pub fn del_edge(&mut self, e: Edge) {
        if let Some(orig) = self.e_orig[e].take() {
            self.e_copy[orig] = None;
        }
        self.graph.del_edge(e);
    }

    /// Deletes `v` and its incident edges.
    pub fn del_node(&mut self, v: Node) {
        let incident: Vec<Edge> = self.graph.adj_entries(v).map(|a| a.edge()).collect();
        for e in incident {
            if self.graph.is_alive_edge(e) {
                self.del_edge(e);
            }
        }
        if let Some(orig) = self.v_orig[v].take() {
            self.v_copy[orig] = None;
        }
        self.graph.del_node(v);
    }

    pub fn consistency_check(&self) -> Result<(), ConsistencyError> {
        for v in self.graph.nodes() {
            if let Some(orig) = self.original(v) {
                if self.copy(orig) != Some(v) {
                    return Err(ConsistencyError::NodeMap(v));
                }
            }
        }
        for v in self.original.nodes() {
            if let Some(c) = self.copy(v) {
                if !self.graph.is_alive_node(c) || self.original(c) != Some(v) {
                    return Err(ConsistencyError::Expansion(v));
                }
            }
        }
        for e in self.graph.edges() {
            let Some(orig) = self.original_edge(e) else {
                continue;
            };
            if self.copy_edge(orig) != Some(e) {
                return Err(ConsistencyError::EdgeRole(e));
            }
            if self.original(self.graph.source(e)) != Some(self.original.source(orig))
                || self.original(self.graph.target(e)) != Some(self.original.target(orig))
            {
                return Err(ConsistencyError::ChainEndpoints(orig));
            }
        }
        Ok(())
    }
}
