//! # Planarized copies with node expansion
//!
//! [`PlanRepExpansion`] generalizes [`crate::copy::chain::GraphCopy`]: an
//! original node may be represented by several copy nodes, its *expansion*,
//! joined by paths of copy edges called *node splits*. Every copy edge lies
//! on exactly one path, either the chain of an original edge or the path of a
//! node split, which is what [`PathOwner`] records.
//!
//! The copy holds one connected component of the original at a time; call
//! [`PlanRepExpansion::init_cc`] to load (or reload) a component.
//!
//! ## Life of a node split
//!
//! A split is created empty ([`PlanRepExpansion::create_node_split`]) or by
//! one of the edits that grow expansions ([`PlanRepExpansion::enlarge_split`],
//! [`PlanRepExpansion::split_node_split`],
//! [`PlanRepExpansion::convert_dummy`], [`PlanRepExpansion::separate_dummy`],
//! a [`Crossing::Node`] in [`PlanRepExpansion::insert_edge_path`]). It is
//! shortened by [`PlanRepExpansion::unsplit_expand_node`] and, once it is a
//! single edge, removed by [`PlanRepExpansion::contract_split`]. Nothing is
//! contracted automatically: callers batch their contractions.
//!
//! Preconditions are checked with `debug_assert!`; breaking one is a bug in
//! the caller. Set [`ExpansionConfig::verify_edits`] to run
//! [`PlanRepExpansion::consistency_check`] after every edit in debug builds.

use derive_more::From;
use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::{
    config::ExpansionConfig,
    copy::{PlanarizedCopy, Unthreaded},
    embedding::{CombinatorialEmbedding, Face},
    error::ConsistencyError,
    graph::{AdjEntry, CcInfo, Edge, EdgeEnd, EdgeVec, Graph, Node, NodeVec},
    list::{List, ListIter, ListPool, ListPos},
    planarity::planar_embed,
};

crate::define_indexed_vec!(
    /// Handle of a node split. Handles of removed splits are not reused.
    pub struct NodeSplitId;
    /// Dense per-split storage.
    pub struct SplitVec;
);

/// The path a copy edge belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, From)]
pub enum PathOwner {
    /// The chain of an original edge.
    Chain(Edge),
    Split(NodeSplitId),
}

/// Where an inserted path starts or ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathEnd {
    Node(Node),
    /// A new copy subdividing this node split edge, see
    /// [`PlanRepExpansion::split_node_split`].
    SplitEdge(Edge),
}

/// One step of a non-embedded path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Crossing {
    /// Cross the edge of the entry, from its left face to its right face.
    Edge(AdjEntry),
    /// Pass through a copy of a splittable node. The entries of `left`, a
    /// cyclically consecutive block of its rotation, move to a new copy; the
    /// path crosses the new split edge joining both copies. `right` holds the
    /// remaining entries.
    Node {
        left: Vec<AdjEntry>,
        right: Vec<AdjEntry>,
    },
}

/// What [`PlanRepExpansion::remove_edge_path`] leaves behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovedPath {
    pub old_source: Option<Node>,
    pub old_target: Option<Node>,
    /// Faces that were joined, when embedded.
    pub new_faces: Vec<Face>,
    /// Former ends that are copies of splittable nodes and carry no chain
    /// edge anymore; they can be merged into their expansion.
    pub merged_nodes: Vec<Node>,
}

#[derive(Clone, Debug)]
pub struct NodeSplit {
    orig: Node,
    path: List,
    pos: ListPos,
}

impl NodeSplit {
    /// The original node whose expansion this split belongs to.
    pub fn original(&self) -> Node {
        self.orig
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct PlanRepExpansion<'a> {
    original: &'a Graph,
    config: ExpansionConfig,
    cc: CcInfo,
    current_cc: Option<usize>,
    graph: Graph,

    v_orig: NodeVec<Option<Node>>,
    v_pos: NodeVec<Option<ListPos>>,
    expansions: NodeVec<List>,
    node_pool: ListPool<Node>,

    e_role: EdgeVec<Option<PathOwner>>,
    e_pos: EdgeVec<Option<ListPos>>,
    chains: EdgeVec<List>,
    edge_pool: ListPool<Edge>,

    splits: SplitVec<Option<NodeSplit>>,
    split_order: List,
    split_pool: ListPool<NodeSplitId>,

    splittable_orig: NodeVec<bool>,
    splittable: NodeVec<bool>,
}

impl<'a> PlanRepExpansion<'a> {
    /// A copy of `original` in which nodes of degree at least
    /// [`ExpansionConfig::min_split_degree`] are splittable. No component is
    /// loaded yet.
    pub fn new(original: &'a Graph) -> Self {
        Self::with_config(original, ExpansionConfig::default())
    }

    pub fn with_config(original: &'a Graph, config: ExpansionConfig) -> Self {
        let mut splittable = NodeVec::filled(original.node_bound(), false);
        for v in original.nodes() {
            splittable[v] = original.degree(v) >= config.min_split_degree;
        }
        Self::build(original, config, splittable)
    }

    /// A copy of `original` in which exactly `nodes` are splittable.
    pub fn with_splittable(original: &'a Graph, nodes: &[Node]) -> Self {
        let mut splittable = NodeVec::filled(original.node_bound(), false);
        for &v in nodes {
            splittable[v] = true;
        }
        Self::build(original, ExpansionConfig::default(), splittable)
    }

    fn build(original: &'a Graph, config: ExpansionConfig, splittable_orig: NodeVec<bool>) -> Self {
        let cc = CcInfo::new(original);
        debug!(
            nodes = original.number_of_nodes(),
            edges = original.number_of_edges(),
            components = cc.number_of_ccs(),
            "prepared expansion"
        );
        PlanRepExpansion {
            original,
            config,
            cc,
            current_cc: None,
            graph: Graph::new(),
            v_orig: NodeVec::new(),
            v_pos: NodeVec::new(),
            expansions: NodeVec::filled(original.node_bound(), List::new()),
            node_pool: ListPool::new(),
            e_role: EdgeVec::new(),
            e_pos: EdgeVec::new(),
            chains: EdgeVec::filled(original.edge_bound(), List::new()),
            edge_pool: ListPool::new(),
            splits: SplitVec::new(),
            split_order: List::new(),
            split_pool: ListPool::new(),
            splittable_orig,
            splittable: NodeVec::new(),
        }
    }

    /// Replaces the copy by a fresh copy of component `cc`. All node splits
    /// are dropped.
    pub fn init_cc(&mut self, cc: usize) {
        debug_assert!(cc < self.cc.number_of_ccs(), "there is no component {cc}");
        let nodes = self.cc.nodes(cc).to_vec();
        let edges = self.cc.edges(cc).to_vec();
        let induced = self.original.copy_induced(&nodes, &edges);

        self.graph = induced.graph;
        self.v_orig = NodeVec::filled(self.graph.node_bound(), None);
        self.v_pos = NodeVec::filled(self.graph.node_bound(), None);
        self.splittable = NodeVec::filled(self.graph.node_bound(), false);
        self.expansions = NodeVec::filled(self.original.node_bound(), List::new());
        self.node_pool = ListPool::new();
        self.e_role = EdgeVec::filled(self.graph.edge_bound(), None);
        self.e_pos = EdgeVec::filled(self.graph.edge_bound(), None);
        self.chains = EdgeVec::filled(self.original.edge_bound(), List::new());
        self.edge_pool = ListPool::new();
        self.splits = SplitVec::new();
        self.split_order = List::new();
        self.split_pool = ListPool::new();

        for &v in &nodes {
            if let Some(c) = induced.node_map[v] {
                self.add_to_expansion(c, v);
            }
        }
        for &e in &edges {
            if let Some(c) = induced.edge_map[e] {
                self.push_path_edge(e.into(), c);
            }
        }
        self.current_cc = Some(cc);
        debug!(
            cc,
            nodes = self.graph.number_of_nodes(),
            edges = self.graph.number_of_edges(),
            "initialized component"
        );
    }

    fn track_node(&mut self, v: Node) {
        self.v_orig.ensure(v, None);
        self.v_pos.ensure(v, None);
        self.splittable.ensure(v, false);
    }

    fn track_edge(&mut self, e: Edge) {
        self.e_role.ensure(e, None);
        self.e_pos.ensure(e, None);
    }

    fn add_to_expansion(&mut self, v: Node, orig: Node) {
        self.track_node(v);
        self.v_orig[v] = Some(orig);
        self.v_pos[v] = Some(self.node_pool.push_back(&mut self.expansions[orig], v));
        self.splittable[v] = self.splittable_orig[orig];
    }

    fn remove_from_expansion(&mut self, v: Node) {
        if let (Some(orig), Some(pos)) = (self.v_orig[v].take(), self.v_pos[v].take()) {
            self.node_pool.remove(&mut self.expansions[orig], pos);
        }
        self.splittable[v] = false;
    }

    fn new_copy_node(&mut self, orig: Node) -> Node {
        let v = self.graph.new_node();
        self.add_to_expansion(v, orig);
        v
    }

    fn verify(&self, op: &str) {
        if cfg!(debug_assertions) && self.config.verify_edits {
            if let Err(err) = self.consistency_check() {
                warn!(op, %err, "expansion is inconsistent");
            }
        }
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

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    pub fn number_of_ccs(&self) -> usize {
        self.cc.number_of_ccs()
    }

    pub fn current_cc(&self) -> Option<usize> {
        self.current_cc
    }

    pub fn nodes_in_cc(&self, cc: usize) -> &[Node] {
        self.cc.nodes(cc)
    }

    /// Number of original nodes in the loaded component.
    pub fn number_of_nodes_in_cc(&self) -> usize {
        self.current_cc.map_or(0, |cc| self.cc.nodes(cc).len())
    }

    pub fn original(&self, v: Node) -> Option<Node> {
        self.v_orig.get(v).copied().flatten()
    }

    /// The original edge whose chain contains `e`.
    pub fn original_edge(&self, e: Edge) -> Option<Edge> {
        match self.path_owner(e) {
            Some(PathOwner::Chain(orig)) => Some(orig),
            _ => None,
        }
    }

    pub fn node_split_of(&self, e: Edge) -> Option<NodeSplitId> {
        match self.path_owner(e) {
            Some(PathOwner::Split(ns)) => Some(ns),
            _ => None,
        }
    }

    pub fn path_owner(&self, e: Edge) -> Option<PathOwner> {
        self.e_role.get(e).copied().flatten()
    }

    pub fn is_dummy(&self, v: Node) -> bool {
        self.original(v).is_none()
    }

    /// First node of the expansion of `v`.
    pub fn copy(&self, v: Node) -> Option<Node> {
        self.node_pool.front(&self.expansions[v])
    }

    pub fn expansion(&self, v: Node) -> ListIter<'_, Node> {
        self.node_pool.iter(&self.expansions[v])
    }

    /// First edge of the chain of `e`.
    pub fn copy_edge(&self, e: Edge) -> Option<Edge> {
        self.edge_pool.front(&self.chains[e])
    }

    pub fn chain(&self, e: Edge) -> ListIter<'_, Edge> {
        self.edge_pool.iter(&self.chains[e])
    }

    pub fn path(&self, owner: PathOwner) -> ListIter<'_, Edge> {
        self.edge_pool.iter(self.path_list(owner))
    }

    pub fn splittable(&self, v: Node) -> bool {
        self.splittable.get(v).copied().unwrap_or(false)
    }

    pub fn splittable_orig(&self, v: Node) -> bool {
        self.splittable_orig.get(v).copied().unwrap_or(false)
    }

    /// Panics if `ns` was removed.
    pub fn node_split(&self, ns: NodeSplitId) -> &NodeSplit {
        match self.splits.get(ns).and_then(Option::as_ref) {
            Some(split) => split,
            None => panic!("node split {ns} was removed"),
        }
    }

    /// Live node splits in creation order.
    pub fn node_splits(&self) -> ListIter<'_, NodeSplitId> {
        self.split_pool.iter(&self.split_order)
    }

    pub fn number_of_node_splits(&self) -> usize {
        self.split_order.len()
    }

    /// Original nodes with more than one copy.
    pub fn number_of_splitted_nodes(&self) -> usize {
        self.original
            .nodes()
            .filter(|&v| self.expansions[v].len() > 1)
            .count()
    }

    /// Dummies of degree four through which two different paths run
    /// straight.
    pub fn compute_number_of_crossings(&self) -> usize {
        self.graph
            .nodes()
            .filter(|&v| self.crossing_entries(v).is_some())
            .count()
    }

    fn crossing_entries(&self, v: Node) -> Option<[AdjEntry; 4]> {
        if !self.is_dummy(v) || self.graph.degree(v) != 4 {
            return None;
        }
        let (a0, a1, a2, a3) = self.graph.adj_entries(v).collect_tuple()?;
        let owner = |adj: AdjEntry| self.path_owner(adj.edge());
        match (owner(a0), owner(a1), owner(a2), owner(a3)) {
            (Some(p), Some(q), Some(p2), Some(q2)) if p == p2 && q == q2 && p != q => {
                Some([a0, a1, a2, a3])
            }
            _ => None,
        }
    }

    fn path_list(&self, owner: PathOwner) -> &List {
        match owner {
            PathOwner::Chain(e) => &self.chains[e],
            PathOwner::Split(ns) => &self.node_split(ns).path,
        }
    }

    fn path_parts(&mut self, owner: PathOwner) -> (&mut ListPool<Edge>, &mut List) {
        let list = match owner {
            PathOwner::Chain(e) => &mut self.chains[e],
            PathOwner::Split(ns) => match self.splits[ns].as_mut() {
                Some(split) => &mut split.path,
                None => panic!("node split {ns} was removed"),
            },
        };
        (&mut self.edge_pool, list)
    }

    /// The copy node the path of `adj` ends at, walking away from the node of
    /// `adj`.
    fn path_end_from(&self, adj: AdjEntry) -> Option<Node> {
        let list = self.path_list(self.path_owner(adj.edge())?);
        if adj.is_source() {
            self.edge_pool.back(list).map(|e| self.graph.target(e))
        } else {
            self.edge_pool.front(list).map(|e| self.graph.source(e))
        }
    }

    fn has_chain_edge(&self, v: Node) -> bool {
        self.graph
            .adj_entries(v)
            .any(|adj| matches!(self.path_owner(adj.edge()), Some(PathOwner::Chain(_))))
    }

    // --------------------------------------------------------------------------------------------
    // Node splits
    // --------------------------------------------------------------------------------------------

    /// A new empty split in the expansion of `orig`.
    pub fn create_node_split(&mut self, orig: Node) -> NodeSplitId {
        let ns = NodeSplitId(self.splits.len());
        let pos = self.split_pool.push_back(&mut self.split_order, ns);
        self.splits.push(Some(NodeSplit {
            orig,
            path: List::new(),
            pos,
        }));
        ns
    }

    /// Drops a split whose path is empty.
    pub fn discard_node_split(&mut self, ns: NodeSplitId) {
        debug_assert!(self.node_split(ns).is_empty(), "node split {ns} still has edges");
        self.remove_split(ns);
    }

    fn remove_split(&mut self, ns: NodeSplitId) {
        if let Some(split) = self.splits[ns].take() {
            self.split_pool.remove(&mut self.split_order, split.pos);
        }
    }

    /// Appends the edges of `list` to the path of `ns`.
    fn adopt_path(&mut self, ns: NodeSplitId, list: List) {
        let moved: Vec<Edge> = self.edge_pool.to_vec(&list);
        for e in moved {
            self.e_role[e] = Some(PathOwner::Split(ns));
        }
        let (pool, path) = self.path_parts(PathOwner::Split(ns));
        pool.append(path, list);
    }

    fn insert_path_edge_after(&mut self, after: Edge, e: Edge) {
        self.track_edge(e);
        if let (Some(owner), Some(pos)) = (self.e_role[after], self.e_pos[after]) {
            let (pool, list) = self.path_parts(owner);
            let new_pos = pool.insert_after(list, pos, e);
            self.e_role[e] = Some(owner);
            self.e_pos[e] = Some(new_pos);
        }
    }

    fn push_front_path_edge(&mut self, owner: PathOwner, e: Edge) {
        self.track_edge(e);
        let (pool, list) = self.path_parts(owner);
        let pos = pool.push_front(list, e);
        self.e_role[e] = Some(owner);
        self.e_pos[e] = Some(pos);
    }

    fn reverse(&mut self, e: Edge, emb: Option<&mut CombinatorialEmbedding>) {
        match emb {
            Some(emb) => emb.reverse_edge(&mut self.graph, e),
            None => self.graph.reverse_edge(e),
        }
    }

    // --------------------------------------------------------------------------------------------
    // Elementary edits
    // --------------------------------------------------------------------------------------------

    /// Subdivides `e` by a dummy; the rear half follows `e` on its path.
    pub fn split(&mut self, e: Edge) -> Edge {
        let e2 = self.split_in_place(e, None);
        self.verify("split");
        e2
    }

    pub fn split_embedded(&mut self, emb: &mut CombinatorialEmbedding, e: Edge) -> Edge {
        let e2 = self.split_in_place(e, Some(emb));
        self.verify("split");
        e2
    }

    /// Inverse of [`PlanRepExpansion::split`].
    pub fn unsplit(&mut self, e_in: Edge, e_out: Edge) {
        self.unsplit_in_place(e_in, e_out, None);
        self.verify("unsplit");
    }

    pub fn unsplit_embedded(&mut self, emb: &mut CombinatorialEmbedding, e_in: Edge, e_out: Edge) {
        self.unsplit_in_place(e_in, e_out, Some(emb));
        self.verify("unsplit");
    }

    /// Deletes `e` and drops it from its path, which may leave the path
    /// broken until the caller repairs it.
    pub fn del_edge(&mut self, e: Edge) {
        if let Some(owner) = self.path_owner(e) {
            self.forget_path_edge(owner, e);
        }
        self.graph.del_edge(e);
    }

    // --------------------------------------------------------------------------------------------
    // Paths
    // --------------------------------------------------------------------------------------------

    /// Routes the empty path of `owner` from `start` to `end` through
    /// `crossings`. New path edges are appended to the rotations at the ends.
    pub fn insert_edge_path(
        &mut self,
        owner: PathOwner,
        start: PathEnd,
        end: PathEnd,
        crossings: &[Crossing],
    ) {
        debug_assert!(self.path_list(owner).is_empty(), "{owner:?} is already routed");
        let start = self.resolve_end(start);
        let end = self.resolve_end(end);
        let mut crossed = Vec::with_capacity(crossings.len());
        for crossing in crossings {
            match crossing {
                Crossing::Edge(adj) => crossed.push(*adj),
                Crossing::Node { left, right } => {
                    crossed.push(self.expand_crossed_node(left, right).adj_source())
                }
            }
        }
        self.thread_path(
            owner,
            None,
            EdgeEnd::Append(start),
            &crossed,
            EdgeEnd::Append(end),
        );
        trace!(?owner, %start, %end, "inserted path");
        self.verify("insert_edge_path");
    }

    fn resolve_end(&mut self, end: PathEnd) -> Node {
        match end {
            PathEnd::Node(v) => v,
            PathEnd::SplitEdge(e) => {
                let e2 = self.split_node_split(e);
                self.graph.source(e2)
            }
        }
    }

    /// Moves the entries of `left` to a new copy of their node, joined to the
    /// old copy by a new one edge split. Returns that split edge, directed
    /// from the old copy to the new one.
    fn expand_crossed_node(&mut self, left: &[AdjEntry], right: &[AdjEntry]) -> Edge {
        let Some(&first) = left.first() else {
            panic!("a node crossing needs entries on its left side");
        };
        let u = self.graph.node_of(first);
        let Some(orig) = self.original(u) else {
            panic!("node crossings pass through copy nodes, {u} is a dummy");
        };
        debug_assert!(self.splittable(u), "{u} is not splittable");
        debug_assert_eq!(left.len() + right.len(), self.graph.degree(u));

        let anchor = (!right.is_empty()).then(|| self.graph.cyclic_pred(first));
        debug_assert!(anchor.map_or(true, |a| right.contains(&a)), "left side is not consecutive");
        let w = self.new_copy_node(orig);
        for &adj in left {
            self.graph.move_adj(adj, EdgeEnd::Append(w));
        }
        let s = self
            .graph
            .new_edge_placed(anchor.map_or(EdgeEnd::Append(u), EdgeEnd::After), EdgeEnd::Append(w));
        let ns = self.create_node_split(orig);
        self.push_path_edge(PathOwner::Split(ns), s);
        trace!(%u, new = %w, split = %ns, "expanded crossed node");
        s
    }

    /// Routes the empty path of `owner` through the embedding. `crossed`
    /// starts with an entry at the first node, behind which the path leaves,
    /// ends with an entry at the last node, and lists the crossed edges in
    /// between.
    pub fn insert_edge_path_embedded(
        &mut self,
        owner: PathOwner,
        emb: &mut CombinatorialEmbedding,
        crossed: &[AdjEntry],
    ) {
        debug_assert!(self.path_list(owner).is_empty(), "{owner:?} is already routed");
        let [first, middle @ .., last] = crossed else {
            panic!("an embedded path needs entries at both ends");
        };
        self.thread_path(
            owner,
            Some(emb),
            EdgeEnd::After(*first),
            middle,
            EdgeEnd::After(*last),
        );
        trace!(?owner, crossings = middle.len(), "inserted embedded path");
        self.verify("insert_edge_path_embedded");
    }

    /// Deletes the path of `owner`; crossing dummies left between two halves
    /// of one path are merged away. An emptied node split stays until it is discarded.
    pub fn remove_edge_path(&mut self, owner: PathOwner) -> RemovedPath {
        self.remove_path(owner, None)
    }

    pub fn remove_edge_path_embedded(
        &mut self,
        emb: &mut CombinatorialEmbedding,
        owner: PathOwner,
    ) -> RemovedPath {
        self.remove_path(owner, Some(emb))
    }

    fn remove_path(
        &mut self,
        owner: PathOwner,
        emb: Option<&mut CombinatorialEmbedding>,
    ) -> RemovedPath {
        let Unthreaded {
            source,
            target,
            faces,
        } = self.unthread_path(owner, emb);
        let merged_nodes = [source, target]
            .into_iter()
            .flatten()
            .unique()
            .filter(|&v| {
                self.graph.is_alive_node(v)
                    && !self.is_dummy(v)
                    && self.splittable(v)
                    && !self.has_chain_edge(v)
            })
            .collect();
        self.verify("remove_edge_path");
        RemovedPath {
            old_source: source,
            old_target: target,
            new_faces: faces,
            merged_nodes,
        }
    }

    // --------------------------------------------------------------------------------------------
    // Growing and shrinking expansions
    // --------------------------------------------------------------------------------------------

    /// Contracts the single edge of `ns`, merging its two copies into the
    /// source copy, and removes the split.
    pub fn contract_split(&mut self, ns: NodeSplitId) {
        self.contract(ns, None);
    }

    pub fn contract_split_embedded(&mut self, emb: &mut CombinatorialEmbedding, ns: NodeSplitId) {
        self.contract(ns, Some(emb));
    }

    fn contract(&mut self, ns: NodeSplitId, emb: Option<&mut CombinatorialEmbedding>) {
        let split = self.node_split(ns);
        debug_assert_eq!(split.len(), 1, "only node splits of one edge can be contracted");
        let Some(e) = self.edge_pool.front(&split.path) else {
            panic!("node split {ns} is empty");
        };
        let w = self.graph.target(e);
        self.forget_path_edge(PathOwner::Split(ns), e);
        let v = match emb {
            Some(emb) => emb.contract(&mut self.graph, e),
            None => self.graph.contract(e),
        };
        self.remove_from_expansion(w);
        self.remove_split(ns);
        debug!(split = %ns, kept = %v, merged = %w, "contracted node split");
        self.verify("contract_split");
    }

    /// Merges the split edge `e_contract` and the chain edge `e_expand`
    /// through their common degree two copy `u`. The merged edge takes the
    /// place of `e_expand` in its chain and is returned; `u` leaves the
    /// expansion and an emptied split is removed.
    pub fn unsplit_expand_node(&mut self, u: Node, e_contract: Edge, e_expand: Edge) -> Edge {
        self.unsplit_expand(u, e_contract, e_expand, None)
    }

    pub fn unsplit_expand_node_embedded(
        &mut self,
        emb: &mut CombinatorialEmbedding,
        u: Node,
        e_contract: Edge,
        e_expand: Edge,
    ) -> Edge {
        self.unsplit_expand(u, e_contract, e_expand, Some(emb))
    }

    fn unsplit_expand(
        &mut self,
        u: Node,
        e_contract: Edge,
        e_expand: Edge,
        mut emb: Option<&mut CombinatorialEmbedding>,
    ) -> Edge {
        debug_assert_eq!(self.graph.degree(u), 2, "{u} is not a subdivision node");
        let Some(PathOwner::Split(ns)) = self.path_owner(e_contract) else {
            panic!("{e_contract} is not a node split edge");
        };
        let Some(chain @ PathOwner::Chain(_)) = self.path_owner(e_expand) else {
            panic!("{e_expand} is not a chain edge");
        };
        self.forget_path_edge(PathOwner::Split(ns), e_contract);

        let kept = if self.graph.target(e_expand) == u {
            if self.graph.source(e_contract) != u {
                self.reverse(e_contract, emb.as_deref_mut());
            }
            match emb {
                Some(emb) => emb.unsplit(&mut self.graph, e_expand, e_contract),
                None => self.graph.unsplit(e_expand, e_contract),
            }
            e_expand
        } else {
            if self.graph.target(e_contract) != u {
                self.reverse(e_contract, emb.as_deref_mut());
            }
            let pos = self.e_pos[e_expand].take();
            self.e_role[e_expand] = None;
            match emb {
                Some(emb) => emb.unsplit(&mut self.graph, e_contract, e_expand),
                None => self.graph.unsplit(e_contract, e_expand),
            }
            if let Some(pos) = pos {
                self.edge_pool.set(pos, e_contract);
            }
            self.e_role[e_contract] = Some(chain);
            self.e_pos[e_contract] = pos;
            e_contract
        };

        self.remove_from_expansion(u);
        if self.node_split(ns).is_empty() {
            self.remove_split(ns);
        }
        trace!(%u, %kept, split = %ns, "unsplit expanded node");
        self.verify("unsplit_expand_node");
        kept
    }

    /// Subdivides the chain edge `e` at the copy `v` of a splittable node. The
    /// new node becomes another copy, the chain now ends there, and the edge
    /// between it and `v` joins a node split: the split ending at `v` if it
    /// is the only split edge at `v`, a new one otherwise. Returns the split
    /// edge.
    pub fn enlarge_split(&mut self, v: Node, e: Edge) -> Edge {
        self.enlarge(v, e, None)
    }

    pub fn enlarge_split_embedded(
        &mut self,
        emb: &mut CombinatorialEmbedding,
        v: Node,
        e: Edge,
    ) -> Edge {
        self.enlarge(v, e, Some(emb))
    }

    fn enlarge(&mut self, v: Node, e: Edge, mut emb: Option<&mut CombinatorialEmbedding>) -> Edge {
        let Some(orig) = self.original(v) else {
            panic!("{v} is a dummy");
        };
        debug_assert!(self.splittable(v), "{v} is not splittable");
        debug_assert!(!self.graph.is_self_loop(e));
        let Some(chain @ PathOwner::Chain(_)) = self.path_owner(e) else {
            panic!("{e} is not a chain edge");
        };
        let leaves_v = self.graph.source(e) == v;
        debug_assert!(leaves_v || self.graph.target(e) == v, "{e} does not end at {v}");

        let e2 = self.split_in_place(e, emb.as_deref_mut());
        let u = self.graph.target(e);
        self.add_to_expansion(u, orig);
        let s = if leaves_v { e } else { e2 };
        self.forget_path_edge(chain, s);

        let others: Vec<NodeSplitId> = self
            .graph
            .adj_entries(v)
            .filter(|adj| adj.edge() != s)
            .filter_map(|adj| self.node_split_of(adj.edge()))
            .collect();
        match others[..] {
            [ns] if self.split_source(ns) == Some(v) || self.split_target(ns) == Some(v) => {
                if self.split_target(ns) == Some(v) {
                    if self.graph.source(s) != v {
                        self.reverse(s, emb.as_deref_mut());
                    }
                    self.push_path_edge(PathOwner::Split(ns), s);
                } else {
                    if self.graph.target(s) != v {
                        self.reverse(s, emb.as_deref_mut());
                    }
                    self.push_front_path_edge(PathOwner::Split(ns), s);
                }
                trace!(%v, new = %u, split = %ns, "extended node split");
            }
            _ => {
                if self.graph.source(s) != v {
                    self.reverse(s, emb.as_deref_mut());
                }
                let ns = self.create_node_split(orig);
                self.push_path_edge(PathOwner::Split(ns), s);
                trace!(%v, new = %u, split = %ns, "started node split");
            }
        }
        self.verify("enlarge_split");
        s
    }

    fn split_source(&self, ns: NodeSplitId) -> Option<Node> {
        self.edge_pool
            .front(&self.node_split(ns).path)
            .map(|e| self.graph.source(e))
    }

    fn split_target(&self, ns: NodeSplitId) -> Option<Node> {
        self.edge_pool
            .back(&self.node_split(ns).path)
            .map(|e| self.graph.target(e))
    }

    /// Subdivides the split edge `e` by a new copy, cutting its split in two
    /// there. Returns the new edge, which starts at the new copy.
    pub fn split_node_split(&mut self, e: Edge) -> Edge {
        self.split_split(e, None)
    }

    pub fn split_node_split_embedded(&mut self, emb: &mut CombinatorialEmbedding, e: Edge) -> Edge {
        self.split_split(e, Some(emb))
    }

    fn split_split(&mut self, e: Edge, emb: Option<&mut CombinatorialEmbedding>) -> Edge {
        let Some(ns) = self.node_split_of(e) else {
            panic!("{e} is not a node split edge");
        };
        let orig = self.node_split(ns).original();
        let e2 = self.split_in_place(e, emb);
        let u = self.graph.source(e2);
        self.convert_dummy(u, orig, None);
        e2
    }

    /// Deletes the self-loop `e`. A dummy left with one incoming and one
    /// outgoing edge of the same path is merged away.
    pub fn remove_self_loop(&mut self, e: Edge) {
        self.remove_loop(e, None);
    }

    pub fn remove_self_loop_embedded(&mut self, emb: &mut CombinatorialEmbedding, e: Edge) {
        self.remove_loop(e, Some(emb));
    }

    fn remove_loop(&mut self, e: Edge, mut emb: Option<&mut CombinatorialEmbedding>) {
        debug_assert!(self.graph.is_self_loop(e), "{e} is not a self-loop");
        let u = self.graph.source(e);
        if let Some(owner) = self.path_owner(e) {
            self.forget_path_edge(owner, e);
        }
        match emb.as_deref_mut() {
            Some(emb) => {
                emb.join_faces(&mut self.graph, e);
            }
            None => self.graph.del_edge(e),
        }

        if self.is_dummy(u) && self.graph.indeg(u) == 1 && self.graph.outdeg(u) == 1 {
            let (mut e_in, mut e_out) = (None, None);
            for adj in self.graph.adj_entries(u) {
                if adj.is_source() {
                    e_out = Some(adj.edge());
                } else {
                    e_in = Some(adj.edge());
                }
            }
            if let (Some(e_in), Some(e_out)) = (e_in, e_out) {
                if self.path_owner(e_in).is_some() && self.path_owner(e_in) == self.path_owner(e_out) {
                    self.unsplit_in_place(e_in, e_out, emb);
                }
            }
        }
        trace!(%e, at = %u, "removed self-loop");
        self.verify("remove_self_loop");
    }

    /// Turns the dummy `u` into a copy of `orig`. Every path running through
    /// `u` is cut there; the part on the side of a copy of `orig` becomes a
    /// node split. The first cut fills `reuse` if that split is empty.
    /// Returns the split of the first cut, or `reuse` if nothing was cut.
    pub fn convert_dummy(
        &mut self,
        u: Node,
        orig: Node,
        reuse: Option<NodeSplitId>,
    ) -> Option<NodeSplitId> {
        debug_assert!(self.is_dummy(u), "{u} is already a copy");
        debug_assert!(self.splittable_orig(orig), "{orig} is not splittable");
        self.add_to_expansion(u, orig);

        let through: Vec<(PathOwner, Edge)> = self
            .graph
            .adj_entries(u)
            .filter(|adj| !adj.is_source())
            .filter_map(|adj| {
                let e_in = adj.edge();
                let owner = self.path_owner(e_in)?;
                let next = self.edge_pool.next(self.e_pos[e_in]?)?;
                (self.graph.source(self.edge_pool.get(next)) == u).then_some((owner, e_in))
            })
            .collect();

        let mut spare = reuse;
        let mut first_cut = None;
        for (owner, e_in) in through {
            let Some(pos) = self.e_pos[e_in] else {
                continue;
            };
            let toward_target = match owner {
                PathOwner::Split(ns) => {
                    debug_assert_eq!(self.node_split(ns).original(), orig);
                    true
                }
                PathOwner::Chain(e) if self.original.target(e) == orig => true,
                PathOwner::Chain(e) => {
                    debug_assert_eq!(
                        self.original.source(e),
                        orig,
                        "chain of {e} passes a copy of {orig} without ending at one"
                    );
                    false
                }
            };
            let cut = {
                let (pool, list) = self.path_parts(owner);
                let rest = pool.split_after(list, pos);
                if toward_target {
                    rest
                } else {
                    std::mem::replace(list, rest)
                }
            };
            let ns = match spare.take() {
                Some(ns) if self.node_split(ns).is_empty() => ns,
                _ => self.create_node_split(orig),
            };
            self.adopt_path(ns, cut);
            first_cut.get_or_insert(ns);
        }
        trace!(%u, %orig, "converted dummy");
        self.verify("convert_dummy");
        first_cut.or(reuse)
    }

    /// Moves the consecutive entries `adj1` and `adj2 = succ(adj1)` of a
    /// dummy `u` to a new copy `w` of the original of `straight`. The parts of
    /// their paths beyond `w` become node splits, and `u` and `w` are joined
    /// by a new one edge split (from `w` if `is_src`), whose edge is returned.
    ///
    /// The paths still ending at `u` are left dangling; finish with
    /// [`PlanRepExpansion::convert_dummy`] on `u`.
    pub fn separate_dummy(
        &mut self,
        adj1: AdjEntry,
        adj2: AdjEntry,
        straight: Node,
        is_src: bool,
    ) -> Edge {
        let u = self.graph.node_of(adj1);
        debug_assert_eq!(self.graph.node_of(adj2), u);
        debug_assert!(self.is_dummy(u), "{u} is not a dummy");
        let Some(orig) = self.original(straight) else {
            panic!("{straight} is not a copy node");
        };

        for adj in [adj1, adj2] {
            let e = adj.edge();
            let (Some(owner), Some(pos)) = (self.path_owner(e), self.e_pos[e]) else {
                panic!("{e} does not lie on a path");
            };
            let detached = {
                let (pool, list) = self.path_parts(owner);
                if adj.is_source() {
                    let front = pool.split_off_before(list, pos);
                    std::mem::replace(list, front)
                } else {
                    let rest = pool.split_after(list, pos);
                    std::mem::replace(list, rest)
                }
            };
            let ns = self.create_node_split(orig);
            self.adopt_path(ns, detached);
        }

        let mut anchor = self.graph.cyclic_pred(adj1);
        if anchor == adj2 {
            anchor = self.graph.cyclic_pred(adj2);
        }
        let at_u = if anchor == adj1 || anchor == adj2 {
            EdgeEnd::Append(u)
        } else {
            EdgeEnd::After(anchor)
        };

        let w = self.new_copy_node(orig);
        self.graph.move_adj(adj1, EdgeEnd::Append(w));
        self.graph.move_adj(adj2, EdgeEnd::Append(w));
        let s = if is_src {
            self.graph.new_edge_placed(EdgeEnd::Append(w), at_u)
        } else {
            self.graph.new_edge_placed(at_u, EdgeEnd::Append(w))
        };
        let ns = self.create_node_split(orig);
        self.push_path_edge(PathOwner::Split(ns), s);
        trace!(%u, new = %w, split = %ns, "separated dummy");
        s
    }

    // --------------------------------------------------------------------------------------------
    // Pseudo-crossings
    // --------------------------------------------------------------------------------------------

    /// Whether `v` is a crossing of two paths that both lead, on consecutive
    /// sides of `v`, to copies of one splittable node.
    pub fn is_pseudo_crossing(&self, v: Node) -> bool {
        self.pseudo_crossing(v).is_some()
    }

    /// Two consecutive entries of a pseudo-crossing and the copy both of
    /// their paths lead to.
    fn pseudo_crossing(&self, v: Node) -> Option<(AdjEntry, AdjEntry, Node)> {
        let entries = self.crossing_entries(v)?;
        (0..4).find_map(|i| {
            let (a, b) = (entries[i], entries[(i + 1) % 4]);
            let (p, q) = (self.path_end_from(a)?, self.path_end_from(b)?);
            let orig = self.original(p)?;
            (self.original(q) == Some(orig) && self.splittable_orig(orig)).then_some((a, b, p))
        })
    }

    /// Turns a pseudo-crossing `v` into a copy of the node both paths lead
    /// to. Returns `false`, changing nothing, for a genuine crossing.
    pub fn resolve_pseudo_crossing(&mut self, v: Node) -> bool {
        let Some((a, b, end)) = self.pseudo_crossing(v) else {
            return false;
        };
        let Some(orig) = self.original(end) else {
            return false;
        };
        let s = self.separate_dummy(a, b, end, false);
        let reuse = self.node_split_of(s);
        self.convert_dummy(v, orig, reuse);
        debug!(crossing = %v, %orig, "resolved pseudo-crossing");
        self.verify("resolve_pseudo_crossing");
        true
    }

    /// Computes a planar embedding of the copy, see [`planar_embed`]. The
    /// rotations are left alone if the copy is not planar.
    pub fn embed(&mut self) -> bool {
        let planar = planar_embed(&mut self.graph);
        debug!(planar, "embedded expansion");
        planar
    }

    // --------------------------------------------------------------------------------------------
    // Consistency
    // --------------------------------------------------------------------------------------------

    /// [`PlanRepExpansion::consistency_check`] plus a check that `emb` still
    /// matches the rotations of the copy.
    pub fn consistency_check_embedded(
        &self,
        emb: &CombinatorialEmbedding,
    ) -> Result<(), ConsistencyError> {
        self.consistency_check()?;
        emb.consistency_check(&self.graph)?;
        Ok(())
    }

    pub fn consistency_check(&self) -> Result<(), ConsistencyError> {
        for v in self.graph.nodes() {
            if self.graph.adj_entries(v).count() != self.graph.degree(v) {
                return Err(ConsistencyError::Rotation(v));
            }
            match self.original(v) {
                Some(orig) => {
                    match self.v_pos[v] {
                        Some(pos) if self.node_pool.get(pos) == v => {}
                        _ => return Err(ConsistencyError::NodeMap(v)),
                    }
                    if self.splittable(v) != self.splittable_orig(orig) {
                        return Err(ConsistencyError::Splittable(v));
                    }
                }
                None if self.splittable(v) => return Err(ConsistencyError::Splittable(v)),
                None => {}
            }
        }
        for orig in self.original.nodes() {
            if self
                .expansion(orig)
                .any(|c| !self.graph.is_alive_node(c) || self.original(c) != Some(orig))
            {
                return Err(ConsistencyError::Expansion(orig));
            }
        }
        for e in self.graph.edges() {
            let Some(owner) = self.path_owner(e) else {
                return Err(ConsistencyError::DanglingEdge(e));
            };
            let alive = match owner {
                PathOwner::Chain(_) => true,
                PathOwner::Split(ns) => self.splits.get(ns).is_some_and(Option::is_some),
            };
            match self.e_pos[e] {
                Some(pos) if alive && self.edge_pool.get(pos) == e => {}
                _ => return Err(ConsistencyError::EdgeRole(e)),
            }
        }

        for orig in self.original.edges() {
            let chain: Vec<Edge> = self.chain(orig).collect();
            let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
                continue;
            };
            if let Some(&e) = chain
                .iter()
                .find(|&&e| self.path_owner(e) != Some(PathOwner::Chain(orig)))
            {
                return Err(ConsistencyError::EdgeRole(e));
            }
            for (a, b) in chain.iter().tuple_windows() {
                let mid = self.graph.target(*a);
                if mid != self.graph.source(*b) || !self.is_dummy(mid) {
                    return Err(ConsistencyError::ChainBroken(orig));
                }
            }
            if self.original(self.graph.source(first)) != Some(self.original.source(orig))
                || self.original(self.graph.target(last)) != Some(self.original.target(orig))
            {
                return Err(ConsistencyError::ChainEndpoints(orig));
            }
        }

        for ns in self.node_splits() {
            let split = self.node_split(ns);
            let path: Vec<Edge> = self.edge_pool.to_vec(&split.path);
            let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
                continue;
            };
            if let Some(&e) = path
                .iter()
                .find(|&&e| self.path_owner(e) != Some(PathOwner::Split(ns)))
            {
                return Err(ConsistencyError::EdgeRole(e));
            }
            for (a, b) in path.iter().tuple_windows() {
                let mid = self.graph.target(*a);
                if mid != self.graph.source(*b) {
                    return Err(ConsistencyError::SplitBroken(ns));
                }
                if !self.is_dummy(mid) && self.original(mid) != Some(split.orig) {
                    return Err(ConsistencyError::SplitInterior(ns, mid));
                }
            }
            if self.original(self.graph.source(first)) != Some(split.orig)
                || self.original(self.graph.target(last)) != Some(split.orig)
            {
                return Err(ConsistencyError::SplitEndpoints(ns));
            }
        }
        Ok(())
    }
}

impl PlanarizedCopy for PlanRepExpansion<'_> {
    type PathId = PathOwner;

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
        self.track_node(self.graph.target(e));
        self.insert_path_edge_after(e, e2);
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
        debug_assert_eq!(self.path_owner(e_in), self.path_owner(e_out));
        if let Some(owner) = self.path_owner(e_out) {
            self.forget_path_edge(owner, e_out);
        }
        match emb {
            Some(emb) => emb.unsplit(&mut self.graph, e_in, e_out),
            None => self.graph.unsplit(e_in, e_out),
        }
    }

    fn path_edges(&self, id: PathOwner) -> Vec<Edge> {
        self.edge_pool.to_vec(self.path_list(id))
    }

    fn path_of(&self, e: Edge) -> Option<PathOwner> {
        self.path_owner(e)
    }

    fn push_path_edge(&mut self, id: PathOwner, e: Edge) {
        self.track_edge(e);
        let (pool, list) = self.path_parts(id);
        let pos = pool.push_back(list, e);
        self.e_role[e] = Some(id);
        self.e_pos[e] = Some(pos);
    }

    fn forget_path_edge(&mut self, id: PathOwner, e: Edge) {
        if let Some(pos) = self.e_pos[e].take() {
            let (pool, list) = self.path_parts(id);
            pool.remove(list, pos);
        }
        self.e_role[e] = None;
    }
}
