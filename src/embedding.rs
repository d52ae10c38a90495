//! # Combinatorial embeddings
//!
//! The faces of a graph are read off its rotation system: the face following
//! an adjacency entry `adj` continues with `cyclic_pred(twin(adj))`. The face
//! traced from `adj` is its *right face*, the face traced from its twin its
//! *left face*.
//!
//! [`CombinatorialEmbedding`] keeps a face label for every adjacency entry and
//! updates it incrementally as the graph is edited through the methods of
//! this module. Edits made directly on the [`Graph`] invalidate the labels
//! until [`CombinatorialEmbedding::compute_faces`] is called again.

use tracing::trace;

use crate::{
    error::EmbeddingError,
    graph::{AdjEntry, AdjVec, CcInfo, Edge, EdgeEnd, Graph, Node},
};

crate::define_indexed_vec!(
    /// Handle of a face.
    pub struct Face;
    /// Dense per-face storage.
    pub struct FaceVec;
);

#[derive(Clone, Debug)]
struct FaceRecord {
    first: Option<AdjEntry>,
    size: usize,
    alive: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CombinatorialEmbedding {
    right_face: AdjVec<Option<Face>>,
    faces: FaceVec<FaceRecord>,
    n_faces: usize,
    external: Option<Face>,
}

/// The entry following `adj` on its face.
pub fn face_succ(graph: &Graph, adj: AdjEntry) -> AdjEntry {
    graph.cyclic_pred(adj.twin())
}

/// The entry preceding `adj` on its face.
pub fn face_pred(graph: &Graph, adj: AdjEntry) -> AdjEntry {
    graph.cyclic_succ(adj).twin()
}

impl CombinatorialEmbedding {
    pub fn new(graph: &Graph) -> Self {
        let mut emb = Self::default();
        emb.compute_faces(graph);
        emb
    }

    /// Traces all faces of `graph` from scratch. The first face found becomes
    /// the external face. A graph without edges has one empty face.
    pub fn compute_faces(&mut self, graph: &Graph) {
        self.right_face = AdjVec::filled(2 * graph.edge_bound(), None);
        self.faces = FaceVec::new();
        self.n_faces = 0;

        for e in graph.edges() {
            for adj in [e.adj_source(), e.adj_target()] {
                if self.right_face[adj].is_some() {
                    continue;
                }
                let f = self.new_face(Some(adj));
                let mut cur = adj;
                loop {
                    self.right_face[cur] = Some(f);
                    self.faces[f].size += 1;
                    cur = face_succ(graph, cur);
                    if cur == adj {
                        break;
                    }
                }
            }
        }
        if self.n_faces == 0 {
            self.new_face(None);
        }
        let first = self.faces().next();
        self.external = first;
        trace!(faces = self.n_faces, "computed faces");
    }

    fn new_face(&mut self, first: Option<AdjEntry>) -> Face {
        self.n_faces += 1;
        self.faces.push(FaceRecord {
            first,
            size: 0,
            alive: true,
        })
    }

    fn kill_face(&mut self, f: Face) {
        self.faces[f].alive = false;
        self.faces[f].first = None;
        self.faces[f].size = 0;
        self.n_faces -= 1;
        if self.external == Some(f) {
            self.external = None;
        }
    }

    fn cover(&mut self, graph: &Graph) {
        self.right_face.grow_to(2 * graph.edge_bound(), None);
    }

    fn label(&self, adj: AdjEntry) -> Option<Face> {
        self.right_face.get(adj).copied().flatten()
    }

    // --------------------------------------------------------------------------------------------
    // Queries
    // --------------------------------------------------------------------------------------------

    /// The face traced from `adj`.
    pub fn right_face(&self, adj: AdjEntry) -> Face {
        match self.label(adj) {
            Some(f) => f,
            None => panic!("adjacency entry {adj} is not embedded"),
        }
    }

    /// The face traced from the twin of `adj`.
    pub fn left_face(&self, adj: AdjEntry) -> Face {
        self.right_face(adj.twin())
    }

    pub fn face_size(&self, f: Face) -> usize {
        self.faces[f].size
    }

    pub fn face_first(&self, f: Face) -> Option<AdjEntry> {
        self.faces[f].first
    }

    pub fn is_alive_face(&self, f: Face) -> bool {
        self.faces.get(f).is_some_and(|r| r.alive)
    }

    pub fn faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.faces.iter().filter(|(_, r)| r.alive).map(|(f, _)| f)
    }

    pub fn number_of_faces(&self) -> usize {
        self.n_faces
    }

    /// The boundary of `f`, starting at its first entry.
    pub fn face_cycle(&self, graph: &Graph, f: Face) -> Vec<AdjEntry> {
        let Some(start) = self.faces[f].first else {
            return Vec::new();
        };
        let mut cycle = Vec::with_capacity(self.faces[f].size);
        let mut cur = start;
        loop {
            cycle.push(cur);
            cur = face_succ(graph, cur);
            if cur == start {
                break;
            }
        }
        cycle
    }

    pub fn external_face(&self) -> Option<Face> {
        self.external
    }

    pub fn set_external_face(&mut self, f: Face) {
        debug_assert!(self.is_alive_face(f));
        self.external = Some(f);
    }

    /// Euler genus of the embedding, summed over the components of `graph`.
    pub fn genus(&self, graph: &Graph) -> isize {
        let cc = CcInfo::new(graph);
        let components = (0..cc.number_of_ccs())
            .filter(|&i| !cc.edges(i).is_empty())
            .count() as isize;
        let nodes = graph.nodes().filter(|&v| graph.degree(v) > 0).count() as isize;
        let edges = graph.number_of_edges() as isize;
        let faces = self.faces().filter(|&f| self.faces[f].size > 0).count() as isize;
        (2 * components - nodes + edges - faces) / 2
    }

    // --------------------------------------------------------------------------------------------
    // Edits
    // --------------------------------------------------------------------------------------------

    /// Subdivides `e`; both halves stay on the faces of `e`.
    pub fn split(&mut self, graph: &mut Graph, e: Edge) -> Edge {
        let e2 = graph.split(e);
        self.cover(graph);
        let f_src = self.right_face(e.adj_source());
        let f_tgt = self.right_face(e.adj_target());
        self.right_face[e2.adj_source()] = Some(f_src);
        self.right_face[e2.adj_target()] = Some(f_tgt);
        self.faces[f_src].size += 1;
        self.faces[f_tgt].size += 1;
        e2
    }

    /// Inverse of [`CombinatorialEmbedding::split`].
    pub fn unsplit(&mut self, graph: &mut Graph, e_in: Edge, e_out: Edge) {
        let f_src = self.right_face(e_out.adj_source());
        let f_tgt = self.right_face(e_out.adj_target());
        for (f, gone, keep) in [
            (f_src, e_out.adj_source(), e_in.adj_source()),
            (f_tgt, e_out.adj_target(), e_in.adj_target()),
        ] {
            self.faces[f].size -= 1;
            if self.faces[f].first == Some(gone) {
                self.faces[f].first = Some(keep);
            }
        }
        self.right_face[e_out.adj_source()] = None;
        self.right_face[e_out.adj_target()] = None;
        graph.unsplit(e_in, e_out);
    }

    /// Inserts an edge from the node of `adj_src` to the node of `adj_tgt`
    /// through their common face, placed directly behind both entries. The
    /// part of the face on the source side keeps the old face.
    pub fn split_face(&mut self, graph: &mut Graph, adj_src: AdjEntry, adj_tgt: AdjEntry) -> Edge {
        let f = self.right_face(adj_src);
        debug_assert_eq!(
            f,
            self.right_face(adj_tgt),
            "entries {adj_src} and {adj_tgt} do not share a face"
        );
        let old_size = self.faces[f].size;
        let e = graph.new_edge_placed(EdgeEnd::After(adj_src), EdgeEnd::After(adj_tgt));
        self.cover(graph);

        let f_new = self.new_face(Some(e.adj_target()));
        let mut cur = e.adj_target();
        let mut new_size = 0;
        loop {
            self.right_face[cur] = Some(f_new);
            new_size += 1;
            cur = face_succ(graph, cur);
            if cur == e.adj_target() {
                break;
            }
        }
        self.faces[f_new].size = new_size;
        self.right_face[e.adj_source()] = Some(f);
        self.faces[f].size = old_size + 2 - new_size;
        self.faces[f].first = Some(e.adj_source());
        trace!(%e, old = %f, new = %f_new, "split face");
        e
    }

    /// Connects the isolated node `v` to the node of `adj`, inside the right
    /// face of `adj`.
    pub fn add_edge_to_isolated_node(
        &mut self,
        graph: &mut Graph,
        v: Node,
        adj: AdjEntry,
        v_is_source: bool,
    ) -> Edge {
        debug_assert_eq!(graph.degree(v), 0);
        let f = self.right_face(adj);
        let e = if v_is_source {
            graph.new_edge_placed(EdgeEnd::Append(v), EdgeEnd::After(adj))
        } else {
            graph.new_edge_placed(EdgeEnd::After(adj), EdgeEnd::Append(v))
        };
        self.cover(graph);
        self.right_face[e.adj_source()] = Some(f);
        self.right_face[e.adj_target()] = Some(f);
        self.faces[f].size += 2;
        e
    }

    /// An entry of the face of `adj` other than the ends of `adj`'s edge.
    fn other_on_face(&self, graph: &Graph, adj: AdjEntry) -> Option<AdjEntry> {
        let e = adj.edge();
        let mut cur = face_succ(graph, adj);
        for _ in 0..self.faces[self.right_face(adj)].size {
            if cur.edge() != e {
                return Some(cur);
            }
            cur = face_succ(graph, cur);
        }
        None
    }

    /// The entries met walking the face from `from` up to, not including,
    /// `to`.
    fn walk_between(&self, graph: &Graph, from: AdjEntry, to: AdjEntry) -> Vec<AdjEntry> {
        let mut out = Vec::new();
        let mut cur = face_succ(graph, from);
        while cur != to {
            out.push(cur);
            cur = face_succ(graph, cur);
        }
        out
    }

    /// Deletes `e` and merges the faces on both of its sides. Returns the
    /// surviving face.
    ///
    /// When both sides of `e` lie on one face, deleting `e` cuts that face in
    /// two; the part following the source end of `e` keeps the face.
    pub fn join_faces(&mut self, graph: &mut Graph, e: Edge) -> Face {
        let (a_src, a_tgt) = (e.adj_source(), e.adj_target());
        let f1 = self.right_face(a_src);
        let f2 = self.right_face(a_tgt);

        if f1 != f2 {
            let replacement = self
                .other_on_face(graph, a_src)
                .or_else(|| self.other_on_face(graph, a_tgt));
            for adj in self.walk_between(graph, a_tgt, a_tgt) {
                self.right_face[adj] = Some(f1);
            }
            self.faces[f1].size = self.faces[f1].size + self.faces[f2].size - 2;
            let external = self.external == Some(f2);
            self.kill_face(f2);
            if external {
                self.external = Some(f1);
            }
            if self.faces[f1].first.map_or(true, |first| first.edge() == e) {
                self.faces[f1].first = replacement;
            }
        } else {
            let front = self.walk_between(graph, a_src, a_tgt);
            let back = self.walk_between(graph, a_tgt, a_src);
            let (kept, moved) = if front.is_empty() {
                (back, Vec::new())
            } else {
                (front, back)
            };
            self.faces[f1].size = kept.len();
            self.faces[f1].first = kept.first().copied();
            if let Some(&first) = moved.first() {
                let f_new = self.new_face(Some(first));
                self.faces[f_new].size = moved.len();
                for adj in moved {
                    self.right_face[adj] = Some(f_new);
                }
            } else if kept.is_empty() && self.n_faces > 1 {
                self.kill_face(f1);
                if self.external.is_none() {
                    let first = self.faces().next();
                    self.external = first;
                }
            }
        }

        self.right_face[a_src] = None;
        self.right_face[a_tgt] = None;
        graph.del_edge(e);
        trace!(%e, face = %f1, "joined faces");
        f1
    }

    /// Contracts `e`, see [`Graph::contract`]; faces other than the two at
    /// `e` keep their boundary.
    pub fn contract(&mut self, graph: &mut Graph, e: Edge) -> Node {
        let f_src = self.right_face(e.adj_source());
        let f_tgt = self.right_face(e.adj_target());
        let repl_src = self.other_on_face(graph, e.adj_source());
        let repl_tgt = self.other_on_face(graph, e.adj_target());
        for (f, replacement) in [(f_src, repl_src), (f_tgt, repl_tgt)] {
            self.faces[f].size -= 1;
            if self.faces[f].first.is_some_and(|first| first.edge() == e) {
                self.faces[f].first = replacement;
            }
        }
        self.right_face[e.adj_source()] = None;
        self.right_face[e.adj_target()] = None;
        graph.contract(e)
    }

    /// Reverses `e`; both faces keep their boundary.
    pub fn reverse_edge(&mut self, graph: &mut Graph, e: Edge) {
        graph.reverse_edge(e);
        let (a, b) = (e.adj_source(), e.adj_target());
        self.right_face.swap(a, b);
        for f in [self.right_face(a), self.right_face(b)] {
            let first = self.faces[f].first;
            if first == Some(a) {
                self.faces[f].first = Some(b);
            } else if first == Some(b) {
                self.faces[f].first = Some(a);
            }
        }
    }

    /// Re-traces every face of `graph` and compares with the stored labels.
    pub fn consistency_check(&self, graph: &Graph) -> Result<(), EmbeddingError> {
        let fresh = CombinatorialEmbedding::new(graph);
        let mut seen = FaceVec::filled(self.faces.len(), false);
        let mut traced_faces = 0;

        for f_fresh in fresh.faces() {
            let cycle = fresh.face_cycle(graph, f_fresh);
            let Some(&start) = cycle.first() else {
                continue;
            };
            traced_faces += 1;
            let f = self.label(start).ok_or(EmbeddingError::MissingFace(start))?;
            for &adj in &cycle {
                match self.label(adj) {
                    None => return Err(EmbeddingError::MissingFace(adj)),
                    Some(g) if g != f => return Err(EmbeddingError::TornFace(start, adj)),
                    Some(_) => {}
                }
            }
            if !self.is_alive_face(f) || seen[f] {
                return Err(EmbeddingError::MergedFace(f));
            }
            seen[f] = true;
            if self.faces[f].size != cycle.len() {
                return Err(EmbeddingError::FaceSize {
                    face: f,
                    stored: self.faces[f].size,
                    traced: cycle.len(),
                });
            }
            if self.faces[f].first.and_then(|a| self.label(a)) != Some(f) {
                return Err(EmbeddingError::FaceFirst(f));
            }
        }

        let stored_faces = self.faces().filter(|&f| self.faces[f].size > 0).count();
        if stored_faces != traced_faces {
            return Err(EmbeddingError::FaceCount {
                expected: traced_faces,
                found: stored_faces,
            });
        }
        if let Some(ext) = self.external {
            if !self.is_alive_face(ext) {
                return Err(EmbeddingError::ExternalFace(ext));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
