//! # Planar embedding
//!
//! [`planar_embed`] decides whether a graph is planar and, if it is, rewrites
//! the rotation of every node so that [`crate::embedding`] traces a plane
//! embedding.
//!
//! Loops and parallel edges are set aside first. The simple graph left over
//! is cut into biconnected blocks, every block is embedded on its own with
//! the fragment and face method of Demoucron, Malgrange and Pertuiset, and
//! the block rotations are concatenated at the cut vertices. Parallel edges
//! go back next to their representative and loops as adjacent pairs, which
//! keeps the embedding plane.

use ahash::AHashMap;
use bitvec::vec::BitVec;
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::graph::{AdjEntry, Edge, Graph, Node, NodeVec};

/// Embeds `graph` in the plane. Returns `false`, leaving the graph untouched,
/// when the graph is not planar.
pub fn planar_embed(graph: &mut Graph) -> bool {
    let simple = SimpleView::new(graph);
    let n = graph.nodes().filter(|&v| graph.degree(v) > 0).count();
    if n >= 3 && simple.edges.len() > 3 * n - 6 {
        debug!(nodes = n, edges = simple.edges.len(), "too many edges to be planar");
        return false;
    }

    let blocks = simple.blocks(graph);
    let mut rotation: NodeVec<Vec<AdjEntry>> = NodeVec::filled(graph.node_bound(), Vec::new());

    for block in &blocks {
        if let [e] = block.as_slice() {
            let (s, t) = (graph.source(*e), graph.target(*e));
            rotation[s].push(e.adj_source());
            rotation[t].push(e.adj_target());
            continue;
        }
        let Some(local) = BlockEmbedder::new(graph, block).embed() else {
            debug!(block_edges = block.len(), "block is not planar");
            return false;
        };
        for (v, order) in local {
            rotation[v].extend(order);
        }
    }

    for (rep, parallel) in &simple.parallel {
        let (u, v) = (graph.source(*rep), graph.target(*rep));
        let rep_u = rep.adj_source();
        let rep_v = rep.adj_target();
        let mut after_u = rep_u;
        let mut before_v = rep_v;
        for &p in parallel {
            let p_u = graph.adj_at(p, u);
            let p_v = graph.adj_at(p, v);
            insert_after(&mut rotation[u], after_u, p_u);
            insert_before(&mut rotation[v], before_v, p_v);
            after_u = p_u;
            before_v = p_v;
        }
    }
    for &l in &simple.loops {
        let v = graph.source(l);
        rotation[v].push(l.adj_source());
        rotation[v].push(l.adj_target());
    }

    let nodes: Vec<Node> = graph.nodes().collect();
    for v in nodes {
        debug_assert_eq!(rotation[v].len(), graph.degree(v));
        graph.set_rotation(v, &rotation[v]);
    }
    debug!(blocks = blocks.len(), "planar embedding found");
    true
}

fn insert_after(order: &mut Vec<AdjEntry>, anchor: AdjEntry, adj: AdjEntry) {
    let i = order.iter().position(|a| *a == anchor).unwrap_or(order.len() - 1);
    order.insert(i + 1, adj);
}

fn insert_before(order: &mut Vec<AdjEntry>, anchor: AdjEntry, adj: AdjEntry) {
    let i = order.iter().position(|a| *a == anchor).unwrap_or(0);
    order.insert(i, adj);
}

/// The simple graph underlying a multigraph.
struct SimpleView {
    /// One representative edge per adjacent pair of nodes.
    edges: Vec<Edge>,
    parallel: Vec<(Edge, Vec<Edge>)>,
    loops: Vec<Edge>,
    adjacency: NodeVec<Vec<(Node, Edge)>>,
}

impl SimpleView {
    fn new(graph: &Graph) -> Self {
        let mut rep: AHashMap<(Node, Node), usize> = AHashMap::new();
        let mut edges = Vec::new();
        let mut parallel: Vec<(Edge, Vec<Edge>)> = Vec::new();
        let mut loops = Vec::new();
        let mut adjacency = NodeVec::filled(graph.node_bound(), Vec::new());

        for e in graph.edges() {
            let (s, t) = (graph.source(e), graph.target(e));
            if s == t {
                loops.push(e);
                continue;
            }
            let key = (s.min(t), s.max(t));
            match rep.get(&key) {
                Some(&i) => parallel[i].1.push(e),
                None => {
                    rep.insert(key, parallel.len());
                    parallel.push((e, Vec::new()));
                    edges.push(e);
                    adjacency[s].push((t, e));
                    adjacency[t].push((s, e));
                }
            }
        }
        parallel.retain(|(_, p)| !p.is_empty());

        SimpleView {
            edges,
            parallel,
            loops,
            adjacency,
        }
    }

    /// Biconnected blocks as edge lists (Hopcroft and Tarjan, without
    /// recursion).
    fn blocks(&self, graph: &Graph) -> Vec<Vec<Edge>> {
        let mut disc: NodeVec<Option<usize>> = NodeVec::filled(graph.node_bound(), None);
        let mut low: NodeVec<usize> = NodeVec::filled(graph.node_bound(), 0);
        let mut time = 0;
        let mut blocks = Vec::new();
        let mut edge_stack: Vec<Edge> = Vec::new();

        for root in graph.nodes() {
            if disc[root].is_some() || self.adjacency[root].is_empty() {
                continue;
            }
            disc[root] = Some(time);
            low[root] = time;
            time += 1;
            let mut frames: Vec<(Node, Option<Edge>, usize)> = vec![(root, None, 0)];

            while let Some(frame) = frames.last_mut() {
                let (v, parent_edge) = (frame.0, frame.1);
                let d_v = disc[v].unwrap_or_default();
                if let Some(&(w, e)) = self.adjacency[v].get(frame.2) {
                    frame.2 += 1;
                    if Some(e) == parent_edge {
                        continue;
                    }
                    match disc[w] {
                        None => {
                            edge_stack.push(e);
                            disc[w] = Some(time);
                            low[w] = time;
                            time += 1;
                            frames.push((w, Some(e), 0));
                        }
                        Some(d_w) if d_w < d_v => {
                            edge_stack.push(e);
                            low[v] = low[v].min(d_w);
                        }
                        Some(_) => {}
                    }
                } else {
                    frames.pop();
                    if let Some(&(u, ..)) = frames.last() {
                        low[u] = low[u].min(low[v]);
                        if low[v] >= disc[u].unwrap_or_default() {
                            let mut block = Vec::new();
                            while let Some(e) = edge_stack.pop() {
                                block.push(e);
                                if Some(e) == parent_edge {
                                    break;
                                }
                            }
                            blocks.push(block);
                        }
                    }
                }
            }
        }
        trace!(blocks = blocks.len(), "biconnected blocks");
        blocks
    }
}

enum Fragment {
    Chord(usize),
    Component(Vec<usize>),
}

/// Embeds one biconnected simple block with at least three nodes.
struct BlockEmbedder<'a> {
    graph: &'a Graph,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ends: Vec<(usize, usize)>,
    adjacency: Vec<Vec<(usize, usize)>>,
    in_h_node: BitVec,
    in_h_edge: BitVec,
    /// Oriented vertex cycles; every embedded edge is traversed once in each
    /// direction.
    faces: Vec<Vec<usize>>,
}

impl<'a> BlockEmbedder<'a> {
    fn new(graph: &'a Graph, block: &[Edge]) -> Self {
        let mut index: AHashMap<Node, usize> = AHashMap::new();
        let mut nodes = Vec::new();
        let mut ends = Vec::with_capacity(block.len());
        let mut local = |v: Node, nodes: &mut Vec<Node>| {
            *index.entry(v).or_insert_with(|| {
                nodes.push(v);
                nodes.len() - 1
            })
        };
        for &e in block {
            let s = local(graph.source(e), &mut nodes);
            let t = local(graph.target(e), &mut nodes);
            ends.push((s, t));
        }
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, &(s, t)) in ends.iter().enumerate() {
            adjacency[s].push((t, i));
            adjacency[t].push((s, i));
        }
        BlockEmbedder {
            graph,
            in_h_node: BitVec::repeat(false, nodes.len()),
            in_h_edge: BitVec::repeat(false, block.len()),
            nodes,
            edges: block.to_vec(),
            ends,
            adjacency,
            faces: Vec::new(),
        }
    }

    /// Rotation of every block node, or `None` if the block is not planar.
    fn embed(mut self) -> Option<Vec<(Node, Vec<AdjEntry>)>> {
        let cycle = self.initial_cycle()?;
        for w in cycle.windows(2) {
            self.mark_edge(w[0], w[1]);
        }
        if let (Some(&first), Some(&last)) = (cycle.first(), cycle.last()) {
            self.mark_edge(last, first);
        }
        for &v in &cycle {
            self.in_h_node.set(v, true);
        }
        self.faces.push(cycle.clone());
        self.faces.push(cycle.into_iter().rev().collect());

        loop {
            let fragments = self.fragments();
            if fragments.is_empty() {
                break;
            }
            let mut choice = None;
            for (fragment, attachments) in &fragments {
                let admissible: Vec<usize> = (0..self.faces.len())
                    .filter(|&f| attachments.iter().all(|a| self.faces[f].contains(a)))
                    .collect();
                match admissible.as_slice() {
                    [] => return None,
                    [f] => {
                        choice = Some((fragment, attachments, *f));
                        break;
                    }
                    [f, ..] => {
                        if choice.is_none() {
                            choice = Some((fragment, attachments, *f));
                        }
                    }
                }
            }
            let (fragment, attachments, face) = choice?;
            let path = self.fragment_path(fragment, attachments)?;
            self.embed_path(face, &path);
        }

        Some(self.rotations())
    }

    fn mark_edge(&mut self, u: usize, v: usize) {
        if let Some(&(_, e)) = self.adjacency[u].iter().find(|(w, _)| *w == v) {
            self.in_h_edge.set(e, true);
        }
    }

    /// A cycle through the first edge of the block.
    fn initial_cycle(&self) -> Option<Vec<usize>> {
        let (s, t) = *self.ends.first()?;
        let mut parent: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut queue = VecDeque::from([t]);
        parent[t] = Some(t);
        while let Some(x) = queue.pop_front() {
            for &(y, e) in &self.adjacency[x] {
                if e == 0 || parent[y].is_some() {
                    continue;
                }
                parent[y] = Some(x);
                if y == s {
                    let mut cycle = vec![s];
                    let mut cur = s;
                    while cur != t {
                        cur = parent[cur]?;
                        cycle.push(cur);
                    }
                    return Some(cycle);
                }
                queue.push_back(y);
            }
        }
        None
    }

    fn fragments(&self) -> Vec<(Fragment, Vec<usize>)> {
        let mut out = Vec::new();
        for (e, &(s, t)) in self.ends.iter().enumerate() {
            if !self.in_h_edge[e] && self.in_h_node[s] && self.in_h_node[t] {
                out.push((Fragment::Chord(e), vec![s, t]));
            }
        }

        let mut seen: BitVec = BitVec::repeat(false, self.nodes.len());
        for root in 0..self.nodes.len() {
            if self.in_h_node[root] || seen[root] {
                continue;
            }
            let mut interior = vec![root];
            let mut attachments = Vec::new();
            let mut attached: BitVec = BitVec::repeat(false, self.nodes.len());
            seen.set(root, true);
            let mut i = 0;
            while i < interior.len() {
                let x = interior[i];
                i += 1;
                for &(y, _) in &self.adjacency[x] {
                    if self.in_h_node[y] {
                        if !attached[y] {
                            attached.set(y, true);
                            attachments.push(y);
                        }
                    } else if !seen[y] {
                        seen.set(y, true);
                        interior.push(y);
                    }
                }
            }
            out.push((Fragment::Component(interior), attachments));
        }
        out
    }

    /// A path through `fragment` between two distinct attachments, as
    /// (nodes, edges).
    fn fragment_path(
        &self,
        fragment: &Fragment,
        attachments: &[usize],
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        match fragment {
            Fragment::Chord(e) => {
                let (s, t) = self.ends[*e];
                Some((vec![s, t], vec![*e]))
            }
            Fragment::Component(interior) => {
                let a = *attachments.first()?;
                let mut inside: BitVec = BitVec::repeat(false, self.nodes.len());
                for &x in interior {
                    inside.set(x, true);
                }
                let mut parent: Vec<Option<(usize, usize)>> = vec![None; self.nodes.len()];
                let mut queue = VecDeque::new();
                for &(x, e) in &self.adjacency[a] {
                    if inside[x] && parent[x].is_none() {
                        parent[x] = Some((a, e));
                        queue.push_back(x);
                    }
                }
                while let Some(x) = queue.pop_front() {
                    for &(y, e) in &self.adjacency[x] {
                        if self.in_h_node[y] && y != a {
                            let mut nodes = vec![y, x];
                            let mut edges = vec![e];
                            let mut cur = x;
                            while cur != a {
                                let (p, pe) = parent[cur]?;
                                nodes.push(p);
                                edges.push(pe);
                                cur = p;
                            }
                            nodes.reverse();
                            edges.reverse();
                            return Some((nodes, edges));
                        }
                        if inside[y] && parent[y].is_none() {
                            parent[y] = Some((x, e));
                            queue.push_back(y);
                        }
                    }
                }
                None
            }
        }
    }

    /// Draws `path` from `a` to `b` through `face`: the face
    /// `a -> X -> b -> Y -> a` becomes `a -> X -> b -> rev(P)` and
    /// `b -> Y -> a -> P`.
    fn embed_path(&mut self, face: usize, (nodes, edges): &(Vec<usize>, Vec<usize>)) {
        for &e in edges {
            self.in_h_edge.set(e, true);
        }
        let interior = &nodes[1..nodes.len() - 1];
        for &x in interior {
            self.in_h_node.set(x, true);
        }
        let (a, b) = (nodes[0], nodes[nodes.len() - 1]);
        let boundary = &self.faces[face];
        let len = boundary.len();
        let (Some(i), Some(j)) = (
            boundary.iter().position(|&v| v == a),
            boundary.iter().position(|&v| v == b),
        ) else {
            return;
        };

        let mut f1 = Vec::new();
        let mut k = i;
        while k != j {
            f1.push(boundary[k]);
            k = (k + 1) % len;
        }
        f1.push(b);
        f1.extend(interior.iter().rev());

        let mut f2 = Vec::new();
        let mut k = j;
        while k != i {
            f2.push(boundary[k]);
            k = (k + 1) % len;
        }
        f2.push(a);
        f2.extend(interior.iter());

        self.faces[face] = f1;
        self.faces.push(f2);
    }

    fn rotations(&self) -> Vec<(Node, Vec<AdjEntry>)> {
        let edge_between = |u: usize, v: usize| {
            self.adjacency[u]
                .iter()
                .find(|(w, _)| *w == v)
                .map(|&(_, e)| e)
        };
        // for the corner u -> v -> w of a face, the entry towards u follows
        // the entry towards w in the rotation of v
        let mut succ: AHashMap<(usize, usize), usize> = AHashMap::new();
        for face in &self.faces {
            let len = face.len();
            for k in 0..len {
                let u = face[(k + len - 1) % len];
                let v = face[k];
                let w = face[(k + 1) % len];
                if let (Some(to_w), Some(to_u)) = (edge_between(v, w), edge_between(v, u)) {
                    succ.insert((v, to_w), to_u);
                }
            }
        }

        (0..self.nodes.len())
            .map(|v| {
                let node = self.nodes[v];
                let degree = self.adjacency[v].len();
                let mut order = Vec::with_capacity(degree);
                let mut cur = self.adjacency[v][0].1;
                for _ in 0..degree {
                    order.push(self.graph.adj_at(self.edges[cur], node));
                    cur = succ.get(&(v, cur)).copied().unwrap_or(cur);
                }
                (node, order)
            })
            .collect()
    }
}
