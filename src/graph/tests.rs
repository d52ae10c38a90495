use super::*;
use proptest::prelude::*;
use similar_asserts::assert_eq;

fn rotation(graph: &Graph, v: Node) -> Vec<AdjEntry> {
    graph.adj_entries(v).collect()
}

fn all_rotations(graph: &Graph) -> Vec<(Node, Vec<AdjEntry>)> {
    graph.nodes().map(|v| (v, rotation(graph, v))).collect()
}

#[test]
fn split_and_unsplit_restore_rotations() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..4).map(|_| g.new_node()).collect();
    let e = g.new_edge(n[0], n[1]);
    g.new_edge(n[2], n[1]);
    g.new_edge(n[1], n[3]);
    g.new_edge(n[0], n[2]);
    let before = all_rotations(&g);

    let e2 = g.split(e);
    let u = g.target(e);
    assert_eq!(g.source(e2), u);
    assert_eq!(g.target(e2), n[1]);
    assert_eq!(g.degree(u), 2);
    assert_eq!(g.indeg(u), 1);
    assert_eq!(g.outdeg(u), 1);
    assert_eq!(rotation(&g, u), vec![e.adj_target(), e2.adj_source()]);
    assert_eq!(
        rotation(&g, n[1]),
        vec![e2.adj_target(), AdjEntry(3), AdjEntry(4)]
    );
    assert_eq!(g.number_of_nodes(), 5);
    assert_eq!(g.number_of_edges(), 5);

    g.unsplit(e, e2);
    assert!(!g.is_alive_node(u));
    assert!(!g.is_alive_edge(e2));
    assert_eq!(all_rotations(&g), before);
    assert_eq!(g.degree(n[1]), 3);
    assert_eq!(g.indeg(n[1]), 2);
}

#[test]
fn split_self_loop() {
    let mut g = Graph::new();
    let v = g.new_node();
    let w = g.new_node();
    let l = g.new_edge(v, v);
    g.new_edge(v, w);
    let l2 = g.split(l);
    let u = g.target(l);
    assert_eq!(g.source(l2), u);
    assert_eq!(g.target(l2), v);
    assert_eq!(
        rotation(&g, v),
        vec![l.adj_source(), l2.adj_target(), AdjEntry(2)]
    );
    assert_eq!(g.degree(v), 3);
}

#[test]
fn contract_inserts_rotation_in_place() {
    let mut g = Graph::new();
    let v = g.new_node();
    let w = g.new_node();
    let x: Vec<Node> = (0..4).map(|_| g.new_node()).collect();
    let a = g.new_edge(v, x[0]);
    let e = g.new_edge(v, w);
    let b = g.new_edge(v, x[1]);
    let c = g.new_edge(w, x[2]);
    let d = g.new_edge(w, x[3]);

    let kept = g.contract(e);
    assert_eq!(kept, v);
    assert!(!g.is_alive_node(w));
    assert_eq!(
        rotation(&g, v),
        vec![a.adj_source(), c.adj_source(), d.adj_source(), b.adj_source()]
    );
    assert_eq!(g.source(c), v);
    assert_eq!(g.degree(v), 4);
    assert_eq!(g.outdeg(v), 4);
    assert_eq!(g.number_of_edges(), 4);
}

#[test]
fn reverse_keeps_rotation_slots() {
    let mut g = Graph::new();
    let v = g.new_node();
    let w = g.new_node();
    let x = g.new_node();
    let y = g.new_node();
    let e = g.new_edge(v, w);
    let f = g.new_edge(v, x);
    let h = g.new_edge(w, y);

    g.reverse_edge(e);
    assert_eq!(g.source(e), w);
    assert_eq!(g.target(e), v);
    assert_eq!(rotation(&g, v), vec![e.adj_target(), f.adj_source()]);
    assert_eq!(rotation(&g, w), vec![e.adj_source(), h.adj_source()]);
    assert_eq!(g.indeg(v), 1);
    assert_eq!(g.outdeg(w), 2);
}

#[test]
fn placed_edges_and_moves() {
    let mut g = Graph::new();
    let v = g.new_node();
    let w = g.new_node();
    let z = g.new_node();
    let e1 = g.new_edge(v, w);
    let e2 = g.new_edge(v, w);
    let e3 = g.new_edge_placed(EdgeEnd::After(e1.adj_source()), EdgeEnd::Before(e1.adj_target()));
    assert_eq!(
        rotation(&g, v),
        vec![e1.adj_source(), e3.adj_source(), e2.adj_source()]
    );
    assert_eq!(
        rotation(&g, w),
        vec![e3.adj_target(), e1.adj_target(), e2.adj_target()]
    );
    assert_eq!(g.first_adj(w), Some(e3.adj_target()));
    let e4 = g.new_edge_placed(EdgeEnd::Before(e1.adj_source()), EdgeEnd::Append(z));
    assert_eq!(g.first_adj(v), Some(e4.adj_source()));
    assert_eq!(g.adj_entries(v).last(), Some(e2.adj_source()));
    g.del_edge(e4);

    g.move_target(e2, EdgeEnd::Append(z));
    assert_eq!(g.target(e2), z);
    assert_eq!(g.degree(w), 2);
    assert_eq!(g.search_edge(v, z), Some(e2));
    assert_eq!(g.search_edge(z, w), None);
}

#[test]
fn components_in_handle_order() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..5).map(|_| g.new_node()).collect();
    let e0 = g.new_edge(n[0], n[1]);
    let e1 = g.new_edge(n[3], n[2]);
    let e2 = g.new_edge(n[2], n[4]);

    let cc = CcInfo::new(&g);
    assert_eq!(cc.number_of_ccs(), 2);
    assert_eq!(cc.nodes(0), [n[0], n[1]].as_slice());
    assert_eq!(cc.edges(0), [e0].as_slice());
    assert_eq!(cc.nodes(1), [n[2], n[3], n[4]].as_slice());
    assert_eq!(cc.edges(1).len(), 2);
    assert!(cc.edges(1).contains(&e1) && cc.edges(1).contains(&e2));
    assert_eq!(cc.component(n[4]), Some(1));
}

#[test]
fn induced_copy_keeps_relative_order() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..4).map(|_| g.new_node()).collect();
    let a = g.new_edge(n[0], n[1]);
    let b = g.new_edge(n[0], n[2]);
    let c = g.new_edge(n[0], n[3]);
    let l = g.new_edge(n[0], n[0]);

    let copy = g.copy_induced(&[n[0], n[1], n[3]], &[a, c, l]);
    assert_eq!(copy.graph.number_of_nodes(), 3);
    assert_eq!(copy.graph.number_of_edges(), 3);
    assert_eq!(copy.edge_map[b], None);
    let v = copy.node_map[n[0]].unwrap();
    let map = |adj: AdjEntry| {
        let e = copy.edge_map[adj.edge()].unwrap();
        if adj.is_source() {
            e.adj_source()
        } else {
            e.adj_target()
        }
    };
    assert_eq!(
        rotation(&copy.graph, v),
        vec![
            map(a.adj_source()),
            map(c.adj_source()),
            map(l.adj_source()),
            map(l.adj_target())
        ]
    );
}

proptest! {
    #[test]
    fn split_unsplit_is_identity(seed in 0u64..500, picks in prop::collection::vec(0usize..64, 1..10)) {
        let mut g = Graph::random(8, 14, seed);
        let before = all_rotations(&g);
        let edges: Vec<Edge> = g.edges().collect();
        let mut done = Vec::new();
        for p in picks {
            let e = edges[p % edges.len()];
            let e2 = g.split(e);
            done.push((e, e2));
        }
        prop_assert_eq!(g.number_of_edges(), 14 + done.len());
        for (e, e2) in done.into_iter().rev() {
            g.unsplit(e, e2);
        }
        prop_assert_eq!(all_rotations(&g), before);
    }

    #[test]
    fn degree_sums_match(seed in 0u64..500) {
        let g = Graph::random(10, 20, seed);
        let total: usize = g.nodes().map(|v| g.degree(v)).sum();
        prop_assert_eq!(total, 2 * g.number_of_edges());
        for v in g.nodes() {
            prop_assert_eq!(g.degree(v), g.indeg(v) + g.outdeg(v));
            prop_assert_eq!(g.adj_entries(v).count(), g.degree(v));
        }
    }
}
