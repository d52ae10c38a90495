use super::*;
use proptest::prelude::*;
use similar_asserts::assert_eq;

fn cycle(n: usize) -> (Graph, Vec<Node>, Vec<Edge>) {
    let mut g = Graph::new();
    let nodes: Vec<Node> = (0..n).map(|_| g.new_node()).collect();
    let edges = (0..n).map(|i| g.new_edge(nodes[i], nodes[(i + 1) % n])).collect();
    (g, nodes, edges)
}

fn sizes(emb: &CombinatorialEmbedding) -> Vec<usize> {
    let mut s: Vec<usize> = emb.faces().map(|f| emb.face_size(f)).collect();
    s.sort_unstable();
    s
}

#[test]
fn triangle_has_two_faces() {
    let (g, _, edges) = cycle(3);
    let emb = CombinatorialEmbedding::new(&g);
    assert_eq!(emb.number_of_faces(), 2);
    assert_eq!(sizes(&emb), vec![3, 3]);
    assert_eq!(emb.genus(&g), 0);

    let inner = emb.right_face(edges[0].adj_source());
    assert_eq!(
        emb.face_cycle(&g, inner),
        vec![
            edges[0].adj_source(),
            edges[1].adj_source(),
            edges[2].adj_source()
        ]
    );
    assert_eq!(emb.left_face(edges[1].adj_target()), inner);
    assert_ne!(emb.left_face(edges[0].adj_source()), inner);
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn edgeless_graph_has_one_empty_face() {
    let mut g = Graph::new();
    g.new_node();
    let emb = CombinatorialEmbedding::new(&g);
    assert_eq!(emb.number_of_faces(), 1);
    let f = emb.external_face().unwrap();
    assert_eq!(emb.face_size(f), 0);
    assert!(emb.face_cycle(&g, f).is_empty());
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn split_face_and_join_back() {
    let (mut g, nodes, edges) = cycle(4);
    let mut emb = CombinatorialEmbedding::new(&g);
    let f = emb.right_face(edges[0].adj_source());
    assert_eq!(emb.right_face(edges[2].adj_source()), f);

    let d = emb.split_face(&mut g, edges[0].adj_source(), edges[2].adj_source());
    assert_eq!(g.source(d), nodes[0]);
    assert_eq!(g.target(d), nodes[2]);
    assert_eq!(emb.number_of_faces(), 3);
    assert_eq!(sizes(&emb), vec![3, 3, 4]);
    assert_eq!(emb.right_face(d.adj_source()), f);
    assert_ne!(emb.left_face(d.adj_source()), f);
    assert_eq!(emb.consistency_check(&g), Ok(()));
    assert_eq!(emb.genus(&g), 0);

    let kept = emb.join_faces(&mut g, d);
    assert_eq!(kept, f);
    assert_eq!(emb.number_of_faces(), 2);
    assert_eq!(sizes(&emb), vec![4, 4]);
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn deleting_a_bridge_cuts_the_face() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..4).map(|_| g.new_node()).collect();
    g.new_edge(n[0], n[1]);
    let bridge = g.new_edge(n[1], n[2]);
    g.new_edge(n[2], n[3]);
    let mut emb = CombinatorialEmbedding::new(&g);
    assert_eq!(emb.number_of_faces(), 1);
    assert_eq!(sizes(&emb), vec![6]);

    emb.join_faces(&mut g, bridge);
    assert_eq!(emb.number_of_faces(), 2);
    assert_eq!(sizes(&emb), vec![2, 2]);
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn split_and_unsplit_keep_faces() {
    let (mut g, _, edges) = cycle(3);
    let mut emb = CombinatorialEmbedding::new(&g);
    let e2 = emb.split(&mut g, edges[1]);
    assert_eq!(sizes(&emb), vec![4, 4]);
    assert_eq!(
        emb.right_face(e2.adj_source()),
        emb.right_face(edges[1].adj_source())
    );
    assert_eq!(emb.consistency_check(&g), Ok(()));

    emb.unsplit(&mut g, edges[1], e2);
    assert_eq!(sizes(&emb), vec![3, 3]);
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn contract_reverse_and_isolated_node() {
    let (mut g, _, edges) = cycle(4);
    let mut emb = CombinatorialEmbedding::new(&g);
    emb.contract(&mut g, edges[0]);
    assert_eq!(g.number_of_nodes(), 3);
    assert_eq!(sizes(&emb), vec![3, 3]);
    assert_eq!(emb.consistency_check(&g), Ok(()));

    emb.reverse_edge(&mut g, edges[2]);
    assert_eq!(emb.consistency_check(&g), Ok(()));

    let lonely = g.new_node();
    let e = emb.add_edge_to_isolated_node(&mut g, lonely, edges[1].adj_source(), false);
    assert_eq!(g.target(e), lonely);
    assert_eq!(sizes(&emb), vec![3, 5]);
    assert_eq!(emb.consistency_check(&g), Ok(()));
}

#[test]
fn external_face_survives_join() {
    let (mut g, _, edges) = cycle(4);
    let mut emb = CombinatorialEmbedding::new(&g);
    let d = emb.split_face(&mut g, edges[0].adj_source(), edges[2].adj_source());
    let inner = emb.left_face(d.adj_source());
    emb.set_external_face(inner);
    let kept = emb.join_faces(&mut g, d);
    assert_eq!(emb.external_face(), Some(kept));
}

#[derive(Clone, Debug)]
enum Op {
    Split(usize),
    Reverse(usize),
    Join(usize),
    Contract(usize),
    SplitFace(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..100).prop_map(Op::Split),
        (0usize..100).prop_map(Op::Reverse),
        (0usize..100).prop_map(Op::Join),
        (0usize..100).prop_map(Op::Contract),
        (0usize..100, 0usize..100).prop_map(|(a, b)| Op::SplitFace(a, b)),
    ]
}

proptest! {
    #[test]
    fn incremental_faces_match_retracing(seed in 0u64..1000, ops in prop::collection::vec(op(), 1..25)) {
        let mut g = Graph::random(7, 12, seed);
        let mut emb = CombinatorialEmbedding::new(&g);
        for op in ops {
            let edges: Vec<Edge> = g.edges().collect();
            if edges.is_empty() {
                break;
            }
            match op {
                Op::Split(i) => {
                    emb.split(&mut g, edges[i % edges.len()]);
                }
                Op::Reverse(i) => emb.reverse_edge(&mut g, edges[i % edges.len()]),
                Op::Join(i) => {
                    emb.join_faces(&mut g, edges[i % edges.len()]);
                }
                Op::Contract(i) => {
                    let e = edges[i % edges.len()];
                    if !g.is_self_loop(e) {
                        emb.contract(&mut g, e);
                    }
                }
                Op::SplitFace(i, j) => {
                    let e = edges[i % edges.len()];
                    let f = emb.right_face(e.adj_source());
                    let boundary = emb.face_cycle(&g, f);
                    let target = boundary[j % boundary.len()];
                    emb.split_face(&mut g, e.adj_source(), target);
                }
            }
            prop_assert_eq!(emb.consistency_check(&g), Ok(()));
        }
    }
}
