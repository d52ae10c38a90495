use super::*;
use proptest::prelude::*;

/// A square `a b c d` with both diagonals; the copy starts without the
/// diagonals routed.
fn square_with_diagonals() -> (Graph, [Node; 4], [Edge; 6]) {
    let mut g = Graph::new();
    let n = [g.new_node(), g.new_node(), g.new_node(), g.new_node()];
    let e = [
        g.new_edge(n[0], n[1]),
        g.new_edge(n[1], n[2]),
        g.new_edge(n[2], n[3]),
        g.new_edge(n[3], n[0]),
        g.new_edge(n[0], n[2]),
        g.new_edge(n[1], n[3]),
    ];
    (g, n, e)
}

#[test]
fn full_copy_maps_both_ways() {
    let (g, n, e) = square_with_diagonals();
    let copy = GraphCopy::new(&g);
    for v in n {
        let c = copy.copy(v).unwrap();
        assert_eq!(copy.original(c), Some(v));
    }
    for orig in e {
        assert_eq!(copy.chain_len(orig), 1);
        let c = copy.copy_edge(orig).unwrap();
        assert_eq!(copy.original_edge(c), Some(orig));
        assert!(!copy.is_reversed(orig));
    }
    assert_eq!(copy.number_of_crossings(), 0);
    assert_eq!(copy.consistency_check(), Ok(()));
}

#[test]
fn split_extends_the_chain_in_order() {
    let (g, _, e) = square_with_diagonals();
    let mut copy = GraphCopy::new(&g);
    let c = copy.copy_edge(e[0]).unwrap();
    let c2 = copy.split(c);
    assert_eq!(copy.chain(e[0]).collect::<Vec<_>>(), vec![c, c2]);
    assert!(copy.is_dummy(copy.graph().target(c)));
    let c3 = copy.split(c);
    assert_eq!(copy.chain(e[0]).collect::<Vec<_>>(), vec![c, c3, c2]);
    assert_eq!(copy.consistency_check(), Ok(()));

    copy.unsplit(c, c3);
    copy.unsplit(c, c2);
    assert_eq!(copy.chain(e[0]).collect::<Vec<_>>(), vec![c]);
    assert_eq!(copy.graph().number_of_nodes(), 4);
    assert_eq!(copy.consistency_check(), Ok(()));
}

#[test]
fn embedded_crossing_and_removal() {
    let (g, n, e) = square_with_diagonals();
    let mut copy = GraphCopy::new(&g);
    copy.remove_edge_path(e[4]);
    copy.remove_edge_path(e[5]);
    assert_eq!(copy.chain_len(e[4]), 0);
    assert_eq!(copy.copy_edge(e[4]), None);

    let mut emb = CombinatorialEmbedding::new(copy.graph());
    assert_eq!(emb.number_of_faces(), 2);
    let at = |copy: &GraphCopy, orig: Edge, v: Node| {
        let c = copy.copy_edge(orig).unwrap();
        copy.graph().adj_at(c, copy.copy(v).unwrap())
    };

    // a -> c through the face bounded by the source ends of the square
    let from_a = at(&copy, e[0], n[0]);
    let into_c = at(&copy, e[2], n[2]);
    copy.insert_edge_path_embedded(e[4], &mut emb, &[from_a, into_c]);
    assert_eq!(copy.chain_len(e[4]), 1);
    assert_eq!(copy.number_of_crossings(), 0);
    assert_eq!(emb.number_of_faces(), 3);

    // b -> d has to cross a -> c
    let ac = copy.copy_edge(e[4]).unwrap();
    let from_b = at(&copy, e[1], n[1]);
    let into_d = at(&copy, e[3], n[3]);
    assert_eq!(emb.right_face(from_b), emb.left_face(ac.adj_source()));
    copy.insert_edge_path_embedded(e[5], &mut emb, &[from_b, ac.adj_source(), into_d]);

    assert_eq!(copy.number_of_crossings(), 1);
    assert_eq!(copy.chain_len(e[4]), 2);
    assert_eq!(copy.chain_len(e[5]), 2);
    assert_eq!(emb.number_of_faces(), 5);
    assert_eq!(copy.consistency_check(), Ok(()));
    assert_eq!(emb.consistency_check(copy.graph()), Ok(()));
    assert_eq!(emb.genus(copy.graph()), 0);

    let joined = copy.remove_edge_path_embedded(&mut emb, e[5]);
    assert!(!joined.is_empty());
    assert_eq!(copy.number_of_crossings(), 0);
    assert_eq!(copy.chain_len(e[4]), 1);
    assert_eq!(copy.graph().number_of_nodes(), 4);
    assert_eq!(emb.number_of_faces(), 3);
    assert_eq!(copy.consistency_check(), Ok(()));
    assert_eq!(emb.consistency_check(copy.graph()), Ok(()));
}

#[test]
fn crossing_insertion_alternates_rotation() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..4).map(|_| g.new_node()).collect();
    let ab = g.new_edge(n[0], n[1]);
    let cd = g.new_edge(n[2], n[3]);
    let mut copy = GraphCopy::new(&g);

    let crossed = copy.copy_edge(ab).unwrap();
    let crossing = copy.copy_edge(cd).unwrap();
    let rear = copy.insert_crossing(crossing, crossed, true);
    let u = copy.graph().target(crossed);
    assert_eq!(copy.graph().source(rear), u);
    assert_eq!(copy.number_of_crossings(), 1);
    assert_eq!(copy.chain(ab).collect::<Vec<_>>(), vec![crossed, rear]);
    let cd_chain: Vec<Edge> = copy.chain(cd).collect();
    assert_eq!(cd_chain.len(), 2);
    assert_eq!(cd_chain[0], crossing);
    assert_eq!(
        copy.graph().adj_entries(u).collect::<Vec<_>>(),
        vec![
            rear.adj_source(),
            cd_chain[1].adj_source(),
            crossed.adj_target(),
            crossing.adj_target()
        ]
    );
    assert_eq!(copy.consistency_check(), Ok(()));

    copy.remove_edge_path(cd);
    assert_eq!(copy.number_of_crossings(), 0);
    assert_eq!(copy.chain_len(ab), 1);

    copy.insert_edge_path(cd, &[crossed.adj_source()]);
    let rear = copy.chain(ab).last().unwrap();
    let u = copy.graph().source(rear);
    let path: Vec<Edge> = copy.chain(cd).collect();
    assert_eq!(
        copy.graph().adj_entries(u).collect::<Vec<_>>(),
        vec![
            crossed.adj_target(),
            path[0].adj_target(),
            rear.adj_source(),
            path[1].adj_source()
        ]
    );
    assert_eq!(copy.consistency_check(), Ok(()));
}

#[test]
fn component_restriction() {
    let mut g = Graph::new();
    let n: Vec<Node> = (0..5).map(|_| g.new_node()).collect();
    let e0 = g.new_edge(n[0], n[1]);
    let e1 = g.new_edge(n[2], n[3]);
    g.new_edge(n[3], n[4]);
    let info = CcInfo::new(&g);

    let mut copy = GraphCopy::empty(&g);
    copy.init_by_cc(&info, 1);
    assert_eq!(copy.graph().number_of_nodes(), 3);
    assert_eq!(copy.copy(n[0]), None);
    assert_eq!(copy.copy_edge(e0), None);
    assert!(copy.copy_edge(e1).is_some());
    assert_eq!(copy.consistency_check(), Ok(()));

    copy.init_by_nodes(&[n[0], n[1], n[2]]);
    assert_eq!(copy.graph().number_of_nodes(), 3);
    assert_eq!(copy.graph().number_of_edges(), 1);
    assert!(copy.copy_edge(e0).is_some());
    assert_eq!(copy.copy_edge(e1), None);
    assert_eq!(copy.consistency_check(), Ok(()));
}

proptest! {
    #[test]
    fn reroutes_keep_chains_consistent(
        seed in 0u64..500,
        ops in prop::collection::vec((0usize..64, prop::collection::vec((0usize..64, any::<bool>()), 0..4)), 1..8),
    ) {
        let g = Graph::random(6, 9, seed);
        let originals: Vec<Edge> = g.edges().collect();
        let mut copy = GraphCopy::new(&g);

        for (pick, crossings) in ops {
            let orig = originals[pick % originals.len()];
            copy.remove_edge_path(orig);
            let candidates: Vec<Edge> = copy.graph().edges().collect();
            let mut crossed: Vec<AdjEntry> = Vec::new();
            if !candidates.is_empty() {
                for (i, src) in crossings {
                    let c = candidates[i % candidates.len()];
                    if crossed.iter().all(|a| a.edge() != c) {
                        crossed.push(if src { c.adj_source() } else { c.adj_target() });
                    }
                }
            }
            copy.insert_edge_path(orig, &crossed);
            prop_assert_eq!(copy.consistency_check(), Ok(()));
            prop_assert_eq!(copy.chain_len(orig), crossed.len() + 1);
        }

        for &orig in &originals {
            copy.remove_edge_path(orig);
        }
        prop_assert_eq!(copy.graph().number_of_nodes(), g.number_of_nodes());
        prop_assert_eq!(copy.graph().number_of_edges(), 0);
    }
}
