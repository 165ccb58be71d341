use terrapin_rdf::vocab::rdf;
use terrapin_rdf::{
    BlankNode, Dataset, Graph, GraphName, Literal, NamedNode, NamedOrBlankNode, Quad, Term, Triple,
};

fn ex(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{local}"))
}

#[test]
fn find_matches_every_filter_combination() {
    let mut graph = Graph::new();
    let b = BlankNode::default();
    graph.insert(Triple::new(ex("alice"), rdf::TYPE, ex("Person")));
    graph.insert(Triple::new(ex("alice"), ex("knows"), ex("bob")));
    graph.insert(Triple::new(ex("bob"), ex("knows"), ex("alice")));
    graph.insert(Triple::new(b.clone(), ex("knows"), ex("alice")));

    let alice = NamedOrBlankNode::from(ex("alice"));
    let knows = ex("knows");
    let alice_term = Term::from(ex("alice"));

    assert_eq!(graph.find(Some(&alice), None, None).count(), 2);
    assert_eq!(graph.find(None, Some(&knows), None).count(), 3);
    assert_eq!(graph.find(None, None, Some(&alice_term)).count(), 2);
    assert_eq!(
        graph.find(None, Some(&knows), Some(&alice_term)).count(),
        2
    );
    let blank = NamedOrBlankNode::from(b);
    assert_eq!(
        graph
            .find(Some(&blank), Some(&knows), Some(&alice_term))
            .count(),
        1
    );
    assert_eq!(graph.find(Some(&blank), Some(&knows), None).count(), 1);
}

#[test]
fn without_supports_completeness_accounting() {
    let mut graph = Graph::new();
    let consumed = Triple::new(ex("s"), rdf::TYPE, ex("T"));
    let remainder = Triple::new(ex("s"), ex("p"), Literal::from(1));
    graph.insert(consumed.clone());
    graph.insert(remainder.clone());

    let rest = graph.without([&consumed]);
    assert_eq!(rest.len(), 1);
    assert!(rest.contains(&remainder));
    assert!(!rest.contains(&consumed));
    // the original graph is untouched
    assert_eq!(graph.len(), 2);
}

#[test]
fn merge_is_idempotent_union() {
    let shared = Triple::new(ex("s"), ex("p"), ex("o"));
    let own = Triple::new(ex("s"), ex("p"), Literal::from(2));
    let mut left: Graph = [shared.clone(), own.clone()].into_iter().collect();
    let right: Graph = [shared].into_iter().collect();

    left.merge(&right);
    assert_eq!(left.len(), 2);
    left.merge(&right);
    assert_eq!(left.len(), 2);
    assert!(left.contains(&own));
}

#[test]
fn dataset_routes_and_groups_quads() {
    let mut dataset = Dataset::new();
    dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), GraphName::DefaultGraph));
    dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), ex("g1")));
    dataset.insert(Quad::new(ex("s"), ex("p"), Literal::from(1), ex("g1")));
    dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), ex("g2")));

    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.default_graph().len(), 1);
    assert_eq!(dataset.named_graphs().count(), 2);

    let names: Vec<String> = dataset
        .named_graphs()
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "<http://example.com/g1>".to_owned(),
            "<http://example.com/g2>".to_owned()
        ]
    );

    let g1 = NamedOrBlankNode::from(ex("g1"));
    assert_eq!(dataset.graph(&g1).map(Graph::len), Some(2));
}

#[test]
fn blank_node_equality_is_by_identity() {
    let b = BlankNode::default();
    let mut graph = Graph::new();
    graph.insert(Triple::new(b.clone(), ex("p"), ex("o")));
    graph.insert(Triple::new(b.clone(), ex("p"), ex("o")));
    assert_eq!(graph.len(), 1);

    graph.insert(Triple::new(BlankNode::default(), ex("p"), ex("o")));
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.triples_for_subject(&b.into()).count(), 1);
}
