use terrapin_rdf::vocab::{rdf, xsd};
use terrapin_rdf::{BlankNode, Graph, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use terrapin_ttl::{
    IriRelativization, ParseFlags, SyntaxErrorKind, TriGParser, TriGSerializer, TurtleParser,
    TurtleSerializer,
};

fn nn(iri: &str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

fn ex(local: &str) -> NamedNode {
    nn(&format!("http://ex/{local}"))
}

#[test]
fn minimal_round_trip() {
    let input = "@prefix ex: <http://example.org/> .\nex:s ex:p \"o\" .\n";
    let graph = TurtleParser::new().parse(input).unwrap();
    assert_eq!(graph.len(), 1);
    let triple = graph.iter().next().unwrap();
    assert_eq!(triple.subject, nn("http://example.org/s").into());
    assert_eq!(triple.predicate, nn("http://example.org/p"));
    assert_eq!(triple.object, Literal::new_simple_literal("o").into());
    let Term::Literal(literal) = &triple.object else {
        panic!("expected a literal");
    };
    assert_eq!(literal.datatype(), xsd::STRING);

    let out = TurtleSerializer::new()
        .with_prefix("ex", "http://example.org/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(out, input);
}

#[test]
fn collection_expands_to_first_rest_nil() {
    let input = "@prefix : <http://ex/> .  :s :p ( :a :b :c ) .";
    let graph = TurtleParser::new().parse(input).unwrap();
    assert_eq!(graph.len(), 7);

    let first = rdf::FIRST.into_owned();
    let rest = rdf::REST.into_owned();
    assert_eq!(graph.triples_for_predicate(&first).count(), 3);
    assert_eq!(graph.triples_for_predicate(&rest).count(), 3);
    assert_eq!(
        graph
            .triples_for_predicate(&rest)
            .filter(|t| t.object == rdf::NIL.into_owned().into())
            .count(),
        1
    );
    let outer: Vec<_> = graph.triples_for_subject(&ex("s").into()).collect();
    assert_eq!(outer.len(), 1);
    assert!(matches!(outer[0].object, Term::BlankNode(_)));

    let out = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(out, "@prefix : <http://ex/> .\n:s :p ( :a :b :c ) .\n");
}

#[test]
fn blank_node_inlining() {
    let mut graph = Graph::new();
    let b = BlankNode::default();
    graph.insert(Triple::new(ex("s"), ex("p"), b.clone()));
    graph.insert(Triple::new(b.clone(), ex("q"), Literal::from(1)));
    graph.insert(Triple::new(b, ex("r"), Literal::from(2)));

    let out = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(out, "@prefix : <http://ex/> .\n:s :p [ :q 1 ; :r 2 ] .\n");
}

#[test]
fn fragment_references_without_prefixes() {
    let mut graph = Graph::new();
    graph.insert(Triple::new(
        nn("http://ex.org/doc#x"),
        nn("http://ex.org/doc#p"),
        nn("http://ex.org/doc#y"),
    ));
    let out = TurtleSerializer::new()
        .with_base_iri("http://ex.org/doc")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(out, "<#x> <#p> <#y> .\n");
}

#[test]
fn permissive_sparql_style_parse() {
    let input = "PREFIX ex: <http://e/>  ex:s ex:p \"x\"";
    let flags = ParseFlags {
        allow_prefix_without_at_sign: true,
        allow_missing_final_dot: true,
        ..ParseFlags::default()
    };
    let graph = TurtleParser::new().with_flags(flags).parse(input).unwrap();
    assert_eq!(graph.len(), 1);
    assert!(graph.contains(&Triple::new(
        nn("http://e/s"),
        nn("http://e/p"),
        Literal::new_simple_literal("x"),
    )));

    assert!(TurtleParser::new().parse(input).is_err());
}

#[test]
fn trig_named_graph() {
    let input = "@prefix : <http://ex/> . :g { :s :p :o . }";
    let dataset = TriGParser::new().parse(input).unwrap();
    assert!(dataset.default_graph().is_empty());
    assert_eq!(dataset.named_graphs().count(), 1);
    let name = NamedOrBlankNode::from(ex("g"));
    let graph = dataset.graph(&name).unwrap();
    assert!(graph.contains(&Triple::new(ex("s"), ex("p"), ex("o"))));

    let error = TurtleParser::new().parse(input).unwrap_err();
    assert!(matches!(
        error.kind(),
        SyntaxErrorKind::NamedGraphInTurtle
    ));

    let out = TriGSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_dataset(&dataset)
        .unwrap();
    assert_eq!(out, "@prefix : <http://ex/> .\n:g {\n\t:s :p :o .\n}\n");
}

#[test]
fn strict_round_trip_without_blank_nodes() {
    let mut graph = Graph::new();
    graph.insert(Triple::new(ex("s"), rdf::TYPE, ex("T")));
    graph.insert(Triple::new(ex("s"), ex("p"), Literal::from(42)));
    graph.insert(Triple::new(ex("s"), ex("p"), Literal::from(true)));
    graph.insert(Triple::new(
        ex("s"),
        ex("q"),
        Literal::new_language_tagged_literal("hê\"llo\n", "en-us").unwrap(),
    ));
    graph.insert(Triple::new(
        ex("t"),
        ex("p"),
        Literal::new_typed_literal("5", xsd::LONG),
    ));

    let out = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    let back = TurtleParser::new().parse(&out).unwrap();
    assert_eq!(back, graph);
}

#[test]
fn encode_after_decode_is_a_fixed_point() {
    let input = r#"@prefix : <http://ex/> .
# a comment
:s :p ( 1 2 ) ;
   :q [ :r "v"@en ] .
:a :b _:shared , 3.5 .
:c :d _:shared .
_:shared :e true .
"#;
    let parser = TurtleParser::new();
    let serializer = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap();
    let once = serializer
        .serialize_graph(&parser.parse(input).unwrap())
        .unwrap();
    let twice = serializer
        .serialize_graph(&parser.parse(&once).unwrap())
        .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn base_invariance_for_absolute_documents() {
    let input = "<http://e/s> <http://e/p> <http://e/o> .";
    let with_base = TurtleParser::new()
        .with_base_iri("http://elsewhere.example/")
        .unwrap()
        .parse(input)
        .unwrap();
    let without_base = TurtleParser::new().parse(input).unwrap();
    assert_eq!(with_base, without_base);
}

#[test]
fn relativization_round_trips_through_the_base() {
    let mut graph = Graph::new();
    graph.insert(Triple::new(
        nn("http://ex.org/dir/other"),
        nn("http://ex.org/vocab#p"),
        nn("http://ex.org/dir/sub/x"),
    ));
    let out = TurtleSerializer::new()
        .with_base_iri("http://ex.org/dir/doc")
        .unwrap()
        .with_relativization(IriRelativization::LOCAL)
        .serialize_graph(&graph)
        .unwrap();
    assert!(out.contains("<other>"));
    assert!(out.contains("<sub/x>"));
    let back = TurtleParser::new()
        .with_base_iri("http://ex.org/dir/doc")
        .unwrap()
        .parse(&out)
        .unwrap();
    assert_eq!(back, graph);
}

#[test]
fn shared_blank_nodes_are_labelled_not_inlined() {
    let mut graph = Graph::new();
    let b = BlankNode::default();
    graph.insert(Triple::new(ex("s"), ex("p"), b.clone()));
    graph.insert(Triple::new(ex("t"), ex("p"), b.clone()));
    graph.insert(Triple::new(b, ex("q"), Literal::from(1)));

    let out = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(out.matches("_:b0").count(), 3);

    let back = TurtleParser::new().parse(&out).unwrap();
    assert_eq!(back.len(), 3);
    let s_object = &back
        .triples_for_subject(&ex("s").into())
        .next()
        .unwrap()
        .object;
    let t_object = &back
        .triples_for_subject(&ex("t").into())
        .next()
        .unwrap()
        .object;
    assert_eq!(s_object, t_object);
    assert!(matches!(s_object, Term::BlankNode(_)));
}

#[test]
fn blank_node_cycles_keep_labels() {
    let mut graph = Graph::new();
    let b1 = BlankNode::default();
    let b2 = BlankNode::default();
    graph.insert(Triple::new(b1.clone(), ex("p"), b2.clone()));
    graph.insert(Triple::new(b2, ex("p"), b1));

    let out = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap()
        .serialize_graph(&graph)
        .unwrap();
    assert!(out.contains("_:b0"));
    assert!(out.contains("_:b1"));
    let back = TurtleParser::new().parse(&out).unwrap();
    assert_eq!(back.len(), 2);
}

#[test]
fn nested_structures_round_trip() {
    let input = "@prefix : <http://ex/> .\n:s :p ( :a ( :b ) [ :q \"v\" ] ) .\n";
    let parser = TurtleParser::new();
    let serializer = TurtleSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap();
    let graph = parser.parse(input).unwrap();
    let out = serializer.serialize_graph(&graph).unwrap();
    assert_eq!(out, "@prefix : <http://ex/> .\n:s :p ( :a ( :b ) [ :q \"v\" ] ) .\n");
}

#[test]
fn string_escapes_are_decoded_by_the_parser() {
    let graph = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> \"\\u0041\\n\\U00010348\" .")
        .unwrap();
    let triple = graph.iter().next().unwrap();
    let Term::Literal(literal) = &triple.object else {
        panic!("expected a literal");
    };
    assert_eq!(literal.value(), "A\n\u{10348}");
}

#[test]
fn malformed_escapes_are_rejected() {
    let error = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> \"\\q\" .")
        .unwrap_err();
    assert!(matches!(error.kind(), SyntaxErrorKind::MalformedEscape(_)));

    let error = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> \"\\uZZZZ\" .")
        .unwrap_err();
    assert!(matches!(error.kind(), SyntaxErrorKind::MalformedEscape(_)));
}

#[test]
fn unknown_prefixes_surface_or_heal() {
    let input = "foaf:a foaf:b foaf:c .";
    let error = TurtleParser::new().parse(input).unwrap_err();
    assert!(matches!(error.kind(), SyntaxErrorKind::UnknownPrefix(p) if p.as_str() == "foaf"));

    let flags = ParseFlags {
        auto_add_common_prefixes: true,
        ..ParseFlags::default()
    };
    let graph = TurtleParser::new().with_flags(flags).parse(input).unwrap();
    assert!(graph.contains(&Triple::new(
        nn("http://xmlns.com/foaf/0.1/a"),
        nn("http://xmlns.com/foaf/0.1/b"),
        nn("http://xmlns.com/foaf/0.1/c"),
    )));
}

#[test]
fn barewords_need_the_flag_and_a_base() {
    let input = "s p o .";
    let flags = ParseFlags {
        allow_identifiers_without_colon: true,
        ..ParseFlags::default()
    };
    let graph = TurtleParser::new()
        .with_flags(flags)
        .with_base_iri("http://e/")
        .unwrap()
        .parse(input)
        .unwrap();
    assert!(graph.contains(&Triple::new(nn("http://e/s"), nn("http://e/p"), nn("http://e/o"))));

    let error = TurtleParser::new()
        .with_flags(flags)
        .parse(input)
        .unwrap_err();
    assert!(matches!(
        error.kind(),
        SyntaxErrorKind::RelativeIriWithoutBase(_)
    ));

    assert!(TurtleParser::new().parse(input).is_err());
}

#[test]
fn relative_iris_need_a_base() {
    let error = TurtleParser::new().parse("<s> <p> <o> .").unwrap_err();
    assert!(matches!(
        error.kind(),
        SyntaxErrorKind::RelativeIriWithoutBase(_)
    ));
    let position = error.position();
    assert_eq!(position.line, 1);
    assert_eq!(position.column, 1);
}

#[test]
fn base_changes_apply_to_subsequent_statements() {
    let input = "@base <http://a/> . <s> <p> <o> . @base <http://b/> . <s2> <p> <o> .";
    let graph = TurtleParser::new().parse(input).unwrap();
    assert!(graph
        .triples_for_subject(&nn("http://a/s").into())
        .next()
        .is_some());
    assert!(graph
        .triples_for_subject(&nn("http://b/s2").into())
        .next()
        .is_some());
}

#[test]
fn blank_node_labels_are_scoped_to_the_document() {
    let graph = TurtleParser::new()
        .parse("_:x <http://e/p> _:x .")
        .unwrap();
    let triple = graph.iter().next().unwrap();
    let NamedOrBlankNode::BlankNode(subject) = &triple.subject else {
        panic!("expected a blank node");
    };
    assert_eq!(&triple.object, &Term::BlankNode(subject.clone()));

    // the same label in another document is a different node
    let other = TurtleParser::new()
        .parse("_:x <http://e/p> _:x .")
        .unwrap();
    let other_triple = other.iter().next().unwrap();
    assert_ne!(other_triple.subject, triple.subject);
}

#[test]
fn language_tags_are_lowercased() {
    let graph = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> \"x\"@EN-US .")
        .unwrap();
    let Term::Literal(literal) = &graph.iter().next().unwrap().object else {
        panic!("expected a literal");
    };
    assert_eq!(literal.language(), Some("en-us"));
    assert_eq!(literal.datatype(), rdf::LANG_STRING);
}

#[test]
fn numeric_and_boolean_literals() {
    let graph = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> 42 , 3.14 , true .")
        .unwrap();
    let objects: Vec<_> = graph
        .objects_for_subject_predicate(&nn("http://e/s").into(), &nn("http://e/p"))
        .cloned()
        .collect();
    assert!(objects.contains(&Literal::new_typed_literal("42", xsd::INTEGER).into()));
    assert!(objects.contains(&Literal::new_typed_literal("3.14", xsd::DECIMAL).into()));
    assert!(objects.contains(&Literal::new_typed_literal("true", xsd::BOOLEAN).into()));
}

#[test]
fn long_strings_span_lines() {
    let graph = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> \"\"\"line1\nline2\"\"\" .")
        .unwrap();
    let Term::Literal(literal) = &graph.iter().next().unwrap().object else {
        panic!("expected a literal");
    };
    assert_eq!(literal.value(), "line1\nline2");
}

#[test]
fn property_list_as_subject() {
    let graph = TurtleParser::new()
        .parse("[ <http://e/p> <http://e/o> ] .")
        .unwrap();
    assert_eq!(graph.len(), 1);
    assert!(matches!(
        graph.iter().next().unwrap().subject,
        NamedOrBlankNode::BlankNode(_)
    ));
}

#[test]
fn missing_statement_dot() {
    let input = "<http://e/s> <http://e/p> <http://e/o>";
    assert!(TurtleParser::new().parse(input).is_err());
    let graph = TurtleParser::new().lenient().parse(input).unwrap();
    assert_eq!(graph.len(), 1);
}

#[test]
fn trig_graph_keyword_and_default_graph_block() {
    let dataset = TriGParser::new()
        .parse("GRAPH <http://e/g> { <http://e/s> <http://e/p> <http://e/o> }")
        .unwrap();
    assert_eq!(dataset.named_graphs().count(), 1);
    assert_eq!(dataset.len(), 1);

    let dataset = TriGParser::new()
        .parse("{ <http://e/s> <http://e/p> <http://e/o> . }")
        .unwrap();
    assert_eq!(dataset.default_graph().len(), 1);
    assert_eq!(dataset.named_graphs().count(), 0);
}

#[test]
fn trig_dataset_round_trip_with_shared_blank_node() {
    let input = "@prefix : <http://ex/> .\n:s :p _:b .\n:g {\n\t_:b :q \"v\" .\n}\n";
    let parser = TriGParser::new();
    let serializer = TriGSerializer::new()
        .with_prefix("", "http://ex/")
        .unwrap();
    let dataset = parser.parse(input).unwrap();
    let once = serializer.serialize_dataset(&dataset).unwrap();
    let twice = serializer
        .serialize_dataset(&parser.parse(&once).unwrap())
        .unwrap();
    assert_eq!(once, twice);
    // the node shared between graphs keeps one label across both
    assert_eq!(once.matches("_:b0").count(), 2);
}

#[test]
fn empty_collection_is_nil() {
    let graph = TurtleParser::new()
        .parse("<http://e/s> <http://e/p> ( ) .")
        .unwrap();
    assert_eq!(graph.len(), 1);
    assert_eq!(
        graph.iter().next().unwrap().object,
        rdf::NIL.into_owned().into()
    );
}

#[test]
fn generated_prefixes_compact_unknown_namespaces() {
    let mut graph = Graph::new();
    graph.insert(Triple::new(
        nn("http://unknown.example/ns#s"),
        nn("http://unknown.example/ns#p"),
        nn("http://unknown.example/ns#o"),
    ));
    let out = TurtleSerializer::new()
        .generate_missing_prefixes(true)
        .serialize_graph(&graph)
        .unwrap();
    assert_eq!(
        out,
        "@prefix ns0: <http://unknown.example/ns#> .\nns0:s ns0:p ns0:o .\n"
    );
}
