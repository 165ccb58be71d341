//! Shared encoder core for the Turtle and TriG serializers.
//!
//! Serialization runs in two passes per graph. The analysis pass groups
//! triples by subject and predicate in first-appearance order, counts blank
//! node references, detects well-formed rdf:first/rdf:rest chains and decides
//! which blank nodes can be inlined. The writing pass then emits subject
//! blocks, rendering consumed structures as `( … )` collections and `[ … ]`
//! property lists. The prefix header is written last, from the compactor's
//! record of the prefixes the body actually used.

use crate::compact::IriCompactor;
use crate::error::{Syntax, TurtleSerializeError};
use crate::iri::IriRelativization;
use crate::namespaces::Namespaces;
use indexmap::IndexMap;
use oxiri::Iri;
use std::collections::{HashMap, HashSet};
use terrapin_rdf::vocab::{rdf, xsd};
use terrapin_rdf::{BlankNode, Dataset, Graph, Literal, NamedNode, NamedOrBlankNode, Term};

#[derive(Clone)]
pub(crate) struct SerializeOptions {
    pub prefixes: Namespaces,
    pub base: Option<Iri<String>>,
    pub relativization: IriRelativization,
    pub generate_missing_prefixes: bool,
    pub use_numeric_local_names: bool,
    pub include_base_declaration: bool,
    pub render_fragments_as_prefixed: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            prefixes: Namespaces::new(),
            base: None,
            relativization: IriRelativization::NONE,
            generate_missing_prefixes: false,
            use_numeric_local_names: false,
            include_base_declaration: false,
            render_fragments_as_prefixed: false,
        }
    }
}

impl SerializeOptions {
    /// Inconsistent options are rejected before any output is produced.
    fn validate(&self) -> Result<(), TurtleSerializeError> {
        if self.base.is_none() {
            if self.include_base_declaration {
                return Err(TurtleSerializeError::Configuration(
                    "include_base_declaration requires a base IRI".into(),
                ));
            }
            if self.relativization.is_enabled() {
                return Err(TurtleSerializeError::Configuration(
                    "IRI relativization requires a base IRI".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Serializes a single graph as Turtle.
pub(crate) fn serialize_graph(
    graph: &Graph,
    options: &SerializeOptions,
) -> Result<String, TurtleSerializeError> {
    options.validate()?;
    let mut encoder = Encoder::new(options);
    let mut body = String::new();
    let barred = HashSet::new();
    encoder.write_graph_body(&mut body, graph, &barred, "");
    Ok(encoder.with_header(body, options))
}

/// Serializes a dataset as Turtle (default graph only, named graphs must be
/// empty) or TriG (named graphs in `name { … }` blocks).
pub(crate) fn serialize_dataset(
    dataset: &Dataset,
    options: &SerializeOptions,
    syntax: Syntax,
) -> Result<String, TurtleSerializeError> {
    options.validate()?;
    if syntax == Syntax::Turtle {
        if let Some((name, _)) = dataset.named_graphs().find(|(_, graph)| !graph.is_empty()) {
            return Err(TurtleSerializeError::GraphNotRepresentable(
                name.to_string(),
            ));
        }
    }
    let barred = barred_blank_nodes(dataset);
    let mut encoder = Encoder::new(options);
    let mut body = String::new();
    encoder.write_graph_body(&mut body, dataset.default_graph(), &barred, "");
    if syntax == Syntax::TriG {
        for (name, graph) in dataset.named_graphs() {
            let rendered_name = match name {
                NamedOrBlankNode::NamedNode(node) => encoder.compactor.compact(node.as_str()),
                NamedOrBlankNode::BlankNode(node) => encoder.label(node),
            };
            body.push_str(&rendered_name);
            body.push_str(" {\n");
            encoder.write_graph_body(&mut body, graph, &barred, "\t");
            body.push_str("}\n");
        }
    }
    Ok(encoder.with_header(body, options))
}

/// Blank nodes that must keep an explicit label whatever the per-graph
/// analysis says: graph names, and nodes shared between graphs.
fn barred_blank_nodes(dataset: &Dataset) -> HashSet<BlankNode> {
    let mut barred = HashSet::new();
    let mut seen_in_graph: HashMap<&BlankNode, usize> = HashMap::new();
    let graphs = std::iter::once(dataset.default_graph())
        .chain(dataset.named_graphs().map(|(_, graph)| graph));
    for (index, graph) in graphs.enumerate() {
        let mut in_this_graph = HashSet::new();
        for triple in graph.iter() {
            if let NamedOrBlankNode::BlankNode(node) = &triple.subject {
                in_this_graph.insert(node);
            }
            if let Term::BlankNode(node) = &triple.object {
                in_this_graph.insert(node);
            }
        }
        for node in in_this_graph {
            match seen_in_graph.insert(node, index) {
                Some(previous) if previous != index => {
                    barred.insert(node.clone());
                }
                _ => {}
            }
        }
    }
    for (name, _) in dataset.named_graphs() {
        if let NamedOrBlankNode::BlankNode(node) = name {
            barred.insert(node.clone());
        }
    }
    barred
}

type PredicateGroups<'g> = IndexMap<&'g NamedNode, Vec<&'g Term>>;

/// Everything the writing pass needs to know about one graph.
struct Analysis<'g> {
    groups: IndexMap<&'g NamedOrBlankNode, PredicateGroups<'g>>,
    bnode_subjects: HashMap<&'g BlankNode, &'g NamedOrBlankNode>,
    /// list head → items, for well-formed rdf:first/rdf:rest chains
    lists: HashMap<&'g BlankNode, Vec<&'g Term>>,
    /// cells (and pure heads) whose subject blocks are swallowed by `( … )`
    consumed: HashSet<&'g BlankNode>,
    /// object-position nodes rendered as `[ … ]` at their single reference
    inline: HashSet<&'g BlankNode>,
}

struct CellInfo<'g> {
    item: &'g Term,
    next: &'g Term,
    extra: bool,
}

fn analyze<'g>(graph: &'g Graph, barred: &HashSet<BlankNode>) -> Analysis<'g> {
    let mut groups: IndexMap<&'g NamedOrBlankNode, PredicateGroups<'g>> = IndexMap::new();
    let mut bnode_subjects = HashMap::new();
    let mut object_refs: HashMap<&'g BlankNode, usize> = HashMap::new();
    let mut parents: HashMap<&'g BlankNode, &'g NamedOrBlankNode> = HashMap::new();
    for triple in graph.iter() {
        groups
            .entry(&triple.subject)
            .or_insert_with(IndexMap::new)
            .entry(&triple.predicate)
            .or_insert_with(Vec::new)
            .push(&triple.object);
        if let NamedOrBlankNode::BlankNode(node) = &triple.subject {
            bnode_subjects.insert(node, &triple.subject);
        }
        if let Term::BlankNode(node) = &triple.object {
            *object_refs.entry(node).or_insert(0) += 1;
            parents.insert(node, &triple.subject);
        }
    }

    // candidate list cells: blank subjects carrying rdf:first and rdf:rest
    // exactly once each
    let mut cells: HashMap<&'g BlankNode, CellInfo<'g>> = HashMap::new();
    for (subject, predicates) in &groups {
        let NamedOrBlankNode::BlankNode(node) = subject else {
            continue;
        };
        if barred.contains(node) {
            continue;
        }
        let mut item = None;
        let mut next = None;
        let mut first_count = 0;
        let mut rest_count = 0;
        let mut extra = false;
        for (predicate, objects) in predicates {
            if **predicate == rdf::FIRST {
                first_count += objects.len();
                item = objects.first().copied();
            } else if **predicate == rdf::REST {
                rest_count += objects.len();
                next = objects.first().copied();
            } else {
                extra = true;
            }
        }
        if let (1, 1, Some(item), Some(next)) = (first_count, rest_count, item, next) {
            cells.insert(node, CellInfo { item, next, extra });
        }
    }

    let mut incoming_rest: HashMap<&'g BlankNode, usize> = HashMap::new();
    for info in cells.values() {
        if let Term::BlankNode(node) = info.next {
            if cells.contains_key(node) {
                *incoming_rest.entry(node).or_insert(0) += 1;
            }
        }
    }

    // walk the chains from each head; an invalid link abandons the whole
    // chain so nothing is silently dropped
    let mut lists = HashMap::new();
    let mut consumed = HashSet::new();
    for (&head, info) in &cells {
        if incoming_rest.get(head).copied().unwrap_or(0) != 0 {
            continue;
        }
        let head_refs = object_refs.get(head).copied().unwrap_or(0);
        let pure_head = !info.extra;
        // a pure head is emitted at its single reference site; an impure head
        // keeps its own block with the collection as subject
        if (pure_head && head_refs != 1) || (!pure_head && head_refs != 0) {
            continue;
        }
        let mut items = vec![info.item];
        let mut chain = vec![head];
        let mut cursor = info.next;
        let valid = loop {
            match cursor {
                Term::NamedNode(node) if *node == rdf::NIL => break true,
                Term::BlankNode(node) => {
                    let Some(cell) = cells.get(node) else {
                        break false;
                    };
                    if cell.extra
                        || object_refs.get(node).copied().unwrap_or(0) != 1
                        || chain.contains(&node)
                    {
                        break false;
                    }
                    chain.push(node);
                    items.push(cell.item);
                    cursor = cell.next;
                }
                _ => break false,
            }
        };
        // the head's one reference must come from outside its own chain,
        // otherwise the rendering site would be swallowed with the cells
        let self_referencing = pure_head
            && parents.get(head).is_some_and(|parent| {
                matches!(
                    parent,
                    NamedOrBlankNode::BlankNode(node) if chain.iter().any(|cell| *cell == node)
                )
            });
        if valid && !self_referencing {
            let kept = usize::from(!pure_head);
            for cell in &chain[kept..] {
                consumed.insert(*cell);
            }
            lists.insert(head, items);
        }
    }

    // inlining candidates: referenced exactly once, not barred, not part of
    // a compacted list
    let mut candidates: HashSet<&'g BlankNode> = HashSet::new();
    for (&node, &count) in &object_refs {
        if count == 1
            && !barred.contains(node)
            && !consumed.contains(node)
            && !lists.contains_key(node)
        {
            candidates.insert(node);
        }
    }
    // break reference cycles: every node on a cycle keeps its label, nodes
    // merely hanging off a cycle stay inlineable
    let mut removals: HashSet<&'g BlankNode> = HashSet::new();
    for &candidate in &candidates {
        let mut seen = vec![candidate];
        let mut cursor = candidate;
        loop {
            let Some(parent) = parents.get(cursor) else {
                break;
            };
            let NamedOrBlankNode::BlankNode(parent) = parent else {
                break;
            };
            if !candidates.contains(parent) {
                break;
            }
            if let Some(at) = seen.iter().position(|node| *node == parent) {
                removals.extend(seen[at..].iter().copied());
                break;
            }
            seen.push(parent);
            cursor = parent;
        }
    }
    let inline = candidates
        .into_iter()
        .filter(|node| !removals.contains(node))
        .collect();

    Analysis {
        groups,
        bnode_subjects,
        lists,
        consumed,
        inline,
    }
}

struct Encoder {
    compactor: IriCompactor,
    labels: HashMap<BlankNode, String>,
    label_count: usize,
}

impl Encoder {
    fn new(options: &SerializeOptions) -> Self {
        Self {
            compactor: IriCompactor::new(
                options.prefixes.clone(),
                options.base.clone(),
                options.relativization,
                options.generate_missing_prefixes,
                options.use_numeric_local_names,
                options.render_fragments_as_prefixed,
            ),
            labels: HashMap::new(),
            label_count: 0,
        }
    }

    /// Prepends the `@base`/`@prefix` header to the finished body.
    fn with_header(&self, body: String, options: &SerializeOptions) -> String {
        let mut out = String::new();
        if options.include_base_declaration {
            if let Some(base) = &options.base {
                out.push_str(&format!("@base <{}> .\n", base.as_str()));
            }
        }
        for (prefix, namespace) in self.compactor.namespaces().iter() {
            if self.compactor.used_prefixes().contains(prefix) {
                out.push_str(&format!("@prefix {prefix}: <{namespace}> .\n"));
            }
        }
        out.push_str(&body);
        out
    }

    fn write_graph_body(
        &mut self,
        out: &mut String,
        graph: &Graph,
        barred: &HashSet<BlankNode>,
        indent: &str,
    ) {
        let analysis = analyze(graph, barred);
        for (subject, predicates) in &analysis.groups {
            if let NamedOrBlankNode::BlankNode(node) = subject {
                if analysis.consumed.contains(node) || analysis.inline.contains(node) {
                    continue;
                }
            }
            self.write_subject_block(out, subject, predicates, &analysis, indent);
        }
    }

    fn write_subject_block<'g>(
        &mut self,
        out: &mut String,
        subject: &'g NamedOrBlankNode,
        predicates: &PredicateGroups<'g>,
        analysis: &Analysis<'g>,
        indent: &str,
    ) {
        let (subject_rendered, skip_list_predicates) = match subject {
            NamedOrBlankNode::NamedNode(node) => (self.compactor.compact(node.as_str()), false),
            NamedOrBlankNode::BlankNode(node) => match analysis.lists.get(node) {
                // an unreferenced list head with extra properties: the
                // collection itself is the subject
                Some(items) => (self.render_collection(items, analysis), true),
                None => (self.label(node), false),
            },
        };
        out.push_str(indent);
        out.push_str(&subject_rendered);
        let mut first_line = true;
        for (predicate, objects) in ordered_predicates(predicates, skip_list_predicates) {
            if first_line {
                out.push(' ');
                first_line = false;
            } else {
                out.push_str(" ;\n");
                out.push_str(indent);
                out.push('\t');
            }
            let rendered_predicate = if *predicate == rdf::TYPE {
                "a".to_owned()
            } else {
                self.compactor.compact(predicate.as_str())
            };
            out.push_str(&rendered_predicate);
            out.push(' ');
            let rendered_objects = objects
                .iter()
                .copied()
                .map(|object| self.render_term(object, analysis))
                .collect::<Vec<_>>()
                .join(" , ");
            out.push_str(&rendered_objects);
        }
        out.push_str(" .\n");
    }

    fn render_term(&mut self, term: &Term, analysis: &Analysis<'_>) -> String {
        match term {
            Term::NamedNode(node) => self.compactor.compact(node.as_str()),
            Term::Literal(literal) => self.render_literal(literal),
            Term::BlankNode(node) => {
                if let Some(items) = analysis.lists.get(node) {
                    if analysis.consumed.contains(node) {
                        return self.render_collection(items, analysis);
                    }
                }
                if analysis.inline.contains(node) {
                    self.render_inline(node, analysis)
                } else {
                    self.label(node)
                }
            }
        }
    }

    fn render_collection(&mut self, items: &[&Term], analysis: &Analysis<'_>) -> String {
        let rendered = items
            .iter()
            .copied()
            .map(|item| self.render_term(item, analysis))
            .collect::<Vec<_>>()
            .join(" ");
        format!("( {rendered} )")
    }

    fn render_inline(&mut self, node: &BlankNode, analysis: &Analysis<'_>) -> String {
        let Some(predicates) = analysis
            .bnode_subjects
            .get(node)
            .and_then(|subject| analysis.groups.get(*subject))
        else {
            return "[]".to_owned();
        };
        let mut parts = Vec::new();
        for (predicate, objects) in ordered_predicates(predicates, false) {
            let rendered_predicate = if *predicate == rdf::TYPE {
                "a".to_owned()
            } else {
                self.compactor.compact(predicate.as_str())
            };
            let rendered_objects = objects
                .iter()
                .copied()
                .map(|object| self.render_term(object, analysis))
                .collect::<Vec<_>>()
                .join(" , ");
            parts.push(format!("{rendered_predicate} {rendered_objects}"));
        }
        format!("[ {} ]", parts.join(" ; "))
    }

    fn render_literal(&mut self, literal: &Literal) -> String {
        let value = literal.value();
        let datatype = literal.datatype();
        let inline = if datatype == xsd::BOOLEAN {
            is_turtle_boolean(value)
        } else if datatype == xsd::INTEGER {
            is_turtle_integer(value)
        } else if datatype == xsd::DECIMAL {
            is_turtle_decimal(value)
        } else {
            false
        };
        if inline {
            return value.to_owned();
        }
        let mut out = String::new();
        write_turtle_string(&mut out, value);
        if let Some(language) = literal.language() {
            out.push('@');
            out.push_str(language);
        } else if !literal.is_plain() {
            out.push_str("^^");
            let rendered = self.compactor.compact(datatype.as_str());
            out.push_str(&rendered);
        }
        out
    }

    /// Stable `_:bN` labels in first-need order.
    fn label(&mut self, node: &BlankNode) -> String {
        if let Some(label) = self.labels.get(node) {
            return label.clone();
        }
        let label = format!("_:b{}", self.label_count);
        self.label_count += 1;
        self.labels.insert(node.clone(), label.clone());
        label
    }
}

/// `rdf:type` first (rendered as `a`), then the remaining predicates in
/// first-appearance order. `skip_list_predicates` drops rdf:first/rdf:rest
/// for collection-as-subject blocks.
fn ordered_predicates<'x, 'g>(
    predicates: &'x PredicateGroups<'g>,
    skip_list_predicates: bool,
) -> Vec<(&'g NamedNode, &'x Vec<&'g Term>)> {
    let mut out = Vec::with_capacity(predicates.len());
    for (predicate, objects) in predicates {
        if **predicate == rdf::TYPE {
            out.insert(0, (*predicate, objects));
        } else if !skip_list_predicates || (**predicate != rdf::FIRST && **predicate != rdf::REST)
        {
            out.push((*predicate, objects));
        }
    }
    out
}

fn is_turtle_boolean(value: &str) -> bool {
    matches!(value, "true" | "false")
}

fn is_turtle_integer(value: &str) -> bool {
    // [19]  INTEGER  ::=  [+-]? [0-9]+
    let mut value = value.as_bytes();
    if let Some(v) = value.strip_prefix(b"+") {
        value = v;
    } else if let Some(v) = value.strip_prefix(b"-") {
        value = v;
    }
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

fn is_turtle_decimal(value: &str) -> bool {
    // [20]  DECIMAL  ::=  [+-]? [0-9]* '.' [0-9]+
    let mut value = value.as_bytes();
    if let Some(v) = value.strip_prefix(b"+") {
        value = v;
    } else if let Some(v) = value.strip_prefix(b"-") {
        value = v;
    }
    while value.first().is_some_and(u8::is_ascii_digit) {
        value = &value[1..];
    }
    let Some(value) = value.strip_prefix(b".") else {
        return false;
    };
    !value.is_empty() && value.iter().all(u8::is_ascii_digit)
}

/// Escapes a literal's lexical form: control characters, `\` and `"` through
/// short escapes, other control characters as `\uXXXX`, and characters
/// outside the Basic Multilingual Plane as `\UXXXXXXXX`.
fn write_turtle_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0'..='\u{1F}' | '\u{7F}' => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c if u32::from(c) > 0xFFFF => {
                out.push_str(&format!("\\U{:08X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_numeric_forms() {
        assert!(is_turtle_integer("42"));
        assert!(is_turtle_integer("-7"));
        assert!(!is_turtle_integer("4.2"));
        assert!(!is_turtle_integer(" 42"));
        assert!(is_turtle_decimal("3.14"));
        assert!(is_turtle_decimal("-.5"));
        assert!(!is_turtle_decimal("3"));
        assert!(!is_turtle_decimal("3."));
    }

    #[test]
    fn string_escaping() {
        let mut out = String::new();
        write_turtle_string(&mut out, "a\"b\\c\nd\u{10348}");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\U00010348\"");
    }
}
