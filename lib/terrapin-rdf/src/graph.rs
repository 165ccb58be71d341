//! In-memory implementation of [RDF graphs](https://www.w3.org/TR/rdf11-concepts/#dfn-graph).

use crate::named_node::NamedNode;
use crate::triple::{NamedOrBlankNode, Term, Triple};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use std::fmt;

const NO_IDS: &[usize] = &[];

/// An in-memory [RDF graph](https://www.w3.org/TR/rdf11-concepts/#dfn-graph).
///
/// Triples are kept in insertion order, duplicates are ignored, and each
/// triple position (subject, predicate, object) is indexed so lookups on any
/// filter combination stay O(1) amortized per candidate.
///
/// Usage example:
/// ```
/// use terrapin_rdf::{Graph, NamedNode, Triple};
///
/// let mut graph = Graph::new();
/// let ex = NamedNode::new("http://example.com")?;
/// let triple = Triple::new(ex.clone(), ex.clone(), ex.clone());
/// graph.insert(triple.clone());
///
/// let results: Vec<_> = graph.triples_for_subject(&ex.into()).collect();
/// assert_eq!(vec![&triple], results);
/// # Result::<_, terrapin_rdf::IriParseError>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: IndexSet<Triple>,
    by_subject: HashMap<NamedOrBlankNode, Vec<usize>>,
    by_predicate: HashMap<NamedNode, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all the triples contained by the graph, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// The number of triples in this graph.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Checks if this graph contains any triple.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Checks if the graph contains the given triple.
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Adds a triple to the graph.
    ///
    /// Returns `false` if the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        let subject = triple.subject.clone();
        let predicate = triple.predicate.clone();
        let object = triple.object.clone();
        let (id, added) = self.triples.insert_full(triple);
        if added {
            self.by_subject.entry(subject).or_default().push(id);
            self.by_predicate.entry(predicate).or_default().push(id);
            self.by_object.entry(object).or_default().push(id);
        }
        added
    }

    /// All triples with the given subject, in insertion order.
    pub fn triples_for_subject<'a>(
        &'a self,
        subject: &NamedOrBlankNode,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_subject
            .get(subject)
            .map_or(NO_IDS, Vec::as_slice)
            .iter()
            .filter_map(|&id| self.triples.get_index(id))
    }

    /// All triples with the given predicate, in insertion order.
    pub fn triples_for_predicate<'a>(
        &'a self,
        predicate: &NamedNode,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_predicate
            .get(predicate)
            .map_or(NO_IDS, Vec::as_slice)
            .iter()
            .filter_map(|&id| self.triples.get_index(id))
    }

    /// All triples with the given object, in insertion order.
    pub fn triples_for_object<'a>(
        &'a self,
        object: &Term,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_object
            .get(object)
            .map_or(NO_IDS, Vec::as_slice)
            .iter()
            .filter_map(|&id| self.triples.get_index(id))
    }

    /// The objects of all triples with the given subject and predicate.
    pub fn objects_for_subject_predicate<'a>(
        &'a self,
        subject: &'a NamedOrBlankNode,
        predicate: &'a NamedNode,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples_for_subject(subject)
            .filter(move |t| t.predicate == *predicate)
            .map(|t| &t.object)
    }

    /// All triples matching the given pattern, in insertion order.
    ///
    /// `None` in a position matches everything. The lookup starts from the
    /// smallest candidate index among the bound positions.
    pub fn find<'a>(
        &'a self,
        subject: Option<&'a NamedOrBlankNode>,
        predicate: Option<&'a NamedNode>,
        object: Option<&'a Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        let mut candidates: Option<&[usize]> = None;
        if let Some(subject) = subject {
            candidates = Some(self.by_subject.get(subject).map_or(NO_IDS, Vec::as_slice));
        }
        if let Some(predicate) = predicate {
            let ids = self
                .by_predicate
                .get(predicate)
                .map_or(NO_IDS, Vec::as_slice);
            if candidates.map_or(true, |c| ids.len() < c.len()) {
                candidates = Some(ids);
            }
        }
        if let Some(object) = object {
            let ids = self.by_object.get(object).map_or(NO_IDS, Vec::as_slice);
            if candidates.map_or(true, |c| ids.len() < c.len()) {
                candidates = Some(ids);
            }
        }
        let ids: Box<dyn Iterator<Item = usize> + 'a> = match candidates {
            Some(ids) => Box::new(ids.iter().copied()),
            None => Box::new(0..self.triples.len()),
        };
        ids.filter_map(|id| self.triples.get_index(id))
            .filter(move |t| {
                subject.map_or(true, |s| t.subject == *s)
                    && predicate.map_or(true, |p| t.predicate == *p)
                    && object.map_or(true, |o| t.object == *o)
            })
    }

    /// Returns a copy of this graph with the given triples removed,
    /// preserving insertion order of the remainder.
    pub fn without<'a>(&self, excluded: impl IntoIterator<Item = &'a Triple>) -> Self {
        let excluded: HashSet<&Triple> = excluded.into_iter().collect();
        self.iter()
            .filter(|t| !excluded.contains(t))
            .cloned()
            .collect()
    }

    /// Inserts all triples of `other` into this graph.
    pub fn merge(&mut self, other: &Self) {
        for triple in other.iter() {
            self.insert(triple.clone());
        }
    }
}

impl PartialEq for Graph {
    /// Set equality: insertion order is irrelevant.
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}

impl Eq for Graph {}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = indexmap::set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triple in self.iter() {
            writeln!(f, "{triple} .")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn insert_is_idempotent() {
        let mut graph = Graph::new();
        let triple = Triple::new(ex("s"), ex("p"), ex("o"));
        assert!(graph.insert(triple.clone()));
        assert!(!graph.insert(triple));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn find_uses_all_positions() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(ex("s"), ex("p"), ex("o")));
        graph.insert(Triple::new(ex("s"), ex("p"), Literal::from(1)));
        graph.insert(Triple::new(ex("s2"), ex("p"), ex("o")));

        let subject = ex("s").into();
        assert_eq!(graph.find(Some(&subject), None, None).count(), 2);
        let predicate = ex("p");
        assert_eq!(graph.find(None, Some(&predicate), None).count(), 3);
        let object = ex("o").into();
        assert_eq!(graph.find(Some(&subject), None, Some(&object)).count(), 1);
        assert_eq!(graph.find(None, None, None).count(), 3);
    }

    #[test]
    fn without_and_merge() {
        let mut graph = Graph::new();
        let kept = Triple::new(ex("s"), ex("p"), ex("o"));
        let dropped = Triple::new(ex("s"), ex("p"), Literal::from(1));
        graph.insert(kept.clone());
        graph.insert(dropped.clone());

        let rest = graph.without([&dropped]);
        assert_eq!(rest.len(), 1);
        assert!(rest.contains(&kept));

        let mut merged = rest.clone();
        merged.merge(&graph);
        assert_eq!(merged, graph);
    }

    #[test]
    fn equality_ignores_order() {
        let a = Triple::new(ex("s"), ex("p"), ex("o"));
        let b = Triple::new(ex("s2"), ex("p"), ex("o"));
        let g1: Graph = [a.clone(), b.clone()].into_iter().collect();
        let g2: Graph = [b, a].into_iter().collect();
        assert_eq!(g1, g2);
    }
}
