//! In-memory implementation of [RDF datasets](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).

use crate::graph::Graph;
use crate::triple::{GraphName, NamedOrBlankNode, Quad, Triple};
use indexmap::IndexMap;
use std::fmt;

/// An in-memory [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset):
/// a default graph plus named graphs keyed by IRI or blank node.
///
/// Named graphs are kept in first-appearance order.
///
/// Usage example:
/// ```
/// use terrapin_rdf::{Dataset, NamedNode, Quad};
///
/// let mut dataset = Dataset::new();
/// let ex = NamedNode::new("http://example.com")?;
/// dataset.insert(Quad::new(ex.clone(), ex.clone(), ex.clone(), ex.clone()));
///
/// assert!(dataset.default_graph().is_empty());
/// assert_eq!(1, dataset.named_graphs().count());
/// # Result::<_, terrapin_rdf::IriParseError>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    default: Graph,
    named: IndexMap<NamedOrBlankNode, Graph>,
}

impl Dataset {
    /// Creates a new empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default graph of this dataset.
    pub fn default_graph(&self) -> &Graph {
        &self.default
    }

    /// The default graph of this dataset, mutable.
    pub fn default_graph_mut(&mut self) -> &mut Graph {
        &mut self.default
    }

    /// The named graphs of this dataset with their names, in first-appearance
    /// order.
    pub fn named_graphs(&self) -> impl Iterator<Item = (&NamedOrBlankNode, &Graph)> {
        self.named.iter()
    }

    /// The graph with the given name, if it exists.
    pub fn graph(&self, name: &NamedOrBlankNode) -> Option<&Graph> {
        self.named.get(name)
    }

    /// The graph with the given name, created empty if absent.
    pub fn graph_mut(&mut self, name: NamedOrBlankNode) -> &mut Graph {
        self.named.entry(name).or_default()
    }

    /// Adds a quad to the dataset.
    ///
    /// Returns `false` if the triple was already present in that graph.
    pub fn insert(&mut self, quad: Quad) -> bool {
        let Quad {
            subject,
            predicate,
            object,
            graph_name,
        } = quad;
        let triple = Triple {
            subject,
            predicate,
            object,
        };
        match graph_name {
            GraphName::DefaultGraph => self.default.insert(triple),
            GraphName::NamedNode(name) => self
                .graph_mut(NamedOrBlankNode::NamedNode(name))
                .insert(triple),
            GraphName::BlankNode(name) => self
                .graph_mut(NamedOrBlankNode::BlankNode(name))
                .insert(triple),
        }
    }

    /// All quads of the dataset: the default graph first, then each named
    /// graph in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = Quad> + '_ {
        self.default
            .iter()
            .map(|t| t.clone().in_graph(GraphName::DefaultGraph))
            .chain(self.named.iter().flat_map(|(name, graph)| {
                graph.iter().map(move |t| {
                    t.clone().in_graph(GraphName::from(name.clone()))
                })
            }))
    }

    /// The total number of triples across all graphs.
    pub fn len(&self) -> usize {
        self.default.len() + self.named.values().map(Graph::len).sum::<usize>()
    }

    /// Checks if the dataset contains any triple in any graph.
    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.named.values().all(Graph::is_empty)
    }
}

impl PartialEq for Dataset {
    /// Graph-by-graph set equality: graph registration order is irrelevant.
    fn eq(&self, other: &Self) -> bool {
        self.default == other.default && self.named == other.named
    }
}

impl Eq for Dataset {}

impl FromIterator<Quad> for Dataset {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut dataset = Self::new();
        dataset.extend(iter);
        dataset
    }
}

impl Extend<Quad> for Dataset {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for quad in self.iter() {
            writeln!(f, "{quad} .")?;
        }
        Ok(())
    }
}
