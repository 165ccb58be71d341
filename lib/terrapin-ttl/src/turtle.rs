//! A [Turtle](https://www.w3.org/TR/turtle/) parser implemented by
//! [`TurtleParser`] and a pretty-printing serializer implemented by
//! [`TurtleSerializer`].

use crate::error::{Syntax, TurtleSerializeError, TurtleSyntaxError};
use crate::iri::IriRelativization;
use crate::lexer::ParseFlags;
use crate::namespaces::Namespaces;
use crate::parser::DocumentParser;
use crate::serializer::{serialize_graph, serialize_dataset, SerializeOptions};
use oxiri::{Iri, IriParseError};
use terrapin_rdf::{Dataset, Graph, Quad};

/// A whole-document [Turtle](https://www.w3.org/TR/turtle/) parser.
///
/// The parser value holds only configuration: it can be cloned freely and
/// reused across documents and threads. Per-document state (prefixes, base,
/// blank node labels) lives and dies with each [`parse`](Self::parse) call.
///
/// Count the number of people:
/// ```
/// use terrapin_rdf::vocab::rdf;
/// use terrapin_rdf::{NamedNode, Term};
/// use terrapin_ttl::TurtleParser;
///
/// let file = r#"@base <http://example.com/> .
/// @prefix schema: <http://schema.org/> .
/// <foo> a schema:Person ;
///     schema:name "Foo" .
/// <bar> a schema:Person ;
///     schema:name "Bar" ."#;
///
/// let graph = TurtleParser::new().parse(file)?;
/// let person = Term::from(NamedNode::new("http://schema.org/Person")?);
/// let count = graph
///     .triples_for_predicate(&rdf::TYPE.into_owned())
///     .filter(|t| t.object == person)
///     .count();
/// assert_eq!(2, count);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TurtleParser {
    flags: ParseFlags,
    base: Option<Iri<String>>,
    prefixes: Namespaces,
}

impl TurtleParser {
    /// Builds a new [`TurtleParser`] with strict defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the permissive flag set.
    #[inline]
    pub fn with_flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Turns on every permissive flag. Useful for real-world documents of
    /// dubious provenance.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.flags = ParseFlags::lenient();
        self
    }

    /// Sets the base IRI used to resolve relative references, typically the
    /// document's own URL.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Seeds a prefix, as if the document declared it.
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        let iri = Iri::parse(prefix_iri.into())?;
        self.prefixes.bind(prefix_name, iri.into_inner());
        Ok(self)
    }

    /// Seeds the bundled well-known prefixes (rdf, rdfs, xsd, …).
    #[inline]
    pub fn with_well_known_prefixes(mut self) -> Self {
        for (prefix, iri) in Namespaces::well_known().iter() {
            self.prefixes.bind(prefix, iri);
        }
        self
    }

    /// Parses a whole Turtle document into a [`Graph`].
    ///
    /// A TriG graph block in the input raises
    /// [`SyntaxErrorKind::NamedGraphInTurtle`](crate::SyntaxErrorKind::NamedGraphInTurtle).
    pub fn parse(&self, input: &str) -> Result<Graph, TurtleSyntaxError> {
        Ok(self.parse_to_document(input)?.graph)
    }

    /// Parses a whole Turtle document, also returning the prefixes and base
    /// IRI that were in effect when the parse finished.
    pub fn parse_to_document(&self, input: &str) -> Result<TurtleDocument, TurtleSyntaxError> {
        let parsed = DocumentParser::new(
            input,
            Syntax::Turtle,
            self.flags,
            self.base.clone(),
            self.prefixes.clone(),
        )
        .parse()?;
        Ok(TurtleDocument {
            graph: parsed.quads.into_iter().map(Quad::into_triple).collect(),
            prefixes: parsed.prefixes,
            base_iri: parsed.base.map(Iri::into_inner),
        })
    }
}

/// The result of [`TurtleParser::parse_to_document`]: the graph plus the
/// final prefix table and base IRI of the document.
#[derive(Debug)]
pub struct TurtleDocument {
    pub graph: Graph,
    pub prefixes: Namespaces,
    pub base_iri: Option<String>,
}

/// A pretty-printing [Turtle](https://www.w3.org/TR/turtle/) serializer.
///
/// Triples are grouped by subject, `rdf:type` is written `a` and hoisted
/// first, blank nodes and well-formed RDF lists are inlined where that does
/// not change the graph, and every IRI is compacted to a fragment reference,
/// relative reference, prefixed name or absolute IRI. Only the prefixes the
/// body uses are declared in the header.
///
/// ```
/// use terrapin_rdf::{Graph, Literal, NamedNode, Triple};
/// use terrapin_ttl::TurtleSerializer;
///
/// let mut graph = Graph::new();
/// graph.insert(Triple::new(
///     NamedNode::new("http://example.org/s")?,
///     NamedNode::new("http://example.org/p")?,
///     Literal::new_simple_literal("o"),
/// ));
/// let out = TurtleSerializer::new()
///     .with_prefix("ex", "http://example.org/")?
///     .serialize_graph(&graph)?;
/// assert_eq!(out, "@prefix ex: <http://example.org/> .\nex:s ex:p \"o\" .\n");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TurtleSerializer {
    options: SerializeOptions,
}

impl TurtleSerializer {
    /// Builds a new [`TurtleSerializer`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a prefix for compaction. Prefixes are declared in the header
    /// in the order given here, and only if the body uses them.
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        let iri = Iri::parse(prefix_iri.into())?;
        self.options.prefixes.bind(prefix_name, iri.into_inner());
        Ok(self)
    }

    /// Makes the bundled well-known prefixes available for compaction.
    #[inline]
    pub fn with_well_known_prefixes(mut self) -> Self {
        for (prefix, iri) in Namespaces::well_known().iter() {
            self.options.prefixes.bind(prefix, iri);
        }
        self
    }

    /// Sets the base IRI for relativization and fragment references.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.options.base = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Sets the relativization policy, [`IriRelativization::NONE`] by
    /// default.
    #[inline]
    pub fn with_relativization(mut self, relativization: IriRelativization) -> Self {
        self.options.relativization = relativization;
        self
    }

    /// Invents `nsN` prefixes for unknown namespaces that end in `/` or `#`.
    #[inline]
    pub fn generate_missing_prefixes(mut self, generate: bool) -> Self {
        self.options.generate_missing_prefixes = generate;
        self
    }

    /// Permits prefixed names whose local part starts with a digit.
    #[inline]
    pub fn use_numeric_local_names(mut self, allow: bool) -> Self {
        self.options.use_numeric_local_names = allow;
        self
    }

    /// Emits an `@base` header line. Requires a base IRI.
    #[inline]
    pub fn include_base_declaration(mut self, include: bool) -> Self {
        self.options.include_base_declaration = include;
        self
    }

    /// Renders IRIs in the base document's `#`-namespace as prefixed names
    /// instead of `<#fragment>` references.
    #[inline]
    pub fn render_fragments_as_prefixed(mut self, prefixed: bool) -> Self {
        self.options.render_fragments_as_prefixed = prefixed;
        self
    }

    /// Writes a graph as Turtle.
    pub fn serialize_graph(&self, graph: &Graph) -> Result<String, TurtleSerializeError> {
        serialize_graph(graph, &self.options)
    }

    /// Writes a dataset as Turtle. Fails with
    /// [`TurtleSerializeError::GraphNotRepresentable`] if any named graph is
    /// non-empty.
    pub fn serialize_dataset(&self, dataset: &Dataset) -> Result<String, TurtleSerializeError> {
        serialize_dataset(dataset, &self.options, Syntax::Turtle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrapin_rdf::{Literal, NamedNode, Triple};

    #[test]
    fn parse_exposes_prefixes_and_base() {
        let document = TurtleParser::new()
            .parse_to_document(
                "@base <http://example.com/> . @prefix ex: <http://example.org/> . <s> ex:p \"o\" .",
            )
            .unwrap();
        assert_eq!(document.graph.len(), 1);
        assert_eq!(document.base_iri.as_deref(), Some("http://example.com/"));
        assert_eq!(
            document.prefixes.get("ex"),
            Some("http://example.org/")
        );
    }

    #[test]
    fn serializer_declares_only_used_prefixes() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            NamedNode::new_unchecked("http://example.org/s"),
            NamedNode::new_unchecked("http://example.org/p"),
            Literal::new_simple_literal("o"),
        ));
        let out = TurtleSerializer::new()
            .with_prefix("ex", "http://example.org/")
            .unwrap()
            .with_prefix("unused", "http://unused.example/")
            .unwrap()
            .serialize_graph(&graph)
            .unwrap();
        assert_eq!(out, "@prefix ex: <http://example.org/> .\nex:s ex:p \"o\" .\n");
    }

    #[test]
    fn base_declaration_requires_base() {
        let error = TurtleSerializer::new()
            .include_base_declaration(true)
            .serialize_graph(&Graph::new())
            .unwrap_err();
        assert!(matches!(error, TurtleSerializeError::Configuration(_)));
    }
}
