//! A [TriG](https://www.w3.org/TR/trig/) parser implemented by
//! [`TriGParser`] and a pretty-printing serializer implemented by
//! [`TriGSerializer`].
//!
//! TriG is Turtle plus named graph blocks; both entry points share the
//! Turtle machinery with graph blocks switched on.

use crate::error::{Syntax, TurtleSerializeError, TurtleSyntaxError};
use crate::iri::IriRelativization;
use crate::lexer::ParseFlags;
use crate::namespaces::Namespaces;
use crate::parser::DocumentParser;
use crate::serializer::{serialize_dataset, SerializeOptions};
use oxiri::{Iri, IriParseError};
use terrapin_rdf::Dataset;

/// A whole-document [TriG](https://www.w3.org/TR/trig/) parser.
///
/// ```
/// use terrapin_ttl::TriGParser;
///
/// let file = "@prefix ex: <http://example.com/> . ex:g { ex:s ex:p ex:o . }";
/// let dataset = TriGParser::new().parse(file)?;
/// assert!(dataset.default_graph().is_empty());
/// assert_eq!(1, dataset.named_graphs().count());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TriGParser {
    flags: ParseFlags,
    base: Option<Iri<String>>,
    prefixes: Namespaces,
}

impl TriGParser {
    /// Builds a new [`TriGParser`] with strict defaults.
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

    /// Turns on every permissive flag.
    #[inline]
    pub fn lenient(mut self) -> Self {
        self.flags = ParseFlags::lenient();
        self
    }

    /// Sets the base IRI used to resolve relative references.
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

    /// Parses a whole TriG document into a [`Dataset`]. Triples outside
    /// graph blocks land in the default graph.
    pub fn parse(&self, input: &str) -> Result<Dataset, TurtleSyntaxError> {
        Ok(self.parse_to_document(input)?.dataset)
    }

    /// Parses a whole TriG document, also returning the prefixes and base
    /// IRI that were in effect when the parse finished.
    pub fn parse_to_document(&self, input: &str) -> Result<TriGDocument, TurtleSyntaxError> {
        let parsed = DocumentParser::new(
            input,
            Syntax::TriG,
            self.flags,
            self.base.clone(),
            self.prefixes.clone(),
        )
        .parse()?;
        Ok(TriGDocument {
            dataset: parsed.quads.into_iter().collect(),
            prefixes: parsed.prefixes,
            base_iri: parsed.base.map(Iri::into_inner),
        })
    }
}

/// The result of [`TriGParser::parse_to_document`]: the dataset plus the
/// final prefix table and base IRI of the document.
#[derive(Debug)]
pub struct TriGDocument {
    pub dataset: Dataset,
    pub prefixes: Namespaces,
    pub base_iri: Option<String>,
}

/// A pretty-printing [TriG](https://www.w3.org/TR/trig/) serializer.
///
/// The default graph is written bare and first; named graphs follow in
/// first-appearance order, wrapped in `name { … }` blocks.
///
/// ```
/// use terrapin_rdf::{Dataset, NamedNode, Quad};
/// use terrapin_ttl::TriGSerializer;
///
/// let mut dataset = Dataset::new();
/// dataset.insert(Quad::new(
///     NamedNode::new("http://example.com/s")?,
///     NamedNode::new("http://example.com/p")?,
///     NamedNode::new("http://example.com/o")?,
///     NamedNode::new("http://example.com/g")?,
/// ));
/// let out = TriGSerializer::new()
///     .with_prefix("ex", "http://example.com/")?
///     .serialize_dataset(&dataset)?;
/// assert_eq!(
///     out,
///     "@prefix ex: <http://example.com/> .\nex:g {\n\tex:s ex:p ex:o .\n}\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TriGSerializer {
    options: SerializeOptions,
}

impl TriGSerializer {
    /// Builds a new [`TriGSerializer`].
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

    /// Writes a dataset as TriG.
    pub fn serialize_dataset(&self, dataset: &Dataset) -> Result<String, TurtleSerializeError> {
        serialize_dataset(dataset, &self.options, Syntax::TriG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrapin_rdf::{GraphName, NamedNode, Quad};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn default_graph_is_written_bare_and_first() {
        let mut dataset = Dataset::new();
        dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), ex("g")));
        dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), GraphName::DefaultGraph));
        let out = TriGSerializer::new()
            .with_prefix("ex", "http://example.com/")
            .unwrap()
            .serialize_dataset(&dataset)
            .unwrap();
        assert_eq!(
            out,
            "@prefix ex: <http://example.com/> .\nex:s ex:p ex:o .\nex:g {\n\tex:s ex:p ex:o .\n}\n"
        );
    }

    #[test]
    fn graph_names_can_be_blank_nodes() {
        let mut dataset = Dataset::new();
        let graph = terrapin_rdf::BlankNode::default();
        dataset.insert(Quad::new(ex("s"), ex("p"), ex("o"), graph));
        let out = TriGSerializer::new()
            .with_prefix("ex", "http://example.com/")
            .unwrap()
            .serialize_dataset(&dataset)
            .unwrap();
        assert_eq!(
            out,
            "@prefix ex: <http://example.com/> .\n_:b0 {\n\tex:s ex:p ex:o .\n}\n"
        );
    }
}
