//! Bi-directional prefix ↔ namespace table with a bundled set of well-known
//! prefixes and generation of fresh prefixes for unknown namespaces.

use crate::lexer::{can_be_escaped_in_local_name, is_possible_pn_chars, is_possible_pn_chars_u};
use indexmap::IndexMap;

/// The prefixes every RDF developer expects to be able to use without
/// declaring them. Used to seed tables via [`Namespaces::well_known`] and to
/// heal undeclared prefixes under the `auto_add_common_prefixes` parsing
/// flag. Individual bindings can be overridden with [`Namespaces::bind`].
pub const WELL_KNOWN_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("schema", "http://schema.org/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("vcard", "http://www.w3.org/2006/vcard/ns#"),
    ("geo", "http://www.w3.org/2003/01/geo/wgs84_pos#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("void", "http://rdfs.org/ns/void#"),
    ("sh", "http://www.w3.org/ns/shacl#"),
];

/// An insertion-ordered mapping from prefix names to namespace IRIs, with
/// reverse lookup for encoding and a generator for fresh `nsN` prefixes.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    entries: IndexMap<String, String>,
    generated_count: usize,
}

impl Namespaces {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table seeded with [`WELL_KNOWN_PREFIXES`].
    pub fn well_known() -> Self {
        let mut namespaces = Self::new();
        for (prefix, iri) in WELL_KNOWN_PREFIXES {
            namespaces.bind(*prefix, *iri);
        }
        namespaces
    }

    /// Binds `prefix` to `namespace`, replacing any previous binding of the
    /// same prefix while keeping its position.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.entries.insert(prefix.into(), namespace.into());
    }

    /// The namespace bound to `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    /// All bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    /// A view of the current mapping.
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the binding best suited to compact `iri`: the longest bound
    /// namespace that is a proper prefix of `iri` such that the remainder is
    /// a legal (possibly escaped) local name. Ties are broken by longest
    /// namespace, then lexicographically smallest prefix name.
    ///
    /// `allow_leading_digit` mirrors the `allow_digit_in_local_name` /
    /// `use_numeric_local_names` switches of the codec.
    pub fn prefix_for<'a, 'b>(
        &'a self,
        iri: &'b str,
        allow_leading_digit: bool,
    ) -> Option<(&'a str, &'b str)> {
        let mut best: Option<(&str, &str)> = None;
        for (prefix, namespace) in &self.entries {
            if namespace.is_empty() || !iri.starts_with(namespace.as_str()) {
                continue;
            }
            let local = &iri[namespace.len()..];
            if !is_valid_local_name(local, allow_leading_digit) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_prefix, best_local)) => {
                    local.len() < best_local.len()
                        || (local.len() == best_local.len() && prefix.as_str() < best_prefix)
                }
            };
            if better {
                best = Some((prefix.as_str(), local));
            }
        }
        best
    }

    /// Returns the prefix bound to `namespace`, binding a new one if needed:
    /// `preferred` when given and free, otherwise the next free generated
    /// name (`ns0`, `ns1`, …).
    pub fn get_or_generate_prefix(
        &mut self,
        namespace: &str,
        preferred: Option<&str>,
    ) -> &str {
        let existing = self
            .entries
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(prefix, _)| prefix.clone());
        let prefix = match existing {
            Some(prefix) => prefix,
            None => {
                let name = match preferred {
                    Some(preferred)
                        if !preferred.is_empty() && !self.entries.contains_key(preferred) =>
                    {
                        preferred.to_owned()
                    }
                    _ => loop {
                        let candidate = format!("ns{}", self.generated_count);
                        self.generated_count += 1;
                        if !self.entries.contains_key(&candidate) {
                            break candidate;
                        }
                    },
                };
                self.entries.insert(name.clone(), namespace.to_owned());
                name
            }
        };
        // reborrow out of the map so the returned &str tracks self
        self.entries
            .get_full(prefix.as_str())
            .map(|(_, key, _)| key.as_str())
            .unwrap_or_default()
    }

    /// When `iri` uses `https://` for a vocabulary whose canonical well-known
    /// form is `http://`, returns the canonical namespace. Used to warn about
    /// probable misspellings of standard vocabularies.
    pub fn canonical_http_twin(iri: &str) -> Option<&'static str> {
        let rest = iri.strip_prefix("https://")?;
        WELL_KNOWN_PREFIXES.iter().find_map(|(_, namespace)| {
            let canonical_rest = namespace.strip_prefix("http://")?;
            rest.starts_with(canonical_rest).then_some(*namespace)
        })
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Namespaces {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut namespaces = Self::new();
        for (prefix, namespace) in iter {
            namespaces.bind(prefix, namespace);
        }
        namespaces
    }
}

/// Splits an IRI at its last `#` or `/`, returning `(namespace, local)`.
/// The namespace keeps the separator.
pub(crate) fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let cut = iri.rfind(['#', '/'])?;
    Some((&iri[..=cut], &iri[cut + 1..]))
}

/// Checks that `local` can be written as a PN_LOCAL, possibly with reserved
/// character escapes.
pub(crate) fn is_valid_local_name(local: &str, allow_leading_digit: bool) -> bool {
    let mut chars = local.chars().peekable();
    let mut first = true;
    while let Some(c) = chars.next() {
        let ok = if first {
            (c.is_ascii_digit() && allow_leading_digit)
                || is_possible_pn_chars_u(c)
                || c == ':'
                || can_be_escaped_in_local_name(c)
        } else if c == '.' {
            // dots are interior-only
            chars.peek().is_some()
        } else {
            is_possible_pn_chars(c) || c == ':' || can_be_escaped_in_local_name(c)
        };
        if !ok {
            return false;
        }
        first = false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_namespace_wins() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("a", "http://example.com/");
        namespaces.bind("b", "http://example.com/deep/");
        assert_eq!(
            namespaces.prefix_for("http://example.com/deep/x", false),
            Some(("b", "x"))
        );
        assert_eq!(
            namespaces.prefix_for("http://example.com/y", false),
            Some(("a", "y"))
        );
    }

    #[test]
    fn ties_break_lexicographically() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("z", "http://example.com/");
        namespaces.bind("a", "http://example.com/");
        assert_eq!(
            namespaces.prefix_for("http://example.com/x", false),
            Some(("a", "x"))
        );
    }

    #[test]
    fn illegal_local_names_are_skipped() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("ex", "http://example.com/");
        assert_eq!(namespaces.prefix_for("http://example.com/a b", false), None);
        assert_eq!(namespaces.prefix_for("http://example.com/1x", false), None);
        assert_eq!(
            namespaces.prefix_for("http://example.com/1x", true),
            Some(("ex", "1x"))
        );
        // empty local names are legal
        assert_eq!(
            namespaces.prefix_for("http://example.com/", false),
            Some(("ex", ""))
        );
    }

    #[test]
    fn generated_prefixes_skip_taken_names() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("ns0", "http://example.com/zero#");
        assert_eq!(
            namespaces.get_or_generate_prefix("http://example.com/one#", None),
            "ns1"
        );
        assert_eq!(
            namespaces.get_or_generate_prefix("http://example.com/one#", None),
            "ns1"
        );
        assert_eq!(
            namespaces.get_or_generate_prefix("http://example.com/two#", Some("two")),
            "two"
        );
    }

    #[test]
    fn well_known_table_is_overridable() {
        let mut namespaces = Namespaces::well_known();
        assert_eq!(
            namespaces.get("rdf"),
            Some("http://www.w3.org/1999/02/22-rdf-syntax-ns#")
        );
        namespaces.bind("rdf", "http://example.com/rdf#");
        assert_eq!(namespaces.get("rdf"), Some("http://example.com/rdf#"));
    }

    #[test]
    fn https_twin_detection() {
        assert_eq!(
            Namespaces::canonical_http_twin("https://schema.org/Person"),
            Some("http://schema.org/")
        );
        assert_eq!(
            Namespaces::canonical_http_twin("https://example.com/Person"),
            None
        );
        assert_eq!(
            Namespaces::canonical_http_twin("http://schema.org/Person"),
            None
        );
    }

    #[test]
    fn split_iri_at_separator() {
        assert_eq!(
            split_iri("http://example.com/ns#local"),
            Some(("http://example.com/ns#", "local"))
        );
        assert_eq!(
            split_iri("http://example.com/a/b"),
            Some(("http://example.com/a/", "b"))
        );
    }
}
