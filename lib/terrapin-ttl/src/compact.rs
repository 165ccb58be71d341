//! IRI compaction for the encoder: for every IRI occurrence, pick the most
//! concise legal rendering among fragment shorthand, relative reference,
//! prefixed name and absolute form, and remember which prefixes were used so
//! the header can declare exactly those.

use crate::iri::{relativize_iri, IriRelativization};
use crate::lexer::{can_be_escaped_in_local_name, is_possible_pn_chars, is_possible_pn_chars_u};
use crate::namespaces::{is_valid_local_name, split_iri, Namespaces};
use indexmap::IndexSet;
use oxiri::Iri;
use std::collections::HashSet;

pub(crate) struct IriCompactor {
    namespaces: Namespaces,
    base: Option<Iri<String>>,
    relativization: IriRelativization,
    generate_missing_prefixes: bool,
    use_numeric_local_names: bool,
    render_fragments_as_prefixed: bool,
    used_prefixes: IndexSet<String>,
    warned_namespaces: HashSet<&'static str>,
}

impl IriCompactor {
    pub fn new(
        namespaces: Namespaces,
        base: Option<Iri<String>>,
        relativization: IriRelativization,
        generate_missing_prefixes: bool,
        use_numeric_local_names: bool,
        render_fragments_as_prefixed: bool,
    ) -> Self {
        Self {
            namespaces,
            base,
            relativization,
            generate_missing_prefixes,
            use_numeric_local_names,
            render_fragments_as_prefixed,
            used_prefixes: IndexSet::new(),
            warned_namespaces: HashSet::new(),
        }
    }

    /// The table backing compaction: custom prefixes in caller order followed
    /// by generated ones in creation order.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The prefixes actually used by compaction so far, in first-use order.
    pub fn used_prefixes(&self) -> &IndexSet<String> {
        &self.used_prefixes
    }

    /// Renders `iri`, choosing in order: fragment shorthand, relative
    /// reference, prefixed name, absolute form.
    pub fn compact(&mut self, iri: &str) -> String {
        self.warn_on_https_vocabulary(iri);
        if let Some(base) = &self.base {
            if !self.render_fragments_as_prefixed {
                let base_str = base.as_str();
                let document = match base_str.find('#') {
                    Some(cut) => &base_str[..cut],
                    None => base_str,
                };
                if let Some(fragment) = iri
                    .strip_prefix(document)
                    .and_then(|rest| rest.strip_prefix('#'))
                {
                    return format!("<#{fragment}>");
                }
            }
            if let Some(reference) = relativize_iri(iri, base, &self.relativization) {
                return format!("<{reference}>");
            }
        }
        if let Some(prefixed) = self.try_prefixed_name(iri) {
            return prefixed;
        }
        format!("<{iri}>")
    }

    fn try_prefixed_name(&mut self, iri: &str) -> Option<String> {
        let allow_digit = self.use_numeric_local_names;
        if self.generate_missing_prefixes
            && self.namespaces.prefix_for(iri, allow_digit).is_none()
        {
            if let Some((namespace, local)) = split_iri(iri) {
                if (namespace.ends_with('/') || namespace.ends_with('#'))
                    && !namespace.ends_with("://")
                    && !local.is_empty()
                    && is_valid_local_name(local, allow_digit)
                {
                    self.namespaces.get_or_generate_prefix(namespace, None);
                }
            }
        }
        let (prefix, local) = self.namespaces.prefix_for(iri, allow_digit)?;
        let prefix = prefix.to_owned();
        let local = escape_local_name(local)?;
        self.used_prefixes.insert(prefix.clone());
        Some(format!("{prefix}:{local}"))
    }

    fn warn_on_https_vocabulary(&mut self, iri: &str) {
        if let Some(canonical) = Namespaces::canonical_http_twin(iri) {
            if self.warned_namespaces.insert(canonical) {
                tracing::warn!(
                    "<{iri}> uses https:// for the well-known vocabulary <{canonical}>, whose canonical form uses http://"
                );
            }
        }
    }
}

/// Renders a local name as PN_LOCAL, backslash-escaping reserved characters.
/// Returns `None` when a character cannot be written at all.
fn escape_local_name(value: &str) -> Option<String> {
    // [168s]  PN_LOCAL  ::=  (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Some(output);
    };
    if is_possible_pn_chars_u(first) || first == ':' || first.is_ascii_digit() {
        output.push(first);
    } else if can_be_escaped_in_local_name(first) {
        output.push('\\');
        output.push(first);
    } else {
        return None;
    }
    while let Some(c) = chars.next() {
        if is_possible_pn_chars(c) || c == ':' || (c == '.' && !chars.as_str().is_empty()) {
            output.push(c);
        } else if can_be_escaped_in_local_name(c) {
            output.push('\\');
            output.push(c);
        } else {
            return None;
        }
    }
    Some(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compactor(namespaces: Namespaces, base: Option<&str>) -> IriCompactor {
        IriCompactor::new(
            namespaces,
            base.map(|b| Iri::parse(b.to_owned()).unwrap()),
            IriRelativization::NONE,
            false,
            false,
            false,
        )
    }

    #[test]
    fn prefixed_name_wins_over_absolute() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("ex", "http://example.com/");
        let mut compactor = compactor(namespaces, None);
        assert_eq!(compactor.compact("http://example.com/x"), "ex:x");
        assert_eq!(compactor.compact("http://other.org/x"), "<http://other.org/x>");
        assert_eq!(
            compactor.used_prefixes().iter().collect::<Vec<_>>(),
            vec!["ex"]
        );
    }

    #[test]
    fn fragment_shorthand() {
        let mut compactor = compactor(Namespaces::new(), Some("http://ex.org/doc"));
        assert_eq!(compactor.compact("http://ex.org/doc#x"), "<#x>");
        assert_eq!(
            compactor.compact("http://ex.org/other#x"),
            "<http://ex.org/other#x>"
        );
        assert!(compactor.used_prefixes().is_empty());
    }

    #[test]
    fn fragments_as_prefixed_names() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("doc", "http://ex.org/doc#");
        let mut compactor = IriCompactor::new(
            namespaces,
            Some(Iri::parse("http://ex.org/doc".to_owned()).unwrap()),
            IriRelativization::NONE,
            false,
            false,
            true,
        );
        assert_eq!(compactor.compact("http://ex.org/doc#x"), "doc:x");
    }

    #[test]
    fn generates_missing_prefixes_for_clean_namespaces() {
        let mut compactor = IriCompactor::new(
            Namespaces::new(),
            None,
            IriRelativization::NONE,
            true,
            false,
            false,
        );
        assert_eq!(compactor.compact("http://example.com/ns#x"), "ns0:x");
        assert_eq!(compactor.compact("http://example.com/ns#y"), "ns0:y");
        // an empty local part does not trigger generation, but the namespace
        // interned above still applies
        assert_eq!(compactor.compact("http://example.com/ns#"), "ns0:");
        // an unknown namespace with no local part stays absolute
        assert_eq!(
            compactor.compact("http://example.com/other#"),
            "<http://example.com/other#>"
        );
    }

    #[test]
    fn numeric_local_names_are_gated() {
        let mut namespaces = Namespaces::new();
        namespaces.bind("ex", "http://example.com/");
        let mut with_numeric = IriCompactor::new(
            namespaces.clone(),
            None,
            IriRelativization::NONE,
            false,
            true,
            false,
        );
        assert_eq!(with_numeric.compact("http://example.com/123"), "ex:123");
        let mut without_numeric = compactor(namespaces, None);
        assert_eq!(
            without_numeric.compact("http://example.com/123"),
            "<http://example.com/123>"
        );
    }

    #[test]
    fn local_name_escaping() {
        assert_eq!(escape_local_name("simple"), Some("simple".to_owned()));
        assert_eq!(escape_local_name("with.dot"), Some("with.dot".to_owned()));
        assert_eq!(escape_local_name("end."), Some("end\\.".to_owned()));
        assert_eq!(escape_local_name("a,b"), Some("a\\,b".to_owned()));
        assert_eq!(escape_local_name("a b"), None);
    }

    #[test]
    fn relative_reference_rendering() {
        let mut compactor = IriCompactor::new(
            Namespaces::new(),
            Some(Iri::parse("http://ex.org/dir/doc".to_owned()).unwrap()),
            IriRelativization::LOCAL,
            false,
            false,
            false,
        );
        assert_eq!(compactor.compact("http://ex.org/dir/other"), "<other>");
        assert_eq!(compactor.compact("http://ex.org/x"), "<http://ex.org/x>");
    }
}
