//! IRI reference resolution and configurable relativization.
//!
//! Resolution follows RFC 3986 §5 through `oxiri`. Relativization is the
//! inverse: given an absolute IRI and a base, find the shortest reference
//! that resolves back to the IRI, subject to a [`IriRelativization`] policy.
//! Every produced reference is verified by resolving it against the base
//! before it is returned, so `resolve(relativize(iri)) == iri` holds by
//! construction.

use oxiri::{Iri, IriParseError};
use terrapin_rdf::NamedNode;

/// An error raised while turning an IRI reference into an absolute IRI.
#[derive(Debug, thiserror::Error)]
pub enum IriResolveError {
    /// The reference is relative and no base IRI is available.
    #[error("the IRI reference is relative and no base IRI is available")]
    NoBaseIri,
    /// The reference is not a valid IRI.
    #[error(transparent)]
    InvalidIri(#[from] IriParseError),
}

/// Resolves `reference` against `base` per RFC 3986 §5.
///
/// A reference that carries a scheme is only validated; a relative reference
/// without a base fails with [`IriResolveError::NoBaseIri`].
pub fn resolve_iri(
    reference: &str,
    base: Option<&Iri<String>>,
) -> Result<NamedNode, IriResolveError> {
    if has_scheme(reference) {
        Ok(NamedNode::new(reference)?)
    } else {
        match base {
            Some(base) => Ok(NamedNode::new_unchecked(
                base.resolve(reference)?.into_inner(),
            )),
            None => Err(IriResolveError::NoBaseIri),
        }
    }
}

/// Checks whether `reference` starts with a `scheme:` part, i.e. is not a
/// relative reference.
pub(crate) fn has_scheme(reference: &str) -> bool {
    let mut chars = reference.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return false,
        }
    }
    false
}

/// Policy for [`relativize_iri`]: how far a reference may stray from the base
/// before the absolute form is preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IriRelativization {
    enabled: bool,
    max_up_levels: Option<u32>,
    max_additional_length: Option<u32>,
    allow_sibling_directories: bool,
    allow_absolute_path: bool,
}

impl IriRelativization {
    /// Never relativize: every IRI is written absolute (fragment shorthand,
    /// which is handled separately by the encoder, stays available).
    pub const NONE: Self = Self {
        enabled: false,
        max_up_levels: Some(0),
        max_additional_length: Some(0),
        allow_sibling_directories: false,
        allow_absolute_path: false,
    };

    /// Only references inside the base document's directory and its
    /// children: no `../`, no siblings, no `/absolute` paths.
    pub const LOCAL: Self = Self {
        enabled: true,
        max_up_levels: Some(0),
        max_additional_length: None,
        allow_sibling_directories: false,
        allow_absolute_path: false,
    };

    /// Anything RFC 3986 can express, within the length budget.
    pub const FULL: Self = Self {
        enabled: true,
        max_up_levels: None,
        max_additional_length: None,
        allow_sibling_directories: true,
        allow_absolute_path: true,
    };

    /// Upper bound on `../` segments, `None` meaning unlimited.
    pub fn with_max_up_levels(mut self, levels: Option<u32>) -> Self {
        self.max_up_levels = levels;
        self
    }

    /// Rejects relative forms longer than the absolute IRI by more than this
    /// many characters, `None` meaning unlimited.
    pub fn with_max_additional_length(mut self, length: Option<u32>) -> Self {
        self.max_additional_length = length;
        self
    }

    /// Permits `../sibling/…` references that descend into a directory next
    /// to the base document's.
    pub fn with_sibling_directories(mut self, allow: bool) -> Self {
        self.allow_sibling_directories = allow;
        self
    }

    /// Permits `/path` references relative to the authority root.
    pub fn with_absolute_path(mut self, allow: bool) -> Self {
        self.allow_absolute_path = allow;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for IriRelativization {
    fn default() -> Self {
        Self::NONE
    }
}

/// Returns the shortest reference for `target` relative to `base` that the
/// policy admits, or `None` when the policy forbids relativization or no
/// admissible reference exists (different scheme or authority, constraint
/// violated, length budget exceeded).
pub fn relativize_iri(
    target: &str,
    base: &Iri<String>,
    options: &IriRelativization,
) -> Option<String> {
    if !options.enabled {
        return None;
    }
    let target_iri = Iri::parse(target).ok()?;
    if target_iri.scheme() != base.scheme() || target_iri.authority() != base.authority() {
        return None;
    }

    let query_suffix = target_iri.query().map_or(String::new(), |q| format!("?{q}"));
    let fragment_suffix = target_iri
        .fragment()
        .map_or(String::new(), |f| format!("#{f}"));

    let mut candidates: Vec<String> = Vec::new();
    if target_iri.path() == base.path() && target_iri.query() == base.query() {
        // same document: empty reference or fragment-only reference
        candidates.push(fragment_suffix.clone());
    }
    if let Some(rel_path) = relative_path(base.path(), target_iri.path(), options) {
        candidates.push(format!("{rel_path}{query_suffix}{fragment_suffix}"));
    }
    if options.allow_absolute_path && target_iri.path().starts_with('/') {
        candidates.push(format!(
            "{}{query_suffix}{fragment_suffix}",
            target_iri.path()
        ));
    }

    candidates.into_iter().find(|candidate| {
        if let Some(max) = options.max_additional_length {
            if candidate.len() > target.len() + max as usize {
                return false;
            }
        }
        // the reference must resolve back to the exact input
        base.resolve(candidate)
            .is_ok_and(|resolved| resolved.as_str() == target)
    })
}

/// Computes a path reference from the base path to the target path, within
/// the up-level and sibling constraints. Query and fragment are appended by
/// the caller.
fn relative_path(base_path: &str, target_path: &str, options: &IriRelativization) -> Option<String> {
    let base_segments: Vec<&str> = base_path.split('/').collect();
    let target_segments: Vec<&str> = target_path.split('/').collect();
    let (base_dir, _) = base_segments.split_at(base_segments.len() - 1);
    let (target_file, target_dir) = target_segments.split_last()?;

    let common = base_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(b, t)| b == t)
        .count();
    let ups = base_dir.len() - common;
    let mut downs: Vec<&str> = target_dir[common..].to_vec();
    downs.push(*target_file);

    if let Some(max) = options.max_up_levels {
        if ups as u64 > u64::from(max) {
            return None;
        }
    }
    if !options.allow_sibling_directories && ups > 0 && downs.len() >= 2 {
        return None;
    }

    let mut reference = String::new();
    for _ in 0..ups {
        reference.push_str("../");
    }
    let descent = downs.join("/");
    if descent.starts_with('/') {
        // would read as a network-path or rooted reference
        return None;
    }
    reference.push_str(&descent);
    if reference.is_empty() {
        // the target is the base directory itself
        reference.push('.');
    } else if ups == 0 && downs[0].contains(':') {
        // protect the first segment from being read as a scheme
        reference.insert_str(0, "./");
    }
    Some(reference)
}
