use rand::random;
use std::fmt;

/// An owned RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// The common way to create a fresh blank node is [`BlankNode::default()`],
/// which mints a unique random identifier. Two blank nodes are equal if and
/// only if they carry the same identifier: labels read from a document are
/// parse-time artifacts, and the parser maps each document label to a fresh
/// node so identifiers never collide across documents.
///
/// It is also possible to create a blank node from an explicit identifier
/// using [`BlankNode::new()`]. The identifier must be valid according to the
/// N-Triples, Turtle and SPARQL `BLANK_NODE_LABEL` production.
///
/// The default string formatter returns an N-Triples, Turtle and SPARQL
/// compatible representation:
/// ```
/// use terrapin_rdf::BlankNode;
///
/// assert_eq!("_:a122", BlankNode::new("a122")?.to_string());
/// # Result::<_, terrapin_rdf::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct BlankNode {
    id: String,
}

impl BlankNode {
    /// Creates a blank node from an explicit identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        let id = id.into();
        validate_blank_node_identifier(&id)?;
        Ok(Self::new_unchecked(id))
    }

    /// Creates a blank node from an explicit identifier without validation.
    ///
    /// It is the caller's responsibility to ensure that `id` is a valid
    /// `BLANK_NODE_LABEL`. [`BlankNode::new()`] is the safe version of this
    /// constructor and should be used for untrusted data.
    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The identifier of this blank node.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.id
    }
}

impl Default for BlankNode {
    /// Mints a blank node with a unique random identifier.
    #[inline]
    fn default() -> Self {
        // The identifier must not start with a digit to stay valid in RDF/XML
        loop {
            let id: u128 = random();
            let str = format!("{id:x}");
            if matches!(str.as_bytes().first(), Some(b'a'..=b'f')) {
                return Self { id: str };
            }
        }
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

fn validate_blank_node_identifier(id: &str) -> Result<(), BlankNodeIdParseError> {
    let mut chars = id.chars();
    let front = chars.next().ok_or(BlankNodeIdParseError)?;
    // [141s]  BLANK_NODE_LABEL  ::=  '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
    if !is_possible_pn_chars_u(front) && !front.is_ascii_digit() {
        return Err(BlankNodeIdParseError);
    }
    let mut last: char = front;
    for c in chars {
        if !is_possible_pn_chars(c) && c != '.' {
            return Err(BlankNodeIdParseError);
        }
        last = c;
    }
    if last == '.' {
        return Err(BlankNodeIdParseError);
    }
    Ok(())
}

// [157s]  PN_CHARS_BASE  ::=  [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
fn is_possible_pn_chars_base(c: char) -> bool {
    matches!(c,
    'A'..='Z'
    | 'a'..='z'
    | '\u{00C0}'..='\u{00D6}'
    | '\u{00D8}'..='\u{00F6}'
    | '\u{00F8}'..='\u{02FF}'
    | '\u{0370}'..='\u{037D}'
    | '\u{037F}'..='\u{1FFF}'
    | '\u{200C}'..='\u{200D}'
    | '\u{2070}'..='\u{218F}'
    | '\u{2C00}'..='\u{2FEF}'
    | '\u{3001}'..='\u{D7FF}'
    | '\u{F900}'..='\u{FDCF}'
    | '\u{FDF0}'..='\u{FFFD}'
    | '\u{10000}'..='\u{EFFFF}')
}

// [158s]  PN_CHARS_U  ::=  PN_CHARS_BASE | '_'
fn is_possible_pn_chars_u(c: char) -> bool {
    is_possible_pn_chars_base(c) || c == '_'
}

// [160s]  PN_CHARS  ::=  PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
fn is_possible_pn_chars(c: char) -> bool {
    is_possible_pn_chars_u(c)
        || matches!(c,
        '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// An error raised during [`BlankNode`] identifier validation.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("the blank node identifier is invalid")]
pub struct BlankNodeIdParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validation() {
        assert!(BlankNode::new("a").is_ok());
        assert!(BlankNode::new("a.b").is_ok());
        assert!(BlankNode::new("0a").is_ok());
        assert!(BlankNode::new("").is_err());
        assert!(BlankNode::new("a.").is_err());
        assert!(BlankNode::new("a b").is_err());
    }

    #[test]
    fn default_is_unique() {
        assert_ne!(BlankNode::default(), BlankNode::default());
    }

    #[test]
    fn equality_is_by_identifier() {
        assert_eq!(BlankNode::new_unchecked("b0"), BlankNode::new_unchecked("b0"));
        assert_ne!(BlankNode::new_unchecked("b0"), BlankNode::new_unchecked("b1"));
    }
}
