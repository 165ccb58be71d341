//! Recursive-descent parser shared by the Turtle and TriG entry points,
//! with one token of lookahead over the [`Lexer`](crate::lexer::Lexer).
//!
//! The parser owns all per-document state: the mutable base IRI, the prefix
//! table, the blank-node label map (labels never leak out of a parse: each
//! document label is mapped to a freshly minted node) and the accumulated
//! quads in source order.

use crate::error::{Syntax, SyntaxErrorKind, TextPosition, TurtleSyntaxError};
use crate::iri::{resolve_iri, IriResolveError};
use crate::lexer::{Lexer, ParseFlags, Token, TokenKind};
use crate::namespaces::{Namespaces, WELL_KNOWN_PREFIXES};
use oxilangtag::LanguageTag;
use oxiri::Iri;
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::Chars;
use terrapin_rdf::vocab::{rdf, xsd};
use terrapin_rdf::{BlankNode, GraphName, Literal, NamedNode, NamedOrBlankNode, Quad, Term};

/// Everything a finished parse produced, beyond the triples themselves.
pub(crate) struct ParsedDocument {
    pub quads: Vec<Quad>,
    pub prefixes: Namespaces,
    pub base: Option<Iri<String>>,
}

pub(crate) struct DocumentParser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    syntax: Syntax,
    flags: ParseFlags,
    base: Option<Iri<String>>,
    prefixes: Namespaces,
    blank_nodes: HashMap<String, BlankNode>,
    quads: Vec<Quad>,
    cur_graph: GraphName,
    in_graph_block: bool,
}

impl<'a> DocumentParser<'a> {
    pub fn new(
        input: &'a str,
        syntax: Syntax,
        flags: ParseFlags,
        base: Option<Iri<String>>,
        prefixes: Namespaces,
    ) -> Self {
        Self {
            lexer: Lexer::new(input, syntax, flags),
            peeked: None,
            syntax,
            flags,
            base,
            prefixes,
            blank_nodes: HashMap::new(),
            quads: Vec::new(),
            cur_graph: GraphName::DefaultGraph,
            in_graph_block: false,
        }
    }

    pub fn parse(mut self) -> Result<ParsedDocument, TurtleSyntaxError> {
        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::PrefixDirective { sparql_style } => {
                    self.parse_prefix_directive(sparql_style)?;
                }
                TokenKind::BaseDirective { sparql_style } => {
                    self.parse_base_directive(sparql_style)?;
                }
                TokenKind::GraphKeyword => {
                    let name = self.parse_graph_name()?;
                    let brace = self.next_token()?;
                    if brace.kind != TokenKind::OpenBrace {
                        return Err(self.syntax_error(
                            "the graph name must be followed by '{'",
                            brace.position,
                        ));
                    }
                    self.parse_graph_block(name)?;
                }
                TokenKind::OpenBrace => {
                    if self.syntax == Syntax::Turtle {
                        return Err(self
                            .lexer
                            .error_at(SyntaxErrorKind::NamedGraphInTurtle, token.position));
                    }
                    self.parse_graph_block(GraphName::DefaultGraph)?;
                }
                _ => {
                    if let Some(graph_name) = self.parse_statement(token, true)? {
                        self.parse_graph_block(graph_name)?;
                    }
                }
            }
        }
        Ok(ParsedDocument {
            quads: self.quads,
            prefixes: self.prefixes,
            base: self.base,
        })
    }

    fn next_token(&mut self) -> Result<Token<'a>, TurtleSyntaxError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&Token<'a>, TurtleSyntaxError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn syntax_error(&self, message: impl Into<String>, position: TextPosition) -> TurtleSyntaxError {
        self.lexer
            .error_at(SyntaxErrorKind::Syntax(message.into()), position)
    }

    // [9]/[12]  prefixID | sparqlPrefix
    fn parse_prefix_directive(&mut self, sparql_style: bool) -> Result<(), TurtleSyntaxError> {
        let token = self.next_token()?;
        let name = match token.kind {
            TokenKind::PrefixedName { prefix, ref local } if local.is_empty() => prefix.to_owned(),
            _ => {
                return Err(self.syntax_error(
                    "the prefix directive must be followed by a prefix like 'ex:'",
                    token.position,
                ))
            }
        };
        let iri_token = self.next_token()?;
        let TokenKind::Iri(raw) = iri_token.kind else {
            return Err(self.syntax_error(
                "the prefix declaration must be followed by the namespace IRI in angle brackets",
                iri_token.position,
            ));
        };
        let namespace = self.resolve_iri_reference(raw, iri_token.position)?;
        self.prefixes.bind(name, namespace.into_string());
        if !sparql_style {
            self.expect_directive_dot()?;
        }
        Ok(())
    }

    // [10]/[13]  base | sparqlBase
    fn parse_base_directive(&mut self, sparql_style: bool) -> Result<(), TurtleSyntaxError> {
        let token = self.next_token()?;
        let TokenKind::Iri(raw) = token.kind else {
            return Err(self.syntax_error(
                "the base directive must be followed by an IRI in angle brackets",
                token.position,
            ));
        };
        let base = self.resolve_iri_reference(raw, token.position)?;
        self.base = Some(Iri::parse_unchecked(base.into_string()));
        if !sparql_style {
            self.expect_directive_dot()?;
        }
        Ok(())
    }

    fn expect_directive_dot(&mut self) -> Result<(), TurtleSyntaxError> {
        let position = self.peek()?.position;
        if self.peek()?.kind == TokenKind::Dot {
            self.next_token()?;
            return Ok(());
        }
        if self.flags.allow_missing_dot_after_prefix && self.peek_starts_statement()? {
            tracing::debug!("tolerating a directive without its terminating '.'");
            return Ok(());
        }
        Err(self.syntax_error("expected '.' after the directive", position))
    }

    /// Parses one statement starting at `first`. When `at_top_level` is set
    /// and the subject turns out to name a TriG graph block, nothing is
    /// emitted and the graph name is returned with the `{` still unconsumed.
    fn parse_statement(
        &mut self,
        first: Token<'a>,
        at_top_level: bool,
    ) -> Result<Option<GraphName>, TurtleSyntaxError> {
        match first.kind {
            TokenKind::Iri(_)
            | TokenKind::PrefixedName { .. }
            | TokenKind::BlankNodeLabel(_)
            | TokenKind::Bareword(_) => {
                let subject = self.subject_from_token(first)?;
                if let Some(name) = self.check_graph_block_start(&subject, at_top_level)? {
                    return Ok(Some(name));
                }
                self.parse_predicate_object_list(&subject)?;
                self.expect_statement_dot()?;
            }
            TokenKind::OpenBracket => {
                if self.peek()?.kind == TokenKind::CloseBracket {
                    self.next_token()?;
                    let subject = NamedOrBlankNode::BlankNode(BlankNode::default());
                    if let Some(name) = self.check_graph_block_start(&subject, at_top_level)? {
                        return Ok(Some(name));
                    }
                    self.parse_predicate_object_list(&subject)?;
                } else {
                    let subject = NamedOrBlankNode::BlankNode(self.parse_property_list_body()?);
                    // the predicate-object list after a property list subject is optional
                    if !matches!(
                        self.peek()?.kind,
                        TokenKind::Dot | TokenKind::CloseBrace | TokenKind::Eof
                    ) {
                        self.parse_predicate_object_list(&subject)?;
                    }
                }
                self.expect_statement_dot()?;
            }
            TokenKind::OpenParen => {
                let head = self.parse_collection()?;
                let subject = match head {
                    Term::NamedNode(node) => NamedOrBlankNode::NamedNode(node),
                    Term::BlankNode(node) => NamedOrBlankNode::BlankNode(node),
                    Term::Literal(_) => {
                        return Err(
                            self.syntax_error("a collection cannot be a literal", first.position)
                        )
                    }
                };
                self.parse_predicate_object_list(&subject)?;
                self.expect_statement_dot()?;
            }
            _ => {
                return Err(self.syntax_error(
                    "expected the subject of a statement (an IRI, a prefixed name, a blank node, a property list or a collection)",
                    first.position,
                ))
            }
        }
        Ok(None)
    }

    /// After a simple subject term: is the next token a `{` opening a TriG
    /// graph block? Consumes the brace when it is.
    fn check_graph_block_start(
        &mut self,
        subject: &NamedOrBlankNode,
        at_top_level: bool,
    ) -> Result<Option<GraphName>, TurtleSyntaxError> {
        if !at_top_level || self.peek()?.kind != TokenKind::OpenBrace {
            return Ok(None);
        }
        let position = self.peek()?.position;
        if self.syntax == Syntax::Turtle {
            return Err(self
                .lexer
                .error_at(SyntaxErrorKind::NamedGraphInTurtle, position));
        }
        self.next_token()?;
        Ok(Some(GraphName::from(subject.clone())))
    }

    // [5]  wrappedGraph  ::=  '{' triplesBlock? '}'
    // [6]  triplesBlock  ::=  triples ('.' triplesBlock?)?
    fn parse_graph_block(&mut self, name: GraphName) -> Result<(), TurtleSyntaxError> {
        self.cur_graph = name;
        self.in_graph_block = true;
        loop {
            let token = self.next_token()?;
            match token.kind {
                TokenKind::CloseBrace => break,
                TokenKind::Eof => {
                    return Err(
                        self.syntax_error("unclosed graph block, expected '}'", token.position)
                    )
                }
                TokenKind::PrefixDirective { .. } | TokenKind::BaseDirective { .. } => {
                    return Err(self.syntax_error(
                        "directives are not allowed inside graph blocks",
                        token.position,
                    ))
                }
                TokenKind::GraphKeyword | TokenKind::OpenBrace => {
                    return Err(
                        self.syntax_error("graph blocks cannot be nested", token.position)
                    )
                }
                _ => {
                    self.parse_statement(token, false)?;
                }
            }
        }
        self.in_graph_block = false;
        self.cur_graph = GraphName::DefaultGraph;
        Ok(())
    }

    // after the GRAPH keyword
    fn parse_graph_name(&mut self) -> Result<GraphName, TurtleSyntaxError> {
        let token = self.next_token()?;
        Ok(match token.kind {
            TokenKind::Iri(raw) => {
                GraphName::NamedNode(self.resolve_iri_reference(raw, token.position)?)
            }
            TokenKind::PrefixedName { prefix, ref local } => {
                let local = local.clone();
                GraphName::NamedNode(self.expand_prefixed_name(prefix, &local, token.position)?)
            }
            TokenKind::Bareword(word) => {
                GraphName::NamedNode(self.bareword_iri(word, token.position)?)
            }
            TokenKind::BlankNodeLabel(label) => GraphName::BlankNode(self.labelled_blank_node(label)),
            TokenKind::OpenBracket => {
                let close = self.next_token()?;
                if close.kind != TokenKind::CloseBracket {
                    return Err(self.syntax_error(
                        "only '[]' can name a graph, not a full property list",
                        close.position,
                    ));
                }
                GraphName::BlankNode(BlankNode::default())
            }
            _ => {
                return Err(self.syntax_error(
                    "the GRAPH keyword must be followed by a graph name",
                    token.position,
                ))
            }
        })
    }

    // [7]  predicateObjectList  ::=  verb objectList (';' (verb objectList)?)*
    fn parse_predicate_object_list(
        &mut self,
        subject: &NamedOrBlankNode,
    ) -> Result<(), TurtleSyntaxError> {
        loop {
            let token = self.next_token()?;
            let verb = self.verb_from_token(token)?;
            self.parse_object_list(subject, &verb)?;
            let mut separated = false;
            while self.peek()?.kind == TokenKind::Semicolon {
                self.next_token()?;
                separated = true;
            }
            if !separated || !self.peek_starts_verb()? {
                return Ok(());
            }
        }
    }

    // [8]  objectList  ::=  object (',' object)*
    fn parse_object_list(
        &mut self,
        subject: &NamedOrBlankNode,
        verb: &NamedNode,
    ) -> Result<(), TurtleSyntaxError> {
        loop {
            let object = self.parse_object()?;
            self.emit(subject.clone(), verb.clone(), object);
            if self.peek()?.kind == TokenKind::Comma {
                self.next_token()?;
            } else {
                return Ok(());
            }
        }
    }

    // [9]  verb  ::=  predicate | 'a'
    fn verb_from_token(&mut self, token: Token<'a>) -> Result<NamedNode, TurtleSyntaxError> {
        match token.kind {
            TokenKind::A => Ok(rdf::TYPE.into_owned()),
            TokenKind::Iri(raw) => self.resolve_iri_reference(raw, token.position),
            TokenKind::PrefixedName { prefix, ref local } => {
                let local = local.clone();
                self.expand_prefixed_name(prefix, &local, token.position)
            }
            TokenKind::Bareword(word) => self.bareword_iri(word, token.position),
            _ => Err(self.syntax_error(
                "expected a predicate (an IRI, a prefixed name or 'a')",
                token.position,
            )),
        }
    }

    // [12]  object  ::=  iri | BlankNode | collection | blankNodePropertyList | literal
    fn parse_object(&mut self) -> Result<Term, TurtleSyntaxError> {
        let token = self.next_token()?;
        Ok(match token.kind {
            TokenKind::Iri(raw) => self.resolve_iri_reference(raw, token.position)?.into(),
            TokenKind::PrefixedName { prefix, ref local } => {
                let local = local.clone();
                self.expand_prefixed_name(prefix, &local, token.position)?
                    .into()
            }
            TokenKind::Bareword(word) => self.bareword_iri(word, token.position)?.into(),
            TokenKind::BlankNodeLabel(label) => self.labelled_blank_node(label).into(),
            TokenKind::Boolean(value) => {
                Literal::new_typed_literal(if value { "true" } else { "false" }, xsd::BOOLEAN)
                    .into()
            }
            TokenKind::Integer(raw) => Literal::new_typed_literal(raw, xsd::INTEGER).into(),
            TokenKind::Decimal(raw) => Literal::new_typed_literal(raw, xsd::DECIMAL).into(),
            TokenKind::String { raw, .. } => {
                let value = self.decode_string_escapes(raw, token.position)?;
                self.parse_literal_annotation(value, token.position)?.into()
            }
            TokenKind::OpenBracket => {
                if self.peek()?.kind == TokenKind::CloseBracket {
                    self.next_token()?;
                    BlankNode::default().into()
                } else {
                    self.parse_property_list_body()?.into()
                }
            }
            TokenKind::OpenParen => self.parse_collection()?,
            _ => {
                return Err(self.syntax_error(
                    "expected an object (an IRI, a blank node, a literal, a property list or a collection)",
                    token.position,
                ))
            }
        })
    }

    // [13]  literal annotation  ::=  LANGTAG | '^^' iri
    fn parse_literal_annotation(
        &mut self,
        value: String,
        position: TextPosition,
    ) -> Result<Literal, TurtleSyntaxError> {
        if let TokenKind::LangTag(tag) = self.peek()?.kind {
            let tag = tag.to_ascii_lowercase();
            self.next_token()?;
            let tag = LanguageTag::parse(tag).map_err(|e| {
                self.syntax_error(format!("invalid language tag: {e}"), position)
            })?;
            return Ok(Literal::new_language_tagged_literal_unchecked(
                value,
                tag.into_inner(),
            ));
        }
        if self.peek()?.kind == TokenKind::Caret {
            self.next_token()?;
            let token = self.next_token()?;
            let datatype = match token.kind {
                TokenKind::Iri(raw) => self.resolve_iri_reference(raw, token.position)?,
                TokenKind::PrefixedName { prefix, ref local } => {
                    let local = local.clone();
                    self.expand_prefixed_name(prefix, &local, token.position)?
                }
                TokenKind::Bareword(word) => self.bareword_iri(word, token.position)?,
                _ => {
                    return Err(self.syntax_error(
                        "expected a datatype IRI after '^^'",
                        token.position,
                    ))
                }
            };
            return Ok(Literal::new_typed_literal(value, datatype));
        }
        Ok(Literal::new_simple_literal(value))
    }

    // [14]  blankNodePropertyList  ::=  '[' predicateObjectList ']'
    // The opening bracket is already consumed and the list is non-empty.
    fn parse_property_list_body(&mut self) -> Result<BlankNode, TurtleSyntaxError> {
        let node = BlankNode::default();
        self.parse_predicate_object_list(&node.clone().into())?;
        let token = self.next_token()?;
        if token.kind != TokenKind::CloseBracket {
            return Err(self.syntax_error(
                "blank node property lists must end with ']'",
                token.position,
            ));
        }
        Ok(node)
    }

    // [15]  collection  ::=  '(' object* ')'
    // The opening parenthesis is already consumed. Expands to an
    // rdf:first/rdf:rest chain ending in rdf:nil; '()' is rdf:nil itself.
    fn parse_collection(&mut self) -> Result<Term, TurtleSyntaxError> {
        if self.peek()?.kind == TokenKind::CloseParen {
            self.next_token()?;
            return Ok(rdf::NIL.into());
        }
        let head = BlankNode::default();
        let mut current = head.clone();
        loop {
            let object = self.parse_object()?;
            self.emit(current.clone().into(), rdf::FIRST.into_owned(), object);
            if self.peek()?.kind == TokenKind::CloseParen {
                self.next_token()?;
                self.emit(current.into(), rdf::REST.into_owned(), rdf::NIL);
                return Ok(head.into());
            }
            let next_cell = BlankNode::default();
            self.emit(
                current.into(),
                rdf::REST.into_owned(),
                next_cell.clone(),
            );
            current = next_cell;
        }
    }

    fn expect_statement_dot(&mut self) -> Result<(), TurtleSyntaxError> {
        let position = self.peek()?.position;
        if self.peek()?.kind == TokenKind::Dot {
            self.next_token()?;
            return Ok(());
        }
        // inside a graph block the final statement needs no dot
        if self.in_graph_block && self.peek()?.kind == TokenKind::CloseBrace {
            return Ok(());
        }
        if self.flags.allow_missing_final_dot && self.peek_starts_statement()? {
            tracing::debug!("tolerating a statement without its terminating '.'");
            return Ok(());
        }
        Err(self.syntax_error("expected '.' at the end of the statement", position))
    }

    fn peek_starts_statement(&mut self) -> Result<bool, TurtleSyntaxError> {
        Ok(matches!(
            self.peek()?.kind,
            TokenKind::Iri(_)
                | TokenKind::PrefixedName { .. }
                | TokenKind::BlankNodeLabel(_)
                | TokenKind::Bareword(_)
                | TokenKind::OpenBracket
                | TokenKind::OpenParen
                | TokenKind::PrefixDirective { .. }
                | TokenKind::BaseDirective { .. }
                | TokenKind::GraphKeyword
                | TokenKind::OpenBrace
                | TokenKind::Eof
        ))
    }

    fn peek_starts_verb(&mut self) -> Result<bool, TurtleSyntaxError> {
        Ok(matches!(
            self.peek()?.kind,
            TokenKind::Iri(_)
                | TokenKind::PrefixedName { .. }
                | TokenKind::Bareword(_)
                | TokenKind::A
        ))
    }

    fn subject_from_token(
        &mut self,
        token: Token<'a>,
    ) -> Result<NamedOrBlankNode, TurtleSyntaxError> {
        Ok(match token.kind {
            TokenKind::Iri(raw) => self.resolve_iri_reference(raw, token.position)?.into(),
            TokenKind::PrefixedName { prefix, ref local } => {
                let local = local.clone();
                self.expand_prefixed_name(prefix, &local, token.position)?
                    .into()
            }
            TokenKind::Bareword(word) => self.bareword_iri(word, token.position)?.into(),
            TokenKind::BlankNodeLabel(label) => self.labelled_blank_node(label).into(),
            _ => {
                return Err(
                    self.syntax_error("expected the subject of a statement", token.position)
                )
            }
        })
    }

    fn emit(&mut self, subject: NamedOrBlankNode, predicate: NamedNode, object: impl Into<Term>) {
        self.quads.push(Quad::new(
            subject,
            predicate,
            object,
            self.cur_graph.clone(),
        ));
    }

    /// Same label, same node; labels are scoped to this document.
    fn labelled_blank_node(&mut self, label: &str) -> BlankNode {
        self.blank_nodes
            .entry(label.to_owned())
            .or_insert_with(BlankNode::default)
            .clone()
    }

    fn resolve_iri_reference(
        &self,
        raw: &str,
        position: TextPosition,
    ) -> Result<NamedNode, TurtleSyntaxError> {
        let reference = self.decode_iri_escapes(raw, position)?;
        self.to_absolute_iri(&reference, position)
    }

    fn bareword_iri(
        &self,
        word: &str,
        position: TextPosition,
    ) -> Result<NamedNode, TurtleSyntaxError> {
        tracing::debug!("treating the bare identifier '{word}' as a relative IRI reference");
        self.to_absolute_iri(word, position)
    }

    fn expand_prefixed_name(
        &mut self,
        prefix: &str,
        local: &str,
        position: TextPosition,
    ) -> Result<NamedNode, TurtleSyntaxError> {
        let namespace = match self.prefixes.get(prefix) {
            Some(namespace) => namespace.to_owned(),
            None => {
                let well_known = self
                    .flags
                    .auto_add_common_prefixes
                    .then(|| {
                        WELL_KNOWN_PREFIXES
                            .iter()
                            .find(|(name, _)| *name == prefix)
                    })
                    .flatten();
                match well_known {
                    Some((name, namespace)) => {
                        tracing::debug!(
                            "auto-declaring the well-known prefix '{name}:' as <{namespace}>"
                        );
                        self.prefixes.bind(*name, *namespace);
                        (*namespace).to_owned()
                    }
                    None => {
                        return Err(self.lexer.error_at(
                            SyntaxErrorKind::UnknownPrefix(prefix.to_owned()),
                            position,
                        ))
                    }
                }
            }
        };
        self.to_absolute_iri(&format!("{namespace}{local}"), position)
    }

    fn to_absolute_iri(
        &self,
        reference: &str,
        position: TextPosition,
    ) -> Result<NamedNode, TurtleSyntaxError> {
        resolve_iri(reference, self.base.as_ref()).map_err(|e| match e {
            IriResolveError::NoBaseIri => self.lexer.error_at(
                SyntaxErrorKind::RelativeIriWithoutBase(reference.to_owned()),
                position,
            ),
            IriResolveError::InvalidIri(e) => {
                self.syntax_error(format!("invalid IRI <{reference}>: {e}"), position)
            }
        })
    }

    /// Decodes `\uXXXX`/`\UXXXXXXXX` escapes inside an IRI reference. Other
    /// escape sequences are not legal in IRIs.
    fn decode_iri_escapes<'b>(
        &self,
        raw: &'b str,
        position: TextPosition,
    ) -> Result<Cow<'b, str>, TurtleSyntaxError> {
        if !raw.contains('\\') {
            return Ok(Cow::Borrowed(raw));
        }
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('u') => out.push(self.decode_hex_escape(&mut chars, 'u', 4, position)?),
                Some('U') => out.push(self.decode_hex_escape(&mut chars, 'U', 8, position)?),
                other => {
                    return Err(self.malformed_escape(
                        format!("\\{}", other.map_or(String::new(), String::from)),
                        position,
                    ))
                }
            }
        }
        Ok(Cow::Owned(out))
    }

    /// Decodes the full Turtle string escape set: ECHAR plus UCHAR.
    fn decode_string_escapes(
        &self,
        raw: &str,
        position: TextPosition,
    ) -> Result<String, TurtleSyntaxError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('t') => out.push('\t'),
                Some('b') => out.push('\u{08}'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('f') => out.push('\u{0C}'),
                Some('"') => out.push('"'),
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some('u') => out.push(self.decode_hex_escape(&mut chars, 'u', 4, position)?),
                Some('U') => out.push(self.decode_hex_escape(&mut chars, 'U', 8, position)?),
                other => {
                    return Err(self.malformed_escape(
                        format!("\\{}", other.map_or(String::new(), String::from)),
                        position,
                    ))
                }
            }
        }
        Ok(out)
    }

    fn decode_hex_escape(
        &self,
        chars: &mut Chars<'_>,
        escape_char: char,
        len: u32,
        position: TextPosition,
    ) -> Result<char, TurtleSyntaxError> {
        let mut digits = String::new();
        let mut codepoint: u32 = 0;
        for _ in 0..len {
            let Some(c) = chars.next() else {
                return Err(
                    self.malformed_escape(format!("\\{escape_char}{digits}"), position)
                );
            };
            digits.push(c);
            let Some(value) = c.to_digit(16) else {
                return Err(
                    self.malformed_escape(format!("\\{escape_char}{digits}"), position)
                );
            };
            codepoint = codepoint.wrapping_mul(16).wrapping_add(value);
        }
        char::from_u32(codepoint)
            .ok_or_else(|| self.malformed_escape(format!("\\{escape_char}{digits}"), position))
    }

    fn malformed_escape(&self, sequence: String, position: TextPosition) -> TurtleSyntaxError {
        self.lexer
            .error_at(SyntaxErrorKind::MalformedEscape(sequence), position)
    }
}
