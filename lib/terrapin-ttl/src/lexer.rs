//! Single-pass tokenizer for Turtle and TriG.
//!
//! The lexer walks the whole input character by character, tracking 1-based
//! line/column positions, and produces spanned tokens. String and IRI escape
//! sequences are scanned past but not decoded here: decoding (and the
//! associated error reporting) is the parser's job, so token boundaries stay
//! simple.

use crate::error::{Syntax, SyntaxErrorKind, TextPosition, TurtleSyntaxError};
use memchr::{memchr, memchr2};
use std::borrow::Cow;

/// The set of permissive parsing switches, each independently toggleable.
///
/// All flags default to off, which gives strict W3C Turtle/TriG behaviour
/// (with the exception of digit-leading local names, see
/// [`allow_digit_in_local_name`](Self::allow_digit_in_local_name)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseFlags {
    /// Accept prefixed names whose local part begins with a digit
    /// (`ex:123abc`).
    pub allow_digit_in_local_name: bool,
    /// Accept `@prefix`/`@base` directives without the terminating dot when
    /// the next token legally starts a statement.
    pub allow_missing_dot_after_prefix: bool,
    /// Resolve undeclared prefixes against the bundled well-known table
    /// instead of failing with `UnknownPrefix`.
    pub auto_add_common_prefixes: bool,
    /// Accept SPARQL-style `PREFIX`/`BASE` (case-insensitive, no dot) in
    /// place of `@prefix`/`@base`.
    pub allow_prefix_without_at_sign: bool,
    /// Tolerate missing statement terminators before end of input or a token
    /// that starts a new statement.
    pub allow_missing_final_dot: bool,
    /// Treat bare identifiers as relative IRI references resolved against the
    /// base IRI.
    pub allow_identifiers_without_colon: bool,
}

impl ParseFlags {
    /// Builds a flag set with every permissive switch turned on.
    pub fn lenient() -> Self {
        Self {
            allow_digit_in_local_name: true,
            allow_missing_dot_after_prefix: true,
            auto_add_common_prefixes: true,
            allow_prefix_without_at_sign: true,
            allow_missing_final_dot: true,
            allow_identifiers_without_colon: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind<'a> {
    PrefixDirective { sparql_style: bool },
    BaseDirective { sparql_style: bool },
    GraphKeyword,
    /// Raw content between `<` and `>`, escapes not decoded.
    Iri(&'a str),
    PrefixedName {
        prefix: &'a str,
        local: Cow<'a, str>,
    },
    BlankNodeLabel(&'a str),
    /// Raw string content without delimiters, escapes not decoded.
    String {
        raw: &'a str,
        long: bool,
    },
    LangTag(&'a str),
    A,
    Boolean(bool),
    Integer(&'a str),
    Decimal(&'a str),
    /// A bare identifier, only produced under
    /// [`ParseFlags::allow_identifiers_without_colon`].
    Bareword(&'a str),
    Dot,
    Semicolon,
    Comma,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    /// `^^`
    Caret,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub position: TextPosition,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u64,
    column: u64,
    syntax: Syntax,
    flags: ParseFlags,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, syntax: Syntax, flags: ParseFlags) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            syntax,
            flags,
        }
    }

    pub fn position(&self) -> TextPosition {
        TextPosition {
            line: self.line,
            column: self.column,
            offset: self.pos,
        }
    }

    /// Builds an error pointing at `position`, with the surrounding line as
    /// context.
    pub fn error_at(&self, kind: SyntaxErrorKind, position: TextPosition) -> TurtleSyntaxError {
        TurtleSyntaxError::new(kind, position, self.line_excerpt(position.offset), self.syntax)
    }

    fn line_excerpt(&self, offset: usize) -> String {
        let offset = offset.min(self.input.len());
        let start = self.input[..offset]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let end = self.input[offset..]
            .find('\n')
            .map_or(self.input.len(), |i| offset + i);
        let line = self.input[start..end].trim_end();
        line.chars().take(80).collect()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes `n` bytes, updating line/column bookkeeping.
    fn advance(&mut self, n: usize) {
        for c in self.input[self.pos..self.pos + n].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += n;
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let bytes = &self.input.as_bytes()[self.pos..];
            match bytes.first() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.advance(1),
                Some(b'#') => {
                    let end = memchr(b'\n', bytes).unwrap_or(bytes.len());
                    self.advance(end);
                }
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, TurtleSyntaxError> {
        self.skip_whitespace_and_comments();
        let position = self.position();
        let Some(&first) = self.input.as_bytes().get(self.pos) else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position,
            });
        };
        let kind = match first {
            b'<' => self.read_iri(position)?,
            b'_' => self.read_blank_node_label(position)?,
            b'"' | b'\'' => self.read_string(first, position)?,
            b'@' => self.read_at_word(position)?,
            b'.' => {
                if self
                    .input
                    .as_bytes()
                    .get(self.pos + 1)
                    .is_some_and(u8::is_ascii_digit)
                {
                    self.read_number(position)?
                } else {
                    self.advance(1);
                    TokenKind::Dot
                }
            }
            b';' => {
                self.advance(1);
                TokenKind::Semicolon
            }
            b',' => {
                self.advance(1);
                TokenKind::Comma
            }
            b'[' => {
                self.advance(1);
                TokenKind::OpenBracket
            }
            b']' => {
                self.advance(1);
                TokenKind::CloseBracket
            }
            b'(' => {
                self.advance(1);
                TokenKind::OpenParen
            }
            b')' => {
                self.advance(1);
                TokenKind::CloseParen
            }
            b'{' => {
                self.advance(1);
                TokenKind::OpenBrace
            }
            b'}' => {
                self.advance(1);
                TokenKind::CloseBrace
            }
            b'^' => {
                if self.input.as_bytes().get(self.pos + 1) == Some(&b'^') {
                    self.advance(2);
                    TokenKind::Caret
                } else {
                    return Err(self.error_at(
                        SyntaxErrorKind::Lexical("unexpected character '^'".into()),
                        position,
                    ));
                }
            }
            b'0'..=b'9' | b'+' | b'-' => self.read_number(position)?,
            _ => self.read_pname_or_keyword(position)?,
        };
        Ok(Token { kind, position })
    }

    fn read_iri(&mut self, position: TextPosition) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    let raw = &rest[1..i];
                    self.advance(i + 1);
                    return Ok(TokenKind::Iri(raw));
                }
                b'\n' => break,
                b'\\' => i += 2,
                _ => i += 1,
            }
        }
        Err(self.error_at(
            SyntaxErrorKind::Lexical("unclosed IRI, expected '>'".into()),
            position,
        ))
    }

    fn read_string(
        &mut self,
        delimiter: u8,
        position: TextPosition,
    ) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        if bytes.get(1) == Some(&delimiter) && bytes.get(2) == Some(&delimiter) {
            return self.read_long_string(delimiter, position);
        }
        // [22]  STRING_LITERAL_QUOTE         ::=  '"' ([^#x22#x5C#xA#xD] | ECHAR | UCHAR)* '"'
        // [23]  STRING_LITERAL_SINGLE_QUOTE  ::=  "'" ([^#x27#x5C#xA#xD] | ECHAR | UCHAR)* "'"
        let mut i = 1;
        loop {
            let Some(found) = memchr2(delimiter, b'\\', &bytes[i..]) else {
                break;
            };
            if memchr2(b'\n', b'\r', &bytes[i..i + found]).is_some() {
                return Err(self.error_at(
                    SyntaxErrorKind::Lexical(
                        "line breaks are not allowed in string literals, use \\n".into(),
                    ),
                    position,
                ));
            }
            i += found;
            if bytes[i] == delimiter {
                let raw = &rest[1..i];
                self.advance(i + 1);
                return Ok(TokenKind::String { raw, long: false });
            }
            // backslash: skip the escaped character too
            i += 2;
            if i > bytes.len() {
                break;
            }
        }
        Err(self.error_at(
            SyntaxErrorKind::Lexical("unterminated string literal".into()),
            position,
        ))
    }

    fn read_long_string(
        &mut self,
        delimiter: u8,
        position: TextPosition,
    ) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        // [24]/[25]  STRING_LITERAL_LONG_*  ::=  "'''" (("'" | "''")? ([^'\] | ECHAR | UCHAR))* "'''"
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 3;
        loop {
            let Some(found) = memchr2(delimiter, b'\\', &bytes[i..]) else {
                break;
            };
            i += found;
            if bytes[i] == b'\\' {
                i += 2;
                if i > bytes.len() {
                    break;
                }
            } else if bytes.get(i + 1) == Some(&delimiter) && bytes.get(i + 2) == Some(&delimiter) {
                let raw = &rest[3..i];
                self.advance(i + 3);
                return Ok(TokenKind::String { raw, long: true });
            } else {
                i += 1;
            }
        }
        Err(self.error_at(
            SyntaxErrorKind::Lexical("unterminated long string literal".into()),
            position,
        ))
    }

    fn read_number(&mut self, position: TextPosition) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        // [19]  INTEGER  ::=  [+-]? [0-9]+
        // [20]  DECIMAL  ::=  [+-]? [0-9]* '.' [0-9]+
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 0;
        if matches!(bytes.first(), Some(b'+' | b'-')) {
            i += 1;
        }
        let before = count_digits(&bytes[i..]);
        i += before;
        if bytes.get(i) == Some(&b'.') {
            let after = count_digits(&bytes[i + 1..]);
            if after > 0 {
                i += 1 + after;
                let raw = &rest[..i];
                self.advance(i);
                return Ok(TokenKind::Decimal(raw));
            }
            // the dot is a statement terminator, leave it unconsumed
        }
        if before == 0 {
            return Err(self.error_at(
                SyntaxErrorKind::Lexical("a number needs at least one digit".into()),
                position,
            ));
        }
        let raw = &rest[..i];
        self.advance(i);
        Ok(TokenKind::Integer(raw))
    }

    fn read_at_word(&mut self, position: TextPosition) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        // '@' then LANGTAG-shaped word, with `@prefix` and `@base` special-cased
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 1;
        while bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            i += 1;
        }
        if i == 1 {
            return Err(self.error_at(
                SyntaxErrorKind::Lexical("expected a language tag or directive after '@'".into()),
                position,
            ));
        }
        let head = &rest[1..i];
        if head == "prefix" {
            self.advance(i);
            return Ok(TokenKind::PrefixDirective {
                sparql_style: false,
            });
        }
        if head == "base" {
            self.advance(i);
            return Ok(TokenKind::BaseDirective {
                sparql_style: false,
            });
        }
        while bytes.get(i) == Some(&b'-') {
            let mut j = i + 1;
            while bytes.get(j).is_some_and(u8::is_ascii_alphanumeric) {
                j += 1;
            }
            if j == i + 1 {
                return Err(self.error_at(
                    SyntaxErrorKind::Lexical("truncated language tag subtag".into()),
                    position,
                ));
            }
            i = j;
        }
        let tag = &rest[1..i];
        self.advance(i);
        Ok(TokenKind::LangTag(tag))
    }

    fn read_blank_node_label(
        &mut self,
        position: TextPosition,
    ) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        // [141s]  BLANK_NODE_LABEL  ::=  '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
        let rest = self.rest();
        if rest.as_bytes().get(1) != Some(&b':') {
            return Err(self.error_at(
                SyntaxErrorKind::Lexical("expected ':' after '_'".into()),
                position,
            ));
        }
        let label_str = &rest[2..];
        let mut chars = label_str.char_indices();
        let Some((_, front)) = chars.next() else {
            return Err(self.error_at(
                SyntaxErrorKind::Lexical("empty blank node label".into()),
                position,
            ));
        };
        if !is_possible_pn_chars_u(front) && !front.is_ascii_digit() {
            return Err(self.error_at(
                SyntaxErrorKind::Lexical(format!(
                    "unexpected character '{front}' at the start of a blank node label"
                )),
                position,
            ));
        }
        let mut end = front.len_utf8();
        for (i, c) in chars {
            if is_possible_pn_chars(c) || c == '.' {
                end = i + c.len_utf8();
            } else {
                break;
            }
        }
        // a trailing dot is the statement terminator, not part of the label
        while label_str[..end].ends_with('.') {
            end -= 1;
        }
        let label = &label_str[..end];
        self.advance(2 + end);
        Ok(TokenKind::BlankNodeLabel(label))
    }

    fn read_pname_or_keyword(
        &mut self,
        position: TextPosition,
    ) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        let rest = self.rest();
        // [167s]  PN_PREFIX  ::=  PN_CHARS_BASE ((PN_CHARS | '.')* PN_CHARS)?
        let mut prefix_end = 0;
        for (i, c) in rest.char_indices() {
            if i == 0 {
                if !is_possible_pn_chars_base(c) {
                    if c == ':' {
                        break;
                    }
                    return Err(self.error_at(
                        SyntaxErrorKind::Lexical(format!("unexpected character '{c}'")),
                        position,
                    ));
                }
            } else if !is_possible_pn_chars(c) && c != '.' {
                break;
            }
            prefix_end = i + c.len_utf8();
        }
        while rest[..prefix_end].ends_with('.') {
            prefix_end -= 1;
        }
        let prefix = &rest[..prefix_end];
        if rest.as_bytes().get(prefix_end) != Some(&b':') {
            return self.read_keyword(prefix, position);
        }
        let (local, consumed) = self.read_local_name(&rest[prefix_end + 1..], position)?;
        self.advance(prefix_end + 1 + consumed);
        Ok(TokenKind::PrefixedName { prefix, local })
    }

    fn read_keyword(
        &mut self,
        word: &'a str,
        position: TextPosition,
    ) -> Result<TokenKind<'a>, TurtleSyntaxError> {
        let kind = match word {
            "a" => Some(TokenKind::A),
            "true" => Some(TokenKind::Boolean(true)),
            "false" => Some(TokenKind::Boolean(false)),
            _ if word.eq_ignore_ascii_case("prefix") && self.flags.allow_prefix_without_at_sign => {
                Some(TokenKind::PrefixDirective { sparql_style: true })
            }
            _ if word.eq_ignore_ascii_case("base") && self.flags.allow_prefix_without_at_sign => {
                Some(TokenKind::BaseDirective { sparql_style: true })
            }
            _ if word.eq_ignore_ascii_case("graph") && self.syntax == Syntax::TriG => {
                Some(TokenKind::GraphKeyword)
            }
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance(word.len());
            return Ok(kind);
        }
        if self.flags.allow_identifiers_without_colon && !word.is_empty() {
            self.advance(word.len());
            return Ok(TokenKind::Bareword(word));
        }
        Err(self.error_at(
            SyntaxErrorKind::Lexical(format!(
                "unexpected identifier '{word}', expected a prefixed name"
            )),
            position,
        ))
    }

    /// Reads a PN_LOCAL, unescaping `\`-escaped reserved characters. Returns
    /// the local name and the number of input bytes consumed.
    fn read_local_name(
        &self,
        rest: &'a str,
        position: TextPosition,
    ) -> Result<(Cow<'a, str>, usize), TurtleSyntaxError> {
        // [168s]  PN_LOCAL  ::=  (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
        let mut owned: Option<String> = None;
        let mut end = 0;
        let mut first = true;
        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let accepted = match c {
                '\\' => {
                    let Some(&(_, escaped)) = chars.peek() else {
                        return Err(self.error_at(
                            SyntaxErrorKind::Lexical("truncated local name escape".into()),
                            position,
                        ));
                    };
                    if !can_be_escaped_in_local_name(escaped) {
                        return Err(self.error_at(
                            SyntaxErrorKind::Lexical(format!(
                                "the character '{escaped}' cannot be escaped in a local name"
                            )),
                            position,
                        ));
                    }
                    chars.next();
                    owned
                        .get_or_insert_with(|| rest[..i].to_owned())
                        .push(escaped);
                    end = i + 1 + escaped.len_utf8();
                    true
                }
                '%' => {
                    let hex = rest.as_bytes().get(i + 1..i + 3);
                    if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                        return Err(self.error_at(
                            SyntaxErrorKind::Lexical(
                                "'%' in a local name must start a percent-encoded sequence".into(),
                            ),
                            position,
                        ));
                    }
                    if let Some(owned) = &mut owned {
                        owned.push_str(&rest[i..i + 3]);
                    }
                    chars.next();
                    chars.next();
                    end = i + 3;
                    true
                }
                '.' => {
                    // interior dots only: a dot run not followed by another
                    // local name character ends the statement instead
                    let continues = rest[i..]
                        .trim_start_matches('.')
                        .chars()
                        .next()
                        .is_some_and(|n| is_local_name_char(n) || n == '\\' || n == '%');
                    if continues {
                        if let Some(owned) = &mut owned {
                            owned.push('.');
                        }
                        end = i + 1;
                    }
                    continues
                }
                c if is_local_name_char(c) => {
                    if first && c.is_ascii_digit() && !self.flags.allow_digit_in_local_name {
                        return Err(self.error_at(
                            SyntaxErrorKind::Lexical(
                                "the local name of a prefixed name cannot start with a digit"
                                    .into(),
                            ),
                            position,
                        ));
                    }
                    if let Some(owned) = &mut owned {
                        owned.push(c);
                    }
                    end = i + c.len_utf8();
                    true
                }
                _ => false,
            };
            if !accepted {
                break;
            }
            first = false;
        }
        let local = match owned {
            Some(owned) => Cow::Owned(owned),
            None => Cow::Borrowed(&rest[..end]),
        };
        Ok((local, end))
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|c| c.is_ascii_digit()).count()
}

fn is_local_name_char(c: char) -> bool {
    is_possible_pn_chars(c) || c == ':' || c.is_ascii_digit()
}

// [157s]  PN_CHARS_BASE  ::=  [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
pub(crate) fn is_possible_pn_chars_base(c: char) -> bool {
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
pub(crate) fn is_possible_pn_chars_u(c: char) -> bool {
    is_possible_pn_chars_base(c) || c == '_'
}

// [160s]  PN_CHARS  ::=  PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
pub(crate) fn is_possible_pn_chars(c: char) -> bool {
    is_possible_pn_chars_u(c)
        || matches!(c,
        '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

pub(crate) fn can_be_escaped_in_local_name(c: char) -> bool {
    matches!(
        c,
        '_' | '~'
            | '.'
            | '-'
            | '!'
            | '$'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | ';'
            | '='
            | '/'
            | '?'
            | '#'
            | '@'
            | '%'
    )
}
