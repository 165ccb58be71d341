use std::error::Error;
use std::fmt;

/// A position in a parsed document: 1-based `line` and `column` (the column
/// counts code points) plus the byte `offset` from the start of the input.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: usize,
}

impl fmt::Display for TextPosition {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// The concrete syntax a parser was reading when it failed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Syntax {
    Turtle,
    TriG,
}

impl fmt::Display for Syntax {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Turtle => "Turtle",
            Self::TriG => "TriG",
        })
    }
}

/// The kind of a [`TurtleSyntaxError`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SyntaxErrorKind {
    /// Token scanning failed: an unclosed IRI, an unterminated string literal
    /// or a character matching no production.
    #[error("{0}")]
    Lexical(String),
    /// The token stream violates the grammar.
    #[error("{0}")]
    Syntax(String),
    /// A relative IRI reference was found and no base IRI is available.
    #[error("the relative IRI reference <{0}> cannot be resolved: no base IRI is available")]
    RelativeIriWithoutBase(String),
    /// A prefixed name uses a prefix that has not been declared.
    #[error("the prefix {0}: has not been declared")]
    UnknownPrefix(String),
    /// An invalid `\u`/`\U` escape sequence.
    #[error("malformed escape sequence '{0}'")]
    MalformedEscape(String),
    /// The Turtle entry point was given a TriG graph block.
    #[error("graph blocks are not allowed in Turtle, use the TriG parser")]
    NamedGraphInTurtle,
}

/// An error in the syntax of a parsed document.
///
/// Carries the error kind, the 1-based source position, an excerpt of the
/// offending line and the concrete syntax being read.
#[derive(Debug)]
pub struct TurtleSyntaxError {
    kind: SyntaxErrorKind,
    position: TextPosition,
    context: String,
    syntax: Syntax,
}

impl TurtleSyntaxError {
    pub(crate) fn new(
        kind: SyntaxErrorKind,
        position: TextPosition,
        context: String,
        syntax: Syntax,
    ) -> Self {
        Self {
            kind,
            position,
            context,
            syntax,
        }
    }

    /// The kind of this error.
    #[inline]
    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// Where the error was detected. Line and column are 1-based.
    #[inline]
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// An excerpt of the input line the error was detected on.
    #[inline]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The concrete syntax the parser was reading.
    #[inline]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }
}

impl fmt::Display for TurtleSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parse error at {}: {}",
            self.syntax, self.position, self.kind
        )?;
        if !self.context.is_empty() {
            write!(f, " in '{}'", self.context)?;
        }
        Ok(())
    }
}

impl Error for TurtleSyntaxError {}

/// An error raised by [`TurtleSerializer`](crate::TurtleSerializer) and
/// [`TriGSerializer`](crate::TriGSerializer) before any output is produced.
///
/// These are programmer errors: once the options are consistent and the
/// dataset fits the chosen format, serialization cannot fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TurtleSerializeError {
    /// The dataset holds triples in a named graph but the target format is
    /// Turtle.
    #[error("the dataset contains the non-empty named graph {0} that Turtle cannot represent, use the TriG serializer instead")]
    GraphNotRepresentable(String),
    /// The serializer options are inconsistent.
    #[error("invalid serializer configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_position_and_context() {
        let error = TurtleSyntaxError::new(
            SyntaxErrorKind::UnknownPrefix("ex".into()),
            TextPosition {
                line: 3,
                column: 7,
                offset: 42,
            },
            "ex:s ex:p ex:o .".into(),
            Syntax::Turtle,
        );
        assert_eq!(
            error.to_string(),
            "Turtle parse error at line 3 column 7: the prefix ex: has not been declared in 'ex:s ex:p ex:o .'"
        );
    }
}
