#![doc = include_str!("../README.md")]
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_qualifications
)]

mod compact;
mod error;
mod iri;
mod lexer;
mod namespaces;
mod parser;
mod serializer;
mod trig;
mod turtle;

pub use crate::error::{
    Syntax, SyntaxErrorKind, TextPosition, TurtleSerializeError, TurtleSyntaxError,
};
pub use crate::iri::{relativize_iri, resolve_iri, IriRelativization, IriResolveError};
pub use crate::lexer::ParseFlags;
pub use crate::namespaces::{Namespaces, WELL_KNOWN_PREFIXES};
pub use crate::trig::{TriGDocument, TriGParser, TriGSerializer};
pub use crate::turtle::{TurtleDocument, TurtleParser, TurtleSerializer};
pub use oxiri::IriParseError;
