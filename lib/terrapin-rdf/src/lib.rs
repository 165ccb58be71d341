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

mod blank_node;
pub mod dataset;
pub mod graph;
mod literal;
mod named_node;
mod triple;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeIdParseError};
pub use crate::dataset::Dataset;
pub use crate::graph::Graph;
pub use crate::literal::Literal;
pub use crate::named_node::{NamedNode, NamedNodeRef};
pub use crate::triple::{
    GraphName, NamedOrBlankNode, Quad, Term, Triple, TryFromTermError,
};
pub use oxilangtag::LanguageTagParseError;
pub use oxiri::IriParseError;
