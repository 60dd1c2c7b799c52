//! RDF data model used by the client.
//!
//! Quads and terms are the `oxrdf` types; this module adds the conversions the
//! protocol needs between plain strings and terms.

pub mod term_converter;

pub use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
