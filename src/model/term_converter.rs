//! Conversion between plain strings and RDF terms.
//!
//! Statement payloads accept terms either in N-Triples form (`<http://...>`,
//! `"7931000"^^<...>`, `_:b0`) or as bare IRIs. [`to_nt_term`] normalizes both to
//! the N-Triples form the protocol expects; encoded values pass through unchanged.
//!
//! ```
//! use graphdb_http::model::term_converter::to_nt_term;
//!
//! assert_eq!(to_nt_term("http://example.org/a"), "<http://example.org/a>");
//! assert_eq!(to_nt_term("<http://example.org/a>"), "<http://example.org/a>");
//! assert_eq!(to_nt_term("\"42\"^^http://www.w3.org/2001/XMLSchema#integer"),
//!            "\"42\"^^http://www.w3.org/2001/XMLSchema#integer");
//! ```

use crate::error::{GraphDbError, Result};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject};
use std::fmt::Write;

/// Whether a value is already in N-Triples form (IRI, literal or blank node).
pub fn is_encoded(value: &str) -> bool {
    (value.starts_with('<') && value.ends_with('>'))
        || value.starts_with('"')
        || value.starts_with("_:")
}

/// Wrap a bare IRI in angle brackets; leave encoded values alone.
pub fn to_nt_term(value: &str) -> String {
    if is_encoded(value) {
        value.to_string()
    } else {
        format!("<{}>", value)
    }
}

/// Strip the angle brackets of an encoded IRI, if present.
pub fn strip_iri(value: &str) -> &str {
    value
        .strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(value)
}

/// Parse an IRI, bare or bracketed.
pub fn to_named_node(value: &str) -> Result<NamedNode> {
    NamedNode::new(strip_iri(value))
        .map_err(|e| GraphDbError::parse(format!("invalid IRI '{}': {}", value, e)))
}

fn to_blank_node(label: &str) -> Result<BlankNode> {
    BlankNode::new(label).map_err(|e| GraphDbError::parse(format!("invalid blank node '_:{}': {}", label, e)))
}

/// Parse a subject: `_:label` is a blank node, anything else an IRI.
pub fn to_subject(value: &str) -> Result<Subject> {
    match value.strip_prefix("_:") {
        Some(label) => Ok(to_blank_node(label)?.into()),
        None => Ok(to_named_node(value)?.into()),
    }
}

/// Parse a graph name: `_:label` is a blank node, anything else an IRI.
pub fn to_graph_name(value: &str) -> Result<GraphName> {
    match value.strip_prefix("_:") {
        Some(label) => Ok(to_blank_node(label)?.into()),
        None => Ok(to_named_node(value)?.into()),
    }
}

/// Build a literal; a language tag takes precedence over a datatype.
pub fn to_literal(value: &str, datatype: Option<&str>, language: Option<&str>) -> Result<Literal> {
    match (language.filter(|l| !l.is_empty()), datatype.filter(|d| !d.is_empty())) {
        (Some(language), _) => Literal::new_language_tagged_literal(value, language)
            .map_err(|e| GraphDbError::parse(format!("invalid language tag '{}': {}", language, e))),
        (None, Some(datatype)) => Ok(Literal::new_typed_literal(value, to_named_node(datatype)?)),
        (None, None) => Ok(Literal::new_simple_literal(value)),
    }
}

/// Serialize quads as an N-Quads document.
pub fn to_nquads(quads: &[Quad]) -> String {
    let mut document = String::new();
    for quad in quads {
        let _ = writeln!(document, "{} .", quad);
    }
    document
}
