//! Line and document based RDF syntaxes, parsed with `rio`.
//!
//! Triples land in the default graph. Blank node labels are kept as the parser
//! reports them, so identical input always produces identical quads.

use super::ParserConfig;
use crate::error::{GraphDbError, Result};
use crate::types::RdfItem;
use oxiri::Iri;
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use rio_api::model as rio;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{NQuadsParser, NTriplesParser, TriGParser, TurtleParser};
use rio_xml::RdfXmlParser;
use std::io::BufRead;

pub(crate) type Sink<'a> = dyn FnMut(RdfItem) -> Result<()> + 'a;

fn base_iri(config: &ParserConfig) -> Result<Option<Iri<String>>> {
    config
        .base_iri
        .as_ref()
        .map(|base| {
            Iri::parse(base.clone())
                .map_err(|e| GraphDbError::Config(format!("invalid base IRI '{}': {}", base, e)))
        })
        .transpose()
}

/// Turtle, and N3 documents restricted to the Turtle grammar.
pub(crate) fn parse_turtle<R: BufRead>(reader: R, config: &ParserConfig, sink: &mut Sink<'_>) -> Result<()> {
    TurtleParser::new(reader, base_iri(config)?).parse_all(&mut |triple| emit_triple(triple, sink))
}

pub(crate) fn parse_ntriples<R: BufRead>(reader: R, sink: &mut Sink<'_>) -> Result<()> {
    NTriplesParser::new(reader).parse_all(&mut |triple| emit_triple(triple, sink))
}

pub(crate) fn parse_nquads<R: BufRead>(reader: R, sink: &mut Sink<'_>) -> Result<()> {
    NQuadsParser::new(reader).parse_all(&mut |quad| emit_quad(quad, sink))
}

pub(crate) fn parse_trig<R: BufRead>(reader: R, config: &ParserConfig, sink: &mut Sink<'_>) -> Result<()> {
    TriGParser::new(reader, base_iri(config)?).parse_all(&mut |quad| emit_quad(quad, sink))
}

pub(crate) fn parse_rdf_xml<R: BufRead>(reader: R, config: &ParserConfig, sink: &mut Sink<'_>) -> Result<()> {
    RdfXmlParser::new(reader, base_iri(config)?).parse_all(&mut |triple| emit_triple(triple, sink))
}

fn emit_triple(triple: rio::Triple<'_>, sink: &mut Sink<'_>) -> Result<()> {
    let quad = Quad::new(
        subject(triple.subject)?,
        named_node(triple.predicate)?,
        term(triple.object)?,
        GraphName::DefaultGraph,
    );
    sink(RdfItem::Quad(quad))
}

fn emit_quad(quad: rio::Quad<'_>, sink: &mut Sink<'_>) -> Result<()> {
    let graph_name = match quad.graph_name {
        None => GraphName::DefaultGraph,
        Some(rio::GraphName::NamedNode(node)) => named_node(node)?.into(),
        Some(rio::GraphName::BlankNode(node)) => blank_node(node)?.into(),
    };
    let quad = Quad::new(
        subject(quad.subject)?,
        named_node(quad.predicate)?,
        term(quad.object)?,
        graph_name,
    );
    sink(RdfItem::Quad(quad))
}

fn named_node(node: rio::NamedNode<'_>) -> Result<NamedNode> {
    NamedNode::new(node.iri).map_err(|e| GraphDbError::parse(format!("invalid IRI <{}>: {}", node.iri, e)))
}

fn blank_node(node: rio::BlankNode<'_>) -> Result<BlankNode> {
    BlankNode::new(node.id).map_err(|e| GraphDbError::parse(format!("invalid blank node _:{}: {}", node.id, e)))
}

fn subject(subject: rio::Subject<'_>) -> Result<Subject> {
    match subject {
        rio::Subject::NamedNode(node) => Ok(named_node(node)?.into()),
        rio::Subject::BlankNode(node) => Ok(blank_node(node)?.into()),
        rio::Subject::Triple(_) => Err(GraphDbError::parse("quoted triples are not supported")),
    }
}

fn term(term: rio::Term<'_>) -> Result<Term> {
    match term {
        rio::Term::NamedNode(node) => Ok(named_node(node)?.into()),
        rio::Term::BlankNode(node) => Ok(blank_node(node)?.into()),
        rio::Term::Literal(literal) => Ok(self::literal(literal)?.into()),
        rio::Term::Triple(_) => Err(GraphDbError::parse("quoted triples are not supported")),
    }
}

fn literal(literal: rio::Literal<'_>) -> Result<Literal> {
    match literal {
        rio::Literal::Simple { value } => Ok(Literal::new_simple_literal(value)),
        rio::Literal::LanguageTaggedString { value, language } => {
            Literal::new_language_tagged_literal(value, language)
                .map_err(|e| GraphDbError::parse(format!("invalid language tag '{}': {}", language, e)))
        }
        rio::Literal::Typed { value, datatype } => Ok(Literal::new_typed_literal(value, named_node(datatype)?)),
    }
}
