//! Response parsers.
//!
//! Each supported serialization is a variant of the closed [`ContentParser`]
//! enum; a [`ParserRegistry`] maps MIME types to variants. Every variant can
//! parse a buffered body ([`ContentParser::parse`]) or a live one
//! ([`ContentParser::parse_stream`]); both run the same code and yield the same
//! items in the same order.
//!
//! | Variant | MIME type | Backend | Items |
//! |---------|-----------|---------|-------|
//! | `Turtle` | `text/turtle` | `rio_turtle` | quads |
//! | `NTriples` | `application/n-triples` | `rio_turtle` | quads |
//! | `NQuads` | `application/n-quads` | `rio_turtle` | quads |
//! | `N3` | `text/n3` | `rio_turtle`, Turtle subset | quads |
//! | `TriG` | `application/trig` | `rio_turtle` | quads |
//! | `JsonLd` | `application/ld+json` | `serde_json` | quads |
//! | `RdfXml` | `application/rdf+xml` | `rio_xml` | quads |
//! | `SparqlJson` | `application/sparql-results+json` | `sparesults` | solutions, boolean |
//! | `SparqlXml` | `application/sparql-results+xml` | `sparesults` | solutions, boolean |

mod jsonld;
mod rdf;
pub mod registry;
mod sparql_results;
pub mod stream;

pub use registry::ParserRegistry;
pub use stream::RdfItemStream;

use crate::error::Result;
use crate::http::{mime, ByteStream};
use crate::types::RdfItem;
use sparesults::QueryResultsFormat;
use std::fmt;
use std::io::BufRead;

/// Options passed to every parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// IRI relative references are resolved against
    pub base_iri: Option<String>,
}

impl ParserConfig {
    /// Set the base IRI.
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }
}

/// A response parser, one per supported serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentParser {
    /// Turtle
    Turtle,
    /// N-Triples
    NTriples,
    /// N-Quads
    NQuads,
    /// N3, limited to its Turtle subset
    N3,
    /// TriG
    TriG,
    /// JSON-LD, streamed by default
    JsonLd,
    /// RDF/XML
    RdfXml,
    /// SPARQL 1.1 query results, JSON
    SparqlJson,
    /// SPARQL query results, XML
    SparqlXml,
}

impl ContentParser {
    /// Every built-in parser.
    pub const ALL: [ContentParser; 9] = [
        ContentParser::Turtle,
        ContentParser::NTriples,
        ContentParser::NQuads,
        ContentParser::N3,
        ContentParser::TriG,
        ContentParser::JsonLd,
        ContentParser::RdfXml,
        ContentParser::SparqlJson,
        ContentParser::SparqlXml,
    ];

    /// MIME type handled by this parser.
    pub fn supported_type(&self) -> &'static str {
        match self {
            ContentParser::Turtle => mime::TURTLE,
            ContentParser::NTriples => mime::N_TRIPLES,
            ContentParser::NQuads => mime::N_QUADS,
            ContentParser::N3 => mime::N3,
            ContentParser::TriG => mime::TRIG,
            ContentParser::JsonLd => mime::JSON_LD,
            ContentParser::RdfXml => mime::RDF_XML,
            ContentParser::SparqlJson => mime::SPARQL_RESULTS_JSON,
            ContentParser::SparqlXml => mime::SPARQL_RESULTS_XML,
        }
    }

    /// Whether responses of this type are streamed even when the caller did not ask.
    pub fn is_streaming(&self) -> bool {
        matches!(self, ContentParser::JsonLd)
    }

    /// Parse from a reader, handing each item to `sink` as soon as it is complete.
    ///
    /// An error returned by `sink` stops parsing and is returned unchanged.
    pub fn parse_into<R: BufRead>(
        &self,
        reader: R,
        config: &ParserConfig,
        sink: &mut dyn FnMut(RdfItem) -> Result<()>,
    ) -> Result<()> {
        match self {
            ContentParser::Turtle | ContentParser::N3 => rdf::parse_turtle(reader, config, sink),
            ContentParser::NTriples => rdf::parse_ntriples(reader, sink),
            ContentParser::NQuads => rdf::parse_nquads(reader, sink),
            ContentParser::TriG => rdf::parse_trig(reader, config, sink),
            ContentParser::RdfXml => rdf::parse_rdf_xml(reader, config, sink),
            ContentParser::JsonLd => jsonld::parse_json_ld(reader, config, sink),
            ContentParser::SparqlJson => sparql_results::parse_results(QueryResultsFormat::Json, reader, sink),
            ContentParser::SparqlXml => sparql_results::parse_results(QueryResultsFormat::Xml, reader, sink),
        }
    }

    /// Parse a whole body, preserving document order.
    pub fn parse(&self, content: &[u8], config: &ParserConfig) -> Result<Vec<RdfItem>> {
        let mut items = Vec::new();
        self.parse_into(content, config, &mut |item| {
            items.push(item);
            Ok(())
        })?;
        Ok(items)
    }

    /// Parse a live body lazily. Must be called from within a tokio runtime.
    pub fn parse_stream(&self, body: ByteStream, config: ParserConfig) -> RdfItemStream {
        stream::spawn_parse(*self, body, config)
    }
}

impl fmt::Display for ContentParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.supported_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;
    use oxrdf::{GraphName, Literal, NamedNode, Quad};

    const SUBJECT: &str = "http://eunis.eea.europa.eu/countries/AZ";
    const PREDICATE: &str = "http://eunis.eea.europa.eu/rdf/schema.rdf#population";

    fn population() -> Vec<RdfItem> {
        vec![RdfItem::Quad(Quad::new(
            NamedNode::new_unchecked(SUBJECT),
            NamedNode::new_unchecked(PREDICATE),
            Literal::new_typed_literal("7931000", xsd::INTEGER),
            GraphName::DefaultGraph,
        ))]
    }

    #[test]
    fn test_every_rdf_format_yields_the_same_quad() {
        let documents = [
            (
                ContentParser::NTriples,
                format!("<{SUBJECT}> <{PREDICATE}> \"7931000\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"),
            ),
            (
                ContentParser::NQuads,
                format!("<{SUBJECT}> <{PREDICATE}> \"7931000\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"),
            ),
            (ContentParser::Turtle, format!("<{SUBJECT}> <{PREDICATE}> 7931000 .")),
            (ContentParser::N3, format!("<{SUBJECT}> <{PREDICATE}> 7931000 .")),
            (ContentParser::TriG, format!("{{ <{SUBJECT}> <{PREDICATE}> 7931000 . }}")),
            (
                ContentParser::JsonLd,
                format!(r#"[{{"@id": "{SUBJECT}", "{PREDICATE}": [{{"@value": 7931000}}]}}]"#),
            ),
            (
                ContentParser::RdfXml,
                format!(
                    r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:s="http://eunis.eea.europa.eu/rdf/schema.rdf#">
  <rdf:Description rdf:about="{SUBJECT}">
    <s:population rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">7931000</s:population>
  </rdf:Description>
</rdf:RDF>"#
                ),
            ),
        ];

        for (parser, document) in documents {
            let items = parser.parse(document.as_bytes(), &ParserConfig::default()).unwrap();
            assert_eq!(items, population(), "{parser}");
        }
    }

    #[test]
    fn test_supported_types_are_distinct() {
        let mut types: Vec<&str> = ContentParser::ALL.iter().map(|p| p.supported_type()).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), ContentParser::ALL.len());
    }

    #[test]
    fn test_only_json_ld_streams_by_default() {
        let streaming: Vec<ContentParser> = ContentParser::ALL
            .into_iter()
            .filter(ContentParser::is_streaming)
            .collect();
        assert_eq!(streaming, vec![ContentParser::JsonLd]);
    }

    #[tokio::test]
    async fn test_json_ld_streamed_equals_buffered() {
        let document = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/statements.jsonld")).unwrap();
        let buffered = ContentParser::JsonLd.parse(&document, &ParserConfig::default()).unwrap();

        let chunks: Vec<Result<bytes::Bytes>> = document
            .chunks(11)
            .map(|chunk| Ok(bytes::Bytes::copy_from_slice(chunk)))
            .collect();
        let streamed = ContentParser::JsonLd
            .parse_stream(Box::pin(futures::stream::iter(chunks)), ParserConfig::default())
            .collect_items()
            .await
            .unwrap();

        assert!(!buffered.is_empty());
        assert_eq!(streamed, buffered);
    }
}
