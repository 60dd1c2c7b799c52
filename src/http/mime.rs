//! MIME type constants used for content negotiation.
//!
//! The values are exact, case-sensitive strings; the server echoes them back in
//! `Content-Type` and the parser registry is keyed by them.
//!
//! | Constant | Value |
//! |----------|-------|
//! | [`TURTLE`] | `text/turtle` |
//! | [`N_TRIPLES`] | `application/n-triples` |
//! | [`N_QUADS`] | `application/n-quads` |
//! | [`N3`] | `text/n3` |
//! | [`TRIG`] | `application/trig` |
//! | [`JSON_LD`] | `application/ld+json` |
//! | [`RDF_XML`] | `application/rdf+xml` |
//! | [`SPARQL_RESULTS_JSON`] | `application/sparql-results+json` |
//! | [`SPARQL_RESULTS_XML`] | `application/sparql-results+xml` |
//! | [`RDF_JSON`] | `application/rdf+json` |

/// Turtle
pub const TURTLE: &str = "text/turtle";
/// N-Triples
pub const N_TRIPLES: &str = "application/n-triples";
/// N-Quads
pub const N_QUADS: &str = "application/n-quads";
/// Notation3
pub const N3: &str = "text/n3";
/// TriG
pub const TRIG: &str = "application/trig";
/// JSON-LD
pub const JSON_LD: &str = "application/ld+json";
/// RDF/XML
pub const RDF_XML: &str = "application/rdf+xml";
/// SPARQL 1.1 query results, JSON
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
/// SPARQL 1.1 query results, XML
pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";
/// RDF/JSON (Talis)
pub const RDF_JSON: &str = "application/rdf+json";

/// Request body types for queries and updates.
pub mod query_content_type {
    /// Form encoded `query=` / `update=` body
    pub const X_WWW_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    /// Raw SPARQL query body
    pub const SPARQL_QUERY: &str = "application/sparql-query";
    /// Raw SPARQL update body
    pub const SPARQL_UPDATE: &str = "application/sparql-update";
}

/// Plain text, used for namespaces and repository size.
pub const TEXT_PLAIN: &str = "text/plain";

/// JSON, used by the server's repository management resource.
pub const JSON: &str = "application/json";

/// Every RDF serialization the client negotiates.
pub const RDF_TYPES: [&str; 8] = [TURTLE, N_TRIPLES, N_QUADS, N3, TRIG, JSON_LD, RDF_XML, RDF_JSON];

/// Whether the type names an RDF graph serialization (as opposed to SPARQL results).
pub fn is_rdf_type(mime: &str) -> bool {
    RDF_TYPES.contains(&mime)
}
