//! SPARQL queries and updates.

pub mod payload;

pub use payload::{EncodedQuery, GetQueryPayload, QueryLanguage, QueryType, UpdateQueryPayload, EXPLAIN_GRAPH};
