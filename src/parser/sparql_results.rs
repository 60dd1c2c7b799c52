//! SPARQL query results in JSON and XML, parsed with `sparesults`.
//!
//! SELECT results become one [`RdfItem::Solution`] per row, unbound variables
//! omitted; ASK results become a single [`RdfItem::Boolean`].

use super::rdf::Sink;
use crate::error::Result;
use crate::types::{Bindings, RdfItem};
use sparesults::{QueryResultsFormat, QueryResultsParser, ReaderQueryResultsParserOutput};
use std::io::Read;

pub(crate) fn parse_results<R: Read>(format: QueryResultsFormat, reader: R, sink: &mut Sink<'_>) -> Result<()> {
    match QueryResultsParser::from_format(format).for_reader(reader)? {
        ReaderQueryResultsParserOutput::Solutions(solutions) => {
            for solution in solutions {
                let bindings: Bindings = solution?
                    .iter()
                    .map(|(variable, term)| (variable.as_str().to_string(), term.clone()))
                    .collect();
                sink(RdfItem::Solution(bindings))?;
            }
            Ok(())
        }
        ReaderQueryResultsParserOutput::Boolean(value) => sink(RdfItem::Boolean(value)),
    }
}
