//! MIME type to parser mapping.

use super::ContentParser;
use crate::http::headers::content_type_essence;
use std::collections::HashMap;

/// Parsers keyed by the MIME type they handle.
///
/// Registering a parser for a type that already has one replaces it; the
/// previous parser is returned so the caller can tell.
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, ContentParser>,
}

impl ParserRegistry {
    /// An empty registry: every response is returned raw.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in parser.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for parser in ContentParser::ALL {
            registry.register(parser);
        }
        registry
    }

    /// Register a parser under its supported type, returning the one it replaces.
    pub fn register(&mut self, parser: ContentParser) -> Option<ContentParser> {
        self.parsers.insert(parser.supported_type().to_string(), parser)
    }

    /// Parser for a MIME type; media type parameters are ignored.
    pub fn get(&self, mime: &str) -> Option<ContentParser> {
        self.parsers.get(content_type_essence(mime)).copied()
    }

    /// Whether a parser is registered for the MIME type.
    pub fn contains(&self, mime: &str) -> bool {
        self.get(mime).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
