//! JSON-LD documents, read incrementally.
//!
//! The document is walked with a `serde` visitor directly over the byte stream.
//! A top-level array, or the `@graph` of a top-level object whose `@context`
//! came first, is converted one node object at a time, so memory use is bounded
//! by the largest node rather than by the document. A `@graph` that precedes the
//! `@context` is buffered until the enclosing object ends.
//!
//! Supported: inline contexts (terms, compact IRIs, `@vocab`, `@base`,
//! `@language`, `@type` coercion, `@container: @list`), node objects, value
//! objects, `@list`, `@set`, embedded nodes, named graphs. Remote contexts and
//! reverse properties are rejected with a parse error.
//!
//! Blank nodes are relabelled `b0`, `b1`, ... in order of first appearance.

use super::rdf::Sink;
use super::ParserConfig;
use crate::error::{GraphDbError, Result};
use crate::types::RdfItem;
use oxiri::Iri;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Read;

pub(crate) fn parse_json_ld<R: Read>(reader: R, config: &ParserConfig, sink: &mut Sink<'_>) -> Result<()> {
    let mut emitter = Emitter::new(config, sink);
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let outcome = Document {
        emitter: &mut emitter,
    }
    .deserialize(&mut deserializer);
    if let Some(failure) = emitter.failure.take() {
        return Err(failure);
    }
    outcome?;
    deserializer.end()?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct TermDefinition {
    iri: String,
    /// `@id`, `@vocab` or a datatype IRI
    type_mapping: Option<String>,
    /// `Some(None)` when the term explicitly has no language
    language: Option<Option<String>>,
    list: bool,
}

#[derive(Debug, Clone, Default)]
struct Context {
    base: Option<String>,
    vocab: Option<String>,
    language: Option<String>,
    /// `None` marks a term mapped to null
    terms: HashMap<String, Option<TermDefinition>>,
}

impl Context {
    fn update(&self, local: &Value) -> Result<Context> {
        match local {
            Value::Null => Ok(Context {
                base: self.base.clone(),
                ..Context::default()
            }),
            Value::Array(items) => items.iter().try_fold(self.clone(), |context, item| context.update(item)),
            Value::String(iri) => Err(GraphDbError::parse(format!(
                "remote context <{}> is not supported",
                iri
            ))),
            Value::Object(map) => {
                let mut context = self.clone();
                context.apply(map)?;
                Ok(context)
            }
            other => Err(GraphDbError::parse(format!("invalid @context: {}", other))),
        }
    }

    fn apply(&mut self, local: &Map<String, Value>) -> Result<()> {
        if local.contains_key("@import") {
            return Err(GraphDbError::parse("@import is not supported"));
        }
        if let Some(base) = local.get("@base") {
            self.base = match base {
                Value::Null => None,
                Value::String(iri) => Some(self.resolve(iri)?),
                other => return Err(GraphDbError::parse(format!("invalid @base: {}", other))),
            };
        }
        if let Some(vocab) = local.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(iri) => self.expand_iri(iri, true, true)?,
                other => return Err(GraphDbError::parse(format!("invalid @vocab: {}", other))),
            };
        }
        if let Some(language) = local.get("@language") {
            self.language = match language {
                Value::Null => None,
                Value::String(tag) => Some(tag.clone()),
                other => return Err(GraphDbError::parse(format!("invalid @language: {}", other))),
            };
        }

        let mut defined = HashSet::new();
        for term in local.keys().filter(|term| !term.starts_with('@')) {
            self.define(local, term, &mut defined)?;
        }
        Ok(())
    }

    fn define(&mut self, local: &Map<String, Value>, term: &str, defined: &mut HashSet<String>) -> Result<()> {
        if !defined.insert(term.to_string()) {
            return Ok(());
        }
        self.terms.remove(term);
        let definition = match local.get(term) {
            None | Some(Value::Null) => None,
            Some(Value::String(iri)) => self.term_iri(local, iri, defined)?.map(|iri| TermDefinition {
                iri,
                ..TermDefinition::default()
            }),
            Some(Value::Object(map)) => self.expanded_definition(local, term, map, defined)?,
            Some(other) => {
                return Err(GraphDbError::parse(format!(
                    "invalid definition of term '{}': {}",
                    term, other
                )))
            }
        };
        self.terms.insert(term.to_string(), definition);
        Ok(())
    }

    fn expanded_definition(
        &mut self,
        local: &Map<String, Value>,
        term: &str,
        map: &Map<String, Value>,
        defined: &mut HashSet<String>,
    ) -> Result<Option<TermDefinition>> {
        if map.contains_key("@reverse") {
            return Err(GraphDbError::parse(format!(
                "reverse property '{}' is not supported",
                term
            )));
        }
        let iri = match map.get("@id") {
            Some(Value::Null) => return Ok(None),
            Some(Value::String(id)) => self.term_iri(local, id, defined)?,
            Some(other) => return Err(GraphDbError::parse(format!("invalid @id of term '{}': {}", term, other))),
            None => self.term_iri(local, term, defined)?,
        };
        let Some(iri) = iri else {
            return Ok(None);
        };

        let type_mapping = match map.get("@type") {
            None | Some(Value::Null) => None,
            Some(Value::String(kind)) if kind == "@id" || kind == "@vocab" => Some(kind.clone()),
            Some(Value::String(datatype)) => Some(self.term_iri(local, datatype, defined)?.ok_or_else(|| {
                GraphDbError::parse(format!("datatype of term '{}' expands to null", term))
            })?),
            Some(other) => return Err(GraphDbError::parse(format!("invalid @type of term '{}': {}", term, other))),
        };
        let language = match map.get("@language") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(tag)) => Some(Some(tag.clone())),
            Some(other) => {
                return Err(GraphDbError::parse(format!(
                    "invalid @language of term '{}': {}",
                    term, other
                )))
            }
        };
        let list = match map.get("@container") {
            Some(Value::String(container)) => container == "@list",
            Some(Value::Array(containers)) => containers.iter().any(|container| container == "@list"),
            _ => false,
        };

        Ok(Some(TermDefinition {
            iri,
            type_mapping,
            language,
            list,
        }))
    }

    /// Expand an IRI inside a context, defining the terms it depends on first.
    fn term_iri(&mut self, local: &Map<String, Value>, value: &str, defined: &mut HashSet<String>) -> Result<Option<String>> {
        let dependency = value.split_once(':').map_or(value, |(prefix, _)| prefix);
        if local.contains_key(dependency) {
            self.define(local, dependency, defined)?;
        }
        self.expand_iri(value, true, false)
    }

    /// `None` when the value is a term mapped to null.
    fn expand_iri(&self, value: &str, vocab: bool, document_relative: bool) -> Result<Option<String>> {
        if value.starts_with('@') {
            return Ok(Some(value.to_string()));
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return Ok(definition.as_ref().map(|definition| definition.iri.clone()));
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Ok(Some(value.to_string()));
            }
            if let Some(Some(definition)) = self.terms.get(prefix) {
                return Ok(Some(format!("{}{}", definition.iri, suffix)));
            }
            return Ok(Some(value.to_string()));
        }
        if vocab {
            if let Some(vocab) = &self.vocab {
                return Ok(Some(format!("{}{}", vocab, value)));
            }
        }
        if document_relative {
            return self.resolve(value).map(Some);
        }
        Ok(Some(value.to_string()))
    }

    fn resolve(&self, value: &str) -> Result<String> {
        match &self.base {
            Some(base) => Iri::parse(base.as_str())
                .and_then(|base| base.resolve(value))
                .map(|iri| iri.into_inner())
                .map_err(|e| GraphDbError::parse(format!("cannot resolve '{}' against <{}>: {}", value, base, e))),
            None => Ok(value.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
enum NodeId {
    Named(NamedNode),
    Blank(BlankNode),
}

impl From<NodeId> for Subject {
    fn from(node: NodeId) -> Self {
        match node {
            NodeId::Named(node) => node.into(),
            NodeId::Blank(node) => node.into(),
        }
    }
}

impl From<NodeId> for Term {
    fn from(node: NodeId) -> Self {
        match node {
            NodeId::Named(node) => node.into(),
            NodeId::Blank(node) => node.into(),
        }
    }
}

impl From<NodeId> for GraphName {
    fn from(node: NodeId) -> Self {
        match node {
            NodeId::Named(node) => node.into(),
            NodeId::Blank(node) => node.into(),
        }
    }
}

fn values_of(value: Option<&Value>) -> &[Value] {
    match value {
        None => &[],
        Some(Value::Array(items)) => items,
        Some(single) => std::slice::from_ref(single),
    }
}

fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| GraphDbError::parse(format!("invalid IRI <{}>: {}", iri, e)))
}

fn canonical_double(value: f64) -> String {
    let formatted = format!("{:E}", value);
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => format!("{}.0E{}", mantissa, exponent),
        _ => formatted,
    }
}

fn number_literal(number: &Number, datatype: Option<&str>) -> Result<Literal> {
    let integral = number
        .as_i64()
        .map(|n| n.to_string())
        .or_else(|| number.as_u64().map(|n| n.to_string()))
        .or_else(|| {
            number
                .as_f64()
                .filter(|n| n.fract() == 0.0 && n.abs() < 1e21)
                .map(|n| format!("{:.0}", n))
        });
    match integral {
        Some(lexical) if datatype != Some(xsd::DOUBLE.as_str()) => Ok(Literal::new_typed_literal(
            lexical,
            named_node(datatype.unwrap_or(xsd::INTEGER.as_str()))?,
        )),
        _ => Ok(Literal::new_typed_literal(
            canonical_double(number.as_f64().unwrap_or_default()),
            named_node(datatype.unwrap_or(xsd::DOUBLE.as_str()))?,
        )),
    }
}

struct Emitter<'a, 'b> {
    root: Context,
    sink: &'a mut Sink<'b>,
    blank_nodes: HashMap<String, BlankNode>,
    next_blank: usize,
    failure: Option<GraphDbError>,
}

impl<'a, 'b> Emitter<'a, 'b> {
    fn new(config: &ParserConfig, sink: &'a mut Sink<'b>) -> Self {
        Emitter {
            root: Context {
                base: config.base_iri.clone(),
                ..Context::default()
            },
            sink,
            blank_nodes: HashMap::new(),
            next_blank: 0,
            failure: None,
        }
    }

    /// Keep the error and hand `serde` a message so deserialization stops.
    fn fail<E: de::Error>(&mut self, error: GraphDbError) -> E {
        let message = error.to_string();
        self.failure = Some(error);
        E::custom(message)
    }

    fn fresh_blank(&mut self) -> BlankNode {
        let node = BlankNode::new_unchecked(format!("b{}", self.next_blank));
        self.next_blank += 1;
        node
    }

    fn reference(&mut self, iri: &str) -> Result<NodeId> {
        match iri.strip_prefix("_:") {
            Some(label) => {
                if let Some(node) = self.blank_nodes.get(label) {
                    return Ok(NodeId::Blank(node.clone()));
                }
                let node = self.fresh_blank();
                self.blank_nodes.insert(label.to_string(), node.clone());
                Ok(NodeId::Blank(node))
            }
            None => named_node(iri).map(NodeId::Named),
        }
    }

    fn node_id(&mut self, context: &Context, id: &str) -> Result<NodeId> {
        let iri = context
            .expand_iri(id, false, true)?
            .ok_or_else(|| GraphDbError::parse(format!("@id '{}' expands to null", id)))?;
        self.reference(&iri)
    }

    fn emit(&mut self, subject: &NodeId, predicate: NamedNode, object: Term, graph: &GraphName) -> Result<()> {
        (self.sink)(RdfItem::Quad(Quad::new(
            subject.clone(),
            predicate,
            object,
            graph.clone(),
        )))
    }

    /// Element of a top-level array or of a `@graph`.
    fn top_level(&mut self, context: &Context, value: &Value, graph: &GraphName) -> Result<()> {
        match value {
            Value::Array(items) => items.iter().try_for_each(|item| self.top_level(context, item, graph)),
            Value::Object(map) if map.contains_key("@set") => self.top_level(context, &map["@set"], graph),
            Value::Object(map) if !map.contains_key("@value") && !map.contains_key("@list") => {
                self.node(context, map, graph).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    fn node(&mut self, context: &Context, map: &Map<String, Value>, graph: &GraphName) -> Result<NodeId> {
        let scoped;
        let context = match map.get("@context") {
            Some(local) => {
                scoped = context.update(local)?;
                &scoped
            }
            None => context,
        };

        let id = match map.get("@id") {
            Some(Value::String(id)) => self.node_id(context, id)?,
            Some(other) => return Err(GraphDbError::parse(format!("invalid @id: {}", other))),
            None => NodeId::Blank(self.fresh_blank()),
        };

        for kind in values_of(map.get("@type")) {
            let Value::String(kind) = kind else {
                return Err(GraphDbError::parse(format!("invalid @type: {}", kind)));
            };
            let iri = context
                .expand_iri(kind, true, true)?
                .ok_or_else(|| GraphDbError::parse(format!("@type '{}' expands to null", kind)))?;
            let object = self.reference(&iri)?;
            self.emit(&id, rdf::TYPE.into_owned(), object.into(), graph)?;
        }

        for (key, value) in map {
            match key.as_str() {
                "@graph" => {
                    let named = GraphName::from(id.clone());
                    self.top_level(context, value, &named)?;
                }
                "@included" => self.top_level(context, value, graph)?,
                "@reverse" => return Err(GraphDbError::parse("@reverse is not supported")),
                keyword if keyword.starts_with('@') => {}
                _ => self.property(context, &id, key, value, graph)?,
            }
        }
        Ok(id)
    }

    fn property(&mut self, context: &Context, subject: &NodeId, key: &str, value: &Value, graph: &GraphName) -> Result<()> {
        let definition = match context.terms.get(key) {
            Some(None) => return Ok(()),
            Some(Some(definition)) => Some(definition),
            None => None,
        };
        let Some(iri) = context.expand_iri(key, true, false)? else {
            return Ok(());
        };
        // properties that do not expand to an absolute IRI are dropped
        if iri.starts_with('@') || iri.starts_with("_:") || !iri.contains(':') {
            return Ok(());
        }
        let predicate = named_node(&iri)?;

        let mut objects = Vec::new();
        let wrap_in_list = definition.map_or(false, |definition| definition.list)
            && !matches!(value, Value::Array(_) | Value::Null)
            && value.get("@list").is_none();
        if wrap_in_list {
            objects.push(self.list(context, definition, std::slice::from_ref(value), graph)?);
        } else {
            self.objects(context, definition, value, graph, &mut objects)?;
        }
        for object in objects {
            self.emit(subject, predicate.clone(), object, graph)?;
        }
        Ok(())
    }

    fn objects(
        &mut self,
        context: &Context,
        definition: Option<&TermDefinition>,
        value: &Value,
        graph: &GraphName,
        out: &mut Vec<Term>,
    ) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Array(items) if definition.map_or(false, |definition| definition.list) => {
                out.push(self.list(context, definition, items, graph)?);
                Ok(())
            }
            Value::Array(items) => items
                .iter()
                .try_for_each(|item| self.objects(context, definition, item, graph, out)),
            Value::Object(map) => {
                if let Some(literal) = map.get("@value") {
                    out.extend(self.value_object(context, map, literal)?);
                } else if map.contains_key("@list") {
                    out.push(self.list(context, definition, values_of(map.get("@list")), graph)?);
                } else if let Some(inner) = map.get("@set") {
                    self.objects(context, definition, inner, graph, out)?;
                } else {
                    out.push(self.node(context, map, graph)?.into());
                }
                Ok(())
            }
            scalar => {
                out.extend(self.scalar(context, definition, scalar)?);
                Ok(())
            }
        }
    }

    fn list(
        &mut self,
        context: &Context,
        definition: Option<&TermDefinition>,
        items: &[Value],
        graph: &GraphName,
    ) -> Result<Term> {
        let mut members = Vec::new();
        for item in items {
            match item {
                Value::Array(nested) => members.push(self.list(context, definition, nested, graph)?),
                _ => self.objects(context, definition, item, graph, &mut members)?,
            }
        }
        if members.is_empty() {
            return Ok(rdf::NIL.into_owned().into());
        }

        let cells: Vec<BlankNode> = members.iter().map(|_| self.fresh_blank()).collect();
        for (index, member) in members.into_iter().enumerate() {
            let cell = NodeId::Blank(cells[index].clone());
            self.emit(&cell, rdf::FIRST.into_owned(), member, graph)?;
            let rest: Term = match cells.get(index + 1) {
                Some(next) => next.clone().into(),
                None => rdf::NIL.into_owned().into(),
            };
            self.emit(&cell, rdf::REST.into_owned(), rest, graph)?;
        }
        Ok(cells[0].clone().into())
    }

    fn value_object(&mut self, context: &Context, map: &Map<String, Value>, value: &Value) -> Result<Option<Term>> {
        let datatype = match map.get("@type") {
            None | Some(Value::Null) => None,
            Some(Value::String(datatype)) => Some(
                context
                    .expand_iri(datatype, true, true)?
                    .ok_or_else(|| GraphDbError::parse(format!("datatype '{}' expands to null", datatype)))?,
            ),
            Some(other) => return Err(GraphDbError::parse(format!("invalid @type of value: {}", other))),
        };
        let language = map.get("@language").and_then(Value::as_str);

        let literal = match value {
            Value::Null => return Ok(None),
            Value::String(text) => match (language, &datatype) {
                (Some(tag), _) => Literal::new_language_tagged_literal(text.as_str(), tag)
                    .map_err(|e| GraphDbError::parse(format!("invalid language tag '{}': {}", tag, e)))?,
                (None, Some(datatype)) => Literal::new_typed_literal(text.as_str(), named_node(datatype)?),
                (None, None) => Literal::new_simple_literal(text.as_str()),
            },
            Value::Bool(flag) => Literal::new_typed_literal(
                flag.to_string(),
                named_node(datatype.as_deref().unwrap_or(xsd::BOOLEAN.as_str()))?,
            ),
            Value::Number(number) => number_literal(number, datatype.as_deref())?,
            other => return Err(GraphDbError::parse(format!("invalid @value: {}", other))),
        };
        Ok(Some(literal.into()))
    }

    fn scalar(&mut self, context: &Context, definition: Option<&TermDefinition>, value: &Value) -> Result<Option<Term>> {
        let coercion = definition.and_then(|definition| definition.type_mapping.as_deref());
        let literal = match (value, coercion) {
            (Value::String(text), Some("@id")) => {
                return match context.expand_iri(text, false, true)? {
                    Some(iri) => Ok(Some(self.reference(&iri)?.into())),
                    None => Ok(None),
                };
            }
            (Value::String(text), Some("@vocab")) => {
                return match context.expand_iri(text, true, true)? {
                    Some(iri) => Ok(Some(self.reference(&iri)?.into())),
                    None => Ok(None),
                };
            }
            (Value::String(text), Some(datatype)) => Literal::new_typed_literal(text.as_str(), named_node(datatype)?),
            (Value::String(text), None) => {
                let language = match definition.and_then(|definition| definition.language.as_ref()) {
                    Some(language) => language.as_deref(),
                    None => context.language.as_deref(),
                };
                match language {
                    Some(tag) => Literal::new_language_tagged_literal(text.as_str(), tag)
                        .map_err(|e| GraphDbError::parse(format!("invalid language tag '{}': {}", tag, e)))?,
                    None => Literal::new_simple_literal(text.as_str()),
                }
            }
            (Value::Bool(flag), coercion) => Literal::new_typed_literal(
                flag.to_string(),
                named_node(coercion.filter(|c| !c.starts_with('@')).unwrap_or(xsd::BOOLEAN.as_str()))?,
            ),
            (Value::Number(number), coercion) => number_literal(number, coercion.filter(|c| !c.starts_with('@')))?,
            _ => return Ok(None),
        };
        Ok(Some(literal.into()))
    }

    fn finish_object(
        &mut self,
        context: &Context,
        id: Option<String>,
        graph: Option<Value>,
        mut properties: Map<String, Value>,
    ) -> Result<()> {
        let has_properties = !properties.is_empty();
        if let Some(id) = id {
            properties.insert("@id".to_string(), Value::String(id));
        }
        match graph {
            Some(graph) if !properties.is_empty() => {
                properties.insert("@graph".to_string(), graph);
                self.node(context, &properties, &GraphName::DefaultGraph).map(|_| ())
            }
            Some(graph) => self.top_level(context, &graph, &GraphName::DefaultGraph),
            None if has_properties => self.node(context, &properties, &GraphName::DefaultGraph).map(|_| ()),
            None => Ok(()),
        }
    }
}

/// Top-level value of the document.
struct Document<'e, 'a, 'b> {
    emitter: &'e mut Emitter<'a, 'b>,
}

impl<'de> DeserializeSeed<'de> for Document<'_, '_, '_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Document<'_, '_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON-LD document")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> std::result::Result<(), A::Error> {
        let context = self.emitter.root.clone();
        GraphSeed {
            emitter: self.emitter,
            context: &context,
            graph: &GraphName::DefaultGraph,
        }
        .visit_seq(seq)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<(), A::Error> {
        let emitter = self.emitter;
        let mut context = emitter.root.clone();
        let mut context_seen = false;
        let mut id: Option<String> = None;
        let mut buffered_graph: Option<Value> = None;
        let mut graph_streamed = false;
        let mut properties = Map::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "@context" => {
                    let local: Value = map.next_value()?;
                    context = context
                        .update(&local)
                        .map_err(|e| emitter.fail::<A::Error>(e))?;
                    context_seen = true;
                }
                "@id" => {
                    let Value::String(value) = map.next_value::<Value>()? else {
                        return Err(emitter.fail(GraphDbError::parse("@id must be a string")));
                    };
                    if graph_streamed {
                        return Err(emitter.fail(GraphDbError::parse("@id must precede @graph")));
                    }
                    id = Some(value);
                }
                "@graph" if context_seen => {
                    let graph = match &id {
                        Some(id) => emitter
                            .node_id(&context, id)
                            .map(GraphName::from)
                            .map_err(|e| emitter.fail::<A::Error>(e))?,
                        None => GraphName::DefaultGraph,
                    };
                    map.next_value_seed(GraphSeed {
                        emitter: &mut *emitter,
                        context: &context,
                        graph: &graph,
                    })?;
                    graph_streamed = true;
                }
                "@graph" => buffered_graph = Some(map.next_value()?),
                _ => {
                    let value: Value = map.next_value()?;
                    properties.insert(key, value);
                }
            }
        }

        emitter
            .finish_object(&context, id, buffered_graph, properties)
            .map_err(|e| emitter.fail(e))
    }
}

/// Content of a streamed `@graph`: node objects, one at a time.
struct GraphSeed<'e, 'a, 'b, 'c> {
    emitter: &'e mut Emitter<'a, 'b>,
    context: &'c Context,
    graph: &'c GraphName,
}

impl<'de> DeserializeSeed<'de> for GraphSeed<'_, '_, '_, '_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for GraphSeed<'_, '_, '_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of node objects")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<(), A::Error> {
        while let Some(element) = seq.next_element::<Value>()? {
            self.emitter
                .top_level(self.context, &element, self.graph)
                .map_err(|e| self.emitter.fail::<A::Error>(e))?;
        }
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<(), A::Error> {
        let node = Value::deserialize(MapAccessDeserializer::new(map))?;
        self.emitter
            .top_level(self.context, &node, self.graph)
            .map_err(|e| self.emitter.fail(e))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<(), E> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Result<Vec<Quad>> {
        let mut quads = Vec::new();
        parse_json_ld(doc.as_bytes(), &ParserConfig::default(), &mut |item| {
            quads.extend(item.into_quad());
            Ok(())
        })?;
        Ok(quads)
    }

    fn iri(value: &str) -> NamedNode {
        NamedNode::new_unchecked(value)
    }

    #[test]
    fn test_expanded_document() {
        let quads = parse(
            r#"[{
                "@id": "http://eunis.eea.europa.eu/countries/AZ",
                "http://eunis.eea.europa.eu/rdf/schema.rdf#population": [{"@value": 7931000}]
            }]"#,
        )
        .unwrap();
        assert_eq!(
            quads,
            vec![Quad::new(
                iri("http://eunis.eea.europa.eu/countries/AZ"),
                iri("http://eunis.eea.europa.eu/rdf/schema.rdf#population"),
                Literal::new_typed_literal("7931000", xsd::INTEGER),
                GraphName::DefaultGraph,
            )]
        );
    }

    #[test]
    fn test_compacted_document_with_context() {
        let quads = parse(
            r#"{
                "@context": {
                    "@vocab": "http://schema.org/",
                    "@language": "en",
                    "ex": "http://example.org/",
                    "knows": {"@type": "@id"},
                    "tags": {"@container": "@list"},
                    "born": {"@id": "ex:born", "@type": "http://www.w3.org/2001/XMLSchema#date"}
                },
                "@id": "ex:alice",
                "@type": "Person",
                "name": "Alice",
                "knows": "ex:bob",
                "born": "1990-01-01",
                "tags": ["a", "b"]
            }"#,
        )
        .unwrap();

        let alice = iri("http://example.org/alice");
        let expect = |predicate: &str, object: Term| {
            Quad::new(alice.clone(), iri(predicate), object, GraphName::DefaultGraph)
        };
        assert_eq!(quads.len(), 9);
        assert!(quads.contains(&expect(rdf::TYPE.as_str(), iri("http://schema.org/Person").into())));
        assert!(quads.contains(&expect(
            "http://schema.org/name",
            Literal::new_language_tagged_literal("Alice", "en").unwrap().into()
        )));
        assert!(quads.contains(&expect("http://schema.org/knows", iri("http://example.org/bob").into())));
        assert!(quads.contains(&expect(
            "http://example.org/born",
            Literal::new_typed_literal("1990-01-01", xsd::DATE).into()
        )));
        let firsts: Vec<&Term> = quads
            .iter()
            .filter(|quad| quad.predicate == rdf::FIRST)
            .map(|quad| &quad.object)
            .collect();
        assert_eq!(firsts.len(), 2);
        assert!(quads
            .iter()
            .any(|quad| quad.predicate == rdf::REST && quad.object == Term::from(rdf::NIL.into_owned())));
    }

    #[test]
    fn test_named_graph() {
        let quads = parse(
            r#"{
                "@context": {"ex": "http://example.org/"},
                "@id": "ex:graph",
                "@graph": [
                    {"@id": "ex:s", "ex:p": {"@id": "ex:o"}},
                    {"@id": "ex:t", "ex:p": true}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(quads.len(), 2);
        assert!(quads.iter().all(|quad| quad.graph_name == iri("http://example.org/graph").into()));
        assert_eq!(quads[1].object, Literal::new_typed_literal("true", xsd::BOOLEAN).into());
    }

    #[test]
    fn test_graph_before_context_is_buffered() {
        let context_first = r#"{"@context": {"ex": "http://example.org/"},
            "@graph": [{"@id": "ex:s", "ex:p": [{"ex:q": 1.5}, "x"]}]}"#;
        let graph_first = r#"{"@graph": [{"@id": "ex:s", "ex:p": [{"ex:q": 1.5}, "x"]}],
            "@context": {"ex": "http://example.org/"}}"#;

        let streamed = parse(context_first).unwrap();
        assert_eq!(streamed, parse(graph_first).unwrap());
        assert_eq!(streamed.len(), 3);
        assert!(streamed.contains(&Quad::new(
            BlankNode::new_unchecked("b0"),
            iri("http://example.org/q"),
            Literal::new_typed_literal("1.5E0", xsd::DOUBLE),
            GraphName::DefaultGraph,
        )));
    }

    #[test]
    fn test_blank_node_labels_are_shared() {
        let quads = parse(
            r#"[{"@id": "_:x", "http://example.org/p": {"@id": "_:y"}},
                {"@id": "_:y", "http://example.org/p": {"@id": "_:x"}}]"#,
        )
        .unwrap();
        assert_eq!(Term::from(quads[0].subject.clone()), quads[1].object);
        assert_eq!(quads[0].object, Term::from(quads[1].subject.clone()));
    }

    #[test]
    fn test_unmapped_properties_are_dropped() {
        let quads = parse(r#"{"@id": "http://example.org/s", "label": "no vocab"}"#).unwrap();
        assert!(quads.is_empty());
    }

    #[test]
    fn test_remote_context_rejected() {
        let err = parse(r#"{"@context": "https://schema.org/", "name": "x"}"#).unwrap_err();
        assert!(matches!(err, GraphDbError::Parse(message) if message.contains("remote context")));
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse(r#"[{"@id": "http://example.org/s""#).is_err());
    }

    #[test]
    fn test_sink_error_is_returned() {
        let doc = r#"[{"@id": "http://a.org/s", "http://a.org/p": ["1", "2"]}]"#;
        let err = parse_json_ld(doc.as_bytes(), &ParserConfig::default(), &mut |_| Err(GraphDbError::StreamClosed))
            .unwrap_err();
        assert!(matches!(err, GraphDbError::StreamClosed));
    }

    #[test]
    fn test_canonical_double() {
        assert_eq!(canonical_double(5.3), "5.3E0");
        assert_eq!(canonical_double(1e21), "1.0E21");
        assert_eq!(canonical_double(0.000125), "1.25E-4");
    }
}
