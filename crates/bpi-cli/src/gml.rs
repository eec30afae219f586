//! GML reading and writing.
//!
//! Reads the subset of GML used for weighted networks:
//!
//! ```text
//! graph [
//!   directed 1
//!   node [ id 0 label "Austria" ]
//!   node [ id 1 label "Belgium" ]
//!   edge [ source 0 target 1 weight 12.5 ]
//! ]
//! ```
//!
//! Unknown keys are skipped. Node ids may be integers or strings and become
//! vertex ids verbatim. A missing edge `weight` is 1.0. Edges are read
//! exactly as declared unless the file says `directed 0`; then each non-loop
//! edge is added in both directions.
//!
//! The writer emits weights with one decimal place and never in scientific
//! notation, so exported files stay readable by tools with naive number
//! parsers.

use std::collections::HashMap;
use std::io::Write;

use bpi_core::{GraphBuilder, IndexError, LabelTable, WeightedGraph};
use tracing::warn;

/// Errors produced while reading GML.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GmlError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("no top-level `graph [ ... ]` block")]
    MissingGraph,

    #[error("{element} #{index}: {message}")]
    Element {
        element: &'static str,
        index: usize,
        message: String,
    },
}

/// A declared node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmlNode {
    pub id: String,
    pub label: Option<String>,
}

/// A declared edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GmlEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// The `graph` block of a GML file.
#[derive(Debug, Clone, PartialEq)]
pub struct GmlDocument {
    /// `false` only for an explicit `directed 0`.
    pub directed: bool,
    pub nodes: Vec<GmlNode>,
    pub edges: Vec<GmlEdge>,
}

impl GmlDocument {
    /// Parse GML text.
    ///
    /// # Errors
    ///
    /// Returns [`GmlError`] on lexical errors, unbalanced brackets, a missing
    /// `graph` block, or nodes and edges without usable ids.
    pub fn parse(src: &str) -> Result<Self, GmlError> {
        let tokens = tokenize(src)?;
        let mut pos = 0;
        let top = parse_list(&tokens, &mut pos, false)?;

        let graph = top
            .into_iter()
            .find_map(|(key, value)| match (key.as_str(), value) {
                ("graph", Value::List(items)) => Some(items),
                _ => None,
            })
            .ok_or(GmlError::MissingGraph)?;

        let mut doc = Self {
            directed: true,
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        for (key, value) in graph {
            match (key.as_str(), value) {
                ("directed", Value::Int(d)) => doc.directed = d != 0,
                ("node", Value::List(fields)) => {
                    let node = parse_node(&fields, doc.nodes.len())?;
                    doc.nodes.push(node);
                }
                ("edge", Value::List(fields)) => {
                    let edge = parse_edge(&fields, doc.edges.len())?;
                    doc.edges.push(edge);
                }
                _ => {}
            }
        }
        Ok(doc)
    }

    /// Build the weighted graph described by this document.
    ///
    /// # Errors
    ///
    /// Propagates [`IndexError::MalformedGraph`] from the builder.
    pub fn to_graph(&self) -> Result<WeightedGraph, IndexError> {
        if !self.directed {
            warn!(
                edges = self.edges.len(),
                "graph declares `directed 0`; adding each edge in both directions"
            );
        }
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_vertex(node.id.clone());
        }
        for edge in &self.edges {
            builder.add_edge(edge.source.clone(), edge.target.clone(), edge.weight);
            if !self.directed && edge.source != edge.target {
                builder.add_edge(edge.target.clone(), edge.source.clone(), edge.weight);
            }
        }
        builder.build()
    }

    /// Node labels declared in the file, if any node has one.
    #[must_use]
    pub fn labels(&self) -> Option<LabelTable> {
        let labels: HashMap<String, String> = self
            .nodes
            .iter()
            .filter_map(|n| n.label.clone().map(|l| (n.id.clone(), l)))
            .collect();
        (!labels.is_empty()).then(|| LabelTable::from_map(labels))
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write `graph` as GML with every vertex labeled through `labels`.
///
/// Integer-like vertex ids are written bare, others quoted, so reading the
/// output back yields the same vertex ids. Edge ids are 1-based.
///
/// # Errors
///
/// Fails with [`IndexError::UnknownVertexLabel`] before writing anything if a
/// vertex has no label, or on I/O errors.
pub fn write_gml(
    out: &mut dyn Write,
    graph: &WeightedGraph,
    labels: &LabelTable,
) -> anyhow::Result<()> {
    let resolved = graph
        .vertices()
        .map(|v| Ok((v, labels.resolve(v)?)))
        .collect::<Result<Vec<_>, IndexError>>()?;

    writeln!(out, "Creator \"bpi\"")?;
    writeln!(out, "Version 1")?;
    writeln!(out, "graph")?;
    writeln!(out, "[")?;
    writeln!(out, "\tlabel \"\"")?;
    writeln!(out, "\tdirected 1")?;

    for (id, label) in resolved {
        writeln!(out, "\tnode")?;
        writeln!(out, "\t[")?;
        writeln!(out, "\t\tid {}", format_id(id))?;
        writeln!(out, "\t\tlabel {}", quote(label))?;
        writeln!(out, "\t]")?;
    }

    for (i, (source, target, weight)) in graph.edges().enumerate() {
        writeln!(out, "\tedge")?;
        writeln!(out, "\t[")?;
        writeln!(out, "\t\tid {}", i + 1)?;
        writeln!(out, "\t\tsource {}", format_id(source))?;
        writeln!(out, "\t\ttarget {}", format_id(target))?;
        writeln!(out, "\t\tweight {weight:.1}")?;
        writeln!(out, "\t]")?;
    }

    writeln!(out, "]")?;
    Ok(())
}

fn format_id(id: &str) -> String {
    if id.parse::<i64>().is_ok() {
        id.to_string()
    } else {
        quote(id)
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('&', "&amp;").replace('"', "&quot;"))
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"").replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Key(String),
    Int(i64),
    Real(f64),
    Str(String),
    Open,
    Close,
}

impl Token {
    const fn describe(&self) -> &'static str {
        match self {
            Self::Key(_) => "a key",
            Self::Int(_) | Self::Real(_) => "a number",
            Self::Str(_) => "a string",
            Self::Open => "'['",
            Self::Close => "']'",
        }
    }
}

fn syntax(line: usize, message: impl Into<String>) -> GmlError {
    GmlError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, GmlError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '[' => {
                chars.next();
                tokens.push((Token::Open, line));
            }
            ']' => {
                chars.next();
                tokens.push((Token::Close, line));
            }
            '"' => {
                chars.next();
                let start = line;
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => {
                            if c == '\n' {
                                line += 1;
                            }
                            s.push(c);
                        }
                        None => return Err(syntax(start, "unterminated string")),
                    }
                }
                tokens.push((Token::Str(unescape(&s)), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut key = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
                tokens.push((Token::Key(key), line));
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                let mut num = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')) {
                        break;
                    }
                    num.push(c);
                    chars.next();
                }
                let token = match num.parse::<i64>() {
                    Ok(i) => Token::Int(i),
                    Err(_) => num
                        .parse::<f64>()
                        .map(Token::Real)
                        .map_err(|_| syntax(line, format!("invalid number '{num}'")))?,
                };
                tokens.push((token, line));
            }
            other => return Err(syntax(line, format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

impl Value {
    fn as_id(&self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Real(_) | Self::List(_) => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            Self::Str(_) | Self::List(_) => None,
        }
    }
}

fn parse_list(
    tokens: &[(Token, usize)],
    pos: &mut usize,
    nested: bool,
) -> Result<Vec<(String, Value)>, GmlError> {
    let mut items = Vec::new();
    loop {
        let Some((token, line)) = tokens.get(*pos) else {
            if nested {
                let last = tokens.last().map_or(1, |(_, l)| *l);
                return Err(syntax(last, "unclosed '['"));
            }
            return Ok(items);
        };
        *pos += 1;

        let key = match token {
            Token::Close if nested => return Ok(items),
            Token::Key(k) => k.clone(),
            other => {
                return Err(syntax(
                    *line,
                    format!("expected a key, found {}", other.describe()),
                ));
            }
        };

        let Some((token, value_line)) = tokens.get(*pos) else {
            return Err(syntax(*line, format!("key '{key}' has no value")));
        };
        *pos += 1;

        let value = match token {
            Token::Int(i) => Value::Int(*i),
            Token::Real(r) => Value::Real(*r),
            Token::Str(s) => Value::Str(s.clone()),
            Token::Open => Value::List(parse_list(tokens, pos, true)?),
            other => {
                return Err(syntax(
                    *value_line,
                    format!("key '{key}' followed by {}", other.describe()),
                ));
            }
        };
        items.push((key, value));
    }
}

fn field<'a>(fields: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn element_error(element: &'static str, index: usize, message: &str) -> GmlError {
    GmlError::Element {
        element,
        index,
        message: message.to_string(),
    }
}

fn parse_node(fields: &[(String, Value)], index: usize) -> Result<GmlNode, GmlError> {
    let id = field(fields, "id")
        .and_then(Value::as_id)
        .ok_or_else(|| element_error("node", index, "missing or non-integer 'id'"))?;
    let label = field(fields, "label").and_then(Value::as_id);
    Ok(GmlNode { id, label })
}

fn parse_edge(fields: &[(String, Value)], index: usize) -> Result<GmlEdge, GmlError> {
    let endpoint = |key: &str| {
        field(fields, key)
            .and_then(Value::as_id)
            .ok_or_else(|| element_error("edge", index, &format!("missing or invalid '{key}'")))
    };
    let weight = match field(fields, "weight") {
        None => 1.0,
        Some(v) => v
            .as_f64()
            .ok_or_else(|| element_error("edge", index, "non-numeric 'weight'"))?,
    };
    Ok(GmlEdge {
        source: endpoint("source")?,
        target: endpoint("target")?,
        weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
Creator "test"
graph
[
    directed 1
    # two countries and a trade flow
    node [ id 0 label "Austria" ]
    node [ id 1 label "Belgium" ]
    node [ id 2 ]
    edge [ source 0 target 1 weight 12.5 ]
    edge [ source 1 target 0 weight 3 ]
    edge [ source 2 target 1 ]
]
"#;

    #[test]
    fn parses_nodes_edges_and_defaults() {
        let doc = GmlDocument::parse(SAMPLE).expect("parse");
        assert!(doc.directed);
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.nodes[0].label.as_deref(), Some("Austria"));
        assert_eq!(doc.nodes[2].label, None);
        assert_eq!(doc.edges.len(), 3);
        assert!((doc.edges[0].weight - 12.5).abs() < f64::EPSILON);
        assert!((doc.edges[1].weight - 3.0).abs() < f64::EPSILON);
        assert!((doc.edges[2].weight - 1.0).abs() < f64::EPSILON);

        let g = doc.to_graph().expect("graph");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert!((g.edge_weight_sum("0", "1") - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn file_labels_become_label_table() {
        let doc = GmlDocument::parse(SAMPLE).expect("parse");
        let labels = doc.labels().expect("labels");
        assert_eq!(labels.resolve("1"), Ok("Belgium"));
        assert!(labels.resolve("2").is_err());
    }

    #[test]
    fn missing_directed_key_reads_edges_as_declared() {
        let doc = GmlDocument::parse(
            "graph [ node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 weight 2.0 ] ]",
        )
        .expect("parse");
        assert!(doc.directed);
        let g = doc.to_graph().expect("graph");
        assert_eq!(g.edge_count(), 1);
        assert!((g.edge_weight_sum("0", "1") - 2.0).abs() < f64::EPSILON);
        assert!(g.edge_weight_sum("1", "0").abs() < f64::EPSILON);
    }

    #[test]
    fn undirected_edges_go_both_ways() {
        let doc = GmlDocument::parse(
            "graph [ directed 0 node [ id 0 ] node [ id 1 ] edge [ source 0 target 1 weight 2.0 ] edge [ source 1 target 1 ] ]",
        )
        .expect("parse");
        assert!(!doc.directed);
        let g = doc.to_graph().expect("graph");
        assert_eq!(g.edge_count(), 3);
        assert!((g.edge_weight_sum("1", "0") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn string_ids_are_accepted() {
        let doc = GmlDocument::parse(
            "graph [ directed 1 node [ id \"NO\" ] node [ id \"RU\" ] edge [ source \"RU\" target \"NO\" ] ]",
        )
        .expect("parse");
        let g = doc.to_graph().expect("graph");
        assert_eq!(g.vertices().collect::<Vec<_>>(), vec!["NO", "RU"]);
    }

    #[test]
    fn syntax_errors_report_line() {
        let err = GmlDocument::parse("graph [\n node [ id 0 ]\n node [ id @ ]\n]").unwrap_err();
        assert_eq!(
            err,
            GmlError::Syntax {
                line: 3,
                message: "unexpected character '@'".into()
            }
        );

        let err = GmlDocument::parse("graph [\n node [ id 0 ]\n").unwrap_err();
        assert!(matches!(err, GmlError::Syntax { .. }));
    }

    #[test]
    fn missing_graph_and_bad_elements() {
        assert_eq!(
            GmlDocument::parse("Creator \"x\""),
            Err(GmlError::MissingGraph)
        );
        let err = GmlDocument::parse("graph [ edge [ source 0 ] ]").unwrap_err();
        assert!(matches!(err, GmlError::Element { element: "edge", index: 0, .. }));
    }

    #[test]
    fn unknown_endpoint_is_malformed_graph() {
        let doc = GmlDocument::parse("graph [ directed 1 node [ id 0 ] edge [ source 0 target 9 ] ]")
            .expect("parse");
        assert!(matches!(doc.to_graph(), Err(IndexError::MalformedGraph(_))));
    }

    #[test]
    fn writer_formats_weights_and_reads_back() {
        let g = WeightedGraph::from_parts(
            &["0", "1", "x"],
            &[("0", "1", 12.25), ("1", "0", 1e7), ("x", "x", 0.5)],
        )
        .expect("graph");
        let labels = LabelTable::from_map(HashMap::from([
            ("0".to_string(), "Austria".to_string()),
            ("1".to_string(), "Bosnia & \"Herz\"".to_string()),
            ("x".to_string(), "Other".to_string()),
        ]));

        let mut buf = Vec::new();
        write_gml(&mut buf, &g, &labels).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("weight 10000000.0"));
        assert!(!text.contains("e7"));
        assert!(text.contains("id \"x\""));
        assert!(text.contains("label \"Bosnia &amp; &quot;Herz&quot;\""));

        let back = GmlDocument::parse(&text).expect("reparse");
        assert!(back.directed);
        let g2 = back.to_graph().expect("graph");
        assert_eq!(g2.vertices().collect::<Vec<_>>(), vec!["0", "1", "x"]);
        assert_eq!(g2.edge_count(), 3);
        assert_eq!(
            back.labels().expect("labels").resolve("1"),
            Ok("Bosnia & \"Herz\"")
        );
    }

    #[test]
    fn writer_fails_on_unlabeled_vertex() {
        let g = WeightedGraph::from_parts(&["0", "5"], &[]).expect("graph");
        let mut buf = Vec::new();
        let err = write_gml(&mut buf, &g, &LabelTable::from_indexed(["Austria"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<IndexError>(),
            Some(&IndexError::UnknownVertexLabel("5".into()))
        );
        assert!(buf.is_empty());
    }
}
