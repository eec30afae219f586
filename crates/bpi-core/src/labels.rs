//! Vertex id → display label table.
//!
//! Vertex ids in country networks are numeric strings that index a fixed
//! name list. The table is built once, injected into ranking, and can be
//! checked against a graph up front so a missing label surfaces before any
//! scoring work.

use std::collections::HashMap;

use crate::error::IndexError;
use crate::graph::WeightedGraph;

/// Read-only mapping from vertex id to display label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
    identity: bool,
}

impl LabelTable {
    /// Label vertex `"i"` with the `i`-th entry of `labels`.
    #[must_use]
    pub fn from_indexed<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| (i.to_string(), label.into()))
            .collect();
        Self {
            labels,
            identity: false,
        }
    }

    /// Use an explicit id → label map.
    #[must_use]
    pub const fn from_map(labels: HashMap<String, String>) -> Self {
        Self {
            labels,
            identity: false,
        }
    }

    /// Every id is its own label.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            labels: HashMap::new(),
            identity: true,
        }
    }

    /// Resolve `id` to its label.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownVertexLabel`] if `id` has no label.
    pub fn resolve<'a>(&'a self, id: &'a str) -> Result<&'a str, IndexError> {
        if self.identity {
            return Ok(id);
        }
        self.labels
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| IndexError::UnknownVertexLabel(id.to_string()))
    }

    /// Check that every vertex of `graph` has a label.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownVertexLabel`] for the first vertex (in
    /// graph order) without one.
    pub fn validate(&self, graph: &WeightedGraph) -> Result<(), IndexError> {
        graph
            .vertices()
            .try_for_each(|v| self.resolve(v).map(|_| ()))
    }

    /// Number of explicit labels (0 for an identity table).
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_labels_use_position_as_id() {
        let t = LabelTable::from_indexed(["Austria", "Belgium"]);
        assert_eq!(t.resolve("0"), Ok("Austria"));
        assert_eq!(t.resolve("1"), Ok("Belgium"));
        assert_eq!(
            t.resolve("2"),
            Err(IndexError::UnknownVertexLabel("2".into()))
        );
    }

    #[test]
    fn identity_never_fails() {
        let t = LabelTable::identity();
        assert_eq!(t.resolve("anything"), Ok("anything"));
    }

    #[test]
    fn validate_reports_first_unlabeled_vertex() {
        let g = WeightedGraph::from_parts(&["0", "5", "7"], &[]).expect("graph");
        let t = LabelTable::from_indexed(["zero"]);
        assert_eq!(
            t.validate(&g),
            Err(IndexError::UnknownVertexLabel("5".into()))
        );
    }
}
