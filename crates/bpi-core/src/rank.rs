//! Ranked, labeled presentation of a score map.
//!
//! Every vertex is resolved through the [`LabelTable`] before truncation, so
//! an unlabeled vertex fails the ranking even when it would not make the
//! cut. Ties keep graph vertex order (stable sort).

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::labels::LabelTable;
use crate::metrics::engine::{IndexKind, ScoreMap};

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum number of entries per list.
    /// Default: 15.
    pub limit: usize,
    /// Decimal places for scores.
    /// Default: 3.
    pub precision: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            limit: 15,
            precision: 3,
        }
    }
}

/// One row of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    pub vertex: String,
    pub label: String,
    pub score: f64,
}

/// Rank `scores` by descending score, label them and keep the first `limit`.
///
/// # Errors
///
/// Returns [`IndexError::UnknownVertexLabel`] if any vertex lacks a label.
pub fn rank(
    scores: &ScoreMap,
    labels: &LabelTable,
    limit: usize,
) -> Result<Vec<RankedEntry>, IndexError> {
    let mut rows = scores
        .iter()
        .map(|(vertex, score)| Ok((vertex, labels.resolve(vertex)?, score)))
        .collect::<Result<Vec<_>, IndexError>>()?;

    rows.sort_by(|a, b| b.2.total_cmp(&a.2));

    Ok(rows
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (vertex, label, score))| RankedEntry {
            rank: i + 1,
            vertex: vertex.to_string(),
            label: label.to_string(),
            score,
        })
        .collect())
}

/// Heading for a ranked list, sized by the rows actually shown.
#[must_use]
pub fn heading(kind: IndexKind, shown: usize) -> String {
    format!("Top-{shown} {}", kind.abbrev())
}

/// Render a ranked list as `heading` followed by one tab-separated row per
/// entry.
#[must_use]
pub fn format_ranking(kind: IndexKind, entries: &[RankedEntry], precision: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heading(kind, entries.len()));
    for e in entries {
        let _ = writeln!(
            out,
            "{}.\t\t{}\t\t{:.prec$}",
            e.rank,
            e.label,
            e.score,
            prec = precision
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> ScoreMap {
        ScoreMap::from_entries(pairs.iter().map(|(v, s)| ((*v).to_string(), *s)).collect())
    }

    #[test]
    fn sorts_descending_and_truncates() {
        let s = scores(&[("0", 0.1), ("1", 0.7), ("2", 0.2)]);
        let labels = LabelTable::from_indexed(["a", "b", "c"]);
        let ranked = rank(&s, &labels, 2).expect("rank");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "b");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].label, "c");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ties_keep_vertex_order() {
        let s = scores(&[("2", 0.5), ("0", 0.5), ("1", 0.5)]);
        let ranked = rank(&s, &LabelTable::identity(), 10).expect("rank");
        let order: Vec<&str> = ranked.iter().map(|e| e.vertex.as_str()).collect();
        assert_eq!(order, vec!["2", "0", "1"]);
    }

    #[test]
    fn missing_label_fails_even_below_cut() {
        let s = scores(&[("0", 0.9), ("5", 0.0)]);
        let labels = LabelTable::from_indexed(["only"]);
        assert_eq!(
            rank(&s, &labels, 1),
            Err(IndexError::UnknownVertexLabel("5".into()))
        );
    }

    #[test]
    fn format_uses_precision_and_shown_count() {
        let s = scores(&[("0", 0.123_456), ("1", 0.5)]);
        let labels = LabelTable::from_indexed(["Norway", "Russia"]);
        let ranked = rank(&s, &labels, 15).expect("rank");

        let text = format_ranking(IndexKind::Pivotal, &ranked, 2);
        assert_eq!(text, "Top-2 PI\n1.\t\tRussia\t\t0.50\n2.\t\tNorway\t\t0.12\n");

        let wide = format_ranking(IndexKind::Bundle, &ranked, 3);
        assert!(wide.starts_with("Top-2 BI\n"));
        assert!(wide.contains("0.123"));
    }
}
