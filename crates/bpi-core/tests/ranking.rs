//! End-to-end pipeline: graph → baseline → both indices → labeled rankings.

use bpi_core::baseline::{Baseline, DEFAULT_DAMPING};
use bpi_core::graph::WeightedGraph;
use bpi_core::metrics::{IndexConfig, IndexKind, bundle_index, pivotal_index};
use bpi_core::rank::{format_ranking, heading, rank};
use bpi_core::{IndexError, LabelTable};

const COUNTRIES: [&str; 5] = ["Austria", "Belgium", "Czechia", "Denmark", "Estonia"];

/// Five suppliers feeding one importer, plus a thin side link.
fn supply_graph() -> WeightedGraph {
    WeightedGraph::from_parts(
        &["0", "1", "2", "3", "4"],
        &[
            ("1", "0", 30.0),
            ("2", "0", 20.0),
            ("3", "0", 10.0),
            ("4", "0", 5.0),
            ("0", "1", 2.0),
            ("2", "1", 1.0),
        ],
    )
    .expect("graph")
}

#[test]
fn ranks_importer_first_with_labels() {
    let g = supply_graph();
    let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
    let labels = LabelTable::from_indexed(COUNTRIES);
    labels.validate(&g).expect("labels cover graph");

    let bi = bundle_index(&g, &ql, &IndexConfig::default()).expect("bundle");
    let ranked = rank(&bi.scores, &labels, 15).expect("rank");

    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0].label, "Austria");
    assert_eq!(ranked[0].rank, 1);
    let ranks: Vec<usize> = ranked.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let text = format_ranking(IndexKind::Bundle, &ranked, 3);
    assert!(text.starts_with("Top-5 BI\n1.\t\tAustria\t\t"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn limit_truncates_and_heading_reports_shown_rows() {
    let g = supply_graph();
    let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
    let pi = pivotal_index(&g, &ql, &IndexConfig::default()).expect("pivotal");
    let ranked = rank(&pi.scores, &LabelTable::from_indexed(COUNTRIES), 2).expect("rank");

    assert_eq!(ranked.len(), 2);
    assert_eq!(heading(IndexKind::Pivotal, ranked.len()), "Top-2 PI");
}

#[test]
fn unlabeled_vertex_fails_ranking() {
    let g = WeightedGraph::from_parts(&["0", "5"], &[("0", "5", 1.0)]).expect("graph");
    let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
    let bi = bundle_index(&g, &ql, &IndexConfig::default()).expect("bundle");
    let labels = LabelTable::from_indexed(["Austria", "Belgium"]);

    assert_eq!(
        rank(&bi.scores, &labels, 15),
        Err(IndexError::UnknownVertexLabel("5".into()))
    );
    assert_eq!(
        labels.validate(&g),
        Err(IndexError::UnknownVertexLabel("5".into()))
    );
}

#[test]
fn ranking_is_idempotent() {
    let g = supply_graph();
    let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
    let bi = bundle_index(&g, &ql, &IndexConfig::default()).expect("bundle");
    let labels = LabelTable::from_indexed(COUNTRIES);

    let first = format_ranking(IndexKind::Bundle, &rank(&bi.scores, &labels, 15).expect("rank"), 3);
    let second = format_ranking(IndexKind::Bundle, &rank(&bi.scores, &labels, 15).expect("rank"), 3);
    assert_eq!(first, second);
}

#[test]
fn results_serialize_for_machine_output() {
    let g = supply_graph();
    let ql = Baseline::compute(&g, DEFAULT_DAMPING).expect("baseline");
    let bi = bundle_index(&g, &ql, &IndexConfig::default()).expect("bundle");
    let ranked = rank(&bi.scores, &LabelTable::identity(), 3).expect("rank");

    let json = serde_json::to_value(&ranked).expect("json");
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    assert_eq!(json[0]["rank"], 1);
    assert_eq!(json[0]["vertex"], "0");

    let result = serde_json::to_value(&bi).expect("json");
    assert_eq!(result["kind"], "bundle");
    assert_eq!(result["rounds"], 8);
}
