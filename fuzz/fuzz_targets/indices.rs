#![no_main]

use bpi_core::baseline::{Baseline, DEFAULT_DAMPING};
use bpi_core::graph::GraphBuilder;
use bpi_core::metrics::{IndexConfig, bundle_index, pivotal_index};
use libfuzzer_sys::fuzz_target;

// Byte layout: [n, order, (source, target, weight)*]. Vertex count and order
// are kept small so group enumeration stays cheap.
fuzz_target!(|data: &[u8]| {
    let Some((&n, rest)) = data.split_first() else {
        return;
    };
    let Some((&order, rest)) = rest.split_first() else {
        return;
    };
    let n = usize::from(n % 16) + 1;
    let order = usize::from(order % 4);

    let mut builder = GraphBuilder::new();
    for i in 0..n {
        builder.add_vertex(i.to_string());
    }
    for chunk in rest.chunks_exact(3) {
        let source = usize::from(chunk[0]) % n;
        let target = usize::from(chunk[1]) % n;
        builder.add_edge(source.to_string(), target.to_string(), f64::from(chunk[2]) / 4.0);
    }
    let Ok(graph) = builder.build() else {
        return;
    };
    let Ok(baseline) = Baseline::compute(&graph, DEFAULT_DAMPING) else {
        return;
    };

    let config = IndexConfig {
        order,
        ..IndexConfig::default()
    };
    for result in [
        bundle_index(&graph, &baseline, &config),
        pivotal_index(&graph, &baseline, &config),
    ] {
        match result {
            Ok(r) => {
                assert_eq!(r.scores.len(), n);
                assert!(r.scores.iter().all(|(_, s)| s.is_finite() && s >= 0.0));
                assert!((r.scores.total() - 1.0).abs() < 1e-9);
            }
            Err(_) => assert_eq!(order, 0),
        }
    }
});
