//! Topological scheduling — dependency-respecting linearization of the
//! task graph using Kahn's algorithm.
//!
//! Ties are broken by registration order (the order of `graph.vertices`),
//! so repeated runs over identical inputs produce identical sequences.

use rustc_hash::FxHashMap;

use super::errors::{Result, SetupError};
use super::types::TaskGraph;

/// Compute a valid execution order over the graph. Fails with
/// `CyclicDependency` naming the vertices that could not be ordered.
pub fn execution_order(graph: &TaskGraph) -> Result<Vec<String>> {
    let position: FxHashMap<&str, usize> = graph
        .vertices
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();
    let mut adjacency: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for name in &graph.vertices {
        in_degree.insert(name, 0);
        adjacency.insert(name, Vec::new());
    }
    for (requirement, dependent) in &graph.edges {
        if let Some(neighbors) = adjacency.get_mut(requirement.as_str()) {
            neighbors.push(dependent);
        }
        if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
            *degree += 1;
        }
    }

    let mut ready: Vec<&str> = graph
        .vertices
        .iter()
        .map(String::as_str)
        .filter(|name| in_degree[name] == 0)
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(graph.vertices.len());
    while !ready.is_empty() {
        // Among all ready vertices, the first-registered one runs next.
        let mut best = 0;
        for i in 1..ready.len() {
            if position[ready[i]] < position[ready[best]] {
                best = i;
            }
        }
        let current = ready.swap_remove(best);
        order.push(current.to_string());

        if let Some(neighbors) = adjacency.get(current) {
            for &neighbor in neighbors {
                let degree = in_degree
                    .get_mut(neighbor)
                    .ok_or_else(|| SetupError::UnknownTask(neighbor.to_string()))?;
                *degree -= 1;
                if *degree == 0 {
                    ready.push(neighbor);
                }
            }
        }
    }

    if order.len() != graph.vertices.len() {
        let mut stuck: Vec<String> = graph
            .vertices
            .iter()
            .filter(|name| !order.contains(name))
            .cloned()
            .collect();
        stuck.sort_by_key(|name| position[name.as_str()]);
        return Err(SetupError::CyclicDependency { tasks: stuck });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn graph(vertices: &[&str], edges: &[(&str, &str)]) -> TaskGraph {
        TaskGraph {
            vertices: vertices.iter().map(|s| s.to_string()).collect(),
            edges: edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_linear_chain() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert_eq!(execution_order(&g).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fanout_ties_broken_by_registration() {
        // b and c both depend only on a; registration order decides.
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        assert_eq!(execution_order(&g).unwrap(), vec!["a", "b", "c"]);

        let g = graph(&["a", "c", "b"], &[("a", "b"), ("a", "c")]);
        assert_eq!(execution_order(&g).unwrap(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_independent_tasks_keep_registration_order() {
        let g = graph(&["zephyr", "apache_tvm", "mlif"], &[]);
        assert_eq!(
            execution_order(&g).unwrap(),
            vec!["zephyr", "apache_tvm", "mlif"]
        );
    }

    #[test]
    fn test_unlocked_vertex_preempts_later_registered_ready_one() {
        // d is ready from the start, but b (registered earlier) becomes
        // ready after a and still runs before d.
        let g = graph(&["a", "b", "d"], &[("a", "b")]);
        assert_eq!(execution_order(&g).unwrap(), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_diamond() {
        let g = graph(
            &["top", "left", "right", "bottom"],
            &[
                ("top", "left"),
                ("top", "right"),
                ("left", "bottom"),
                ("right", "bottom"),
            ],
        );
        assert_eq!(
            execution_order(&g).unwrap(),
            vec!["top", "left", "right", "bottom"]
        );
    }

    #[test]
    fn test_two_cycle_reported() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let err = execution_order(&g).unwrap_err();
        match err {
            SetupError::CyclicDependency { tasks } => {
                assert_eq!(tasks, vec!["a", "b"]);
            }
            other => panic!("expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_with_clean_prefix_returns_no_partial_order() {
        // a is orderable, b<->c are not; the whole call must fail.
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "b")]);
        let err = execution_order(&g).unwrap_err();
        match err {
            SetupError::CyclicDependency { tasks } => assert_eq!(tasks, vec!["b", "c"]),
            other => panic!("expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_determinism_across_calls() {
        let g = graph(
            &["e", "d", "c", "b", "a"],
            &[("e", "a"), ("d", "b"), ("c", "b")],
        );
        let first = execution_order(&g).unwrap();
        let second = execution_order(&g).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        /// Random DAGs (edges only point from lower to higher index) always
        /// yield a permutation respecting every edge.
        #[test]
        fn prop_order_respects_edges(
            n in 1usize..24,
            raw_edges in proptest::collection::vec((0usize..24, 0usize..24), 0..80)
        ) {
            let vertices: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
            let edges: Vec<(String, String)> = raw_edges
                .into_iter()
                .filter(|(a, b)| a < b && *b < n)
                .map(|(a, b)| (format!("t{}", a), format!("t{}", b)))
                .collect();
            let g = TaskGraph { vertices: vertices.clone(), edges: edges.clone() };

            let order = execution_order(&g).unwrap();

            let mut sorted = order.clone();
            sorted.sort();
            let mut expected = vertices;
            expected.sort();
            prop_assert_eq!(sorted, expected, "order must be a permutation of V");

            let index: std::collections::HashMap<&str, usize> =
                order.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();
            for (u, v) in &edges {
                prop_assert!(index[u.as_str()] < index[v.as_str()],
                    "edge {} -> {} violated", u, v);
            }
        }

        /// Any graph containing a directed 2-cycle fails, never returning a
        /// partial order.
        #[test]
        fn prop_cycle_always_detected(n in 2usize..12, at in 0usize..12) {
            let at = at % (n - 1);
            let vertices: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
            let edges = vec![
                (format!("t{}", at), format!("t{}", at + 1)),
                (format!("t{}", at + 1), format!("t{}", at)),
            ];
            let g = TaskGraph { vertices, edges };
            prop_assert!(
                matches!(
                    execution_order(&g),
                    Err(SetupError::CyclicDependency { .. })
                ),
                "expected CyclicDependency error"
            );
        }
    }
}
