//! Small [`AssemblyGraph`] examples used in documentation and tests.

use crate::AssemblyGraph;

/// Returns the `Example 1` [`AssemblyGraph`].
///
/// ```mermaid
/// graph LR;
///   NODE_1---NODE_2;
///   NODE_2---NODE_3;
///   NODE_2---NODE_4;
///   NODE_5;
///   NODE_6---NODE_7;
/// ```
///
/// ## Examples
///
/// ```rust
/// let graph = metacoag_graph::examples::example_1();
/// assert_eq!(graph.node_count(), 7);
/// assert_eq!(graph.link_count(), 4);
/// ```
pub fn example_1() -> AssemblyGraph<&'static str> {
    let mut graph = AssemblyGraph::new();
    ["NODE_1", "NODE_2", "NODE_3", "NODE_4", "NODE_5", "NODE_6", "NODE_7"].into_iter().for_each(|n| {
        graph.add_node(n);
    });
    [("NODE_1", "NODE_2"), ("NODE_2", "NODE_3"), ("NODE_2", "NODE_4"), ("NODE_6", "NODE_7")]
        .into_iter()
        .for_each(|(source, target)| {
            graph.add_link(source, target);
        });
    graph
}

/// Returns a [`AssemblyGraph`] path of `n` contigs named `NODE_1` to `NODE_n`.
///
/// ```mermaid
/// graph LR;
///   NODE_1---NODE_2;
///   NODE_2---NODE_3;
///   NODE_3---NODE_n;
/// ```
///
/// ## Examples
///
/// ```rust
/// let graph = metacoag_graph::examples::path(4);
/// assert_eq!(graph.get_neighbors(&"NODE_2".to_string())?, [&"NODE_1".to_string(), &"NODE_3".to_string()]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn path(n: usize) -> AssemblyGraph<String> {
    let mut graph = AssemblyGraph::new();
    (1..=n).for_each(|i| {
        graph.add_node(format!("NODE_{i}"));
    });
    (1..n).for_each(|i| {
        graph.add_link(format!("NODE_{i}"), format!("NODE_{}", i + 1));
    });
    graph
}
