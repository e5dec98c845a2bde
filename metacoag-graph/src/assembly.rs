use crate::{parse, FromEdgeList, FromGfa};

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, VecDeque};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::path::Path;

/// An [`AssemblyGraph`] of contigs connected by undirected links.
///
/// ## Introduction
///
/// - The nodes (`N`) are contig identifiers (ex. [`str`], [`String`], [`usize`]).
/// - Links carry no weight, they only record that two contigs overlap or are adjacent in the assembly.
/// - Links are undirected and deduplicated, self-loops are discarded.
/// - Nodes keep the index order in which they were added.
///
/// ```mermaid
/// graph LR;
///   NODE_1---NODE_2;
///   NODE_2---NODE_3;
///   NODE_2---NODE_4;
///   NODE_5;
///   NODE_6---NODE_7;
/// ```
#[derive(Clone, Debug)]
pub struct AssemblyGraph<N> {
    /// Undirected graph of contigs (`N`).
    pub graph: UnGraph<N, ()>,
    /// Lookup of node (`N`) to [`NodeIndex`].
    index: HashMap<N, NodeIndex>,
}

impl<N> Default for AssemblyGraph<N>
where
    N: Clone + Debug + Display + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> AssemblyGraph<N>
where
    N: Clone + Debug + Display + Eq + Hash,
{
    /// Returns a new empty [`AssemblyGraph`].
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// let mut graph = AssemblyGraph::new();
    /// graph.add_link("NODE_1", "NODE_2");
    /// assert_eq!(graph.get_nodes(), [&"NODE_1", &"NODE_2"]);
    /// ```
    pub fn new() -> Self {
        AssemblyGraph { graph: UnGraph::default(), index: HashMap::new() }
    }

    /// Adds a node (`N`) to the [`AssemblyGraph`] and returns the [`NodeIndex`].
    ///
    /// - If the node already exists, returns the existing [`NodeIndex`].
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// use petgraph::graph::NodeIndex;
    ///
    /// let mut graph = AssemblyGraph::new();
    /// assert_eq!(graph.add_node("NODE_1"), NodeIndex::new(0));
    /// assert_eq!(graph.add_node("NODE_2"), NodeIndex::new(1));
    /// assert_eq!(graph.add_node("NODE_1"), NodeIndex::new(0));
    /// ```
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        match self.index.get(&node) {
            Some(node_index) => *node_index,
            None => {
                let node_index = self.graph.add_node(node.clone());
                self.index.insert(node, node_index);
                node_index
            }
        }
    }

    /// Creates an undirected link between two nodes (`N`) and returns the [`EdgeIndex`].
    ///
    /// - If either node doesn't exist yet in the graph, it is created.
    /// - If the link already exists (in either direction), returns the existing [`EdgeIndex`].
    /// - Self-loops are not stored and return [`None`], though the node is still created.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// let mut graph = AssemblyGraph::new();
    /// let first = graph.add_link("NODE_1", "NODE_2");
    /// let again = graph.add_link("NODE_2", "NODE_1");
    /// assert_eq!(first, again);
    /// assert_eq!(graph.add_link("NODE_3", "NODE_3"), None);
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.link_count(), 1);
    /// ```
    pub fn add_link(&mut self, source: N, target: N) -> Option<EdgeIndex> {
        let source_index = self.add_node(source);
        let target_index = self.add_node(target);
        (source_index != target_index)
            .then(|| self.graph.update_edge(source_index, target_index, ()))
    }

    /// Returns true if the node (`N`) is in the [`AssemblyGraph`].
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Returns the node (`N`) that corresponds to the [`NodeIndex`].
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// use petgraph::graph::NodeIndex;
    ///
    /// let mut graph = AssemblyGraph::new();
    /// graph.add_link("NODE_1", "NODE_2");
    /// assert_eq!(graph.get_node(&NodeIndex::new(1))?, &"NODE_2");
    /// assert!(graph.get_node(&NodeIndex::new(5)).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_node(&self, node_index: &NodeIndex) -> Result<&N, Report> {
        self.graph
            .node_weight(*node_index)
            .ok_or_else(|| eyre!("Failed to get node data for node index {node_index:?}"))
    }

    /// Returns the [`NodeIndex`] that corresponds to the node (`N`).
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// use petgraph::graph::NodeIndex;
    ///
    /// let graph = AssemblyGraph::from([("NODE_1", "NODE_2"), ("NODE_2", "NODE_3")]);
    /// assert_eq!(graph.get_node_index(&"NODE_3")?, NodeIndex::new(2));
    /// assert!(graph.get_node_index(&"NODE_9").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_node_index(&self, node: &N) -> Result<NodeIndex, Report> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| eyre!("Failed to get node index of node {node}"))
    }

    /// Returns all nodes (`N`) in the [`AssemblyGraph`], in index order.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// let graph = metacoag_graph::examples::example_1();
    /// assert_eq!(graph.get_nodes().len(), 7);
    /// assert_eq!(graph.get_nodes()[0], &"NODE_1");
    /// ```
    pub fn get_nodes(&self) -> Vec<&N> {
        self.graph.node_weights().collect()
    }

    /// Returns all links in the [`AssemblyGraph`] as node (`N`) pairs, in the order they were added.
    ///
    /// The endpoint with the lower [`NodeIndex`] comes first.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// let graph = AssemblyGraph::from([("NODE_2", "NODE_1"), ("NODE_2", "NODE_3")]);
    /// assert_eq!(graph.get_links()?, [(&"NODE_2", &"NODE_1"), (&"NODE_2", &"NODE_3")]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_links(&self) -> Result<Vec<(&N, &N)>, Report> {
        self.graph
            .edge_references()
            .map(|e| {
                let (a, b) = match e.source() < e.target() {
                    true => (e.source(), e.target()),
                    false => (e.target(), e.source()),
                };
                Ok((self.get_node(&a)?, self.get_node(&b)?))
            })
            .collect()
    }

    /// Returns the immediate neighbors of a node (`N`), in index order.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// let graph = metacoag_graph::examples::example_1();
    /// assert_eq!(graph.get_neighbors(&"NODE_2")?, [&"NODE_1", &"NODE_3", &"NODE_4"]);
    /// assert_eq!(graph.get_neighbors(&"NODE_5")?, Vec::<&&str>::new());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_neighbors(&self, node: &N) -> Result<Vec<&N>, Report> {
        let node_index = self.get_node_index(node)?;
        self.graph
            .neighbors(node_index)
            .sorted()
            .dedup()
            .map(|i| self.get_node(&i))
            .collect()
    }

    /// Returns true if a node (`N`) has no links.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// let graph = metacoag_graph::examples::example_1();
    /// assert!(graph.is_isolated(&"NODE_5")?);
    /// assert!(!graph.is_isolated(&"NODE_1")?);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn is_isolated(&self, node: &N) -> Result<bool, Report> {
        let node_index = self.get_node_index(node)?;
        Ok(self.graph.neighbors(node_index).next().is_none())
    }

    /// Returns the nodes (`N`) reachable from `node` within `limit` hops, with their hop distance.
    ///
    /// A breadth-first search where only nodes accepted by `through` may be used as intermediate
    /// hops. Every reached node is reported, whether or not it can be passed through.
    ///
    /// - The start node is not reported.
    /// - Results are sorted by distance, then by [`NodeIndex`].
    ///
    /// ## Arguments
    ///
    /// - `node` - The start node (`N`).
    /// - `limit` - Maximum number of hops.
    /// - `through` - Returns true if a node may be traversed to reach nodes beyond it.
    ///
    /// ## Examples
    ///
    /// Only immediate neighbors when nothing can be traversed.
    ///
    /// ```rust
    /// let graph = metacoag_graph::examples::example_1();
    /// let reached = graph.get_reachable(&"NODE_1", 10, |_| false)?;
    /// assert_eq!(reached, [(&"NODE_2", 1)]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// Traverse through `NODE_2` only.
    ///
    /// ```rust
    /// # let graph = metacoag_graph::examples::example_1();
    /// let reached = graph.get_reachable(&"NODE_1", 10, |n| *n == "NODE_2")?;
    /// assert_eq!(reached, [(&"NODE_2", 1), (&"NODE_3", 2), (&"NODE_4", 2)]);
    ///
    /// let reached = graph.get_reachable(&"NODE_1", 1, |n| *n == "NODE_2")?;
    /// assert_eq!(reached, [(&"NODE_2", 1)]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_reachable<F>(&self, node: &N, limit: usize, through: F) -> Result<Vec<(&N, usize)>, Report>
    where
        F: Fn(&N) -> bool,
    {
        let start = self.get_node_index(node)?;
        let mut distances: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let distance = distances[&current];
            if distance >= limit {
                continue;
            }
            // the start node is always expanded, others only if they can be traversed
            if current != start && !through(self.get_node(&current)?) {
                continue;
            }
            for neighbor in self.graph.neighbors(current) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, distance + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        distances
            .into_iter()
            .filter(|(i, _)| *i != start)
            .sorted_by_key(|(i, d)| (*d, *i))
            .map(|(i, d)| Ok((self.get_node(&i)?, d)))
            .collect()
    }

    /// Returns the number of nodes in the [`AssemblyGraph`].
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of links in the [`AssemblyGraph`].
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the [`AssemblyGraph`] has no nodes.
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// let mut graph = AssemblyGraph::new();
    /// assert!(graph.is_empty());
    /// graph.add_node("NODE_1");
    /// assert!(!graph.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

impl AssemblyGraph<String> {
    /// Reads an [`AssemblyGraph`] from a file.
    ///
    /// - `.gfa` files are parsed as [GFA](FromGfa).
    /// - Anything else is parsed as a normalized [edge list](FromEdgeList).
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// use std::io::Write;
    ///
    /// let mut file = tempfile::Builder::new().suffix(".tsv").tempfile()?;
    /// writeln!(file, "NODE_1\tNODE_2")?;
    /// let graph = AssemblyGraph::read(&file.path())?;
    /// assert_eq!(graph.link_count(), 1);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn read<P>(path: &P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read assembly graph: {path:?}"))?;
        let is_gfa = path.as_ref().extension().is_some_and(|ext| ext == "gfa");
        let graph = match is_gfa {
            true => AssemblyGraph::from_gfa(&text),
            false => AssemblyGraph::from_edge_list(&text),
        };
        graph.wrap_err_with(|| format!("Failed to parse assembly graph: {path:?}"))
    }
}

/// Returns an [`AssemblyGraph`] created from an iterable object of links (`N`, `N`).
impl<I, N> From<I> for AssemblyGraph<N>
where
    I: IntoIterator<Item = (N, N)>,
    N: Clone + Debug + Display + Eq + Hash,
{
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::AssemblyGraph;
    /// let graph = AssemblyGraph::from([(1, 2), (2, 3), (3, 1)]);
    /// assert_eq!(graph.get_nodes(), [&1, &2, &3]);
    /// assert_eq!(graph.link_count(), 3);
    /// ```
    fn from(it: I) -> Self {
        let mut graph = AssemblyGraph::new();
        it.into_iter().for_each(|(source, target)| {
            graph.add_link(source, target);
        });
        graph
    }
}

impl FromEdgeList for AssemblyGraph<String> {
    /// Returns an [`AssemblyGraph`] created from a normalized edge list.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::{AssemblyGraph, FromEdgeList};
    /// let graph = AssemblyGraph::from_edge_list("A\tB\nB\tA\nB\tC\n")?;
    /// assert_eq!(graph.link_count(), 2);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_edge_list(edge_list: &str) -> Result<Self, Report> {
        let links = parse::edge_list_to_vec(edge_list)?;
        Ok(AssemblyGraph::from(links))
    }
}

impl FromGfa for AssemblyGraph<String> {
    /// Returns an [`AssemblyGraph`] created from a GFA [`str`].
    ///
    /// - Without `P` lines (MEGAHIT, Flye), segments are contigs and `L` lines link them.
    /// - With `P` lines (SPAdes), paths are contigs and are linked through their end segments,
    ///   see [`Gfa::path_links`](crate::parse::Gfa::path_links).
    ///
    /// Contigs without links are kept as isolated nodes.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use metacoag_graph::{AssemblyGraph, FromGfa};
    /// let gfa = "S\tA\t*\nS\tB\t*\nS\tC\t*\nL\tA\t+\tB\t+\t0M\n";
    /// let graph = AssemblyGraph::from_gfa(gfa)?;
    /// assert_eq!(graph.node_count(), 3);
    /// assert!(graph.is_isolated(&"C".to_string())?);
    ///
    /// let gfa = "S\t1\t*\nS\t2\t*\nS\t3\t*\nL\t2\t+\t3\t-\t0M\nP\tNODE_1_1\t1+,2+\t*\nP\tNODE_2_1\t3+\t*\n";
    /// let graph = AssemblyGraph::from_gfa(gfa)?;
    /// assert_eq!(graph.get_nodes(), [&"NODE_1_1".to_string(), &"NODE_2_1".to_string()]);
    /// assert_eq!(graph.link_count(), 1);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_gfa(gfa: &str) -> Result<Self, Report> {
        let gfa = parse::parse_gfa(gfa)?;
        let (nodes, links) = match gfa.paths.is_empty() {
            true => (gfa.segments, gfa.links),
            false => {
                let links = gfa.path_links();
                let nodes = gfa.paths.into_iter().map(|p| p.path_name).collect();
                (nodes, links)
            }
        };
        let mut graph = AssemblyGraph::new();
        nodes.into_iter().for_each(|n| {
            graph.add_node(n);
        });
        links.into_iter().for_each(|(source, target)| {
            graph.add_link(source, target);
        });
        Ok(graph)
    }
}
