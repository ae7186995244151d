//! Workflow graph construction.
//!
//! A workflow owns an arena of registered nodes keyed by id, the adjacency
//! map used for export, and the reverse adjacency ("destinations") used for
//! cycle detection. Every edge call takes the workflow lock once, validates
//! the whole call, and only then mutates, so a rejected call leaves the
//! graph untouched.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tracing::trace;

use crate::{
    FlowError, Result, ShareLock,
    workflow::{
        edge::{Edge, EdgeLabel},
        node::{Node, NodeId, NodeKind, NodeRole},
    },
};

/// A registered node plus everything edge calls attach to it.
#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub node: Node,
    pub kind: NodeKind,
    pub branch: Option<EdgeLabel>,
    /// ordered successors; for a conditional node `[true, false]`,
    /// for a parallel source the branches
    pub next: Vec<NodeId>,
    /// aggregate node of a parallel source
    pub aggregate: Option<NodeId>,
}

impl Vertex {
    fn new(node: Node) -> Self {
        Self {
            node,
            kind: NodeKind::Plain,
            branch: None,
            next: Vec::new(),
            aggregate: None,
        }
    }

    pub fn role(&self) -> NodeRole {
        match (self.kind, self.branch) {
            (NodeKind::Conditional, _) => NodeRole::Conditional,
            (_, Some(EdgeLabel::True)) => NodeRole::TrueBranch,
            (_, Some(EdgeLabel::False)) => NodeRole::FalseBranch,
            (NodeKind::ParallelSource, None) => NodeRole::ParallelSource,
            (NodeKind::Plain, None) => NodeRole::Plain,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Graph {
    pub vertices: HashMap<NodeId, Vertex>,
    /// from -> (to -> edge)
    pub edges: HashMap<NodeId, BTreeMap<NodeId, Edge>>,
    /// to -> predecessors, in insertion order
    pub destinations: HashMap<NodeId, Vec<NodeId>>,
    pub root: Option<NodeId>,
}

impl Graph {
    fn validate(
        &self,
        ids: &[&str],
    ) -> Result<()> {
        match ids.iter().find(|id| !self.vertices.contains_key(**id)) {
            Some(id) => Err(FlowError::Validation(format!("node '{}' is not registered, use add_nodes() to register the node", id))),
            None => Ok(()),
        }
    }

    /// Local cycle check: an edge may not point back at the root, and may not
    /// duplicate an already recorded predecessor link. Multi-hop cycles through
    /// unrelated nodes are not detected here.
    fn check_circular(
        &self,
        to: &str,
        from: &str,
    ) -> Result<()> {
        let circular = from == to || self.root.as_deref() == Some(to) || self.destinations.get(to).is_some_and(|froms| froms.iter().any(|n| n == from));
        if circular {
            return Err(FlowError::Cycle {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    fn check_kind(
        &self,
        id: &str,
        kind: NodeKind,
    ) -> Result<()> {
        let current = self.vertices.get(id).map(|v| v.kind).unwrap_or_default();
        if current != NodeKind::Plain && current != kind {
            return Err(FlowError::Structural(format!(
                "node '{}' is already a {} node and cannot become a {} node",
                id,
                current.as_ref(),
                kind.as_ref()
            )));
        }
        Ok(())
    }

    fn assign_root(
        &mut self,
        id: &str,
    ) {
        if self.root.is_none() {
            self.root = Some(id.to_string());
        }
    }

    fn vertex_mut(
        &mut self,
        id: &str,
    ) -> Result<&mut Vertex> {
        self.vertices.get_mut(id).ok_or_else(|| FlowError::Validation(format!("node '{}' is not registered", id)))
    }

    fn link(
        &mut self,
        edge: Edge,
    ) {
        self.destinations.entry(edge.to.clone()).or_default().push(edge.from.clone());
        self.edges.entry(edge.from.clone()).or_default().insert(edge.to.clone(), edge);
    }
}

/// A named DAG of nodes.
///
/// Built once through the edge calls, then executed any number of times.
/// Construction calls may come from several threads; each call holds the
/// workflow lock for its whole duration. Mutating a workflow while an
/// execution is in flight is not supported.
#[derive(Clone)]
pub struct Workflow {
    name: String,
    graph: ShareLock<Graph>,
}

impl Workflow {
    /// create a new workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: Arc::new(RwLock::new(Graph::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entry node: the first node ever passed as the source of an edge.
    pub fn root(&self) -> Option<NodeId> {
        self.read().root.clone()
    }

    /// Registers nodes. A node whose id is already registered has its action
    /// replaced; the edges attached to it are kept.
    pub fn add_nodes<I>(
        &self,
        nodes: I,
    ) where
        I: IntoIterator<Item = Node>,
    {
        let mut graph = self.write();
        for node in nodes {
            trace!("workflow::add_node({}, {})", self.name, node.id);
            match graph.vertices.get_mut(&node.id) {
                Some(vertex) => vertex.node = node,
                None => {
                    graph.vertices.insert(node.id.clone(), Vertex::new(node));
                }
            }
        }
    }

    /// Chains `to` after `from`.
    ///
    /// Only one edge call may originate from a node, so a second plain edge
    /// from the same node is rejected.
    pub fn add_edge(
        &self,
        from: &str,
        to: &str,
    ) -> Result<()> {
        trace!("workflow::add_edge({}, {} -> {})", self.name, from, to);
        let mut graph = self.write();

        graph.validate(&[from, to])?;
        graph.check_circular(to, from)?;
        if graph.edges.contains_key(from) {
            return Err(FlowError::Structural(format!(
                "node '{}' already has an outgoing edge, use add_parallel_edge() to use parallel node",
                from
            )));
        }

        graph.assign_root(from);
        graph.vertex_mut(from)?.next.push(to.to_string());
        graph.link(Edge::new(from, to));

        Ok(())
    }

    /// Routes `from` into `condition`, whose output selects `true_node` or
    /// `false_node`.
    pub fn add_conditional_edge(
        &self,
        from: &str,
        condition: &str,
        true_node: &str,
        false_node: &str,
    ) -> Result<()> {
        trace!("workflow::add_conditional_edge({}, {} -> {} ? {} : {})", self.name, from, condition, true_node, false_node);
        let mut graph = self.write();

        graph.validate(&[from, condition, true_node, false_node])?;
        graph.check_circular(true_node, from)?;
        graph.check_circular(false_node, from)?;
        graph.check_circular(condition, from)?;
        graph.check_circular(true_node, condition)?;
        graph.check_circular(false_node, condition)?;
        graph.check_kind(condition, NodeKind::Conditional)?;
        if let Some(kind) = graph.vertices.get(from).map(|v| v.kind).filter(|k| *k != NodeKind::Plain) {
            return Err(FlowError::Structural(format!("node '{}' is a {} node and cannot chain a condition", from, kind.as_ref())));
        }

        graph.assign_root(from);

        let cond = graph.vertex_mut(condition)?;
        cond.kind = NodeKind::Conditional;
        cond.next = vec![true_node.to_string(), false_node.to_string()];
        graph.vertex_mut(true_node)?.branch.get_or_insert(EdgeLabel::True);
        graph.vertex_mut(false_node)?.branch.get_or_insert(EdgeLabel::False);
        graph.vertex_mut(from)?.next.push(condition.to_string());

        graph.edges.remove(condition);
        graph.link(Edge::new(from, condition));
        graph.link(Edge::labeled(condition, true_node, EdgeLabel::True));
        graph.link(Edge::labeled(condition, false_node, EdgeLabel::False));
        graph.destinations.entry(true_node.to_string()).or_default().push(from.to_string());
        graph.destinations.entry(false_node.to_string()).or_default().push(from.to_string());

        Ok(())
    }

    /// Fans the output of `from` out to every branch concurrently and joins
    /// the branch results at `aggregate`.
    pub fn add_parallel_edge(
        &self,
        from: &str,
        aggregate: &str,
        branches: &[&str],
    ) -> Result<()> {
        trace!("workflow::add_parallel_edge({}, {} -> {:?} -> {})", self.name, from, branches, aggregate);
        let mut graph = self.write();

        graph.validate(&[from, aggregate])?;
        graph.validate(branches)?;
        graph.check_circular(aggregate, from)?;
        let mut seen = HashSet::with_capacity(branches.len());
        for branch in branches {
            if !seen.insert(*branch) {
                return Err(FlowError::Structural(format!("branch '{}' is listed more than once", branch)));
            }
            graph.check_circular(branch, from)?;
            graph.check_circular(aggregate, branch)?;
        }
        graph.check_kind(from, NodeKind::ParallelSource)?;

        graph.assign_root(from);

        let source = graph.vertex_mut(from)?;
        source.kind = NodeKind::ParallelSource;
        source.next = branches.iter().map(|b| b.to_string()).collect();
        source.aggregate = Some(aggregate.to_string());

        graph.edges.remove(from);
        for branch in branches {
            graph.edges.remove(*branch);
            graph.link(Edge::new(from, branch));
            graph.link(Edge::new(branch, aggregate));
        }
        graph.destinations.entry(aggregate.to_string()).or_default().push(from.to_string());

        Ok(())
    }

    /// Role assigned to a registered node by the edge calls so far.
    pub fn role(
        &self,
        id: &str,
    ) -> Option<NodeRole> {
        self.read().vertices.get(id).map(Vertex::role)
    }

    /// Ordered successors of a registered node.
    pub fn next(
        &self,
        id: &str,
    ) -> Option<Vec<NodeId>> {
        self.read().vertices.get(id).map(|v| v.next.clone())
    }

    /// All edges, sorted by source then target.
    pub fn edges(&self) -> Vec<Edge> {
        let graph = self.read();
        let mut froms: Vec<_> = graph.edges.keys().collect();
        froms.sort();
        froms.into_iter().flat_map(|from| graph.edges[from].values().cloned()).collect()
    }

    /// Snapshot of one vertex, taken under the read lock.
    pub(crate) fn vertex(
        &self,
        id: &str,
    ) -> Result<Vertex> {
        self.read().vertices.get(id).cloned().ok_or_else(|| FlowError::Validation(format!("node '{}' is not registered", id)))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let graph = self.read();
        f.debug_struct("Workflow").field("name", &self.name).field("root", &graph.root).field("nodes", &graph.vertices.len()).finish()
    }
}
