//! Graphviz export of a workflow graph.

use std::collections::HashMap;

use convert_case::{Case, Casing};
use petgraph::{
    dot::{Config, Dot},
    graph::{DiGraph, EdgeReference, NodeIndex},
};

use crate::{
    Result,
    workflow::{Workflow, node::NodeRole},
};

/// Shape and color scheme used for each role.
fn style(role: NodeRole) -> (&'static str, &'static str) {
    match role {
        NodeRole::Conditional => ("diamond", "ylorbr3"),
        NodeRole::TrueBranch => ("rectangle", "greens3"),
        NodeRole::FalseBranch => ("rectangle", "reds3"),
        NodeRole::ParallelSource => ("parallelogram", "purples3"),
        NodeRole::Plain => ("rectangle", "blues3"),
    }
}

/// `add-user` -> `Add User`
fn title_case(key: &str) -> String {
    key.replace('-', " ").from_case(Case::Title).to_case(Case::Title)
}

/// Quotes `s` as a DOT string. Control characters other than newline are dropped.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Workflow {
    /// Renders the workflow as a DOT document.
    ///
    /// Nodes are styled by role, and the branches of a conditional node carry
    /// their `true` / `false` label. Output is deterministic.
    pub fn export(&self) -> Result<Vec<u8>> {
        let mut graph: DiGraph<String, &'static str> = DiGraph::new();
        let mut roles = Vec::new();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();

        {
            let state = self.read();
            let mut ids: Vec<_> = state.vertices.keys().cloned().collect();
            ids.sort();
            for id in ids {
                let role = state.vertices[&id].role();
                indices.insert(id.clone(), graph.add_node(title_case(&id)));
                roles.push(role);
            }
        }

        for edge in self.edges() {
            if let (Some(from), Some(to)) = (indices.get(&edge.from), indices.get(&edge.to)) {
                graph.add_edge(*from, *to, edge.label.map(<&'static str>::from).unwrap_or_default());
            }
        }

        let edge_attrs = |_: &DiGraph<String, &'static str>, edge: EdgeReference<'_, &'static str>| match *edge.weight() {
            "" => String::new(),
            label => format!("label = {} ", quote(label)),
        };
        let node_attrs = |_: &DiGraph<String, &'static str>, (index, label): (NodeIndex, &String)| {
            let (shape, scheme) = style(roles[index.index()]);
            format!("label = {} shape = {} colorscheme = {} style = filled color = 2 fillcolor = 1 ", quote(label), shape, scheme)
        };
        let dot = Dot::with_attr_getters(&graph, &[Config::EdgeNoLabel, Config::NodeNoLabel, Config::GraphContentOnly], &edge_attrs, &node_attrs);

        let out = format!(
            "digraph {{\n    label = {}\n    bgcolor = \"lightgrey\"\n    labelloc = \"t\"\n{}}}\n",
            quote(&title_case(self.name())),
            dot
        );

        Ok(out.into_bytes())
    }
}
