//! Workflow edge definitions for connecting nodes.
//!
//! Edges only describe the graph; execution follows each node's ordered
//! successor list. Labels mark the two branches of a conditional node.

use serde::{Deserialize, Serialize};

use crate::workflow::node::NodeId;

/// Label carried by the branches leaving a conditional node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::IntoStaticStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EdgeLabel {
    /// Taken when the condition output parses as `true`.
    True,
    /// Taken otherwise.
    False,
}

/// A directed connection between two registered nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// ID of the source node.
    pub from: NodeId,
    /// ID of the target node.
    pub to: NodeId,
    /// Branch label, only set on the edges leaving a conditional node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<EdgeLabel>,
}

impl Edge {
    pub fn new(
        from: &str,
        to: &str,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: None,
        }
    }

    pub fn labeled(
        from: &str,
        to: &str,
        label: EdgeLabel,
    ) -> Self {
        Self {
            label: Some(label),
            ..Self::new(from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_strings() {
        assert_eq!(EdgeLabel::True.as_ref(), "true");
        assert_eq!(EdgeLabel::False.as_ref(), "false");
        assert_eq!("true".parse::<EdgeLabel>().unwrap(), EdgeLabel::True);
    }

    #[test]
    fn test_labeled_edge_serializes_label() {
        let edge = Edge::labeled("check", "save", EdgeLabel::True);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["label"], "true");

        let plain = serde_json::to_value(Edge::new("a", "b")).unwrap();
        assert!(plain.get("label").is_none());
    }
}
