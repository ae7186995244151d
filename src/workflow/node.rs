use std::{collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{FlowError, Result};

/// node id
pub type NodeId = String;

/// Key under which every action receives its incoming payload.
pub const DATA_KEY: &str = "data";

/// Keyed byte inputs handed to an action.
pub type Params = HashMap<String, Vec<u8>>;

/// Failure reported by a user action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of a user action.
pub type ActionResult = std::result::Result<Vec<u8>, ActionError>;

/// A node action. Actions are synchronous and may block.
pub type Action = Arc<dyn Fn(&Params) -> ActionResult + Send + Sync>;

/// How the engine treats a node when execution reaches it.
///
/// Assigned by the edge call that establishes the role and never changed
/// afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// Run the action, then every successor in order.
    #[default]
    Plain,
    /// Run the action, parse the output as a boolean and take one branch.
    Conditional,
    /// Run the action, fan the output out to every branch, then aggregate.
    ParallelSource,
}

/// Visible role of a node, as shown by the graph export.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeRole {
    #[default]
    Plain,
    Conditional,
    TrueBranch,
    FalseBranch,
    ParallelSource,
}

/// A named unit of computation.
///
/// Cloning a node is cheap: the action is shared.
#[derive(Clone)]
pub struct Node {
    /// node id, unique within a workflow
    pub id: NodeId,
    /// node action
    action: Action,
}

impl Node {
    pub fn new<F>(
        id: impl Into<NodeId>,
        action: F,
    ) -> Self
    where
        F: Fn(&Params) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            action: Arc::new(action),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Invokes the action directly, outside of any workflow.
    pub fn trigger(
        &self,
        params: &Params,
    ) -> ActionResult {
        (self.action)(params)
    }

    /// Invokes the action and tags a failure with this node's id.
    pub(crate) fn run(
        &self,
        params: &Params,
    ) -> Result<Vec<u8>> {
        self.trigger(params).map_err(|e| FlowError::Execution {
            node: self.id.clone(),
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Builds the single-entry input every non-aggregate action receives.
pub fn data_params(data: Vec<u8>) -> Params {
    let mut params = Params::with_capacity(1);
    params.insert(DATA_KEY.to_string(), data);
    params
}
