//! Workflow execution.
//!
//! Execution threads one byte payload through the graph starting at the root.
//! Every node is handled the same way: run its action, then continue
//! according to its [`NodeKind`]:
//!
//! - `Plain`: feed the output through every successor in order, depth first
//! - `Conditional`: parse the output as a boolean and forward the node's
//!   *input* to the selected branch
//! - `ParallelSource`: broadcast the output to every branch concurrently,
//!   wait for all of them, then run the aggregate node
//!
//! Actions are synchronous, so each one runs on the tokio blocking pool.

use futures::{
    FutureExt,
    future::{BoxFuture, join_all},
};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    FlowError, Result, utils,
    workflow::{
        Workflow,
        node::{DATA_KEY, Node, NodeId, NodeKind, Params, data_params},
        workflow::Vertex,
    },
};

impl Workflow {
    /// Executes the workflow from its root with `payload` bound to `"data"`.
    ///
    /// The first failing action aborts the whole execution, except inside a
    /// parallel fan-out where a failing branch contributes an empty result.
    /// Must be called from within a tokio runtime.
    pub async fn execute(
        &self,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let root = self.root().ok_or_else(|| FlowError::Structural(format!("workflow '{}' has no edges to execute", self.name())))?;
        let span = info_span!("execute", workflow = %self.name(), execution_id = %Uuid::new_v4());

        async move {
            let start = utils::time::time_millis();
            let result = self.dispatch(root, payload).await;
            let elapsed_ms = utils::time::time_millis() - start;
            match &result {
                Ok(output) => info!(elapsed_ms, bytes = output.len(), "workflow succeeded"),
                Err(e) => warn!(elapsed_ms, error = %e, "workflow failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Runs one node with `input` as its data and continues from it.
    fn dispatch(
        &self,
        nid: NodeId,
        input: Vec<u8>,
    ) -> BoxFuture<'_, Result<Vec<u8>>> {
        async move {
            let vertex = self.vertex(&nid)?;
            debug!(node = %nid, kind = vertex.kind.as_ref(), "run node");
            let output = invoke(&vertex.node, data_params(input.clone())).await?;
            self.proceed(vertex, output, input).await
        }
        .boxed()
    }

    /// Continues from a node whose action already produced `output`.
    /// `input` is what the node received; conditional nodes forward it.
    fn proceed(
        &self,
        vertex: Vertex,
        output: Vec<u8>,
        input: Vec<u8>,
    ) -> BoxFuture<'_, Result<Vec<u8>>> {
        async move {
            match vertex.kind {
                NodeKind::Plain => self.sequential(&vertex.next, output).await,
                NodeKind::Conditional => self.conditional(&vertex, &output, input).await,
                NodeKind::ParallelSource => self.parallel(&vertex, output).await,
            }
        }
        .boxed()
    }

    async fn sequential(
        &self,
        next: &[NodeId],
        mut result: Vec<u8>,
    ) -> Result<Vec<u8>> {
        for nid in next {
            result = self.dispatch(nid.clone(), result).await?;
        }
        Ok(result)
    }

    async fn conditional(
        &self,
        vertex: &Vertex,
        decision: &[u8],
        input: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let truth = parse_bool(decision).unwrap_or_else(|| {
            warn!(node = %vertex.node.id, output = %String::from_utf8_lossy(decision), "condition output is not a boolean, taking the false branch");
            false
        });

        let index = if truth { 0 } else { 1 };
        let branch = vertex
            .next
            .get(index)
            .cloned()
            .ok_or_else(|| FlowError::Structural(format!("conditional node '{}' has no {} branch", vertex.node.id, truth)))?;
        debug!(node = %vertex.node.id, truth, branch = %branch, "condition evaluated");

        self.dispatch(branch, input).await
    }

    async fn parallel(
        &self,
        vertex: &Vertex,
        shared: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let aggregate_id = vertex
            .aggregate
            .clone()
            .ok_or_else(|| FlowError::Structural(format!("parallel node '{}' has no aggregate node", vertex.node.id)))?;
        let branches = vertex.next.iter().map(|id| self.vertex(id).map(|v| v.node)).collect::<Result<Vec<_>>>()?;
        debug!(node = %vertex.node.id, branches = branches.len(), aggregate = %aggregate_id, "fan out");

        let tasks = branches.into_iter().map(|branch| {
            let params = data_params(shared.clone());
            let id = branch.id.clone();
            let handle = tokio::task::spawn_blocking(move || branch.trigger(&params));
            async move { (id, handle.await) }
        });

        // barrier: every branch has finished once join_all resolves
        let mut params = Params::with_capacity(vertex.next.len() + 1);
        for (id, joined) in join_all(tasks).await {
            let output = match joined {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    warn!(node = %id, error = %e, "parallel branch failed, passing an empty result to the aggregate");
                    Vec::new()
                }
                Err(e) => {
                    warn!(node = %id, error = %e, "parallel branch panicked, passing an empty result to the aggregate");
                    Vec::new()
                }
            };
            params.insert(id, output);
        }
        params.insert(DATA_KEY.to_string(), shared.clone());

        let aggregate = self.vertex(&aggregate_id)?;
        debug!(node = %aggregate_id, kind = aggregate.kind.as_ref(), "run aggregate");
        let output = invoke(&aggregate.node, params).await?;
        self.proceed(aggregate, output, shared).await
    }
}

/// Runs an action on the blocking pool.
async fn invoke(
    node: &Node,
    params: Params,
) -> Result<Vec<u8>> {
    let node = node.clone();
    let id = node.id.clone();
    tokio::task::spawn_blocking(move || node.run(&params)).await.map_err(|e| FlowError::Execution {
        node: id,
        message: e.to_string(),
    })?
}

/// Boolean literals accepted from a condition output.
fn parse_bool(raw: &[u8]) -> Option<bool> {
    match raw {
        b"1" | b"t" | b"T" | b"true" | b"TRUE" | b"True" => Some(true),
        b"0" | b"f" | b"F" | b"false" | b"FALSE" | b"False" => Some(false),
        _ => None,
    }
}
