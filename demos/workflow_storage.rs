use std::sync::Arc;

use flowgraph::{DATA_KEY, MemStore, Node, Params, Storage, Workflow};

fn append(id: &'static str, suffix: &'static str) -> Node {
    Node::new(id, move |p: &Params| Ok(format!("{} {}", String::from_utf8_lossy(&p[DATA_KEY]), suffix).into_bytes()))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let workflow = Workflow::new("Add User");
    workflow.add_nodes([
        append("Get Input", "node1"),
        append("Transform to User", "node2"),
        Node::new("Validate User", |_: &Params| Ok(b"false".to_vec())),
        append("Save User", "node4"),
        append("Error Response", "node5"),
        append("Success Response", "node6"),
        append("Send Response", "node7"),
    ]);
    workflow.add_edge("Get Input", "Transform to User").expect("edge");
    workflow.add_conditional_edge("Transform to User", "Validate User", "Save User", "Error Response").expect("conditional edge");
    workflow.add_edge("Save User", "Success Response").expect("edge");
    workflow.add_edge("Success Response", "Send Response").expect("edge");
    workflow.add_edge("Error Response", "Send Response").expect("edge");

    let storage = MemStore::new();
    storage.save(Arc::new(workflow)).unwrap();

    let w = storage.get("Add User").unwrap();
    let result = w.execute(b"from storage".to_vec()).await.unwrap();

    println!("{}", String::from_utf8_lossy(&result));
}
