use flowgraph::{DATA_KEY, EngineBuilder, Node, Params, Workflow};

fn text(param: &Params, key: &str) -> String {
    param.get(key).map(|v| String::from_utf8_lossy(v).to_string()).unwrap_or_default()
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let nodes = [
        Node::new("get-input", |p: &Params| Ok(format!("{} node1", text(p, DATA_KEY)).into_bytes())),
        Node::new("transform-user", |p: &Params| Ok(format!("{} node2", text(p, DATA_KEY)).into_bytes())),
        Node::new("validate-user", |_: &Params| Ok(b"true".to_vec())),
        Node::new("save-user", |p: &Params| Ok(format!("save-user {}", text(p, DATA_KEY)).into_bytes())),
        Node::new("error-response", |p: &Params| Ok(format!("error-response {}", text(p, DATA_KEY)).into_bytes())),
        Node::new("send-sms", |p: &Params| Ok(format!("{} send-sms", text(p, DATA_KEY)).into_bytes())),
        Node::new("send-notification", |p: &Params| Ok(format!("{} send-notification", text(p, DATA_KEY)).into_bytes())),
        Node::new("send-email", |p: &Params| Ok(format!("{} send-email", text(p, DATA_KEY)).into_bytes())),
        Node::new("success-response", |p: &Params| {
            Ok(format!(
                "success-response [aggregate][{}, {}, {}] {}",
                text(p, "send-sms"),
                text(p, "send-notification"),
                text(p, "send-email"),
                text(p, DATA_KEY)
            )
            .into_bytes())
        }),
        Node::new("send-response", |p: &Params| Ok(format!("{} send-response", text(p, DATA_KEY)).into_bytes())),
    ];

    let workflow = Workflow::new("add-user");
    workflow.add_nodes(nodes);
    workflow.add_edge("get-input", "transform-user").expect("edge");
    workflow.add_conditional_edge("transform-user", "validate-user", "save-user", "error-response").expect("conditional edge");
    workflow.add_parallel_edge("save-user", "success-response", &["send-sms", "send-notification", "send-email"]).expect("parallel edge");
    workflow.add_edge("success-response", "send-response").expect("edge");
    workflow.add_edge("error-response", "send-response").expect("edge");

    let engine = EngineBuilder::new().async_worker_thread_number(4).build().unwrap();
    engine.deploy(workflow).unwrap();

    let result = engine.execute("add-user", b"hallo").unwrap();
    println!("{}", String::from_utf8_lossy(&result));

    let dot = engine.export("add-user").unwrap();
    std::fs::write("add-user.gv", dot).unwrap();
}
