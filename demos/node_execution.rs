use flowgraph::{DATA_KEY, Node, Params, data_params};

fn main() {
    let node = Node::new("Get Input", |param: &Params| Ok(format!("{} node1", String::from_utf8_lossy(&param[DATA_KEY])).into_bytes()));

    let res = node.trigger(&data_params(b"input to".to_vec())).unwrap();

    println!("{}", String::from_utf8_lossy(&res));
}
