pub mod edge;
mod executor;
mod export;
pub mod node;
mod workflow;

pub use workflow::Workflow;
