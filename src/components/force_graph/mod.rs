mod component;
mod layout;
mod render;
mod scene;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use state::GraphView;
pub use types::{
	GraphData, GraphPayload, NewEdge, NewEdgeProperties, NewNode, NewNodeProperties, NodeId,
	PathPayload,
};
