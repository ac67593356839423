//! Async handlers behind the page: graph reload and the three forms.
//!
//! Failures stop at the handler and are logged; the view is only touched on
//! success. Every mutation is followed by a full reload from the backend.

use log::{error, info, warn};

use crate::api::GraphBackend;
use crate::components::force_graph::{
	GraphData, GraphView, NewEdge, NewEdgeProperties, NewNode, NewNodeProperties, NodeId,
};
use crate::error::FormError;

fn parse_id(field: &'static str, value: &str) -> Result<NodeId, FormError> {
	value.trim().parse().map_err(|_| FormError::InvalidId {
		field,
		value: value.to_string(),
	})
}

/// Raw values of the node form.
#[derive(Clone, Debug, Default)]
pub struct NodeForm {
	pub id: String,
	pub name: String,
}

impl NodeForm {
	pub fn parse(&self) -> Result<NewNode, FormError> {
		Ok(NewNode {
			id: parse_id("nodeId", &self.id)?,
			properties: NewNodeProperties {
				name: self.name.clone(),
			},
		})
	}
}

/// Raw values of the edge form.
#[derive(Clone, Debug, Default)]
pub struct EdgeForm {
	pub from: String,
	pub to: String,
	pub weight: String,
	pub kind: String,
}

impl EdgeForm {
	/// An empty weight means 1.
	pub fn parse(&self) -> Result<NewEdge, FormError> {
		let weight = match self.weight.trim() {
			"" => 1.0,
			raw => raw
				.parse::<f64>()
				.ok()
				.filter(|w| w.is_finite())
				.ok_or_else(|| FormError::InvalidNumber {
					field: "weight",
					value: self.weight.clone(),
				})?,
		};
		Ok(NewEdge {
			from: parse_id("fromNode", &self.from)?,
			to: parse_id("toNode", &self.to)?,
			weight,
			properties: NewEdgeProperties {
				kind: self.kind.clone(),
			},
		})
	}
}

/// Raw values of the shortest-path form.
#[derive(Clone, Debug, Default)]
pub struct PathForm {
	pub from: String,
	pub to: String,
}

impl PathForm {
	pub fn parse(&self) -> Result<(NodeId, NodeId), FormError> {
		Ok((parse_id("pathFrom", &self.from)?, parse_id("pathTo", &self.to)?))
	}
}

/// Fetches the graph and re-renders. On failure the current view stays.
pub async fn load_graph<B: GraphBackend>(backend: &B, view: &GraphView) {
	match backend.fetch_graph().await {
		Ok(payload) => {
			let data = GraphData::from(payload);
			info!("loaded graph: {} nodes, {} links", data.nodes.len(), data.links.len());
			view.update(|state| state.render(&data));
		}
		Err(err) => error!("failed to load graph: {err}"),
	}
}

pub async fn submit_node<B: GraphBackend>(backend: &B, view: &GraphView, form: &NodeForm) {
	let node = match form.parse() {
		Ok(node) => node,
		Err(err) => {
			warn!("node form rejected: {err}");
			return;
		}
	};
	if let Err(err) = backend.create_node(&node).await {
		error!("failed to add node {}: {err}", node.id);
		return;
	}
	load_graph(backend, view).await;
}

pub async fn submit_edge<B: GraphBackend>(backend: &B, view: &GraphView, form: &EdgeForm) {
	let edge = match form.parse() {
		Ok(edge) => edge,
		Err(err) => {
			warn!("edge form rejected: {err}");
			return;
		}
	};
	if let Err(err) = backend.create_edge(&edge).await {
		error!("failed to add edge {} -> {}: {err}", edge.from, edge.to);
		return;
	}
	load_graph(backend, view).await;
}

/// Queries a shortest path and highlights it.
pub async fn find_path<B: GraphBackend>(backend: &B, view: &GraphView, form: &PathForm) {
	let (from, to) = match form.parse() {
		Ok(ends) => ends,
		Err(err) => {
			warn!("path form rejected: {err}");
			return;
		}
	};
	match backend.shortest_path(from, to).await {
		Ok(path) => {
			let ids = path.node_ids();
			view.update(|state| state.highlight_path(&ids));
		}
		Err(err) => error!("failed to find path {from} -> {to}: {err}"),
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use futures::executor::block_on;
	use pretty_assertions::assert_eq;
	use serde::de::DeserializeOwned;
	use serde_json::{Value, json};

	use super::*;
	use crate::components::force_graph::{GraphPayload, PathPayload};
	use crate::config::GraphConfig;
	use crate::error::ApiError;

	#[derive(Debug, PartialEq)]
	enum Call {
		FetchGraph,
		CreateNode(NewNode),
		CreateEdge(NewEdge),
		ShortestPath(NodeId, NodeId),
	}

	#[derive(Default)]
	struct FakeBackend {
		graph: RefCell<Value>,
		path: Vec<NodeId>,
		/// Replaces the path response body when set.
		path_body: RefCell<Option<Value>>,
		offline: RefCell<bool>,
		calls: RefCell<Vec<Call>>,
	}

	impl FakeBackend {
		fn with_graph(graph: Value) -> Self {
			Self {
				graph: RefCell::new(graph),
				..Default::default()
			}
		}

		fn fail(&self, path: &str) -> Result<(), ApiError> {
			if *self.offline.borrow() {
				return Err(ApiError::Transport {
					path: path.to_string(),
					source: gloo_net::Error::GlooError("connection refused".into()),
				});
			}
			Ok(())
		}

		fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T, ApiError> {
			serde_json::from_value(body).map_err(|err| ApiError::Decode {
				path: path.to_string(),
				source: gloo_net::Error::SerdeError(err),
			})
		}
	}

	impl GraphBackend for FakeBackend {
		async fn fetch_graph(&self) -> Result<GraphPayload, ApiError> {
			self.calls.borrow_mut().push(Call::FetchGraph);
			self.fail("/api/graph")?;
			Self::decode("/api/graph", self.graph.borrow().clone())
		}

		async fn create_node(&self, node: &NewNode) -> Result<(), ApiError> {
			self.calls.borrow_mut().push(Call::CreateNode(node.clone()));
			self.fail("/api/node")
		}

		async fn create_edge(&self, edge: &NewEdge) -> Result<(), ApiError> {
			self.calls.borrow_mut().push(Call::CreateEdge(edge.clone()));
			self.fail("/api/edge")
		}

		async fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<PathPayload, ApiError> {
			self.calls.borrow_mut().push(Call::ShortestPath(from, to));
			self.fail("/api/shortest_path")?;
			let body = self
				.path_body
				.borrow()
				.clone()
				.unwrap_or_else(|| json!({ "nodes": self.path }));
			Self::decode("/api/shortest_path", body)
		}
	}

	fn two_node_graph() -> Value {
		json!({
			"nodes": [
				{"id": 1, "properties": {"name": "A"}},
				{"id": 2, "properties": {"name": "B"}}
			],
			"edges": [{"from": 1, "to": 2, "properties": {}}]
		})
	}

	fn view() -> GraphView {
		let view = GraphView::new(GraphConfig::default());
		view.update(|state| state.initialize(800.0, 600.0));
		view
	}

	#[test]
	fn load_renders_transformed_links() {
		let backend = FakeBackend::with_graph(two_node_graph());
		let view = view();
		block_on(load_graph(&backend, &view));

		let scene = view.with(|state| state.scene());
		assert_eq!(scene.nodes.len(), 2);
		assert_eq!(scene.lines.len(), 1);
		assert_eq!((scene.lines[0].source, scene.lines[0].target), (1, 2));
		assert_eq!(view.with(|state| state.links[0].weight), 1.0);
	}

	#[test]
	fn failed_load_keeps_previous_view() {
		let backend = FakeBackend::with_graph(two_node_graph());
		let view = view();
		block_on(load_graph(&backend, &view));
		let before = view.with(|state| state.scene());

		*backend.offline.borrow_mut() = true;
		block_on(load_graph(&backend, &view));

		assert_eq!(view.with(|state| state.scene()), before);
	}

	#[test]
	fn error_body_keeps_previous_view() {
		let backend = FakeBackend::with_graph(two_node_graph());
		let view = view();
		block_on(load_graph(&backend, &view));
		let before = view.with(|state| state.scene());

		*backend.graph.borrow_mut() = json!({"error": "db down"});
		block_on(load_graph(&backend, &view));

		let after = view.with(|state| state.scene());
		assert_eq!(after.nodes.len(), 2);
		assert_eq!(after, before);
	}

	#[test]
	fn node_form_posts_parsed_id_then_reloads() {
		let backend = FakeBackend::with_graph(two_node_graph());
		let view = view();
		let form = NodeForm {
			id: "5".into(),
			name: "X".into(),
		};
		*backend.graph.borrow_mut() = json!({
			"nodes": [{"id": 5, "properties": {"name": "X"}}],
			"edges": []
		});

		block_on(submit_node(&backend, &view, &form));

		assert_eq!(
			*backend.calls.borrow(),
			vec![
				Call::CreateNode(NewNode {
					id: 5,
					properties: NewNodeProperties { name: "X".into() },
				}),
				Call::FetchGraph,
			]
		);
		let scene = view.with(|state| state.scene());
		assert_eq!(scene.nodes.len(), 1);
		assert_eq!(scene.nodes[0].label, "X");
	}

	#[test]
	fn invalid_node_id_sends_nothing() {
		let backend = FakeBackend::default();
		let form = NodeForm {
			id: "five".into(),
			name: "X".into(),
		};
		block_on(submit_node(&backend, &view(), &form));
		assert!(backend.calls.borrow().is_empty());
	}

	#[test]
	fn failed_post_skips_reload() {
		let backend = FakeBackend::with_graph(two_node_graph());
		*backend.offline.borrow_mut() = true;
		let form = EdgeForm {
			from: "1".into(),
			to: "2".into(),
			weight: "2.5".into(),
			kind: "road".into(),
		};
		block_on(submit_edge(&backend, &view(), &form));

		assert_eq!(
			*backend.calls.borrow(),
			vec![Call::CreateEdge(NewEdge {
				from: 1,
				to: 2,
				weight: 2.5,
				properties: NewEdgeProperties {
					kind: "road".into()
				},
			})]
		);
	}

	#[test]
	fn edge_form_weight_rules() {
		let mut form = EdgeForm {
			from: " 3".into(),
			to: "4 ".into(),
			weight: String::new(),
			kind: "link".into(),
		};
		assert_eq!(form.parse().unwrap().weight, 1.0);
		assert_eq!((form.parse().unwrap().from, form.parse().unwrap().to), (3, 4));

		form.weight = "heavy".into();
		assert_eq!(
			form.parse(),
			Err(FormError::InvalidNumber {
				field: "weight",
				value: "heavy".into()
			})
		);
	}

	#[test]
	fn path_form_highlights_returned_nodes() {
		let backend = FakeBackend {
			path: vec![1, 2],
			..FakeBackend::with_graph(two_node_graph())
		};
		let view = view();
		block_on(load_graph(&backend, &view));

		let form = PathForm {
			from: "1".into(),
			to: "2".into(),
		};
		block_on(find_path(&backend, &view, &form));

		assert_eq!(backend.calls.borrow().last(), Some(&Call::ShortestPath(1, 2)));
		assert!(view.with(|state| state.has_highlight()));
		assert!(view.with(|state| state.is_link_highlighted(1, 2)));
	}

	#[test]
	fn path_form_normalizes_ids() {
		let form = PathForm {
			from: "1".into(),
			to: "x".into(),
		};
		assert_eq!(
			form.parse(),
			Err(FormError::InvalidId {
				field: "pathTo",
				value: "x".into()
			})
		);
	}

	#[test]
	fn failed_path_query_leaves_no_highlight() {
		let backend = FakeBackend {
			path: vec![1, 2],
			..FakeBackend::with_graph(two_node_graph())
		};
		let view = view();
		block_on(load_graph(&backend, &view));
		*backend.offline.borrow_mut() = true;

		let form = PathForm {
			from: "1".into(),
			to: "2".into(),
		};
		block_on(find_path(&backend, &view, &form));
		assert!(!view.with(|state| state.has_highlight()));
	}

	#[test]
	fn path_error_body_keeps_existing_highlight() {
		let backend = FakeBackend {
			path: vec![1, 2],
			..FakeBackend::with_graph(two_node_graph())
		};
		let view = view();
		block_on(load_graph(&backend, &view));
		let form = PathForm {
			from: "1".into(),
			to: "2".into(),
		};
		block_on(find_path(&backend, &view, &form));

		*backend.path_body.borrow_mut() = Some(json!({"error": "no path"}));
		block_on(find_path(&backend, &view, &form));

		assert!(view.with(|state| state.has_highlight()));
		assert_eq!(view.with(|state| state.highlight.path.clone()), vec![1, 2]);
	}
}
