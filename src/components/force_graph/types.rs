use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node identity as used by the backend.
pub type NodeId = i64;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
	#[serde(default)]
	pub name: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: NodeId,
	#[serde(default)]
	pub properties: NodeProperties,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeProperties {
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Edge as served by `GET /api/graph`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub from: NodeId,
	pub to: NodeId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
	#[serde(default)]
	pub properties: EdgeProperties,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphPayload {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
	pub weight: f64,
}

impl From<&GraphEdge> for GraphLink {
	/// `properties.weight` wins over the top-level field; anything missing,
	/// non-positive or non-finite falls back to 1.
	fn from(edge: &GraphEdge) -> Self {
		let weight = [edge.properties.weight, edge.weight]
			.into_iter()
			.flatten()
			.find(|w| w.is_finite() && *w > 0.0)
			.unwrap_or(1.0);
		Self {
			source: edge.from,
			target: edge.to,
			weight,
		}
	}
}

/// Render input: nodes verbatim, edges mapped to links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl From<GraphPayload> for GraphData {
	fn from(payload: GraphPayload) -> Self {
		let links = payload.edges.iter().map(GraphLink::from).collect();
		Self {
			nodes: payload.nodes,
			links,
		}
	}
}

/// Body of `POST /api/node`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewNode {
	pub id: NodeId,
	pub properties: NewNodeProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewNodeProperties {
	pub name: String,
}

/// Body of `POST /api/edge`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewEdge {
	pub from: NodeId,
	pub to: NodeId,
	pub weight: f64,
	pub properties: NewEdgeProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewEdgeProperties {
	#[serde(rename = "type")]
	pub kind: String,
}

/// One element of a shortest path; the backend may send bare ids or whole nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
	Id(NodeId),
	Node { id: NodeId },
}

impl PathStep {
	pub fn id(&self) -> NodeId {
		match *self {
			PathStep::Id(id) | PathStep::Node { id } => id,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PathPayload {
	pub nodes: Vec<PathStep>,
}

impl PathPayload {
	pub fn node_ids(&self) -> Vec<NodeId> {
		self.nodes.iter().map(PathStep::id).collect()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn link_for(edge: Value) -> GraphLink {
		let edge: GraphEdge = serde_json::from_value(edge).unwrap();
		GraphLink::from(&edge)
	}

	#[test]
	fn missing_or_zero_weight_defaults_to_one() {
		assert_eq!(link_for(json!({"from": 1, "to": 2, "properties": {}})).weight, 1.0);
		assert_eq!(link_for(json!({"from": 1, "to": 2})).weight, 1.0);
		assert_eq!(
			link_for(json!({"from": 1, "to": 2, "weight": 0, "properties": {"weight": 0}})).weight,
			1.0
		);
	}

	#[test]
	fn explicit_weight_is_kept() {
		assert_eq!(
			link_for(json!({"from": 1, "to": 2, "properties": {"weight": 2.5}})).weight,
			2.5
		);
		assert_eq!(link_for(json!({"from": 1, "to": 2, "weight": 2.5})).weight, 2.5);
	}

	#[test]
	fn payload_maps_edges_to_links() {
		let payload: GraphPayload = serde_json::from_value(json!({
			"nodes": [
				{"id": 1, "properties": {"name": "A"}},
				{"id": 2, "properties": {"name": "B"}}
			],
			"edges": [{"from": 1, "to": 2, "properties": {}}]
		}))
		.unwrap();

		let data = GraphData::from(payload);

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[1].properties.name, "B");
		assert_eq!(
			data.links,
			vec![GraphLink {
				source: 1,
				target: 2,
				weight: 1.0
			}]
		);
	}

	#[test]
	fn node_properties_keep_unknown_fields() {
		let node: GraphNode = serde_json::from_value(json!({
			"id": 7,
			"properties": {"name": "G", "color": "red"}
		}))
		.unwrap();
		assert_eq!(node.properties.extra.get("color"), Some(&json!("red")));
	}

	#[test]
	fn requests_serialize_to_wire_shape() {
		let node = NewNode {
			id: 5,
			properties: NewNodeProperties { name: "X".into() },
		};
		assert_eq!(
			serde_json::to_value(&node).unwrap(),
			json!({"id": 5, "properties": {"name": "X"}})
		);

		let edge = NewEdge {
			from: 1,
			to: 2,
			weight: 1.5,
			properties: NewEdgeProperties {
				kind: "road".into(),
			},
		};
		assert_eq!(
			serde_json::to_value(&edge).unwrap(),
			json!({"from": 1, "to": 2, "weight": 1.5, "properties": {"type": "road"}})
		);
	}

	#[test]
	fn error_bodies_do_not_decode() {
		let body = json!({"error": "db down"});
		assert!(serde_json::from_value::<GraphPayload>(body.clone()).is_err());
		assert!(serde_json::from_value::<PathPayload>(body).is_err());
	}

	#[test]
	fn path_accepts_ids_and_node_objects() {
		let ids: PathPayload = serde_json::from_value(json!({"nodes": [1, 3, 4]})).unwrap();
		assert_eq!(ids.node_ids(), vec![1, 3, 4]);

		let nodes: PathPayload = serde_json::from_value(json!({
			"nodes": [{"id": 1, "properties": {"name": "A"}}, {"id": 2}]
		}))
		.unwrap();
		assert_eq!(nodes.node_ids(), vec![1, 2]);
	}
}
