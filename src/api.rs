//! Client for the graph backend's HTTP API.

use gloo_net::http::{Request, Response};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::components::force_graph::{GraphPayload, NewEdge, NewNode, NodeId, PathPayload};
use crate::error::ApiError;

pub const GRAPH_ROUTE: &str = "/api/graph";
pub const NODE_ROUTE: &str = "/api/node";
pub const EDGE_ROUTE: &str = "/api/edge";

pub fn shortest_path_route(from: NodeId, to: NodeId) -> String {
	format!("/api/shortest_path/{from}/{to}")
}

/// The operations the view needs from the backend.
#[allow(async_fn_in_trait)]
pub trait GraphBackend {
	async fn fetch_graph(&self) -> Result<GraphPayload, ApiError>;
	/// Response bodies are ignored.
	async fn create_node(&self, node: &NewNode) -> Result<(), ApiError>;
	async fn create_edge(&self, edge: &NewEdge) -> Result<(), ApiError>;
	async fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<PathPayload, ApiError>;
}

/// `fetch`-based backend. Bodies are decoded whatever the status code;
/// a non-2xx status is only logged.
#[derive(Clone, Debug)]
pub struct HttpBackend {
	base: String,
}

impl HttpBackend {
	pub fn new(base: impl Into<String>) -> Self {
		let base: String = base.into();
		Self {
			base: base.trim_end_matches('/').to_string(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base, path)
	}

	async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
		let response = Request::get(&self.url(path))
			.send()
			.await
			.map_err(|source| ApiError::Transport {
				path: path.to_string(),
				source,
			})?;
		note_status(path, &response);
		response.json::<T>().await.map_err(|source| ApiError::Decode {
			path: path.to_string(),
			source,
		})
	}

	async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
		let transport = |source| ApiError::Transport {
			path: path.to_string(),
			source,
		};
		let response = Request::post(&self.url(path))
			.json(body)
			.map_err(transport)?
			.send()
			.await
			.map_err(transport)?;
		note_status(path, &response);
		Ok(())
	}
}

fn note_status(path: &str, response: &Response) {
	if !response.ok() {
		warn!("{} answered {} {}", path, response.status(), response.status_text());
	}
}

impl GraphBackend for HttpBackend {
	async fn fetch_graph(&self) -> Result<GraphPayload, ApiError> {
		self.get_json(GRAPH_ROUTE).await
	}

	async fn create_node(&self, node: &NewNode) -> Result<(), ApiError> {
		self.post_json(NODE_ROUTE, node).await
	}

	async fn create_edge(&self, edge: &NewEdge) -> Result<(), ApiError> {
		self.post_json(EDGE_ROUTE, edge).await
	}

	async fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<PathPayload, ApiError> {
		self.get_json(&shortest_path_route(from, to)).await
	}
}
