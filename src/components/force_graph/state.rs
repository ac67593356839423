use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::rc::Rc;

use force_graph::DefaultNodeIdx;
use log::{debug, warn};

use super::layout::{DRAG_ALPHA_TARGET, Layout, REHEAT_ALPHA};
use super::scene::{ArrowMarker, LineShape, NodeShape, Scene};
use super::types::{GraphData, NodeId};
use crate::config::GraphConfig;

/// Radius of the circle new nodes are laid out on.
const SEED_RADIUS: f64 = 100.0;
const ARROW_LENGTH: f64 = 8.0;
const HIGHLIGHT_SPEED: f64 = 1.8;

#[derive(Clone, Debug)]
pub struct LayoutLink {
	pub source: NodeId,
	pub target: NodeId,
	pub weight: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Gestures currently in progress.
	pub active: usize,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub path: Vec<NodeId>,
	pub nodes: HashSet<NodeId>,
	/// Links joining consecutive path nodes, stored in path order.
	pub links: HashSet<(NodeId, NodeId)>,
	pub highlight_t: f64,
}

/// Everything the graph view owns: surface size, layout, links, drag and
/// highlight bookkeeping.
pub struct GraphState {
	config: GraphConfig,
	pub layout: Layout,
	pub links: Vec<LayoutLink>,
	pub drag: DragState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl GraphState {
	pub fn new(config: GraphConfig, width: f64, height: f64) -> Self {
		let layout = Layout::new(&config.forces, width / 2.0, height / 2.0);
		Self {
			config,
			layout,
			links: Vec::new(),
			drag: DragState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			flow_time: 0.0,
		}
	}

	/// Sizes the surface without disturbing the simulation.
	pub fn initialize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout.set_center(width / 2.0, height / 2.0);
	}

	/// Replaces everything drawn with `data`, starting a fresh simulation.
	pub fn render(&mut self, data: &GraphData) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let mut layout = Layout::new(&self.config.forces, cx, cy);
		let count = data.nodes.len().max(1) as f64;

		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count;
			layout.add_node(
				node.id,
				node.properties.name.clone(),
				cx + SEED_RADIUS * angle.cos(),
				cy + SEED_RADIUS * angle.sin(),
				self.config.forces.node_mass,
			);
		}

		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			if layout.add_link(link.source, link.target).is_none() {
				warn!(
					"dropping link {} -> {}: endpoint not in node set",
					link.source, link.target
				);
				continue;
			}
			links.push(LayoutLink {
				source: link.source,
				target: link.target,
				weight: link.weight,
			});
		}

		self.layout = layout;
		self.links = links;
		self.drag = DragState::default();
		self.highlight = HighlightState::default();
	}

	pub fn tick(&mut self, dt: f32) {
		self.layout.tick(dt);
		self.flow_time += dt as f64;

		let target = if self.has_highlight() { 1.0 } else { 0.0 };
		self.highlight.highlight_t +=
			(target - self.highlight.highlight_t) * HIGHLIGHT_SPEED * dt as f64;
		if target == 0.0 && self.highlight.highlight_t < 0.01 {
			self.highlight.highlight_t = 0.0;
		}
	}

	/// Re-fits to new bounds and lets the nodes redistribute.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.initialize(width, height);
		self.layout.reheat(REHEAT_ALPHA);
		debug!(
			"layout restarted around {:?} at alpha {:.3}",
			self.layout.center(),
			self.layout.alpha()
		);
	}

	pub fn node_at_position(&self, x: f64, y: f64) -> Option<DefaultNodeIdx> {
		let mut found = None;
		self.layout.visit_nodes(|idx, nx, ny, _| {
			let (dx, dy) = (nx - x, ny - y);
			if (dx * dx + dy * dy).sqrt() < self.config.hit_radius {
				found = Some(idx);
			}
		});
		found
	}

	pub fn drag_start(&mut self, idx: DefaultNodeIdx, x: f64, y: f64) {
		let Some((nx, ny)) = self.layout.position(idx) else {
			return;
		};
		if self.drag.active == 0 {
			self.layout.set_alpha_target(DRAG_ALPHA_TARGET);
			self.layout.restart();
			debug!("drag started, alpha target {}", self.layout.alpha_target());
		}
		self.drag.active += 1;
		self.drag.node_idx = Some(idx);
		self.drag.start_x = x;
		self.drag.start_y = y;
		self.drag.node_start_x = nx;
		self.drag.node_start_y = ny;
		self.layout.pin(idx, nx as f32, ny as f32);
	}

	/// Moves the pin by the pointer's travel since `drag_start`.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let (px, py) = (
			self.drag.node_start_x + (x - self.drag.start_x),
			self.drag.node_start_y + (y - self.drag.start_y),
		);
		self.layout.pin(idx, px as f32, py as f32);
	}

	pub fn drag_end(&mut self) {
		let Some(idx) = self.drag.node_idx.take() else {
			return;
		};
		self.drag.active = self.drag.active.saturating_sub(1);
		if self.drag.active == 0 {
			self.layout.set_alpha_target(0.0);
		}
		self.layout.unpin(idx);
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.node_idx.is_some()
	}

	/// Marks the nodes of `path`, and the links between consecutive ones, as
	/// highlighted. Ids not in the current graph are ignored, and a pair with
	/// an unknown side marks no link; an empty path clears the highlight.
	pub fn highlight_path(&mut self, path: &[NodeId]) {
		let known = |id: &NodeId| self.layout.index_of(*id).is_some();

		let nodes: Vec<NodeId> = path.iter().copied().filter(known).collect();
		self.highlight.links = path
			.windows(2)
			.filter(|w| known(&w[0]) && known(&w[1]))
			.map(|w| (w[0], w[1]))
			.collect();
		self.highlight.nodes = nodes.iter().copied().collect();
		self.highlight.path = nodes;
		debug!("highlighting path {:?}", self.highlight.path);
	}

	pub fn has_highlight(&self) -> bool {
		!self.highlight.path.is_empty()
	}

	pub fn is_node_highlighted(&self, id: NodeId) -> bool {
		self.highlight.nodes.contains(&id)
	}

	pub fn is_link_highlighted(&self, source: NodeId, target: NodeId) -> bool {
		self.highlight.links.contains(&(source, target))
			|| self.highlight.links.contains(&(target, source))
	}

	/// Builds the display list from the current node positions.
	pub fn scene(&self) -> Scene {
		let radius = self.config.node_radius;
		let mut positions = HashMap::with_capacity(self.layout.node_count());
		let mut nodes = Vec::with_capacity(self.layout.node_count());
		self.layout.visit_nodes(|_, x, y, node| {
			positions.insert(node.id, (x, y));
			nodes.push(NodeShape {
				id: node.id,
				x,
				y,
				radius,
				label: node.label.clone(),
				highlighted: self.is_node_highlighted(node.id),
			});
		});

		let lines = self
			.links
			.iter()
			.filter_map(|link| {
				let (&(x1, y1), &(x2, y2)) =
					(positions.get(&link.source)?, positions.get(&link.target)?);
				Some(LineShape {
					source: link.source,
					target: link.target,
					x1,
					y1,
					x2,
					y2,
					stroke_width: link.weight.sqrt(),
					highlighted: self.is_link_highlighted(link.source, link.target),
				})
			})
			.collect();

		Scene {
			width: self.width,
			height: self.height,
			marker: ArrowMarker {
				length: ARROW_LENGTH,
				half_width: ARROW_LENGTH / 2.0,
				inset: radius,
				color: "#999",
			},
			lines,
			nodes,
			has_highlight: self.has_highlight(),
			highlight_t: self.highlight.highlight_t,
			flow_time: self.flow_time,
		}
	}
}

/// Shared handle to the graph state. Every handler borrows through it; no
/// borrow outlives a single synchronous call.
#[derive(Clone)]
pub struct GraphView(Rc<RefCell<GraphState>>);

impl GraphView {
	pub fn new(config: GraphConfig) -> Self {
		Self(Rc::new(RefCell::new(GraphState::new(config, 0.0, 0.0))))
	}

	#[cfg(test)]
	pub fn with<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R {
		f(&self.0.borrow())
	}

	pub fn update<R>(&self, f: impl FnOnce(&mut GraphState) -> R) -> R {
		f(&mut self.0.borrow_mut())
	}
}
