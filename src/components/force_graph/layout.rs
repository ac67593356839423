use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::NodeId;
use crate::config::ForceConfig;

/// Below this energy the simulation stops stepping.
pub const ALPHA_MIN: f64 = 0.001;
/// Energy target held while a node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Minimum energy after a resize.
pub const REHEAT_ALPHA: f64 = 0.3;
/// Ticks it takes to cool from 1 to `ALPHA_MIN` with a zero target.
const COOLING_TICKS: f64 = 300.0;

#[derive(Clone, Debug)]
pub struct LayoutNode {
	pub id: NodeId,
	pub label: String,
	/// Pinned position (`fx`, `fy`); the node is held here while set.
	pub pin: Option<(f32, f32)>,
}

/// Force simulation with link, repulsion and centering forces plus
/// alpha-based energy control.
pub struct Layout {
	graph: ForceGraph<LayoutNode, ()>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	center: (f32, f32),
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
}

impl Layout {
	pub fn new(forces: &ForceConfig, center_x: f64, center_y: f64) -> Self {
		let graph = ForceGraph::new(SimulationParameters {
			force_charge: -forces.charge_strength,
			force_spring: forces.link_spring,
			force_max: forces.force_max,
			node_speed: forces.node_speed,
			damping_factor: forces.damping,
		});
		Self {
			graph,
			index: HashMap::new(),
			center: (center_x as f32, center_y as f32),
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / COOLING_TICKS),
			running: true,
		}
	}

	/// Adds a node at `(x, y)`. A repeated id replaces the index entry but the
	/// earlier node stays in the simulation.
	pub fn add_node(
		&mut self,
		id: NodeId,
		label: String,
		x: f64,
		y: f64,
		mass: f32,
	) -> DefaultNodeIdx {
		let idx = self.graph.add_node(NodeData {
			x: x as f32,
			y: y as f32,
			mass,
			is_anchor: false,
			user_data: LayoutNode {
				id,
				label,
				pin: None,
			},
		});
		self.index.insert(id, idx);
		idx
	}

	/// Connects two existing nodes. Returns `None` if either id is unknown.
	pub fn add_link(
		&mut self,
		source: NodeId,
		target: NodeId,
	) -> Option<(DefaultNodeIdx, DefaultNodeIdx)> {
		let (&src, &tgt) = (self.index.get(&source)?, self.index.get(&target)?);
		self.graph.add_edge(src, tgt, EdgeData::default());
		Some((src, tgt))
	}

	pub fn index_of(&self, id: NodeId) -> Option<DefaultNodeIdx> {
		self.index.get(&id).copied()
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	/// Advances one step. Returns `false` when the layout is at rest.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.running {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		self.hold_pins();
		self.graph.update(dt * self.alpha as f32);
		self.apply_centering();
		self.hold_pins();

		if self.alpha < ALPHA_MIN {
			self.running = false;
			debug!("layout settled");
		}
		true
	}

	fn hold_pins(&mut self) {
		self.graph.visit_nodes_mut(|node| {
			if let Some((fx, fy)) = node.data.user_data.pin {
				node.data.x = fx;
				node.data.y = fy;
				node.data.is_anchor = true;
			}
		});
	}

	/// Translates free nodes so the mean position of all nodes sits on the center.
	fn apply_centering(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0usize);
		self.graph.visit_nodes(|node| {
			sx += node.x();
			sy += node.y();
			n += 1;
		});
		if n == 0 {
			return;
		}
		let (dx, dy) = (self.center.0 - sx / n as f32, self.center.1 - sy / n as f32);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += dx;
				node.data.y += dy;
			}
		});
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Raises the energy to at least `alpha` and resumes stepping.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
		self.restart();
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn center(&self) -> (f64, f64) {
		(self.center.0 as f64, self.center.1 as f64)
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x as f32, y as f32);
	}

	pub fn pin(&mut self, idx: DefaultNodeIdx, x: f32, y: f32) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.user_data.pin = Some((x, y));
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	pub fn unpin(&mut self, idx: DefaultNodeIdx) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.user_data.pin = None;
				node.data.is_anchor = false;
			}
		});
	}

	#[cfg(test)]
	pub fn pin_of(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut pin = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pin = node.data.user_data.pin;
			}
		});
		pin
	}

	pub fn position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn visit_nodes(&self, mut f: impl FnMut(DefaultNodeIdx, f64, f64, &LayoutNode)) {
		self.graph.visit_nodes(|node| {
			f(node.index(), node.x() as f64, node.y() as f64, &node.data.user_data);
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_nodes() -> Layout {
		let mut layout = Layout::new(&ForceConfig::default(), 200.0, 150.0);
		layout.add_node(1, "A".into(), 100.0, 150.0, 10.0);
		layout.add_node(2, "B".into(), 300.0, 150.0, 10.0);
		layout.add_link(1, 2);
		layout
	}

	#[test]
	fn unknown_endpoint_is_not_linked() {
		let mut layout = two_nodes();
		assert!(layout.add_link(1, 99).is_none());
		assert!(layout.add_link(1, 2).is_some());
	}

	#[test]
	fn cools_down_and_stops() {
		let mut layout = two_nodes();
		let mut steps = 0;
		while layout.tick(0.016) {
			steps += 1;
			assert!(steps < 1000, "layout never settled");
		}
		assert!(!layout.is_running());
		assert!(layout.alpha() < ALPHA_MIN);
		assert!(steps > 100);
	}

	#[test]
	fn reheat_resumes_a_settled_layout() {
		let mut layout = two_nodes();
		while layout.tick(0.016) {}
		layout.reheat(REHEAT_ALPHA);
		assert!(layout.is_running());
		assert!(layout.alpha() >= REHEAT_ALPHA);
		assert!(layout.tick(0.016));
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut layout = two_nodes();
		let idx = layout.index_of(1).unwrap();
		layout.pin(idx, 42.0, 24.0);
		for _ in 0..20 {
			layout.tick(0.016);
		}
		assert_eq!(layout.position(idx), Some((42.0, 24.0)));

		layout.unpin(idx);
		assert_eq!(layout.pin_of(idx), None);
	}

	#[test]
	fn centering_pulls_mean_to_center() {
		let mut layout = Layout::new(&ForceConfig::default(), 500.0, 400.0);
		layout.add_node(1, "A".into(), 0.0, 0.0, 10.0);
		layout.add_node(2, "B".into(), 40.0, 0.0, 10.0);
		layout.tick(0.016);

		let (mut sx, mut sy) = (0.0, 0.0);
		layout.visit_nodes(|_, x, y, _| {
			sx += x;
			sy += y;
		});
		assert!((sx / 2.0 - 500.0).abs() < 0.01);
		assert!((sy / 2.0 - 400.0).abs() < 0.01);
	}
}
