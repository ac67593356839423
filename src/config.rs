//! Runtime configuration for the explorer.

/// Tunables handed to the force simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Many-body strength; negative values repel.
	pub charge_strength: f32,
	pub link_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping: f32,
	pub node_mass: f32,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			charge_strength: -300.0,
			link_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			node_mass: 10.0,
		}
	}
}

/// Top-level configuration shared by the page, the canvas and the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Prefix for every API path. Empty means same origin.
	pub api_base: String,
	pub forces: ForceConfig,
	pub node_radius: f64,
	/// Pointer distance, in graph units, that still counts as a hit on a node.
	pub hit_radius: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			api_base: option_env!("GRAPH_API_BASE")
				.unwrap_or_default()
				.trim_end_matches('/')
				.to_string(),
			forces: ForceConfig::default(),
			node_radius: 10.0,
			hit_radius: 12.0,
		}
	}
}
