use super::types::NodeId;

/// Arrowhead drawn at the target end of every line.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowMarker {
	pub length: f64,
	pub half_width: f64,
	/// Distance from the target center to the tip, so the tip sits on the circle rim.
	pub inset: f64,
	pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineShape {
	pub source: NodeId,
	pub target: NodeId,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub stroke_width: f64,
	pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub label: String,
	pub highlighted: bool,
}

/// Display list for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	pub width: f64,
	pub height: f64,
	pub marker: ArrowMarker,
	pub lines: Vec<LineShape>,
	pub nodes: Vec<NodeShape>,
	pub has_highlight: bool,
	/// Eased 0..1 fade of the path highlight.
	pub highlight_t: f64,
	pub flow_time: f64,
}
