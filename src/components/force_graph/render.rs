use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{LineShape, Scene};

const BACKGROUND: &str = "#ffffff";
const NODE_FILL: &str = "#69b3a2";
const PATH_FILL: &str = "#ff7f0e";
const LABEL_COLOR: &str = "#333";
const LABEL_DX: f64 = 12.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Clears the surface and paints `scene`.
pub fn paint(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	draw_lines(scene, ctx);
	draw_nodes(scene, ctx);
}

fn draw_lines(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(scene.highlight_t);
	let (dash, gap) = (8.0, 4.0);
	let dash_offset = -(scene.flow_time * 30.0) % (dash + gap);

	for line in &scene.lines {
		let (dx, dy) = (line.x2 - line.x1, line.y2 - line.y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		// t=0: every line at base; t=1: path lines at full strength, others faded
		let on_path = scene.has_highlight && line.highlighted;
		let (alpha, width) = if on_path {
			(0.6 + 0.4 * t, line.stroke_width * (1.0 + t))
		} else if scene.has_highlight {
			(0.6 - 0.45 * t, line.stroke_width)
		} else {
			(0.6, line.stroke_width)
		};
		let color = if on_path { PATH_FILL } else { scene.marker.color };

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		if on_path {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let marker = &scene.marker;
		ctx.begin_path();
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(
			line.x2 - ux * (marker.inset + marker.length),
			line.y2 - uy * (marker.inset + marker.length),
		);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		draw_arrow(scene, line, (ux, uy), color, ctx);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_arrow(
	scene: &Scene,
	line: &LineShape,
	(ux, uy): (f64, f64),
	color: &str,
	ctx: &CanvasRenderingContext2d,
) {
	let marker = &scene.marker;
	let (tip_x, tip_y) = (line.x2 - ux * marker.inset, line.y2 - uy * marker.inset);
	let (back_x, back_y) = (tip_x - ux * marker.length, tip_y - uy * marker.length);
	let (px, py) = (-uy * marker.half_width, ux * marker.half_width);
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(scene.highlight_t);
	ctx.set_font("12px sans-serif");

	// Path nodes go last so they sit on top.
	let (path, rest): (Vec<_>, Vec<_>) = scene
		.nodes
		.iter()
		.partition(|n| scene.has_highlight && n.highlighted);

	for node in rest {
		let alpha = if scene.has_highlight { 1.0 - 0.6 * t } else { 1.0 };
		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(NODE_FILL);
		ctx.fill();

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, node.x + LABEL_DX, node.y + 4.0);
	}
	ctx.set_global_alpha(1.0);

	for node in path {
		let radius = node.radius * (1.0 + 0.3 * t);
		let glow_radius = node.radius * (1.4 + 0.8 * t);

		if t > 0.01 {
			if let Ok(gradient) =
				ctx.create_radial_gradient(node.x, node.y, radius * 0.3, node.x, node.y, glow_radius)
			{
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 127, 14, {})", 0.35 * t));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 127, 14, 0)");
				ctx.begin_path();
				let _ = ctx.arc(node.x, node.y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(PATH_FILL);
		ctx.fill();

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, node.x + radius + 2.0, node.y + 4.0);
	}
}
