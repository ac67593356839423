use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::GraphView;

const FRAME_DT: f32 = 0.016;

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// Size of the canvas' container, falling back when it has not been laid out.
fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let measured = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64));
	fitted_size(measured)
}

fn fitted_size(measured: Option<(f64, f64)>) -> (f64, f64) {
	match measured {
		Some((w, h)) if w > 0.0 && h > 0.0 => (w, h),
		_ => {
			debug!(
				"graph container measured {:?}, using {}x{}",
				measured, FALLBACK_SIZE.0, FALLBACK_SIZE.1
			);
			FALLBACK_SIZE
		}
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas bound to a [`GraphView`]: sizes itself to its container, runs the
/// tick/paint loop, handles node dragging and window resizes. `on_ready` runs
/// once the surface is sized.
#[component]
pub fn ForceGraphCanvas(
	graph: GraphView,
	#[prop(optional)] on_ready: Option<Box<dyn Fn()>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (view_init, animate_init, resize_cb_init) =
		(graph.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window available");
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			error!("canvas has no 2d context");
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		view_init.update(|s| s.initialize(w, h));
		info!("graph surface initialized at {}x{}", w, h);

		let (view_resize, canvas_resize) = (view_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			view_resize.update(|s| s.resize(nw, nh));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (view_anim, animate_inner) = (view_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let scene = view_anim.update(|s| {
				s.tick(FRAME_DT);
				s.scene()
			});
			render::paint(&scene, &ctx);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		if let Some(on_ready) = &on_ready {
			on_ready();
		}
	});

	let view_md = graph.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		view_md.update(|s| {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag_start(idx, x, y);
			}
		});
	};

	let view_mm = graph.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		view_mm.update(|s| {
			if s.is_dragging() {
				s.drag_to(x, y);
			}
		});
	};

	let view_mu = graph.clone();
	let on_mouseup = move |_: MouseEvent| view_mu.update(|s| s.drag_end());

	let view_ml = graph;
	let on_mouseleave = move |_: MouseEvent| view_ml.update(|s| s.drag_end());

	view! {
		<canvas
			node_ref=canvas_ref
			id="graph"
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn laid_out_container_keeps_its_size() {
		assert_eq!(fitted_size(Some((1024.0, 480.0))), (1024.0, 480.0));
	}

	#[test]
	fn empty_or_missing_container_falls_back() {
		assert_eq!(fitted_size(Some((0.0, 300.0))), FALLBACK_SIZE);
		assert_eq!(fitted_size(None), FALLBACK_SIZE);
	}
}
