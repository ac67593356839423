use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::actions::{self, EdgeForm, NodeForm, PathForm};
use crate::api::HttpBackend;
use crate::components::force_graph::{ForceGraphCanvas, GraphView};
use crate::config::GraphConfig;

fn read(input: NodeRef<Input>) -> String {
	input.get().map(|el| el.value()).unwrap_or_default()
}

/// Default Home Page: the graph surface plus the node, edge and path forms.
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphConfig::default();
	let backend = HttpBackend::new(config.api_base.clone());
	let view = GraphView::new(config);

	let (node_id, node_name) = (NodeRef::<Input>::new(), NodeRef::<Input>::new());
	let (from_node, to_node) = (NodeRef::<Input>::new(), NodeRef::<Input>::new());
	let (weight, edge_type) = (NodeRef::<Input>::new(), NodeRef::<Input>::new());
	let (path_from, path_to) = (NodeRef::<Input>::new(), NodeRef::<Input>::new());

	let on_ready: Box<dyn Fn()> = {
		let (backend, view) = (backend.clone(), view.clone());
		Box::new(move || {
			let (backend, view) = (backend.clone(), view.clone());
			spawn_local(async move { actions::load_graph(&backend, &view).await });
		})
	};

	let on_node_submit = {
		let (backend, view) = (backend.clone(), view.clone());
		move |ev: SubmitEvent| {
			ev.prevent_default();
			let form = NodeForm {
				id: read(node_id),
				name: read(node_name),
			};
			let (backend, view) = (backend.clone(), view.clone());
			spawn_local(async move { actions::submit_node(&backend, &view, &form).await });
		}
	};

	let on_edge_submit = {
		let (backend, view) = (backend.clone(), view.clone());
		move |ev: SubmitEvent| {
			ev.prevent_default();
			let form = EdgeForm {
				from: read(from_node),
				to: read(to_node),
				weight: read(weight),
				kind: read(edge_type),
			};
			let (backend, view) = (backend.clone(), view.clone());
			spawn_local(async move { actions::submit_edge(&backend, &view, &form).await });
		}
	};

	let on_path_submit = {
		let (backend, view) = (backend, view.clone());
		move |ev: SubmitEvent| {
			ev.prevent_default();
			let form = PathForm {
				from: read(path_from),
				to: read(path_to),
			};
			let (backend, view) = (backend.clone(), view.clone());
			spawn_local(async move { actions::find_path(&backend, &view, &form).await });
		}
	};

	view! {
		<div class="explorer">
			<aside class="controls">
				<form id="nodeForm" on:submit=on_node_submit>
					<h2>"Add node"</h2>
					<input id="nodeId" type="number" placeholder="ID" required node_ref=node_id />
					<input id="nodeName" type="text" placeholder="Name" required node_ref=node_name />
					<button type="submit">"Add node"</button>
				</form>

				<form id="edgeForm" on:submit=on_edge_submit>
					<h2>"Add edge"</h2>
					<input id="fromNode" type="number" placeholder="From" required node_ref=from_node />
					<input id="toNode" type="number" placeholder="To" required node_ref=to_node />
					<input id="weight" type="number" step="any" placeholder="Weight" node_ref=weight />
					<input id="edgeType" type="text" placeholder="Type" node_ref=edge_type />
					<button type="submit">"Add edge"</button>
				</form>

				<form id="pathForm" on:submit=on_path_submit>
					<h2>"Shortest path"</h2>
					<input id="pathFrom" type="number" placeholder="From" required node_ref=path_from />
					<input id="pathTo" type="number" placeholder="To" required node_ref=path_to />
					<button type="submit">"Find path"</button>
				</form>
			</aside>

			<div class="graph-container">
				<ForceGraphCanvas graph=view on_ready=on_ready />
			</div>
		</div>
	}
}
