//! Character relationship graph for the browser.
//!
//! [`RelationshipGraph`] is the canvas widget. What drives it works without
//! a DOM as well: [`GraphState`] owns the characters, the layout and the
//! viewport, and [`InteractionController`] turns input events into changes
//! to it. [`App`] shows the widget on a small cast of sample characters.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod pages;

pub use components::force_graph::{
	Bounds, CharacterRecord, GraphConfig, GraphData, GraphError, GraphState, Handled,
	InteractionConfig, InteractionController, InteractionMode, NodeId, NodeStyle, Point,
	PointerButton, RelationshipGraph, RelationshipRecord, RelationshipType,
	SimulationParameters, SimulationStatus, Transform, ViewFilter,
};

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Sends `log` output to the browser console and reports panics there.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("console logging ready");
}

/// Root view: the graph page at `/`, a short notice on any other path.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Relationship Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
