use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use leptos::html::{Canvas, Div};
use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlDivElement,
	HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent, TouchList, WheelEvent, Window,
};

use super::config::GraphConfig;
use super::fullscreen;
use super::interaction::{Handled, InteractionController, PointerButton, WheelInput};
use super::render::{self, Avatars};
use super::state::{GraphState, InteractionMode};
use super::types::{Bounds, GraphData, NodeId, Point};

/// Store and controller of one mounted view.
struct GraphView {
	state: GraphState,
	controller: InteractionController,
	avatars: Avatars,
}

type SharedView = Rc<RefCell<Option<GraphView>>>;

/// A DOM listener that detaches itself when dropped.
struct Listener {
	target: EventTarget,
	name: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
	fn new(target: &EventTarget, name: &'static str, callback: impl FnMut(Event) + 'static) -> Self {
		let callback = Closure::<dyn FnMut(Event)>::new(callback);
		if let Err(err) =
			target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
		{
			warn!("could not listen for {name}: {err:?}");
		}
		Self {
			target: target.clone(),
			name,
			callback,
		}
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.name, self.callback.as_ref().unchecked_ref());
	}
}

/// `requestAnimationFrame` loop; cancelled when dropped.
struct FrameLoop {
	window: Window,
	pending: Rc<Cell<Option<i32>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameLoop {
	fn start(window: Window, mut frame: impl FnMut() + 'static) -> Self {
		let pending = Rc::new(Cell::new(None));
		let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
		let (pending_inner, callback_inner, window_inner) =
			(pending.clone(), callback.clone(), window.clone());

		*callback.borrow_mut() = Some(Closure::new(move || {
			pending_inner.set(None);
			frame();
			if let Some(ref cb) = *callback_inner.borrow() {
				request_frame(&window_inner, cb, &pending_inner);
			}
		}));
		if let Some(ref cb) = *callback.borrow() {
			request_frame(&window, cb, &pending);
		}

		Self {
			window,
			pending,
			callback,
		}
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		if let Some(id) = self.pending.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// The closure holds a handle to its own cell.
		self.callback.borrow_mut().take();
	}
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut()>, pending: &Cell<Option<i32>>) {
	match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
		Ok(id) => pending.set(Some(id)),
		Err(err) => warn!("requestAnimationFrame failed: {err:?}"),
	}
}

/// Everything a mounted view registered outside its own DOM subtree.
struct ViewHandle {
	view: SharedView,
	listeners: Vec<Listener>,
	frame: Option<FrameLoop>,
}

impl Drop for ViewHandle {
	fn drop(&mut self) {
		self.frame.take();
		self.listeners.clear();
		if let Ok(mut view) = self.view.try_borrow_mut() {
			view.take();
		}
		debug!("graph view torn down");
	}
}

/// Runs `f` against the mounted view, then syncs the canvas cursor and
/// reports a changed selection.
fn dispatch<R>(
	view: &SharedView,
	canvas_ref: NodeRef<Canvas>,
	on_select: Option<Callback<Option<NodeId>>>,
	f: impl FnOnce(&mut GraphView) -> R,
) -> Option<R> {
	let (result, cursor, selection) = {
		let mut guard = view.borrow_mut();
		let view = guard.as_mut()?;
		let before = view.state.interaction.selected_node_id;
		let result = f(view);
		let after = view.state.interaction.selected_node_id;
		(
			result,
			view.controller.cursor(&view.state),
			(before != after).then_some(after),
		)
	};

	if let Some(canvas) = canvas_ref.get_untracked() {
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
	if let (Some(selection), Some(on_select)) = (selection, on_select) {
		on_select.run(selection);
	}
	Some(result)
}

fn prevent(ev: &Event, handled: Option<Handled>) {
	if handled.is_some_and(Handled::prevents_default) {
		ev.prevent_default();
	}
}

/// Keys typed into the search box belong to the box.
fn from_text_input(ev: &Event) -> bool {
	ev.target()
		.is_some_and(|target| target.dyn_ref::<HtmlInputElement>().is_some())
}

fn canvas_point(canvas_ref: NodeRef<Canvas>, client_x: i32, client_y: i32) -> Option<Point> {
	let canvas = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	))
}

fn touch_points(canvas_ref: NodeRef<Canvas>, touches: &TouchList) -> Vec<Point> {
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|touch| canvas_point(canvas_ref, touch.client_x(), touch.client_y()))
		.collect()
}

fn measure(container: &HtmlDivElement) -> Bounds {
	Bounds::new(
		container.client_width() as f64,
		container.client_height() as f64,
	)
}

fn fit_canvas(canvas: &HtmlCanvasElement, bounds: Bounds) {
	canvas.set_width(bounds.width.max(0.0) as u32);
	canvas.set_height(bounds.height.max(0.0) as u32);
}

/// Re-measures the container and hands the new size to the store.
fn sync_size(view: &SharedView, container_ref: NodeRef<Div>, canvas_ref: NodeRef<Canvas>) {
	let (Some(container), Some(canvas)) = (container_ref.get_untracked(), canvas_ref.get_untracked())
	else {
		return;
	};
	let bounds = measure(&container);
	fit_canvas(&canvas, bounds);
	if let Some(view) = view.borrow_mut().as_mut() {
		view.state.resize(bounds);
		// Resizing the canvas cleared it.
		view.state.mark_dirty();
	}
}

const MODES: [(InteractionMode, &str); 3] = [
	(InteractionMode::Default, "Select"),
	(InteractionMode::Pan, "Pan"),
	(InteractionMode::Zoom, "Zoom"),
];

/// Interactive relationship graph drawn on a canvas.
///
/// Reloading `data` rebuilds the layout; characters that survive keep their
/// place. Selection changes are reported through `on_select`.
#[component]
pub fn RelationshipGraph(
	/// Characters, relationships and the type registry to draw.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Layout, input and node style tunables.
	#[prop(optional)]
	config: GraphConfig,
	/// Called with the new selection whenever it changes.
	#[prop(optional, into)]
	on_select: Option<Callback<Option<NodeId>>>,
	/// Height in CSS pixels outside fullscreen.
	#[prop(default = 500.0)]
	height: f64,
) -> impl IntoView {
	let container_ref = NodeRef::<Div>::new();
	let canvas_ref = NodeRef::<Canvas>::new();
	let shared: SharedView = Rc::new(RefCell::new(None));
	let view_handle = StoredValue::new_local(None::<ViewHandle>);
	let mode = RwSignal::new(InteractionMode::Default);
	let is_fullscreen = RwSignal::new(false);
	let show_labels = RwSignal::new(true);
	let hidden_types = RwSignal::new(HashSet::<i64>::new());

	let shared_init = shared.clone();
	Effect::new(move |_| {
		let data = data.get();
		let (Some(container), Some(canvas)) = (container_ref.get(), canvas_ref.get()) else {
			return;
		};

		if shared_init.borrow().is_some() {
			dispatch(&shared_init, canvas_ref, on_select, |view| {
				view.state.load(&data);
				view.controller.reset();
				mode.set(view.state.interaction.mode);
			});
			return;
		}

		let Some(window) = web_sys::window() else {
			warn!("no window, graph view disabled");
			return;
		};
		let Some(document) = window.document() else {
			warn!("no document, graph view disabled");
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas 2d context unavailable, graph view disabled");
			return;
		};

		let bounds = measure(&container);
		fit_canvas(&canvas, bounds);
		let mut state = GraphState::new(config, bounds);
		state.load(&data);
		*shared_init.borrow_mut() = Some(GraphView {
			state,
			controller: InteractionController::new(config.interaction),
			avatars: Avatars::default(),
		});

		let mut listeners = Vec::with_capacity(4);
		let shared_keys = shared_init.clone();
		listeners.push(Listener::new(&window, "keydown", move |ev: Event| {
			if from_text_input(&ev) {
				return;
			}
			let Some(key_event) = ev.dyn_ref::<KeyboardEvent>() else {
				return;
			};
			let (key, repeat) = (key_event.key(), key_event.repeat());
			let handled = dispatch(&shared_keys, canvas_ref, on_select, |view| {
				view.controller.key_down(&mut view.state, &key, repeat)
			});
			prevent(&ev, handled);
		}));

		let shared_keys = shared_init.clone();
		listeners.push(Listener::new(&window, "keyup", move |ev: Event| {
			if from_text_input(&ev) {
				return;
			}
			let Some(key_event) = ev.dyn_ref::<KeyboardEvent>() else {
				return;
			};
			let key = key_event.key();
			let handled = dispatch(&shared_keys, canvas_ref, on_select, |view| {
				view.controller.key_up(&mut view.state, &key)
			});
			prevent(&ev, handled);
		}));

		let shared_resize = shared_init.clone();
		listeners.push(Listener::new(&window, "resize", move |_| {
			sync_size(&shared_resize, container_ref, canvas_ref);
		}));

		let shared_fullscreen = shared_init.clone();
		listeners.push(Listener::new(&document, "fullscreenchange", move |_| {
			let Some(container) = container_ref.get_untracked() else {
				return;
			};
			let active = fullscreen::is_active(&container);
			is_fullscreen.set(active);
			dispatch(&shared_fullscreen, canvas_ref, on_select, |view| {
				view.controller.fullscreen_changed(&mut view.state, active);
			});
			sync_size(&shared_fullscreen, container_ref, canvas_ref);
		}));

		let shared_frame = shared_init.clone();
		let frame = FrameLoop::start(window, move || {
			let mut guard = shared_frame.borrow_mut();
			let Some(view) = guard.as_mut() else {
				return;
			};
			if view.state.is_animating() {
				view.state.tick();
			}
			// Draw again next frame while avatars are still arriving.
			if view.state.take_dirty() && render::render(&view.state, &ctx, &mut view.avatars) {
				view.state.mark_dirty();
			}
		});

		view_handle.set_value(Some(ViewHandle {
			view: shared_init.clone(),
			listeners,
			frame: Some(frame),
		}));
		info!("graph view mounted at {}x{}", bounds.width, bounds.height);
	});

	on_cleanup(move || {
		view_handle.try_update_value(|handle| handle.take());
	});

	let shared_md = shared.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(position) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let (button, time) = (PointerButton::from_dom(ev.button()), ev.time_stamp());
		let handled = dispatch(&shared_md, canvas_ref, on_select, |view| {
			view.controller
				.pointer_down(&mut view.state, position, button, time)
		});
		prevent(&ev, handled);
	};

	let shared_mm = shared.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(position) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let handled = dispatch(&shared_mm, canvas_ref, on_select, |view| {
			view.controller.pointer_move(&mut view.state, position)
		});
		prevent(&ev, handled);
	};

	let shared_mu = shared.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(position) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let button = PointerButton::from_dom(ev.button());
		let handled = dispatch(&shared_mu, canvas_ref, on_select, |view| {
			view.controller.pointer_up(&mut view.state, position, button)
		});
		prevent(&ev, handled);
	};

	let shared_ml = shared.clone();
	let on_mouseleave = move |_: MouseEvent| {
		dispatch(&shared_ml, canvas_ref, on_select, |view| {
			view.controller.pointer_leave(&mut view.state)
		});
	};

	let shared_wh = shared.clone();
	let on_wheel = move |ev: WheelEvent| {
		let Some(position) = canvas_point(canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		let input = WheelInput {
			delta_x: ev.delta_x(),
			delta_y: ev.delta_y(),
			position,
			shift: ev.shift_key(),
		};
		let handled = dispatch(&shared_wh, canvas_ref, on_select, |view| {
			view.controller.wheel(&mut view.state, input)
		});
		prevent(&ev, handled);
	};

	let shared_ts = shared.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let (touches, time) = (touch_points(canvas_ref, &ev.touches()), ev.time_stamp());
		let handled = dispatch(&shared_ts, canvas_ref, on_select, |view| {
			view.controller.touch_start(&mut view.state, &touches, time)
		});
		prevent(&ev, handled);
	};

	let shared_tm = shared.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let touches = touch_points(canvas_ref, &ev.touches());
		let handled = dispatch(&shared_tm, canvas_ref, on_select, |view| {
			view.controller.touch_move(&mut view.state, &touches)
		});
		prevent(&ev, handled);
	};

	let shared_te = shared.clone();
	let on_touchend = move |ev: TouchEvent| {
		let (remaining, time) = (touch_points(canvas_ref, &ev.touches()), ev.time_stamp());
		let handled = dispatch(&shared_te, canvas_ref, on_select, |view| {
			view.controller.touch_end(&mut view.state, &remaining, time)
		});
		prevent(&ev, handled);
	};

	let shared_tc = shared.clone();
	let on_touchcancel = move |ev: TouchEvent| {
		let handled = dispatch(&shared_tc, canvas_ref, on_select, |view| {
			view.controller.touch_cancel(&mut view.state)
		});
		prevent(&ev, handled);
	};

	let shared_tb = shared.clone();
	let toolbar = move |action: &dyn Fn(&mut InteractionController, &mut GraphState)| {
		dispatch(&shared_tb, canvas_ref, on_select, |view| {
			action(&mut view.controller, &mut view.state)
		});
	};

	let mode_buttons = MODES
		.into_iter()
		.map(|(button_mode, label)| {
			let toolbar = toolbar.clone();
			view! {
				<button
					class="graph-mode"
					class:active=move || mode.get() == button_mode
					on:click=move |_| {
						mode.set(button_mode);
						toolbar(&|controller: &mut InteractionController, state: &mut GraphState| {
							controller.set_mode(state, button_mode)
						});
					}
				>
					{label}
				</button>
			}
		})
		.collect_view();

	let (zoom_in, zoom_out, center) = (toolbar.clone(), toolbar.clone(), toolbar);
	let shared_fs = shared.clone();
	let on_fullscreen = move |_: MouseEvent| {
		let Some(request) = dispatch(&shared_fs, canvas_ref, on_select, |view| {
			view.controller.toggle_fullscreen(&view.state)
		}) else {
			return;
		};
		if let Some(container) = container_ref.get_untracked() {
			if let Err(err) = fullscreen::apply(request, &container) {
				debug!("{err}");
			}
		}
	};

	let shared_search = shared.clone();
	let on_search = move |ev: Event| {
		let query = event_target_value(&ev);
		dispatch(&shared_search, canvas_ref, on_select, |view| {
			view.state.set_search(&query)
		});
	};

	let shared_labels = shared.clone();
	let on_labels = move |_: MouseEvent| {
		let show = !show_labels.get_untracked();
		let applied = dispatch(&shared_labels, canvas_ref, on_select, |view| {
			view.state.set_show_labels(show)
		});
		if applied.is_some() {
			show_labels.set(show);
		}
	};

	// Reactive children must be `Send`; the legend reaches the view through
	// a local store.
	let shared_types = StoredValue::new_local(shared.clone());
	let type_chips = move || {
		data.with(|data| {
			data.relationship_types
				.iter()
				.map(|kind| {
					let type_id = kind.id;
					let on_toggle = move |_: MouseEvent| {
						let hidden = shared_types.with_value(|shared| {
							dispatch(shared, canvas_ref, on_select, |view| {
								view.state.toggle_relationship_type(type_id);
								view.state.filter().hidden_types.clone()
							})
						});
						if let Some(hidden) = hidden {
							hidden_types.set(hidden);
						}
					};
					view! {
						<button
							class="graph-type"
							class:filtered=move || hidden_types.with(|hidden| hidden.contains(&type_id))
							title="Fade this relationship type"
							on:click=on_toggle
						>
							<span class="swatch" style=format!("background: {};", kind.color)></span>
							{kind.name.clone()}
						</button>
					}
				})
				.collect_view()
		})
	};

	let container_style = move || {
		if is_fullscreen.get() {
			"position: relative; width: 100vw; height: 100vh; overflow: hidden;".to_string()
		} else {
			format!("position: relative; width: 100%; height: {height}px; overflow: hidden;")
		}
	};

	view! {
		<div node_ref=container_ref class="relationship-graph" style=container_style>
			<canvas
				node_ref=canvas_ref
				class="relationship-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				on:touchcancel=on_touchcancel
				on:contextmenu=|ev: MouseEvent| ev.prevent_default()
				style="display: block; width: 100%; height: 100%; touch-action: none;"
			/>
			<div class="graph-toolbar">
				{mode_buttons}
				<button title="Zoom in" on:click=move |_| zoom_in(&InteractionController::zoom_in)>
					"+"
				</button>
				<button title="Zoom out" on:click=move |_| zoom_out(&InteractionController::zoom_out)>
					"-"
				</button>
				<button title="Center view" on:click=move |_| center(&InteractionController::center_view)>
					"Center"
				</button>
				<button title="Toggle labels" on:click=on_labels>
					{move || if show_labels.get() { "Hide labels" } else { "Show labels" }}
				</button>
				<button title="Toggle fullscreen" on:click=on_fullscreen>
					{move || if is_fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }}
				</button>
				<input
					class="graph-search"
					type="search"
					placeholder="Search characters"
					on:input=on_search
				/>
			</div>
			<div class="graph-legend">{type_chips}</div>
		</div>
	}
}
