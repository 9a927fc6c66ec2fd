//! Pointer, touch and keyboard handling for the graph view.
//!
//! One state machine covers every input device. The controller keeps only
//! the gesture in progress; everything observable (selection, mode, drag
//! flags, transform, pins) is written into [`GraphState`].

use log::debug;

use super::config::InteractionConfig;
use super::state::{GraphState, InteractionMode};
use super::types::{NodeId, Point};

/// Mouse button behind a press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	/// Left button: drags nodes, pans the background, clicks select.
	Primary,
	/// Wheel button: always pans.
	Middle,
	/// Right button, left to the context menu.
	Secondary,
	/// Back, forward and anything else.
	Other,
}

impl PointerButton {
	/// Maps `MouseEvent.button`.
	pub fn from_dom(button: i16) -> Self {
		match button {
			0 => PointerButton::Primary,
			1 => PointerButton::Middle,
			2 => PointerButton::Secondary,
			_ => PointerButton::Other,
		}
	}
}

/// Whether the browser's default action for the event should be suppressed.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
	/// The graph consumed the event.
	PreventDefault,
	/// Let the browser do its usual thing.
	Ignored,
}

impl Handled {
	/// Shorthand for `self == Handled::PreventDefault`.
	pub fn prevents_default(self) -> bool {
		self == Handled::PreventDefault
	}
}

/// What the fullscreen button asks the platform for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenRequest {
	Enter,
	Exit,
}

/// One wheel event in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelInput {
	pub delta_x: f64,
	pub delta_y: f64,
	pub position: Point,
	pub shift: bool,
}

/// The gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	PanningBackground,
	DraggingNode {
		id: NodeId,
		/// World-space offset from the pointer to the node center.
		grab_offset: Point,
	},
	PinchZooming {
		distance: f64,
		held_node: Option<NodeId>,
	},
}

/// The press or touch sequence currently being classified as click or drag.
#[derive(Clone, Copy, Debug)]
struct Press {
	button: PointerButton,
	origin: Point,
	last: Point,
	started_ms: f64,
	target: Option<NodeId>,
	/// Ends in a selection change if it turns out to be a click.
	selects: bool,
	multi_touch: bool,
}

impl Press {
	fn travel(&self) -> f64 {
		self.origin.distance(self.last)
	}
}

/// Turns raw pointer, touch and key events into changes to a
/// [`GraphState`]. Every handler says whether the browser default should be
/// suppressed.
#[derive(Debug, Default)]
pub struct InteractionController {
	config: InteractionConfig,
	gesture: Gesture,
	press: Option<Press>,
}

impl InteractionController {
	/// An idle controller.
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config,
			gesture: Gesture::Idle,
			press: None,
		}
	}

	/// The gesture in progress.
	pub fn gesture(&self) -> Gesture {
		self.gesture
	}

	/// Forgets any gesture in progress without touching the state. Used when
	/// the working set is replaced underneath the controller.
	pub fn reset(&mut self) {
		self.gesture = Gesture::Idle;
		self.press = None;
	}

	// Mouse

	/// Starts a pan, a node drag or a click candidate depending on the
	/// button, the mode and what is under the pointer.
	pub fn pointer_down(
		&mut self,
		state: &mut GraphState,
		position: Point,
		button: PointerButton,
		time_ms: f64,
	) -> Handled {
		// A second button while one is held joins nothing.
		if self.gesture != Gesture::Idle || self.press.is_some() {
			return Handled::PreventDefault;
		}

		let mode = state.interaction.mode;
		let pan_override = state.interaction.is_panning || !mode.allows_node_drag();
		let hit = state.node_at(position);
		let pans = match button {
			PointerButton::Middle => true,
			PointerButton::Primary => pan_override || hit.is_none(),
			PointerButton::Secondary | PointerButton::Other => return Handled::Ignored,
		};

		self.press = Some(Press {
			button,
			origin: position,
			last: position,
			started_ms: time_ms,
			target: hit,
			selects: button == PointerButton::Primary && !pan_override,
			multi_touch: false,
		});

		if pans {
			if pan_override || button == PointerButton::Middle || mode.allows_background_pan() {
				self.begin_pan(state, position);
			}
		} else if let Some(id) = hit {
			self.begin_drag(state, id, position);
		}
		Handled::PreventDefault
	}

	/// Hover tracking while idle, otherwise moves the view or the held node.
	pub fn pointer_move(&mut self, state: &mut GraphState, position: Point) -> Handled {
		if self.gesture == Gesture::Idle && self.press.is_none() {
			let hovered = state.node_at(position);
			state.set_hovered(hovered);
			state.interaction.last_pointer_pos = position;
			return Handled::Ignored;
		}
		self.track(state, position)
	}

	/// Ends the gesture; a press that barely moved selects what it landed on.
	/// Only the button that started the press ends it.
	pub fn pointer_up(
		&mut self,
		state: &mut GraphState,
		position: Point,
		button: PointerButton,
	) -> Handled {
		let Some(mut press) = self.press.filter(|press| press.button == button) else {
			return Handled::Ignored;
		};
		self.press = None;
		press.last = position;
		self.end_gesture(state);
		if press.selects && press.travel() < self.config.tap_max_distance {
			state.select_node(press.target);
		}
		Handled::PreventDefault
	}

	/// Pointer left the canvas: end whatever was going on, select nothing.
	pub fn pointer_leave(&mut self, state: &mut GraphState) {
		self.press = None;
		self.end_gesture(state);
		state.set_hovered(None);
	}

	/// Zooms about the pointer, or pans with Shift held.
	pub fn wheel(&mut self, state: &mut GraphState, input: WheelInput) -> Handled {
		state
			.transform
			.wheel_zoom(input.delta_x, input.delta_y, input.position, input.shift);
		state.mark_dirty();
		Handled::PreventDefault
	}

	// Touch

	/// `touches` are all touches currently on the surface.
	pub fn touch_start(&mut self, state: &mut GraphState, touches: &[Point], time_ms: f64) -> Handled {
		match touches {
			[] => Handled::Ignored,
			[touch] => {
				if self.gesture != Gesture::Idle {
					return Handled::PreventDefault;
				}
				let mode = state.interaction.mode;
				let pan_override = state.interaction.is_panning || !mode.allows_node_drag();
				let hit = state.node_at(*touch);
				self.press = Some(Press {
					button: PointerButton::Primary,
					origin: *touch,
					last: *touch,
					started_ms: time_ms,
					target: hit,
					selects: true,
					multi_touch: false,
				});
				match hit {
					Some(id) if !pan_override => self.begin_drag(state, id, *touch),
					_ if pan_override || mode.allows_background_pan() => {
						self.begin_pan(state, *touch)
					}
					_ => {}
				}
				Handled::PreventDefault
			}
			[first, second, ..] => {
				if let Some(press) = self.press.as_mut() {
					press.multi_touch = true;
				}
				if !state.interaction.mode.allows_pinch() {
					return Handled::PreventDefault;
				}
				let held_node = match self.gesture {
					Gesture::DraggingNode { id, .. } => Some(id),
					Gesture::PinchZooming { held_node, .. } => held_node,
					Gesture::Idle | Gesture::PanningBackground => None,
				};
				self.gesture = Gesture::PinchZooming {
					distance: first.distance(*second),
					held_node,
				};
				state.interaction.is_actively_dragging = false;
				debug!("pinch started");
				Handled::PreventDefault
			}
		}
	}

	/// Pinch-zooms with two touches, otherwise follows the first one.
	pub fn touch_move(&mut self, state: &mut GraphState, touches: &[Point]) -> Handled {
		match (self.gesture, touches) {
			(_, []) => Handled::Ignored,
			(Gesture::PinchZooming { distance, held_node }, [first, second, ..]) => {
				let current = first.distance(*second);
				if distance > 0.0 && current > 0.0 {
					state
						.transform
						.pinch_zoom(current / distance, first.midpoint(*second));
					state.mark_dirty();
				}
				self.gesture = Gesture::PinchZooming {
					distance: current,
					held_node,
				};
				Handled::PreventDefault
			}
			(_, [touch, ..]) => self.track(state, *touch),
		}
	}

	/// `remaining` are the touches still on the surface after the lift.
	pub fn touch_end(&mut self, state: &mut GraphState, remaining: &[Point], time_ms: f64) -> Handled {
		match remaining {
			[] => {
				let press = self.press.take();
				self.end_gesture(state);
				if let Some(press) = press {
					if self.is_tap(&press, time_ms) {
						state.select_node(press.target);
					}
				}
			}
			[touch] => {
				if let Gesture::PinchZooming { held_node, .. } = self.gesture {
					match held_node {
						Some(_) => self.end_gesture(state),
						None if state.interaction.mode.allows_background_pan() => {
							self.begin_pan(state, *touch)
						}
						None => self.gesture = Gesture::Idle,
					}
				}
				state.interaction.last_pointer_pos = *touch;
			}
			[first, second, ..] => {
				if let Gesture::PinchZooming { held_node, .. } = self.gesture {
					self.gesture = Gesture::PinchZooming {
						distance: first.distance(*second),
						held_node,
					};
				}
			}
		}
		Handled::PreventDefault
	}

	/// The platform took the touches away; nothing is selected.
	pub fn touch_cancel(&mut self, state: &mut GraphState) -> Handled {
		self.press = None;
		self.end_gesture(state);
		Handled::PreventDefault
	}

	fn is_tap(&self, press: &Press, ended_ms: f64) -> bool {
		!press.multi_touch
			&& press.travel() < self.config.tap_max_distance
			&& ended_ms - press.started_ms < self.config.tap_max_duration_ms
	}

	// Keyboard

	/// Space holds the pan override, `+`/`=` and `-`/`_` step the zoom, and
	/// Escape clears the selection.
	pub fn key_down(&mut self, state: &mut GraphState, key: &str, repeat: bool) -> Handled {
		match key {
			// Left to the browser so Escape still leaves fullscreen.
			"Escape" => {
				state.select_node(None);
				Handled::Ignored
			}
			"+" | "=" => {
				self.zoom_in(state);
				Handled::PreventDefault
			}
			"-" | "_" => {
				self.zoom_out(state);
				Handled::PreventDefault
			}
			" " | "Spacebar" => {
				if !repeat {
					state.interaction.is_panning = true;
					state.mark_dirty();
				}
				Handled::PreventDefault
			}
			_ => Handled::Ignored,
		}
	}

	/// Releases the Space pan override.
	pub fn key_up(&mut self, state: &mut GraphState, key: &str) -> Handled {
		match key {
			" " | "Spacebar" => {
				state.interaction.is_panning = false;
				state.mark_dirty();
				Handled::PreventDefault
			}
			_ => Handled::Ignored,
		}
	}

	// Toolbar and platform

	/// Switches the toolbar mode.
	pub fn set_mode(&mut self, state: &mut GraphState, mode: InteractionMode) {
		state.interaction.mode = mode;
		state.mark_dirty();
	}

	/// One zoom step in, about the viewport center.
	pub fn zoom_in(&mut self, state: &mut GraphState) {
		let pivot = state.bounds().center();
		state.transform.zoom_in(pivot);
		state.mark_dirty();
	}

	/// One zoom step out, about the viewport center.
	pub fn zoom_out(&mut self, state: &mut GraphState) {
		let pivot = state.bounds().center();
		state.transform.zoom_out(pivot);
		state.mark_dirty();
	}

	/// Back to the identity transform.
	pub fn center_view(&mut self, state: &mut GraphState) {
		state.transform.reset();
		state.mark_dirty();
	}

	/// What to ask the platform for. The state only flips once the platform
	/// reports back through [`Self::fullscreen_changed`].
	pub fn toggle_fullscreen(&self, state: &GraphState) -> FullscreenRequest {
		if state.interaction.is_fullscreen {
			FullscreenRequest::Exit
		} else {
			FullscreenRequest::Enter
		}
	}

	/// The platform entered or left fullscreen.
	pub fn fullscreen_changed(&mut self, state: &mut GraphState, active: bool) {
		state.interaction.is_fullscreen = active;
		state.mark_dirty();
	}

	/// CSS cursor for the canvas.
	pub fn cursor(&self, state: &GraphState) -> &'static str {
		match self.gesture {
			Gesture::PanningBackground | Gesture::DraggingNode { .. } => "grabbing",
			_ if state.interaction.is_panning || state.interaction.mode == InteractionMode::Pan => {
				"grab"
			}
			_ if state.interaction.hovered_node_id.is_some() => "pointer",
			_ => "default",
		}
	}

	fn begin_pan(&mut self, state: &mut GraphState, position: Point) {
		self.gesture = Gesture::PanningBackground;
		state.interaction.is_actively_dragging = true;
		state.interaction.last_pointer_pos = position;
	}

	fn begin_drag(&mut self, state: &mut GraphState, id: NodeId, position: Point) {
		let Some(node) = state.node(id).map(|node| node.position()) else {
			return;
		};
		let world = state.transform.screen_to_world(position);
		self.gesture = Gesture::DraggingNode {
			id,
			grab_offset: Point::new(node.x - world.x, node.y - world.y),
		};
		state.interaction.dragged_node_id = Some(id);
		state.interaction.is_actively_dragging = true;
		state.interaction.last_pointer_pos = position;
		state.heat();
		state.pin_node(id, node);
		debug!("dragging node {id}");
	}

	/// Follows a single moving pointer or touch.
	fn track(&mut self, state: &mut GraphState, position: Point) -> Handled {
		if let Some(press) = self.press.as_mut() {
			press.last = position;
		}
		let handled = match self.gesture {
			Gesture::PanningBackground => {
				let last = state.interaction.last_pointer_pos;
				state.transform.pan(position.x - last.x, position.y - last.y);
				state.mark_dirty();
				Handled::PreventDefault
			}
			Gesture::DraggingNode { id, grab_offset } => {
				let world = state.transform.screen_to_world(position);
				state.pin_node(
					id,
					Point::new(world.x + grab_offset.x, world.y + grab_offset.y),
				);
				Handled::PreventDefault
			}
			Gesture::PinchZooming { .. } => Handled::PreventDefault,
			Gesture::Idle => Handled::Ignored,
		};
		state.interaction.last_pointer_pos = position;
		handled
	}

	fn end_gesture(&mut self, state: &mut GraphState) {
		let released = match self.gesture {
			Gesture::DraggingNode { id, .. } => Some(id),
			Gesture::PinchZooming { held_node, .. } => held_node,
			Gesture::Idle | Gesture::PanningBackground => None,
		};
		if let Some(id) = released {
			state.unpin_node(id);
			state.cool();
			debug!("released node {id}");
		}
		self.gesture = Gesture::Idle;
		state.interaction.dragged_node_id = None;
		state.interaction.is_actively_dragging = false;
		state.mark_dirty();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::GraphConfig;
	use crate::components::force_graph::types::{
		Bounds, CharacterRecord, GraphData, RelationshipRecord,
	};

	/// Node 1 at (100, 100), node 2 at (400, 300), identity transform.
	fn fixture() -> (InteractionController, GraphState) {
		let mut state = GraphState::new(GraphConfig::default(), Bounds::new(800.0, 600.0));
		state.load(&GraphData {
			characters: vec![
				CharacterRecord {
					id: 1,
					name: "A".into(),
					avatar: None,
				},
				CharacterRecord {
					id: 2,
					name: "B".into(),
					avatar: None,
				},
			],
			relationships: vec![RelationshipRecord {
				id: Some(1),
				source_id: 1,
				target_id: 2,
				type_id: 1,
				description: None,
			}],
			relationship_types: vec![],
		});
		for (id, at) in [(1, Point::new(100.0, 100.0)), (2, Point::new(400.0, 300.0))] {
			state.pin_node(id, at);
			state.unpin_node(id);
		}
		(InteractionController::new(InteractionConfig::default()), state)
	}

	fn alpha_target(state: &GraphState) -> f64 {
		state.simulation().unwrap().alpha_target()
	}

	#[test]
	fn background_drag_pans() {
		let (mut ctl, mut state) = fixture();
		let handled = ctl.pointer_down(&mut state, Point::new(600.0, 500.0), PointerButton::Primary, 0.0);
		assert!(handled.prevents_default());
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		assert!(state.interaction.is_actively_dragging);

		assert!(ctl.pointer_move(&mut state, Point::new(630.0, 480.0)).prevents_default());
		assert!(ctl.pointer_move(&mut state, Point::new(640.0, 490.0)).prevents_default());
		assert_eq!((state.transform.x, state.transform.y), (40.0, -10.0));

		let _ = ctl.pointer_up(&mut state, Point::new(640.0, 490.0), PointerButton::Primary);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert!(!state.interaction.is_actively_dragging);
	}

	#[test]
	fn node_drag_pins_heats_and_releases() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.pointer_down(&mut state, Point::new(105.0, 100.0), PointerButton::Primary, 0.0);
		assert!(matches!(ctl.gesture(), Gesture::DraggingNode { id: 1, .. }));
		assert_eq!(state.interaction.dragged_node_id, Some(1));
		assert!(state.simulation().unwrap().is_pinned(1));
		assert_eq!(alpha_target(&state), 0.3);

		let _ = ctl.pointer_move(&mut state, Point::new(205.0, 150.0));
		assert_eq!(state.node(1).unwrap().position(), Point::new(200.0, 150.0));
		// The solver keeps the pin through ticks.
		state.tick();
		assert_eq!(state.node(1).unwrap().position(), Point::new(200.0, 150.0));

		let _ = ctl.pointer_up(&mut state, Point::new(205.0, 150.0), PointerButton::Primary);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert!(!state.simulation().unwrap().is_pinned(1));
		assert!(!state.node(1).unwrap().pinned);
		assert_eq!(alpha_target(&state), 0.0);
		assert_eq!(state.interaction.dragged_node_id, None);
		// Moved too far to count as a click.
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn node_drag_follows_zoomed_pointer() {
		let (mut ctl, mut state) = fixture();
		state.transform.zoom_at_point(2.0, Point::new(0.0, 0.0));
		// Node 1 is drawn at (200, 200) now.
		let _ = ctl.pointer_down(&mut state, Point::new(200.0, 200.0), PointerButton::Primary, 0.0);
		let _ = ctl.pointer_move(&mut state, Point::new(260.0, 240.0));
		assert_eq!(state.node(1).unwrap().position(), Point::new(130.0, 120.0));
	}

	#[test]
	fn clicks_select_and_clear() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.pointer_down(&mut state, Point::new(400.0, 300.0), PointerButton::Primary, 0.0);
		let _ = ctl.pointer_up(&mut state, Point::new(402.0, 301.0), PointerButton::Primary);
		assert_eq!(state.interaction.selected_node_id, Some(2));

		let _ = ctl.pointer_down(&mut state, Point::new(700.0, 50.0), PointerButton::Primary, 10.0);
		let _ = ctl.pointer_up(&mut state, Point::new(700.0, 50.0), PointerButton::Primary);
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn background_pan_keeps_selection() {
		let (mut ctl, mut state) = fixture();
		state.select_node(Some(1));
		let _ = ctl.pointer_down(&mut state, Point::new(700.0, 50.0), PointerButton::Primary, 0.0);
		let _ = ctl.pointer_move(&mut state, Point::new(760.0, 50.0));
		let _ = ctl.pointer_up(&mut state, Point::new(760.0, 50.0), PointerButton::Primary);
		assert_eq!(state.interaction.selected_node_id, Some(1));
	}

	#[test]
	fn middle_button_pans_even_over_a_node() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Middle, 0.0);
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		assert!(!state.simulation().unwrap().is_pinned(1));
		let _ = ctl.pointer_up(&mut state, Point::new(100.0, 100.0), PointerButton::Middle);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn other_buttons_do_not_end_a_drag() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Primary, 0.0);
		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Middle, 5.0);
		let handled = ctl.pointer_up(&mut state, Point::new(100.0, 100.0), PointerButton::Middle);
		assert_eq!(handled, Handled::Ignored);
		let handled = ctl.pointer_up(&mut state, Point::new(100.0, 100.0), PointerButton::Secondary);
		assert_eq!(handled, Handled::Ignored);
		assert!(matches!(ctl.gesture(), Gesture::DraggingNode { id: 1, .. }));
		assert!(state.simulation().unwrap().is_pinned(1));

		let _ = ctl.pointer_move(&mut state, Point::new(150.0, 100.0));
		assert_eq!(state.node(1).unwrap().position(), Point::new(150.0, 100.0));
		assert!(ctl.pointer_up(&mut state, Point::new(150.0, 100.0), PointerButton::Primary).prevents_default());
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert!(!state.simulation().unwrap().is_pinned(1));
	}

	#[test]
	fn secondary_button_is_ignored() {
		let (mut ctl, mut state) = fixture();
		let handled = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Secondary, 0.0);
		assert_eq!(handled, Handled::Ignored);
		assert_eq!(ctl.gesture(), Gesture::Idle);
	}

	#[test]
	fn space_override_turns_node_press_into_pan() {
		let (mut ctl, mut state) = fixture();
		assert!(ctl.key_down(&mut state, " ", false).prevents_default());
		assert!(state.interaction.is_panning);
		assert_eq!(ctl.cursor(&state), "grab");

		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Primary, 0.0);
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		assert_eq!(ctl.cursor(&state), "grabbing");
		let _ = ctl.pointer_up(&mut state, Point::new(100.0, 100.0), PointerButton::Primary);
		// Pan-override presses never change the selection.
		assert_eq!(state.interaction.selected_node_id, None);

		let _ = ctl.key_up(&mut state, " ");
		assert!(!state.interaction.is_panning);
		assert_eq!(ctl.cursor(&state), "default");
	}

	#[test]
	fn modes_gate_drags() {
		let (mut ctl, mut state) = fixture();
		ctl.set_mode(&mut state, InteractionMode::Pan);
		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Primary, 0.0);
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		let _ = ctl.pointer_up(&mut state, Point::new(100.0, 100.0), PointerButton::Primary);

		ctl.set_mode(&mut state, InteractionMode::Zoom);
		let _ = ctl.pointer_down(&mut state, Point::new(700.0, 50.0), PointerButton::Primary, 0.0);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		let _ = ctl.pointer_move(&mut state, Point::new(750.0, 50.0));
		assert_eq!(state.transform.x, 0.0);
		let _ = ctl.pointer_up(&mut state, Point::new(750.0, 50.0), PointerButton::Primary);

		let _ = ctl.pointer_down(&mut state, Point::new(100.0, 100.0), PointerButton::Primary, 0.0);
		assert!(matches!(ctl.gesture(), Gesture::DraggingNode { id: 1, .. }));
	}

	#[test]
	fn short_touch_is_a_tap_long_travel_is_a_drag() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.touch_start(&mut state, &[Point::new(100.0, 100.0)], 1_000.0);
		let _ = ctl.touch_move(&mut state, &[Point::new(103.0, 104.0)]);
		let _ = ctl.touch_end(&mut state, &[], 1_150.0);
		assert_eq!(state.interaction.selected_node_id, Some(1));

		let (mut ctl, mut state) = fixture();
		let _ = ctl.touch_start(&mut state, &[Point::new(100.0, 100.0)], 1_000.0);
		let _ = ctl.touch_move(&mut state, &[Point::new(130.0, 140.0)]);
		let _ = ctl.touch_end(&mut state, &[], 1_150.0);
		assert_eq!(state.interaction.selected_node_id, None);
		assert_eq!(state.node(1).unwrap().position(), Point::new(130.0, 140.0));
	}

	#[test]
	fn slow_touch_is_not_a_tap() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.touch_start(&mut state, &[Point::new(400.0, 300.0)], 0.0);
		let _ = ctl.touch_end(&mut state, &[], 450.0);
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn background_tap_clears_selection_and_touch_pan_moves_view() {
		let (mut ctl, mut state) = fixture();
		state.select_node(Some(2));
		let _ = ctl.touch_start(&mut state, &[Point::new(700.0, 50.0)], 0.0);
		let _ = ctl.touch_end(&mut state, &[], 80.0);
		assert_eq!(state.interaction.selected_node_id, None);

		let _ = ctl.touch_start(&mut state, &[Point::new(700.0, 50.0)], 100.0);
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		let _ = ctl.touch_move(&mut state, &[Point::new(650.0, 80.0)]);
		assert_eq!((state.transform.x, state.transform.y), (-50.0, 30.0));
		let _ = ctl.touch_end(&mut state, &[], 400.0);
		assert_eq!(ctl.gesture(), Gesture::Idle);
	}

	#[test]
	fn pinch_zooms_about_the_midpoint() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.touch_start(&mut state, &[Point::new(650.0, 100.0)], 0.0);
		let _ = ctl.touch_start(
			&mut state,
			&[Point::new(650.0, 100.0), Point::new(750.0, 100.0)],
			10.0,
		);
		assert!(matches!(ctl.gesture(), Gesture::PinchZooming { held_node: None, .. }));

		let mid = Point::new(700.0, 100.0);
		let before = state.transform.screen_to_world(mid);
		let _ = ctl.touch_move(&mut state, &[Point::new(600.0, 100.0), Point::new(800.0, 100.0)]);
		assert!((state.transform.scale - 2.0).abs() < 1e-9);
		let after = state.transform.screen_to_world(mid);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);

		// One finger lifts: nothing was held, so the other one pans.
		let _ = ctl.touch_end(&mut state, &[Point::new(600.0, 100.0)], 50.0);
		assert_eq!(ctl.gesture(), Gesture::PanningBackground);
		let _ = ctl.touch_end(&mut state, &[], 60.0);
		// A sequence that became a pinch is never a tap.
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn pinch_while_holding_a_node_falls_back_to_idle() {
		let (mut ctl, mut state) = fixture();
		let _ = ctl.touch_start(&mut state, &[Point::new(100.0, 100.0)], 0.0);
		let _ = ctl.touch_start(
			&mut state,
			&[Point::new(100.0, 100.0), Point::new(200.0, 200.0)],
			5.0,
		);
		assert!(matches!(ctl.gesture(), Gesture::PinchZooming { held_node: Some(1), .. }));
		assert!(state.simulation().unwrap().is_pinned(1));

		let _ = ctl.touch_end(&mut state, &[Point::new(100.0, 100.0)], 20.0);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert!(!state.simulation().unwrap().is_pinned(1));
		assert_eq!(state.interaction.dragged_node_id, None);
	}

	#[test]
	fn wheel_zooms_and_prevents_scrolling() {
		let (mut ctl, mut state) = fixture();
		let handled = ctl.wheel(
			&mut state,
			WheelInput {
				delta_x: 0.0,
				delta_y: -100.0,
				position: Point::new(0.0, 0.0),
				shift: false,
			},
		);
		assert!(handled.prevents_default());
		assert!((state.transform.scale - 1.2).abs() < 1e-9);
	}

	#[test]
	fn escape_clears_selection() {
		let (mut ctl, mut state) = fixture();
		state.select_node(Some(1));
		let handled = ctl.key_down(&mut state, "Escape", false);
		assert_eq!(handled, Handled::Ignored);
		assert_eq!(state.interaction.selected_node_id, None);
	}

	#[test]
	fn plus_and_minus_keys_zoom_about_the_viewport_center() {
		let (mut ctl, mut state) = fixture();
		assert!(ctl.key_down(&mut state, "+", false).prevents_default());
		assert!((state.transform.scale - 1.2).abs() < 1e-9);
		assert!(ctl.key_down(&mut state, "=", true).prevents_default());
		assert!((state.transform.scale - 1.44).abs() < 1e-9);
		let center = state.transform.screen_to_world(Point::new(400.0, 300.0));
		assert!((center.x - 400.0).abs() < 1e-9 && (center.y - 300.0).abs() < 1e-9);

		assert!(ctl.key_down(&mut state, "-", false).prevents_default());
		assert!(ctl.key_down(&mut state, "_", false).prevents_default());
		assert!((state.transform.scale - 1.0).abs() < 1e-9);

		for _ in 0..30 {
			let _ = ctl.key_down(&mut state, "-", true);
		}
		assert_eq!(state.transform.scale, 0.1);
		assert_eq!(ctl.key_down(&mut state, "a", false), Handled::Ignored);
	}

	#[test]
	fn fullscreen_follows_platform_reports() {
		let (mut ctl, mut state) = fixture();
		assert_eq!(ctl.toggle_fullscreen(&state), FullscreenRequest::Enter);
		// Requesting alone changes nothing.
		assert!(!state.interaction.is_fullscreen);
		ctl.fullscreen_changed(&mut state, true);
		assert_eq!(ctl.toggle_fullscreen(&state), FullscreenRequest::Exit);
		ctl.fullscreen_changed(&mut state, false);
		assert!(!state.interaction.is_fullscreen);
	}

	#[test]
	fn hover_and_leave() {
		let (mut ctl, mut state) = fixture();
		assert_eq!(ctl.pointer_move(&mut state, Point::new(101.0, 99.0)), Handled::Ignored);
		assert_eq!(state.interaction.hovered_node_id, Some(1));
		assert_eq!(ctl.cursor(&state), "pointer");

		let _ = ctl.pointer_down(&mut state, Point::new(101.0, 99.0), PointerButton::Primary, 0.0);
		ctl.pointer_leave(&mut state);
		assert_eq!(ctl.gesture(), Gesture::Idle);
		assert_eq!(state.interaction.hovered_node_id, None);
		assert!(!state.simulation().unwrap().is_pinned(1));
	}

	#[test]
	fn toolbar_actions() {
		let (mut ctl, mut state) = fixture();
		ctl.zoom_in(&mut state);
		assert!((state.transform.scale - 1.2).abs() < 1e-9);
		// Viewport center stays put.
		let center = state.transform.screen_to_world(Point::new(400.0, 300.0));
		assert!((center.x - 400.0).abs() < 1e-9);
		ctl.zoom_out(&mut state);
		ctl.center_view(&mut state);
		assert_eq!(state.transform, crate::components::force_graph::transform::Transform::IDENTITY);
	}
}
