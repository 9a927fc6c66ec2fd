use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::state::{GraphState, NodeView};
use super::types::NodeId;

const BACKGROUND: &str = "#111827";
const EMPTY_TEXT: &str = "No relationships yet";
const SEARCH_MISS_ALPHA: f64 = 0.3;
const FILTERED_EDGE_ALPHA: f64 = 0.2;

/// Node ids drawn at full strength while something is hovered or selected.
struct Focus {
	active: bool,
	ids: HashSet<NodeId>,
}

impl Focus {
	fn from_state(state: &GraphState) -> Self {
		let roots = [
			state.interaction.hovered_node_id,
			state.interaction.selected_node_id,
		];
		let mut ids: HashSet<NodeId> = roots.iter().flatten().copied().collect();
		for edge in state.edges() {
			if roots.contains(&Some(edge.source_id)) || roots.contains(&Some(edge.target_id)) {
				ids.insert(edge.source_id);
				ids.insert(edge.target_id);
			}
		}
		Self {
			active: !ids.is_empty(),
			ids,
		}
	}

	fn node_alpha(&self, node: &NodeView<'_>) -> f64 {
		if node.dimmed {
			SEARCH_MISS_ALPHA
		} else if !self.active || self.ids.contains(&node.id) {
			0.8
		} else {
			0.3
		}
	}

	fn edge_alpha(&self, highlighted: bool, filtered: bool) -> f64 {
		match (filtered, self.active, highlighted) {
			(true, ..) => FILTERED_EDGE_ALPHA,
			(false, false, _) => 0.6,
			(false, true, true) => 0.8,
			(false, true, false) => 0.2,
		}
	}
}

/// Avatar images by URL. Loading is left to the browser; a node falls back
/// to its initials until its image has decoded.
#[derive(Default)]
pub struct Avatars {
	images: HashMap<String, HtmlImageElement>,
}

enum Avatar<'a> {
	Ready(&'a HtmlImageElement),
	Loading,
	Missing,
}

impl Avatars {
	/// Starts the download on first sight of `src`.
	fn get(&mut self, src: &str) -> Avatar<'_> {
		if !self.images.contains_key(src) {
			let Ok(image) = HtmlImageElement::new() else {
				return Avatar::Missing;
			};
			image.set_src(src);
			debug!("loading avatar {src}");
			self.images.insert(src.to_owned(), image);
		}
		match self.images.get(src) {
			Some(image) if !image.complete() => Avatar::Loading,
			// Broken or empty image.
			Some(image) if image.natural_width() == 0 => Avatar::Missing,
			Some(image) => Avatar::Ready(image),
			None => Avatar::Missing,
		}
	}
}

/// Draws one frame. Returns whether an avatar is still loading, in which
/// case another frame is due.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, avatars: &mut Avatars) -> bool {
	let bounds = state.bounds();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, bounds.width, bounds.height);

	if state.nodes().is_empty() {
		ctx.set_fill_style_str("rgba(229, 231, 235, 0.8)");
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let center = bounds.center();
		let _ = ctx.fill_text(EMPTY_TEXT, center.x, center.y);
		return false;
	}

	let focus = Focus::from_state(state);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.scale, state.transform.scale);
	draw_edges(state, ctx, &focus);
	let loading = draw_nodes(state, ctx, &focus, avatars);
	ctx.restore();
	ctx.set_global_alpha(1.0);
	loading
}

fn draw_edges(state: &GraphState, ctx: &CanvasRenderingContext2d, focus: &Focus) {
	let k = state.transform.scale;
	let show_labels = state.filter().show_labels;
	ctx.set_line_width(1.5 / k);
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

	for edge in state.edge_views() {
		ctx.set_global_alpha(focus.edge_alpha(edge.highlighted, edge.filtered));
		ctx.set_stroke_style_str(edge.color);
		ctx.begin_path();
		ctx.move_to(edge.source.x, edge.source.y);
		ctx.line_to(edge.target.x, edge.target.y);
		ctx.stroke();

		if show_labels && edge.highlighted && !edge.filtered {
			let mid = edge.source.midpoint(edge.target);
			ctx.set_fill_style_str(edge.color);
			let _ = ctx.fill_text(edge.type_name, mid.x, mid.y - 5.0 / k);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	focus: &Focus,
	avatars: &mut Avatars,
) -> bool {
	let k = state.transform.scale;
	let show_labels = state.filter().show_labels;
	let mut loading = false;

	for node in state.node_views() {
		let (x, y, radius) = (node.x, node.y, node.radius);

		if node.hovered {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, radius * 2.2) {
				let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.35)");
				let _ = gradient.add_color_stop(0.6, "rgba(200, 220, 255, 0.1)");
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, radius * 2.2, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		let alpha = focus.node_alpha(&node);
		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.color);
		ctx.fill();

		if node.selected {
			ctx.set_stroke_style_str("#ffffff");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		} else if node.pinned {
			let dash = 3.0 / k;
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(dash),
			));
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
			ctx.set_line_width(1.0 / k);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		let avatar = match node.avatar {
			Some(src) => avatars.get(src),
			None => Avatar::Missing,
		};
		if let Avatar::Ready(image) = avatar {
			ctx.save();
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius - 1.0 / k, 0.0, 2.0 * PI);
			ctx.clip();
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				image,
				x - radius,
				y - radius,
				radius * 2.0,
				radius * 2.0,
			);
			ctx.restore();
		} else {
			loading |= matches!(avatar, Avatar::Loading);
			// Initials inside the circle.
			ctx.set_global_alpha(if node.dimmed { alpha } else { 1.0 });
			ctx.set_fill_style_str("white");
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			ctx.set_font(&format!("{}px sans-serif", (radius * 0.8).min(12.0)));
			let initials: String = node.label.chars().take(2).collect();
			let _ = ctx.fill_text(&initials, x, y);
		}

		if show_labels {
			ctx.set_global_alpha(alpha);
			ctx.set_fill_style_str("rgba(229, 231, 235, 1)");
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
			let _ = ctx.fill_text(node.label, x, y + radius + 12.0);
		}
	}
	ctx.set_global_alpha(1.0);
	loading
}
