use std::collections::{HashMap, HashSet};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::{debug, info, warn};

use super::config::GraphConfig;
use super::error::GraphError;
use super::simulation::{Lcg, Simulation};
use super::transform::Transform;
use super::types::{
	Bounds, GraphData, GraphEdge, GraphNode, NodeId, Point, RelationshipType,
};

const COLORS: &[&str] = &[
	"#1E88E5", "#E53935", "#43A047", "#FB8C00", "#8E24AA", "#00ACC1", "#F9A825", "#5E35B1",
	"#3949AB", "#00897B",
];

/// Shown for relationships whose type id is not in the registry.
pub const UNKNOWN_TYPE_NAME: &str = "Unknown";
/// Stroke color for relationships of an unregistered type.
pub const UNKNOWN_TYPE_COLOR: &str = "#94a3b8";

/// Palette color for a character, stable for its id.
pub fn node_color(id: NodeId) -> &'static str {
	COLORS[id.rem_euclid(COLORS.len() as i64) as usize]
}

/// Toolbar mode deciding what a primary drag does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
	/// Drag nodes, pan on the background.
	#[default]
	Default,
	/// Every primary drag pans; nodes cannot be dragged.
	Pan,
	/// Background drags do nothing; zoom gestures and node drags still work.
	Zoom,
}

impl InteractionMode {
	/// Whether dragging empty canvas moves the view.
	pub fn allows_background_pan(self) -> bool {
		self != InteractionMode::Zoom
	}

	/// Whether a press on a node picks it up.
	pub fn allows_node_drag(self) -> bool {
		self != InteractionMode::Pan
	}

	/// Whether two fingers zoom.
	pub fn allows_pinch(self) -> bool {
		self != InteractionMode::Pan
	}
}

/// Observable input state of one view. Reset on every reload except for
/// `is_fullscreen`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	/// Current toolbar mode.
	pub mode: InteractionMode,
	/// Character picked by the last click or tap.
	pub selected_node_id: Option<NodeId>,
	/// Character held by a drag, if any.
	pub dragged_node_id: Option<NodeId>,
	/// Character under the mouse.
	pub hovered_node_id: Option<NodeId>,
	/// Explicit pan override (Space held).
	pub is_panning: bool,
	/// A pan or node drag is in progress.
	pub is_actively_dragging: bool,
	/// Last pointer or touch position seen, in screen space.
	pub last_pointer_pos: Point,
	/// Mirrors what the platform last reported.
	pub is_fullscreen: bool,
}

/// Where the layout engine stands.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationStatus {
	/// No nodes, nothing to simulate.
	Empty,
	/// Still moving; the frame loop keeps ticking.
	Running,
	/// Cooled below the stop threshold.
	Settled,
	/// Construction failed; nodes stay where they were seeded.
	Unavailable(GraphError),
}

/// Display-only narrowing of the graph. Never touches the layout, and
/// survives reloads.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewFilter {
	/// Name query. Blank leaves every node at full strength.
	pub search: String,
	/// Relationship types whose edges are faded out.
	pub hidden_types: HashSet<i64>,
	/// Whether names and relationship labels are drawn.
	pub show_labels: bool,
}

impl Default for ViewFilter {
	fn default() -> Self {
		Self {
			search: String::new(),
			hidden_types: HashSet::new(),
			show_labels: true,
		}
	}
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
	matcher
		.fuzzy_match(text, query)
		.or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// What the renderer needs per node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView<'a> {
	pub id: NodeId,
	pub label: &'a str,
	pub avatar: Option<&'a str>,
	pub color: &'a str,
	pub degree: usize,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub selected: bool,
	pub hovered: bool,
	pub pinned: bool,
	/// A name search is active and this node does not match it.
	pub dimmed: bool,
}

/// An edge with its endpoints resolved to current positions.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView<'a> {
	pub id: &'a str,
	pub color: &'a str,
	pub type_name: &'a str,
	pub source: Point,
	pub target: Point,
	pub highlighted: bool,
	/// The relationship type is filtered out.
	pub filtered: bool,
}

/// Single owner of the node/edge working set, viewport transform and
/// interaction state for one graph view.
pub struct GraphState {
	/// Viewport pan and zoom.
	pub transform: Transform,
	/// Selection, hover, mode and drag flags.
	pub interaction: InteractionState,
	filter: ViewFilter,
	/// `None` while the search is blank.
	search_matches: Option<HashSet<NodeId>>,
	config: GraphConfig,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	index_by_id: HashMap<NodeId, usize>,
	simulation: Option<Simulation>,
	unavailable: Option<GraphError>,
	bounds: Bounds,
	rng: Lcg,
	dirty: bool,
}

impl GraphState {
	/// An empty store for a viewport of `bounds`.
	pub fn new(config: GraphConfig, bounds: Bounds) -> Self {
		Self {
			transform: Transform::IDENTITY,
			interaction: InteractionState::default(),
			filter: ViewFilter::default(),
			search_matches: None,
			config,
			nodes: Vec::new(),
			edges: Vec::new(),
			index_by_id: HashMap::new(),
			simulation: None,
			unavailable: None,
			bounds,
			rng: Lcg::new(0x5eed),
			dirty: true,
		}
	}

	/// Replaces the working set and rebuilds the simulation. Nodes whose id
	/// survives keep their position.
	pub fn load(&mut self, data: &GraphData) {
		let previous = self
			.nodes
			.iter()
			.map(|node| (node.id, node.position()))
			.collect::<HashMap<_, _>>();

		let mut nodes = Vec::with_capacity(data.characters.len());
		let mut index_by_id = HashMap::with_capacity(data.characters.len());
		for character in &data.characters {
			if index_by_id.contains_key(&character.id) {
				warn!("duplicate character id {}, keeping the first", character.id);
				continue;
			}
			let position = match previous.get(&character.id) {
				Some(&position) => position,
				None => self.seed_position(),
			};
			index_by_id.insert(character.id, nodes.len());
			nodes.push(GraphNode {
				id: character.id,
				label: character.name.clone(),
				avatar: character.avatar.clone(),
				color: node_color(character.id).to_owned(),
				degree: 0,
				x: position.x,
				y: position.y,
				vx: 0.0,
				vy: 0.0,
				pinned: false,
			});
		}

		let types = data
			.relationship_types
			.iter()
			.map(|kind| (kind.id, kind))
			.collect::<HashMap<i64, &RelationshipType>>();

		let mut edges = Vec::with_capacity(data.relationships.len());
		for (index, relationship) in data.relationships.iter().enumerate() {
			let (source, target) = (
				index_by_id.get(&relationship.source_id),
				index_by_id.get(&relationship.target_id),
			);
			let (Some(&source), Some(&target)) = (source, target) else {
				debug!(
					"dropping relationship {} -> {}: endpoint not loaded",
					relationship.source_id, relationship.target_id
				);
				continue;
			};
			nodes[source].degree += 1;
			nodes[target].degree += 1;

			let kind = types.get(&relationship.type_id);
			edges.push(GraphEdge {
				id: match relationship.id {
					Some(id) => format!("rel-{id}"),
					None => format!(
						"rel-{index}-{}-{}",
						relationship.source_id, relationship.target_id
					),
				},
				source_id: relationship.source_id,
				target_id: relationship.target_id,
				type_id: relationship.type_id,
				type_name: kind.map_or(UNKNOWN_TYPE_NAME, |kind| kind.name.as_str()).to_owned(),
				color: kind.map_or(UNKNOWN_TYPE_COLOR, |kind| kind.color.as_str()).to_owned(),
				description: relationship.description.clone(),
			});
		}

		self.nodes = nodes;
		self.edges = edges;
		self.index_by_id = index_by_id;
		self.interaction = InteractionState {
			is_fullscreen: self.interaction.is_fullscreen,
			..InteractionState::default()
		};
		self.refresh_search();
		self.rebuild_simulation();
		info!(
			"graph loaded: {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
	}

	fn seed_position(&mut self) -> Point {
		let spread = self.config.node.seed_spread;
		let center = if self.bounds.is_usable() {
			self.bounds.center()
		} else {
			Point::default()
		};
		let mut x = center.x + (self.rng.next_f64() - 0.5) * spread;
		let mut y = center.y + (self.rng.next_f64() - 0.5) * spread;
		if self.bounds.is_usable() {
			x = x.clamp(0.0, self.bounds.width);
			y = y.clamp(0.0, self.bounds.height);
		}
		Point::new(x, y)
	}

	/// Structural changes always go through here: the old solver is dropped,
	/// never patched.
	fn rebuild_simulation(&mut self) {
		self.simulation = None;
		self.unavailable = None;
		self.dirty = true;
		if self.nodes.is_empty() {
			return;
		}

		match Simulation::new(
			&self.nodes,
			&self.edges,
			self.bounds,
			self.config.simulation,
		) {
			Ok(simulation) => self.simulation = Some(simulation),
			Err(err) => {
				warn!("simulation unavailable, keeping static layout: {err}");
				self.unavailable = Some(err);
			}
		}
	}

	/// Advances the simulation one step and copies positions back. Returns
	/// whether anything moved.
	pub fn tick(&mut self) -> bool {
		let Some(simulation) = self.simulation.as_mut() else {
			return false;
		};
		if !simulation.tick() {
			return false;
		}
		for (node, body) in self.nodes.iter_mut().zip(simulation.bodies()) {
			debug_assert_eq!(node.id, body.id);
			node.x = body.x;
			node.y = body.y;
			node.vx = body.vx;
			node.vy = body.vy;
		}
		self.dirty = true;
		true
	}

	/// Where the layout engine stands.
	pub fn status(&self) -> SimulationStatus {
		if let Some(err) = &self.unavailable {
			return SimulationStatus::Unavailable(err.clone());
		}
		match &self.simulation {
			None => SimulationStatus::Empty,
			Some(simulation) if simulation.is_running() => SimulationStatus::Running,
			Some(_) => SimulationStatus::Settled,
		}
	}

	/// Whether the frame loop should keep ticking.
	pub fn is_animating(&self) -> bool {
		self.simulation.as_ref().is_some_and(Simulation::is_running)
	}

	/// Halts the tick loop without touching positions.
	pub fn stop(&mut self) {
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.stop();
		}
	}

	/// The live solver, absent for an empty graph or an unusable viewport.
	pub fn simulation(&self) -> Option<&Simulation> {
		self.simulation.as_ref()
	}

	/// Tunables this store was built with.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Current viewport size.
	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Working-set nodes in load order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Working-set edges; both endpoints of each are loaded.
	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	/// Looks a node up by id.
	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.index_by_id.get(&id).map(|&index| &self.nodes[index])
	}

	/// The selected node, if it is still loaded.
	pub fn selected_node(&self) -> Option<&GraphNode> {
		self.interaction
			.selected_node_id
			.and_then(|id| self.node(id))
	}

	/// Selects `id`, or clears the selection with `None`. Unknown ids are
	/// ignored. Returns whether the selection changed.
	pub fn select_node(&mut self, id: Option<NodeId>) -> bool {
		if id.is_some_and(|id| !self.index_by_id.contains_key(&id)) {
			return false;
		}
		if self.interaction.selected_node_id == id {
			return false;
		}
		self.interaction.selected_node_id = id;
		self.dirty = true;
		true
	}

	/// Sets the hovered node; a no-op when nothing changed.
	pub fn set_hovered(&mut self, id: Option<NodeId>) {
		if self.interaction.hovered_node_id != id {
			self.interaction.hovered_node_id = id;
			self.dirty = true;
		}
	}

	/// Topmost node whose hit area contains the screen point.
	pub fn node_at(&self, screen: Point) -> Option<NodeId> {
		let world = self.transform.screen_to_world(screen);
		let style = &self.config.node;
		self.nodes
			.iter()
			.filter_map(|node| {
				let distance = node.position().distance(world);
				(distance <= style.hit_radius(node.degree)).then_some((node.id, distance))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id)
	}

	/// Keeps the solver hot for the duration of a drag.
	pub fn heat(&mut self) {
		if let Some(simulation) = self.simulation.as_mut() {
			let drag_alpha = simulation.params().drag_alpha;
			simulation.set_alpha_target(drag_alpha);
			simulation.restart();
		}
	}

	/// Lets the solver cool down to rest.
	pub fn cool(&mut self) {
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.set_alpha_target(0.0);
		}
	}

	/// Fixes a node at world coordinates. Without a simulation the node is
	/// simply moved.
	pub fn pin_node(&mut self, id: NodeId, world: Point) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		let node = &mut self.nodes[index];
		node.x = world.x;
		node.y = world.y;
		node.vx = 0.0;
		node.vy = 0.0;
		node.pinned = true;
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.pin(id, world);
		}
		self.dirty = true;
		true
	}

	/// Hands a pinned node back to the forces.
	pub fn unpin_node(&mut self, id: NodeId) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		self.nodes[index].pinned = false;
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.unpin(id);
		}
		true
	}

	/// New viewport size. Re-centers and reheats a live simulation, or builds
	/// one if the previous size was unusable.
	pub fn resize(&mut self, bounds: Bounds) {
		if self.bounds == bounds {
			return;
		}
		self.bounds = bounds;
		self.dirty = true;
		match self.simulation.as_mut() {
			Some(simulation) if bounds.is_usable() => {
				let drag_alpha = simulation.params().drag_alpha;
				simulation.set_center(bounds.center());
				simulation.reheat(drag_alpha);
			}
			Some(_) => {}
			None if !self.nodes.is_empty() => self.rebuild_simulation(),
			None => {}
		}
	}

	/// Drops a node and its incident edges.
	pub fn remove_node(&mut self, id: NodeId) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		self.nodes.remove(index);
		let removed = self
			.edges
			.iter()
			.filter(|edge| edge.source_id == id || edge.target_id == id)
			.map(|edge| edge.id.clone())
			.collect::<HashSet<_>>();
		self.drop_edges(&removed);
		self.reindex();

		let interaction = &mut self.interaction;
		if interaction.selected_node_id == Some(id) {
			interaction.selected_node_id = None;
		}
		if interaction.hovered_node_id == Some(id) {
			interaction.hovered_node_id = None;
		}
		if interaction.dragged_node_id == Some(id) {
			interaction.dragged_node_id = None;
			interaction.is_actively_dragging = false;
		}
		self.rebuild_simulation();
		debug!("node {id} removed");
		true
	}

	/// Drops one edge by its `rel-` id and rebuilds the solver.
	pub fn remove_edge(&mut self, edge_id: &str) -> bool {
		if !self.edges.iter().any(|edge| edge.id == edge_id) {
			return false;
		}
		self.drop_edges(&HashSet::from([edge_id.to_owned()]));
		self.rebuild_simulation();
		true
	}

	/// Active search, type filter and label toggle.
	pub fn filter(&self) -> &ViewFilter {
		&self.filter
	}

	/// Sets the name query and works out which nodes match it.
	pub fn set_search(&mut self, query: &str) {
		if self.filter.search == query {
			return;
		}
		self.filter.search = query.to_owned();
		self.refresh_search();
		self.dirty = true;
	}

	fn refresh_search(&mut self) {
		let query = self.filter.search.trim();
		self.search_matches = (!query.is_empty()).then(|| {
			let matcher = SkimMatcherV2::default();
			self.nodes
				.iter()
				.filter(|node| fuzzy_match_score(&matcher, &node.label, query).is_some())
				.map(|node| node.id)
				.collect()
		});
	}

	/// Whether `id` passes the name search. Everything passes a blank one.
	pub fn matches_search(&self, id: NodeId) -> bool {
		self.search_matches
			.as_ref()
			.is_none_or(|matches| matches.contains(&id))
	}

	/// Fades a relationship type out, or back in. Returns whether it is now
	/// filtered.
	pub fn toggle_relationship_type(&mut self, type_id: i64) -> bool {
		let hidden = !self.filter.hidden_types.remove(&type_id);
		if hidden {
			self.filter.hidden_types.insert(type_id);
		}
		self.dirty = true;
		hidden
	}

	/// Shows or hides names and relationship labels.
	pub fn set_show_labels(&mut self, show: bool) {
		if self.filter.show_labels != show {
			self.filter.show_labels = show;
			self.dirty = true;
		}
	}

	fn drop_edges(&mut self, ids: &HashSet<String>) {
		let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
			.into_iter()
			.partition(|edge| ids.contains(&edge.id));
		self.edges = kept;
		for edge in removed {
			for endpoint in [edge.source_id, edge.target_id] {
				if let Some(node) = self.nodes.iter_mut().find(|node| node.id == endpoint) {
					node.degree = node.degree.saturating_sub(1);
				}
			}
		}
	}

	fn reindex(&mut self) {
		self.index_by_id = self
			.nodes
			.iter()
			.enumerate()
			.map(|(index, node)| (node.id, index))
			.collect();
	}

	/// Per-node draw data in load order.
	pub fn node_views(&self) -> impl Iterator<Item = NodeView<'_>> {
		let style = &self.config.node;
		let interaction = &self.interaction;
		self.nodes.iter().map(move |node| NodeView {
			id: node.id,
			label: &node.label,
			avatar: node.avatar.as_deref(),
			color: &node.color,
			degree: node.degree,
			x: node.x,
			y: node.y,
			radius: style.radius(node.degree),
			selected: interaction.selected_node_id == Some(node.id),
			hovered: interaction.hovered_node_id == Some(node.id),
			pinned: node.pinned,
			dimmed: !self.matches_search(node.id),
		})
	}

	/// Per-edge draw data with endpoints resolved to current positions.
	pub fn edge_views(&self) -> impl Iterator<Item = EdgeView<'_>> {
		let focus = [
			self.interaction.hovered_node_id,
			self.interaction.selected_node_id,
		];
		self.edges.iter().filter_map(move |edge| {
			let source = self.node(edge.source_id)?.position();
			let target = self.node(edge.target_id)?.position();
			Some(EdgeView {
				id: &edge.id,
				color: &edge.color,
				type_name: &edge.type_name,
				source,
				target,
				highlighted: focus
					.iter()
					.flatten()
					.any(|&id| id == edge.source_id || id == edge.target_id),
				filtered: self.filter.hidden_types.contains(&edge.type_id),
			})
		})
	}

	/// Requests a redraw on the next frame.
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Whether a redraw is due; clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{CharacterRecord, RelationshipRecord};

	fn character(id: NodeId, name: &str) -> CharacterRecord {
		CharacterRecord {
			id,
			name: name.into(),
			avatar: None,
		}
	}

	fn relationship(id: Option<i64>, source_id: NodeId, target_id: NodeId) -> RelationshipRecord {
		RelationshipRecord {
			id,
			source_id,
			target_id,
			type_id: 10,
			description: None,
		}
	}

	fn data(characters: Vec<CharacterRecord>, relationships: Vec<RelationshipRecord>) -> GraphData {
		GraphData {
			characters,
			relationships,
			relationship_types: vec![RelationshipType {
				id: 10,
				name: "ally".into(),
				color: "#22c55e".into(),
			}],
		}
	}

	fn loaded(data: &GraphData) -> GraphState {
		let mut state = GraphState::new(GraphConfig::default(), Bounds::new(800.0, 600.0));
		state.load(data);
		state
	}

	#[test]
	fn dangling_edges_never_reach_the_simulation() {
		let state = loaded(&data(
			vec![character(1, "A"), character(2, "B")],
			vec![relationship(Some(1), 1, 2), relationship(Some(2), 1, 99)],
		));
		assert_eq!(state.edges().len(), 1);
		assert_eq!(state.simulation().unwrap().link_count(), 1);
		assert_eq!(state.node(1).unwrap().degree, 1);
		assert_eq!(state.node(2).unwrap().degree, 1);
	}

	#[test]
	fn edges_get_stable_ids_and_type_metadata() {
		let mut input = data(
			vec![character(1, "A"), character(2, "B")],
			vec![relationship(Some(7), 1, 2), relationship(None, 2, 1)],
		);
		input.relationships[1].type_id = 404;
		let state = loaded(&input);

		let edges = state.edges();
		assert_eq!(edges[0].id, "rel-7");
		assert_eq!(edges[0].type_name, "ally");
		assert_eq!(edges[0].color, "#22c55e");
		assert_eq!(edges[1].id, "rel-1-2-1");
		assert_eq!(edges[1].type_name, UNKNOWN_TYPE_NAME);
		assert_eq!(edges[1].color, UNKNOWN_TYPE_COLOR);
	}

	#[test]
	fn nodes_are_seeded_near_center_and_colored_by_id() {
		let state = loaded(&data(
			vec![character(3, "C"), character(13, "M"), character(-1, "Z")],
			vec![],
		));
		for node in state.nodes() {
			assert!((node.x - 400.0).abs() <= 50.0);
			assert!((node.y - 300.0).abs() <= 50.0);
		}
		assert_eq!(state.node(3).unwrap().color, state.node(13).unwrap().color);
		assert_eq!(state.node(-1).unwrap().color, node_color(9));
	}

	#[test]
	fn duplicate_characters_keep_the_first() {
		let state = loaded(&data(vec![character(1, "A"), character(1, "A2")], vec![]));
		assert_eq!(state.nodes().len(), 1);
		assert_eq!(state.node(1).unwrap().label, "A");
		assert_eq!(state.status(), SimulationStatus::Running);
	}

	#[test]
	fn reload_keeps_surviving_positions_and_resets_interaction() {
		let mut state = loaded(&data(vec![character(1, "A"), character(2, "B")], vec![]));
		state.pin_node(1, Point::new(42.0, 24.0));
		state.unpin_node(1);
		state.select_node(Some(2));
		state.interaction.is_fullscreen = true;
		state.interaction.mode = InteractionMode::Pan;

		state.load(&data(vec![character(1, "A"), character(3, "C")], vec![]));
		assert_eq!(state.node(1).unwrap().position(), Point::new(42.0, 24.0));
		assert!(state.node(2).is_none());
		assert_eq!(state.interaction.selected_node_id, None);
		assert_eq!(state.interaction.mode, InteractionMode::Default);
		assert!(state.interaction.is_fullscreen);
	}

	#[test]
	fn empty_graph_has_no_simulation() {
		let mut state = loaded(&GraphData::default());
		assert_eq!(state.status(), SimulationStatus::Empty);
		assert!(!state.tick());
		assert!(state.node_at(Point::new(400.0, 300.0)).is_none());
	}

	#[test]
	fn unusable_viewport_falls_back_to_static_layout() {
		let mut state = GraphState::new(GraphConfig::default(), Bounds::new(0.0, 0.0));
		state.load(&data(vec![character(1, "A"), character(2, "B")], vec![]));
		assert!(matches!(
			state.status(),
			SimulationStatus::Unavailable(GraphError::InvalidBounds { .. })
		));
		let before = state.nodes().to_vec();
		assert!(!state.tick());
		assert_eq!(state.nodes(), before.as_slice());

		// Dragging still moves nodes without a solver.
		assert!(state.pin_node(1, Point::new(5.0, 5.0)));
		assert_eq!(state.node(1).unwrap().position(), Point::new(5.0, 5.0));
		state.unpin_node(1);

		state.resize(Bounds::new(800.0, 600.0));
		assert_eq!(state.status(), SimulationStatus::Running);
		assert!(state.tick());
	}

	#[test]
	fn tick_writes_positions_back() {
		let mut state = loaded(&data(
			vec![character(1, "A"), character(2, "B")],
			vec![relationship(Some(1), 1, 2)],
		));
		let before = state.node(1).unwrap().position();
		assert!(state.tick());
		assert_ne!(state.node(1).unwrap().position(), before);
		assert!(state.take_dirty());
		assert!(!state.take_dirty());
	}

	#[test]
	fn removing_a_node_clears_selection_and_incident_edges() {
		let mut state = loaded(&data(
			vec![character(1, "A"), character(2, "B"), character(3, "C")],
			vec![relationship(Some(1), 1, 2), relationship(Some(2), 2, 3)],
		));
		assert!(state.select_node(Some(2)));
		assert!(state.remove_node(2));
		assert_eq!(state.interaction.selected_node_id, None);
		assert!(state.edges().is_empty());
		assert_eq!(state.node(1).unwrap().degree, 0);
		assert_eq!(state.simulation().unwrap().len(), 2);
		assert_eq!(state.simulation().unwrap().link_count(), 0);
		assert!(!state.remove_node(2));
	}

	#[test]
	fn removing_an_edge_updates_degree() {
		let mut state = loaded(&data(
			vec![character(1, "A"), character(2, "B")],
			vec![relationship(Some(5), 1, 2)],
		));
		assert!(state.remove_edge("rel-5"));
		assert!(!state.remove_edge("rel-5"));
		assert_eq!(state.node(2).unwrap().degree, 0);
		assert_eq!(state.simulation().unwrap().link_count(), 0);
	}

	#[test]
	fn selection_ignores_unknown_ids() {
		let mut state = loaded(&data(vec![character(1, "A")], vec![]));
		assert!(!state.select_node(Some(77)));
		assert!(state.select_node(Some(1)));
		assert_eq!(state.selected_node().unwrap().label, "A");
		assert!(state.select_node(None));
		assert!(state.selected_node().is_none());
	}

	#[test]
	fn hit_testing_goes_through_the_transform() {
		let mut state = loaded(&data(vec![character(1, "A")], vec![]));
		state.pin_node(1, Point::new(100.0, 100.0));
		state.transform.zoom_at_point(2.0, Point::new(0.0, 0.0));
		state.transform.pan(10.0, 0.0);
		// World (100, 100) is at screen (210, 200).
		assert_eq!(state.node_at(Point::new(210.0, 200.0)), Some(1));
		// Hit radius is 26 world units, 52 screen pixels at scale 2.
		assert_eq!(state.node_at(Point::new(260.0, 200.0)), Some(1));
		assert_eq!(state.node_at(Point::new(265.0, 200.0)), None);
	}

	#[test]
	fn edge_views_resolve_positions_and_highlight_focus() {
		let mut state = loaded(&data(
			vec![character(1, "A"), character(2, "B"), character(3, "C")],
			vec![relationship(Some(1), 1, 2), relationship(Some(2), 2, 3)],
		));
		state.pin_node(1, Point::new(10.0, 20.0));
		state.set_hovered(Some(1));
		let views = state.edge_views().collect::<Vec<_>>();
		assert_eq!(views.len(), 2);
		assert_eq!(views[0].source, Point::new(10.0, 20.0));
		assert!(views[0].highlighted);
		assert!(!views[1].highlighted);

		let node = state.node_views().find(|view| view.id == 1).unwrap();
		assert!(node.hovered && node.pinned && !node.selected);
		assert!((node.radius - 13.2).abs() < 1e-9);
	}

	#[test]
	fn name_search_dims_everything_else() {
		let mut state = loaded(&data(
			vec![character(1, "Ada"), character(2, "Bastian"), character(3, "Corin")],
			vec![relationship(Some(1), 1, 2)],
		));
		assert!(state.node_views().all(|view| !view.dimmed));

		state.take_dirty();
		state.set_search("bsn");
		assert!(state.take_dirty());
		let dimmed = state
			.node_views()
			.filter(|view| view.dimmed)
			.map(|view| view.id)
			.collect::<Vec<_>>();
		assert_eq!(dimmed, vec![1, 3]);

		// Upper-case queries still find lower-case letters.
		state.set_search("ADA");
		assert!(state.matches_search(1));
		assert!(!state.matches_search(2));

		state.set_search("   ");
		assert!(state.node_views().all(|view| !view.dimmed));
	}

	#[test]
	fn search_and_filters_survive_reload() {
		let mut state = loaded(&data(vec![character(1, "Ada")], vec![]));
		state.set_search("ada");
		state.toggle_relationship_type(10);
		state.set_show_labels(false);

		state.load(&data(
			vec![character(1, "Ada"), character(2, "Adalbert"), character(3, "Greta")],
			vec![relationship(Some(1), 2, 3)],
		));
		assert_eq!(state.filter().search, "ada");
		assert!(!state.filter().show_labels);
		assert!(state.matches_search(2));
		assert!(!state.matches_search(3));
		assert!(state.edge_views().all(|view| view.filtered));
	}

	#[test]
	fn type_filter_fades_only_its_edges() {
		let mut input = data(
			vec![character(1, "A"), character(2, "B"), character(3, "C")],
			vec![relationship(Some(1), 1, 2), relationship(Some(2), 2, 3)],
		);
		input.relationships[1].type_id = 20;
		let mut state = loaded(&input);

		assert!(state.toggle_relationship_type(20));
		let filtered = state
			.edge_views()
			.map(|view| (view.id, view.filtered))
			.collect::<Vec<_>>();
		assert_eq!(filtered, vec![("rel-1", false), ("rel-2", true)]);
		// Layout is untouched.
		assert_eq!(state.simulation().unwrap().link_count(), 2);

		assert!(!state.toggle_relationship_type(20));
		assert!(state.edge_views().all(|view| !view.filtered));
	}

	#[test]
	fn labels_toggle_requests_a_redraw_only_on_change() {
		let mut state = loaded(&data(vec![character(1, "A")], vec![]));
		assert!(state.filter().show_labels);
		state.take_dirty();
		state.set_show_labels(true);
		assert!(!state.take_dirty());
		state.set_show_labels(false);
		assert!(state.take_dirty());
		assert!(!state.filter().show_labels);
	}

	#[test]
	fn resize_recenters_and_reheats() {
		let mut state = loaded(&data(vec![character(1, "A"), character(2, "B")], vec![]));
		while state.tick() {}
		assert_eq!(state.status(), SimulationStatus::Settled);
		state.resize(Bounds::new(1000.0, 1000.0));
		assert_eq!(state.status(), SimulationStatus::Running);
		assert_eq!(
			state.simulation().unwrap().center(),
			Point::new(500.0, 500.0)
		);
	}
}
