//! Force simulation driven by an energy scalar ("alpha") that cools
//! geometrically each tick.
//!
//! Four forces run per tick, in this order: many-body repulsion, centering,
//! collision and link springs. Repulsion and springs scale with alpha,
//! collision does not, so overlaps keep being resolved while the layout
//! settles. Fixed (pinned) nodes take part in every force but are put back
//! on their pin after integration.

use std::collections::HashMap;

use log::debug;

use super::error::GraphError;
use super::types::{Bounds, GraphEdge, GraphNode, NodeId, Point};

/// Force strengths and cooling schedule. `Default` is the stock layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
	/// Negative values repel.
	pub charge_strength: f64,
	/// Distances below this are softened in the repulsion term.
	pub charge_distance_min: f64,
	/// Per-node collision radius; two centers keep at least twice this apart.
	pub collision_radius: f64,
	/// Fraction of an overlap resolved per tick.
	pub collision_strength: f64,
	/// Rest length of a relationship spring.
	pub link_distance: f64,
	/// Spring stiffness before the per-link degree bias.
	pub link_strength: f64,
	/// How fast alpha approaches its target each tick.
	pub alpha_decay: f64,
	/// Alpha below which the simulation stops.
	pub alpha_min: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Energy kept while a node is being dragged.
	pub drag_alpha: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		Self {
			charge_strength: -150.0,
			charge_distance_min: 1.0,
			collision_radius: 30.0,
			collision_strength: 1.0,
			link_distance: 100.0,
			link_strength: 0.5,
			alpha_decay: 0.02,
			alpha_min: 0.001,
			velocity_decay: 0.4,
			drag_alpha: 0.3,
		}
	}
}

/// Physics state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fixed: Option<Point>,
}

impl Body {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

#[derive(Clone, Copy, Debug)]
struct Link {
	source: usize,
	target: usize,
	bias: f64,
}

/// Linear congruential generator, used for the sub-pixel jiggle that
/// separates coincident nodes and for seeding positions.
#[derive(Clone, Debug)]
pub struct Lcg(u32);

impl Lcg {
	pub fn new(seed: u32) -> Self {
		Self(seed)
	}

	/// Uniform in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

/// Positions after one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickSnapshot {
	pub alpha: f64,
	pub positions: Vec<(NodeId, Point)>,
}

pub struct Simulation {
	params: SimulationParameters,
	bodies: Vec<Body>,
	index_by_id: HashMap<NodeId, usize>,
	links: Vec<Link>,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	rng: Lcg,
}

impl Simulation {
	/// Builds the solver for a node/edge set. Every edge must reference nodes
	/// in `nodes`; callers filter dangling edges beforehand.
	pub fn new(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		bounds: Bounds,
		params: SimulationParameters,
	) -> Result<Self, GraphError> {
		if !bounds.is_usable() {
			return Err(GraphError::InvalidBounds {
				width: bounds.width,
				height: bounds.height,
			});
		}

		let mut bodies = Vec::with_capacity(nodes.len());
		let mut index_by_id = HashMap::with_capacity(nodes.len());
		for node in nodes {
			if !node.x.is_finite() || !node.y.is_finite() {
				return Err(GraphError::NonFinitePosition(node.id));
			}
			if index_by_id.insert(node.id, bodies.len()).is_some() {
				return Err(GraphError::DuplicateNode(node.id));
			}
			bodies.push(Body {
				id: node.id,
				x: node.x,
				y: node.y,
				vx: 0.0,
				vy: 0.0,
				fixed: node.pinned.then(|| node.position()),
			});
		}

		let mut pairs = Vec::with_capacity(edges.len());
		let mut count = vec![0usize; bodies.len()];
		for edge in edges {
			let lookup = |id: NodeId| {
				index_by_id
					.get(&id)
					.copied()
					.ok_or_else(|| GraphError::DanglingEdge {
						edge: edge.id.clone(),
						node: id,
					})
			};
			let (source, target) = (lookup(edge.source_id)?, lookup(edge.target_id)?);
			if source == target {
				continue;
			}
			count[source] += 1;
			count[target] += 1;
			pairs.push((source, target));
		}
		let links = pairs
			.into_iter()
			.map(|(source, target)| Link {
				source,
				target,
				bias: count[source] as f64 / (count[source] + count[target]) as f64,
			})
			.collect::<Vec<_>>();

		debug!(
			"simulation built: {} nodes, {} links",
			bodies.len(),
			links.len()
		);

		Ok(Self {
			params,
			running: !bodies.is_empty(),
			bodies,
			index_by_id,
			links,
			center: bounds.center(),
			alpha: 1.0,
			alpha_target: 0.0,
			rng: Lcg::new(1),
		})
	}

	pub fn params(&self) -> &SimulationParameters {
		&self.params
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	pub fn body(&self, id: NodeId) -> Option<&Body> {
		self.index_by_id.get(&id).map(|&i| &self.bodies[i])
	}

	pub fn center(&self) -> Point {
		self.center
	}

	/// Advances one step. Returns `false` without doing any work once the
	/// simulation has settled or been stopped.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.apply_charge();
		self.apply_center();
		self.apply_collision();
		self.apply_links();
		self.integrate();

		if self.alpha < self.params.alpha_min {
			self.running = false;
			debug!("simulation settled");
		}
		true
	}

	/// Lazy sequence of snapshots; ends when the simulation settles.
	pub fn ticks(&mut self) -> Ticks<'_> {
		Ticks { sim: self }
	}

	/// Ticks synchronously until settled or `max_ticks` is reached.
	pub fn settle(&mut self, max_ticks: usize) -> usize {
		let mut ticks = 0;
		while ticks < max_ticks && self.tick() {
			ticks += 1;
		}
		ticks
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Resumes ticking at the current alpha.
	pub fn restart(&mut self) {
		self.running = !self.bodies.is_empty();
	}

	/// Raises alpha to at least `alpha` and restarts.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
		self.restart();
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	/// Freezes a node at `at`. It keeps pushing on its neighbors but the
	/// solver no longer moves it.
	pub fn pin(&mut self, id: NodeId, at: Point) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		let body = &mut self.bodies[index];
		body.fixed = Some(at);
		body.x = at.x;
		body.y = at.y;
		body.vx = 0.0;
		body.vy = 0.0;
		let drag_alpha = self.params.drag_alpha;
		self.reheat(drag_alpha);
		true
	}

	/// Releases a pinned node. Positions are left untouched; only the energy
	/// target drops so the layout cools down.
	pub fn unpin(&mut self, id: NodeId) -> bool {
		let Some(&index) = self.index_by_id.get(&id) else {
			return false;
		};
		self.bodies[index].fixed = None;
		self.alpha_target = 0.0;
		true
	}

	pub fn is_pinned(&self, id: NodeId) -> bool {
		self.body(id).is_some_and(|body| body.fixed.is_some())
	}

	fn snapshot(&self) -> TickSnapshot {
		TickSnapshot {
			alpha: self.alpha,
			positions: self
				.bodies
				.iter()
				.map(|body| (body.id, body.position()))
				.collect(),
		}
	}

	fn apply_charge(&mut self) {
		let n = self.bodies.len();
		let min_sq = self.params.charge_distance_min * self.params.charge_distance_min;
		let strength = self.params.charge_strength * self.alpha;

		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = self.bodies[j].x - self.bodies[i].x;
				let mut dy = self.bodies[j].y - self.bodies[i].y;
				let mut l = dx * dx + dy * dy;
				if dx == 0.0 {
					dx = self.rng.jiggle();
					l += dx * dx;
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
					l += dy * dy;
				}
				if l < min_sq {
					l = (min_sq * l).sqrt();
				}
				let w = strength / l;
				self.bodies[i].vx += dx * w;
				self.bodies[i].vy += dy * w;
				self.bodies[j].vx -= dx * w;
				self.bodies[j].vy -= dy * w;
			}
		}
	}

	fn apply_center(&mut self) {
		let n = self.bodies.len() as f64;
		if n == 0.0 {
			return;
		}
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), body| (sx + body.x, sy + body.y));
		let (shift_x, shift_y) = (sx / n - self.center.x, sy / n - self.center.y);
		for body in &mut self.bodies {
			body.x -= shift_x;
			body.y -= shift_y;
		}
	}

	fn apply_collision(&mut self) {
		let n = self.bodies.len();
		let radius = self.params.collision_radius;
		let reach = radius + radius;
		let strength = self.params.collision_strength;
		// Equal radii, so both sides take half of the correction.
		let share = (radius * radius) / (radius * radius + radius * radius);

		for i in 0..n {
			let xi = self.bodies[i].x + self.bodies[i].vx;
			let yi = self.bodies[i].y + self.bodies[i].vy;
			for j in (i + 1)..n {
				let mut x = xi - (self.bodies[j].x + self.bodies[j].vx);
				let mut y = yi - (self.bodies[j].y + self.bodies[j].vy);
				let mut l = x * x + y * y;
				if l >= reach * reach {
					continue;
				}
				if x == 0.0 {
					x = self.rng.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.rng.jiggle();
					l += y * y;
				}
				let distance = l.sqrt();
				let k = (reach - distance) / distance * strength;
				let (px, py) = (x * k, y * k);
				self.bodies[i].vx += px * share;
				self.bodies[i].vy += py * share;
				self.bodies[j].vx -= px * (1.0 - share);
				self.bodies[j].vy -= py * (1.0 - share);
			}
		}
	}

	fn apply_links(&mut self) {
		let scale = self.alpha * self.params.link_strength;
		for index in 0..self.links.len() {
			let Link {
				source,
				target,
				bias,
			} = self.links[index];
			let (s, t) = (&self.bodies[source], &self.bodies[target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let length = (x * x + y * y).sqrt();
			let k = (length - self.params.link_distance) / length * scale;
			let (x, y) = (x * k, y * k);

			let t = &mut self.bodies[target];
			t.vx -= x * bias;
			t.vy -= y * bias;
			let s = &mut self.bodies[source];
			s.vx += x * (1.0 - bias);
			s.vy += y * (1.0 - bias);
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		for body in &mut self.bodies {
			match body.fixed {
				Some(at) => {
					body.x = at.x;
					body.y = at.y;
					body.vx = 0.0;
					body.vy = 0.0;
				}
				None => {
					body.vx *= keep;
					body.vy *= keep;
					body.x += body.vx;
					body.y += body.vy;
				}
			}
		}
	}
}

/// Iterator returned by [`Simulation::ticks`].
pub struct Ticks<'a> {
	sim: &'a mut Simulation,
}

impl Iterator for Ticks<'_> {
	type Item = TickSnapshot;

	fn next(&mut self) -> Option<TickSnapshot> {
		if !self.sim.tick() {
			return None;
		}
		Some(self.sim.snapshot())
	}
}
