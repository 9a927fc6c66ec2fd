use super::simulation::SimulationParameters;

/// Tunables for one graph view. `Default` matches the stock look and feel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphConfig {
	/// Force strengths and cooling.
	pub simulation: SimulationParameters,
	/// Click and tap thresholds.
	pub interaction: InteractionConfig,
	/// Node sizing and seeding.
	pub node: NodeStyle,
}

/// Thresholds that tell a click or tap from a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
	/// Pointer travel (screen px) below which a press/release is a click or tap.
	pub tap_max_distance: f64,
	/// Longest touch, in milliseconds, still counted as a tap.
	pub tap_max_duration_ms: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			tap_max_distance: 10.0,
			tap_max_duration_ms: 300.0,
		}
	}
}

/// How big nodes are drawn and where new ones appear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// World-space radius of a node without relationships.
	pub base_radius: f64,
	/// Radius growth per incident edge, as a fraction of `base_radius`.
	pub degree_growth: f64,
	/// Cap on the growth factor.
	pub max_growth: f64,
	/// Extra world-space slack around the drawn circle that still hits.
	pub hit_padding: f64,
	/// Side of the square around the viewport center new nodes are seeded in.
	pub seed_spread: f64,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			base_radius: 12.0,
			degree_growth: 0.1,
			max_growth: 1.5,
			hit_padding: 14.0,
			seed_spread: 100.0,
		}
	}
}

impl NodeStyle {
	/// Drawn radius for a node with `degree` relationships.
	pub fn radius(&self, degree: usize) -> f64 {
		let growth = (1.0 + degree as f64 * self.degree_growth).min(self.max_growth);
		self.base_radius * growth
	}

	/// Radius within which a press picks the node up.
	pub fn hit_radius(&self, degree: usize) -> f64 {
		self.radius(degree) + self.hit_padding
	}
}
