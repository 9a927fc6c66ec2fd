//! Input records supplied by the hosting app and the working node/edge set
//! derived from them.

/// Character ids as used by the hosting app.
pub type NodeId = i64;

/// A character as supplied by the hosting app.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterRecord {
	/// Unique within one [`GraphData`].
	pub id: NodeId,
	/// Display name, also what the search matches against.
	pub name: String,
	/// Image URL drawn inside the node.
	pub avatar: Option<String>,
}

/// A directed relationship between two characters.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipRecord {
	/// Persistent id; unsaved relationships have none.
	pub id: Option<i64>,
	/// Character the relationship starts from.
	pub source_id: NodeId,
	/// Character the relationship points to.
	pub target_id: NodeId,
	/// Key into [`GraphData::relationship_types`].
	pub type_id: i64,
	/// Free text shown in the details panel.
	pub description: Option<String>,
}

/// Display metadata for a relationship type.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipType {
	/// Referenced by [`RelationshipRecord::type_id`].
	pub id: i64,
	/// Label drawn on highlighted edges.
	pub name: String,
	/// CSS color for edges of this type.
	pub color: String,
}

/// Everything the graph view needs from the hosting app.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Nodes to lay out. Later duplicates of an id are ignored.
	pub characters: Vec<CharacterRecord>,
	/// Edges. Those naming an unknown character are dropped.
	pub relationships: Vec<RelationshipRecord>,
	/// Type registry for names and colors.
	pub relationship_types: Vec<RelationshipType>,
}

/// Screen or world space point, depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Grows to the right.
	pub x: f64,
	/// Grows downwards.
	pub y: f64,
}

impl Point {
	/// The point (`x`, `y`).
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Halfway between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
}

impl Bounds {
	/// A `width` by `height` viewport.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Where the layout is pulled to.
	pub fn center(self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Whether both sides are finite and strictly positive.
	pub fn is_usable(self) -> bool {
		self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
	}
}

impl Default for Bounds {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

/// A character in the working set.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: String,
	pub avatar: Option<String>,
	pub color: String,
	pub degree: usize,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub pinned: bool,
}

impl GraphNode {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// A relationship in the working set. Both endpoints are guaranteed to exist.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub source_id: NodeId,
	pub target_id: NodeId,
	pub type_id: i64,
	pub type_name: String,
	pub color: String,
	pub description: Option<String>,
}
