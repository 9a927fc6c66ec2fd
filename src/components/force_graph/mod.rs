//! Force-directed relationship graph: data model, layout engine, viewport,
//! input handling and the canvas component tying them together.

mod component;
pub mod config;
pub mod error;
mod fullscreen;
pub mod interaction;
mod render;
pub mod simulation;
pub mod state;
pub mod transform;
pub mod types;

pub use component::RelationshipGraph;
pub use config::{GraphConfig, InteractionConfig, NodeStyle};
pub use error::GraphError;
pub use interaction::{Handled, InteractionController, PointerButton};
pub use simulation::SimulationParameters;
pub use state::{GraphState, InteractionMode, SimulationStatus, ViewFilter};
pub use transform::Transform;
pub use types::{
	Bounds, CharacterRecord, GraphData, NodeId, Point, RelationshipRecord, RelationshipType,
};
