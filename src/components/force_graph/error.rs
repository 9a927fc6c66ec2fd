use thiserror::Error;

use super::types::NodeId;

/// Failures the graph engine can report. None of them are fatal to the view;
/// the store falls back to a static layout or simply drops the feature.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	/// Zero, negative or non-finite viewport.
	#[error("viewport {width}x{height} cannot host a simulation")]
	InvalidBounds {
		/// Offending width.
		width: f64,
		/// Offending height.
		height: f64,
	},

	/// A seed position was NaN or infinite.
	#[error("node {0} has a non-finite position")]
	NonFinitePosition(NodeId),

	/// The solver was handed the same id twice.
	#[error("node {0} appears more than once")]
	DuplicateNode(NodeId),

	/// The solver was handed an edge whose endpoint it does not know.
	#[error("edge {edge} references unknown node {node}")]
	DanglingEdge {
		/// Id of the edge.
		edge: String,
		/// The missing endpoint.
		node: NodeId,
	},

	/// The browser refused to enter or leave fullscreen.
	#[error("fullscreen unavailable: {0}")]
	Fullscreen(String),
}
