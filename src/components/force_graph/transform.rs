//! Viewport transform: pan offset plus uniform scale.
//!
//! Screen space is canvas pixels, world space is where the simulation places
//! nodes. `world = (screen - translation) / scale`.

use super::types::Point;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;
pub const ZOOM_SENSITIVITY: f64 = 0.002;
pub const ZOOM_STEP: f64 = 1.2;

/// Pan and zoom of one view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Kept within `[MIN_SCALE, MAX_SCALE]`.
	pub scale: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	/// No pan, no zoom.
	pub const IDENTITY: Transform = Transform {
		x: 0.0,
		y: 0.0,
		scale: 1.0,
	};

	/// Limits `scale` to the supported zoom range.
	pub fn clamp_scale(scale: f64) -> f64 {
		scale.clamp(MIN_SCALE, MAX_SCALE)
	}

	/// Where a canvas pixel lands in the layout.
	pub fn screen_to_world(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.x) / self.scale,
			(screen.y - self.y) / self.scale,
		)
	}

	/// Inverse of [`Self::screen_to_world`].
	pub fn world_to_screen(&self, world: Point) -> Point {
		Point::new(world.x * self.scale + self.x, world.y * self.scale + self.y)
	}

	/// Sets the scale while keeping the world point under `pivot` fixed on
	/// screen.
	pub fn zoom_at_point(&mut self, new_scale: f64, pivot: Point) {
		if !new_scale.is_finite() || !pivot.x.is_finite() || !pivot.y.is_finite() {
			return;
		}
		let new_scale = Self::clamp_scale(new_scale);
		let ratio = new_scale / self.scale;
		self.x = pivot.x - (pivot.x - self.x) * ratio;
		self.y = pivot.y - (pivot.y - self.y) * ratio;
		self.scale = new_scale;
	}

	/// Screen-space deltas, no scale correction.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		if !dx.is_finite() || !dy.is_finite() {
			return;
		}
		self.x += dx;
		self.y += dy;
	}

	/// Back to [`Self::IDENTITY`].
	pub fn reset(&mut self) {
		*self = Self::IDENTITY;
	}

	/// Mouse wheel. Shift turns the wheel into a pan.
	pub fn wheel_zoom(&mut self, delta_x: f64, delta_y: f64, pointer: Point, shift_held: bool) {
		if shift_held {
			self.pan(-delta_x, -delta_y);
			return;
		}
		let step = delta_y.abs() * ZOOM_SENSITIVITY;
		let factor = if delta_y > 0.0 { 1.0 - step } else { 1.0 + step };
		self.zoom_at_point(self.scale * factor, pointer);
	}

	/// `distance_ratio` is current over previous two-finger distance.
	pub fn pinch_zoom(&mut self, distance_ratio: f64, center: Point) {
		self.zoom_at_point(self.scale * distance_ratio, center);
	}

	/// Multiplies the scale by `ZOOM_STEP` about `pivot`.
	pub fn zoom_in(&mut self, pivot: Point) {
		self.zoom_at_point(self.scale * ZOOM_STEP, pivot);
	}

	/// Divides the scale by `ZOOM_STEP` about `pivot`.
	pub fn zoom_out(&mut self, pivot: Point) {
		self.zoom_at_point(self.scale / ZOOM_STEP, pivot);
	}
}
