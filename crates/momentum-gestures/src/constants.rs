//! Shared gesture constants for consistent pointer handling.
//!
//! These values are in logical pixels (or pixels per second/frame where
//! noted). They are shared between the pan session and the drag feature
//! so the two never disagree about when a gesture has started.

/// Pan start threshold in logical pixels.
///
/// A session only reports `on_start` once total displacement from the
/// origin exceeds this distance. Below it, only history accumulates.
/// Keeps sub-pixel pointer noise from being treated as an intentional
/// drag.
pub const PAN_START_THRESHOLD: f32 = 3.0;

/// Velocity lookback window in milliseconds.
///
/// Velocity is measured against the oldest history sample still inside
/// this window, normalized to pixels per second.
pub const VELOCITY_WINDOW_MS: f64 = 100.0;

/// Width of the auto-scroll trigger zone along a container edge, in
/// logical pixels.
pub const EDGE_ZONE_PX: f32 = 50.0;

/// Maximum auto-scroll speed in pixels per frame.
///
/// Actual speed ramps up quadratically with proximity to the edge
/// (`MAX_SCROLL_SPEED * intensity²`), so entering the zone feels gentle
/// and the cap is only reached at the edge itself.
pub const MAX_SCROLL_SPEED: f32 = 25.0;

/// Spring stiffness for the drag snap-back-to-origin animation.
pub const SNAP_BACK_STIFFNESS: f32 = 400.0;

/// Spring damping for the drag snap-back-to-origin animation.
pub const SNAP_BACK_DAMPING: f32 = 40.0;
