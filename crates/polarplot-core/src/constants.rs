//! Shared constants for preview geometry and the session console.

/// Padding between the drawing and the canvas edge, in pixels.
pub const CANVAS_PADDING_PX: f64 = 20.0;

/// Smallest allowed preview zoom.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed preview zoom.
pub const MAX_ZOOM: f64 = 4.0;

/// Zoom multiplier applied per "zoom in" wheel tick.
pub const ZOOM_IN_FACTOR: f64 = 1.05;

/// Zoom multiplier applied per "zoom out" wheel tick.
pub const ZOOM_OUT_FACTOR: f64 = 0.95;

/// Minimum span used when fitting bounds, in model units.
pub const MIN_SPAN_MM: f64 = 1.0;

/// Number of dedup keys remembered by the session log.
pub const SEEN_KEY_CAPACITY: usize = 1000;

/// Delay before reconnecting a dropped event stream, in milliseconds.
pub const RECONNECT_DELAY_MS: u64 = 5000;

/// Entries shown per console page.
pub const LOG_PAGE_SIZE: usize = 25;

/// Responses longer than this are collapsed by default.
pub const RESPONSE_PREVIEW_CHARS: usize = 200;

/// The console follows new entries when the view is this close to the bottom.
pub const FOLLOW_THRESHOLD_PX: f64 = 80.0;

/// Message type carried by device command/response stream events.
pub const GCODE_RESPONSE_TYPE: &str = "gcode_response";
