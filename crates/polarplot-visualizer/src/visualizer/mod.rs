//! 2D plot preview
//!
//! This module provides:
//! - Model/screen geometry and the zoom-to-cursor math (viewport)
//! - Parse caching keyed on source text (toolpath_cache)
//! - Drawing backends behind a minimal surface trait (surface)
//! - The observable preview model (preview)
//! - Drawing and pointer/wheel interaction (renderer)

pub mod preview;
pub mod renderer;
pub mod surface;
pub mod toolpath_cache;
pub mod viewport;

pub use preview::PreviewState;
pub use renderer::{EventDisposition, PlotRenderer, PointerGesture, RenderStyle, WheelDirection};
pub use surface::{Color, DisplayList, DrawOp, DrawingSurface, Stroke, SvgSurface};
pub use toolpath_cache::ToolpathCache;
pub use viewport::{
    clamp_zoom, BoundingBox, PaperRect, Point2D, Projector, ViewTransform, ViewportSize,
};
