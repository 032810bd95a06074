//! # Polarplot Visualizer
//!
//! G-code parsing and the interactive 2D plot preview.
//! Includes the motion parser, the model-to-screen projector, drawing
//! surfaces, and the pan/zoom renderer.

pub mod gcode;
pub mod visualizer;

pub use gcode::{GcodeParser, MotionSegment, ParsedToolpath, ToolpathStats};

pub use visualizer::{
    clamp_zoom, BoundingBox, Color, DisplayList, DrawOp, DrawingSurface, EventDisposition,
    PaperRect, PlotRenderer, Point2D, PointerGesture, PreviewState, Projector, RenderStyle,
    Stroke, SvgSurface, ToolpathCache, ViewTransform, ViewportSize, WheelDirection,
};
