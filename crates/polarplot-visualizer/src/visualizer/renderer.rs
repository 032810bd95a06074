//! Plot renderer
//!
//! Draws the preview onto any [`DrawingSurface`] and turns pointer and
//! wheel input into pan/zoom changes on the owned [`PreviewState`].
//!
//! Drawing is a pure function of the preview state. Dragging keeps the
//! pointer's offset from the pan captured at pointer-down, so every move
//! computes an absolute pan and repeated moves cannot drift.

use polarplot_core::constants::{ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use tracing::trace;

use super::preview::PreviewState;
use super::surface::{Color, DrawingSurface, Stroke};
use super::viewport::Point2D;

/// Whether an input event was handled here.
///
/// `Consumed` means the host must not apply its own default handling
/// (page scroll for wheel events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

/// Direction of a single wheel tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    ZoomIn,
    ZoomOut,
}

impl WheelDirection {
    /// Classify a wheel delta; positive deltas scroll down and zoom out.
    pub fn from_delta(delta_y: f64) -> Option<Self> {
        if delta_y > 0.0 {
            Some(WheelDirection::ZoomOut)
        } else if delta_y < 0.0 {
            Some(WheelDirection::ZoomIn)
        } else {
            None
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            WheelDirection::ZoomIn => ZOOM_IN_FACTOR,
            WheelDirection::ZoomOut => ZOOM_OUT_FACTOR,
        }
    }
}

/// Pointer and wheel input, in surface pixel coordinates.
pub trait PointerGesture {
    fn pointer_down(&mut self, at: Point2D) -> EventDisposition;
    fn pointer_move(&mut self, at: Point2D) -> EventDisposition;
    fn pointer_up(&mut self, at: Point2D) -> EventDisposition;
    /// The pointer left the surface
    fn pointer_leave(&mut self) -> EventDisposition;
    fn wheel(&mut self, at: Point2D, delta_y: f64) -> EventDisposition;
}

/// Colors and strokes used by [`PlotRenderer::draw`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: Color,
    pub paper: Stroke,
    pub draw: Stroke,
    pub travel: Stroke,
}

impl Default for RenderStyle {
    fn default() -> Self {
        let ink = Color::rgb(0x1f, 0x29, 0x37);
        Self {
            background: Color::rgb(0xff, 0xff, 0xff),
            paper: Stroke::dashed(Color::rgb(0x9c, 0xa3, 0xaf), 1.0, 0.8, 6.0, 4.0),
            draw: Stroke::solid(ink, 1.5, 0.9),
            travel: Stroke::dashed(Color::rgb(0x60, 0xa5, 0xfa), 1.0, 0.35, 4.0, 4.0),
        }
    }
}

/// Pointer offset from the pan at the moment the drag began
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    offset: Point2D,
}

#[derive(Debug, Clone)]
pub struct PlotRenderer {
    state: PreviewState,
    style: RenderStyle,
    drag: Option<DragAnchor>,
}

impl PlotRenderer {
    pub fn new(state: PreviewState) -> Self {
        Self {
            state,
            style: RenderStyle::default(),
            drag: None,
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PreviewState {
        &mut self.state
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Zoom 1, no pan
    pub fn reset_view(&mut self) {
        self.state.reset_view();
    }

    /// Drop any gesture in progress, e.g. when the surface is torn down
    pub fn cancel_gesture(&mut self) {
        if self.drag.take().is_some() {
            trace!("Drag cancelled");
        }
    }

    /// Render the current state from scratch
    pub fn draw(&self, surface: &mut dyn DrawingSurface) {
        surface.clear(self.style.background);

        let Some(projector) = self.state.projector() else {
            return;
        };

        if let Some(paper) = self.state.paper() {
            let (half_w, half_h) = paper.half_extents();
            let top_left = projector.map_point(-half_w, half_h);
            let bottom_right = projector.map_point(half_w, -half_h);
            surface.draw_rect(
                top_left,
                bottom_right.x - top_left.x,
                bottom_right.y - top_left.y,
                &self.style.paper,
            );
        }

        let toolpath = self.state.toolpath();
        for segment in &toolpath.segments {
            let stroke = if segment.pen_down {
                &self.style.draw
            } else {
                &self.style.travel
            };
            surface.draw_line(
                projector.map_point(segment.from.x, segment.from.y),
                projector.map_point(segment.to.x, segment.to.y),
                stroke,
            );
        }
    }

    fn end_drag(&mut self) -> EventDisposition {
        match self.drag.take() {
            Some(_) => {
                trace!("Drag ended");
                EventDisposition::Consumed
            }
            None => EventDisposition::Ignored,
        }
    }
}

impl PointerGesture for PlotRenderer {
    fn pointer_down(&mut self, at: Point2D) -> EventDisposition {
        let pan = self.state.view().pan;
        self.drag = Some(DragAnchor {
            offset: Point2D::new(at.x - pan.x, at.y - pan.y),
        });
        trace!("Drag started at ({:.1}, {:.1})", at.x, at.y);
        EventDisposition::Consumed
    }

    fn pointer_move(&mut self, at: Point2D) -> EventDisposition {
        let Some(anchor) = self.drag else {
            return EventDisposition::Ignored;
        };
        self.state.set_pan(Point2D::new(
            at.x - anchor.offset.x,
            at.y - anchor.offset.y,
        ));
        EventDisposition::Consumed
    }

    fn pointer_up(&mut self, _at: Point2D) -> EventDisposition {
        self.end_drag()
    }

    fn pointer_leave(&mut self) -> EventDisposition {
        self.end_drag()
    }

    fn wheel(&mut self, at: Point2D, delta_y: f64) -> EventDisposition {
        if let Some(direction) = WheelDirection::from_delta(delta_y) {
            self.state.zoom_at(at, direction.factor());
        }
        // Always swallowed so the host page never scrolls under the preview
        EventDisposition::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::surface::{DisplayList, DrawOp};
    use crate::visualizer::viewport::ViewportSize;
    use polarplot_core::Paper;

    fn renderer_with(source: &str) -> PlotRenderer {
        let mut state = PreviewState::new(ViewportSize::new(800.0, 600.0));
        state.set_source(source);
        PlotRenderer::new(state)
    }

    #[test]
    fn test_empty_state_only_clears() {
        let renderer = renderer_with("");
        let mut list = DisplayList::new();
        renderer.draw(&mut list);
        assert_eq!(list.ops(), &[DrawOp::Clear(renderer.style().background)]);
    }

    #[test]
    fn test_segments_use_move_kind_strokes() {
        let renderer = renderer_with("G1 X10 Y0\nG0 X0 Y0");
        let mut list = DisplayList::new();
        renderer.draw(&mut list);

        let strokes: Vec<Stroke> = list.lines().map(|(_, _, s)| *s).collect();
        assert_eq!(strokes.len(), 2);
        assert!(!strokes[0].is_dashed());
        assert!(strokes[1].is_dashed());
        assert!(strokes[0].opacity > strokes[1].opacity);
    }

    #[test]
    fn test_paper_outline_is_dashed_rect() {
        let mut renderer = renderer_with("G1 X10 Y10");
        renderer.state_mut().set_paper(Paper::by_name("A4"));
        let mut list = DisplayList::new();
        renderer.draw(&mut list);

        let rects: Vec<&DrawOp> = list.rects().collect();
        assert_eq!(rects.len(), 1);
        if let DrawOp::Rect {
            width,
            height,
            stroke,
            ..
        } = rects[0]
        {
            assert!(*width > 0.0 && *height > 0.0);
            assert!(stroke.is_dashed());
            // A4 is portrait
            assert!(height > width);
        }
    }

    #[test]
    fn test_drag_sets_absolute_pan() {
        let mut renderer = renderer_with("G1 X10 Y10");
        renderer.state_mut().set_pan(Point2D::new(5.0, 5.0));

        renderer.pointer_down(Point2D::new(100.0, 100.0));
        renderer.pointer_move(Point2D::new(130.0, 90.0));
        renderer.pointer_move(Point2D::new(120.0, 110.0));
        assert_eq!(renderer.state().view().pan, Point2D::new(25.0, 15.0));

        assert_eq!(
            renderer.pointer_up(Point2D::new(120.0, 110.0)),
            EventDisposition::Consumed
        );
        assert!(!renderer.is_dragging());
        assert_eq!(
            renderer.pointer_move(Point2D::new(500.0, 500.0)),
            EventDisposition::Ignored
        );
        assert_eq!(renderer.state().view().pan, Point2D::new(25.0, 15.0));
    }

    #[test]
    fn test_pointer_leave_releases_drag() {
        let mut renderer = renderer_with("G1 X10 Y10");
        renderer.pointer_down(Point2D::new(10.0, 10.0));
        assert!(renderer.is_dragging());
        assert_eq!(renderer.pointer_leave(), EventDisposition::Consumed);
        assert!(!renderer.is_dragging());
        assert_eq!(renderer.pointer_leave(), EventDisposition::Ignored);
    }

    #[test]
    fn test_wheel_is_always_consumed() {
        let mut renderer = renderer_with("G1 X10 Y10");
        assert_eq!(
            renderer.wheel(Point2D::new(1.0, 1.0), 0.0),
            EventDisposition::Consumed
        );
        assert_eq!(renderer.state().view().zoom(), 1.0);

        renderer.wheel(Point2D::new(400.0, 300.0), -3.0);
        assert!((renderer.state().view().zoom() - 1.05).abs() < 1e-12);
        renderer.wheel(Point2D::new(400.0, 300.0), 3.0);
        assert!((renderer.state().view().zoom() - 0.9975).abs() < 1e-12);
    }

    #[test]
    fn test_reset_view() {
        let mut renderer = renderer_with("G1 X10 Y10");
        renderer.wheel(Point2D::new(10.0, 10.0), -1.0);
        renderer.pointer_down(Point2D::new(0.0, 0.0));
        renderer.pointer_move(Point2D::new(40.0, 40.0));
        renderer.reset_view();
        assert_eq!(renderer.state().view().zoom(), 1.0);
        assert_eq!(renderer.state().view().pan, Point2D::default());
    }

    #[test]
    fn test_cancel_gesture() {
        let mut renderer = renderer_with("");
        renderer.pointer_down(Point2D::new(0.0, 0.0));
        renderer.cancel_gesture();
        assert!(!renderer.is_dragging());
    }
}
