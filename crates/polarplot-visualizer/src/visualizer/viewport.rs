//! Viewport geometry for the 2D preview.
//!
//! Model space is millimeters with Y pointing up (plotter convention).
//! Screen space is pixels with the origin at the top-left and Y pointing
//! down. The pan offset is expressed in screen pixels relative to the
//! viewport center and is applied after scaling, so a drag moves the
//! drawing exactly as far as the pointer moved.

use polarplot_core::constants::{MAX_ZOOM, MIN_SPAN_MM, MIN_ZOOM};
use polarplot_core::Paper;
use serde::{Deserialize, Serialize};

/// A 2D point, in model units or screen pixels depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned extent accumulated while parsing toolpaths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Degenerate box containing a single point
    pub fn at(point: Point2D) -> Self {
        Self {
            min_x: point.x,
            max_x: point.x,
            min_y: point.y,
            max_y: point.y,
        }
    }

    pub fn include(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn union(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Paper outline in model space, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperRect {
    pub width: f64,
    pub height: f64,
}

impl PaperRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_x: -self.width / 2.0,
            max_x: self.width / 2.0,
            min_y: -self.height / 2.0,
            max_y: self.height / 2.0,
        }
    }
}

impl From<&Paper> for PaperRect {
    fn from(paper: &Paper) -> Self {
        Self::new(paper.width_mm, paper.height_mm)
    }
}

/// Render surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Clamp a zoom factor into the supported range.
///
/// Non-finite input falls back to 1.0.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// User-controlled zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    zoom: f64,
    /// Offset from the viewport center, in screen pixels
    pub pan: Point2D,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point2D::default(),
        }
    }
}

impl ViewTransform {
    pub fn new(zoom: f64, pan: Point2D) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Scale by `factor` while keeping the content under `cursor` fixed.
    ///
    /// `cursor` is measured from the viewport center, like the pan offset.
    /// The point under the cursor in zoom-1 units is `(cursor - pan) / zoom`;
    /// after the step it must land on the cursor again.
    pub fn zoomed_at(&self, cursor: Point2D, factor: f64) -> ViewTransform {
        let new_zoom = clamp_zoom(self.zoom * factor);
        if new_zoom == self.zoom {
            return *self;
        }
        let anchor_x = (cursor.x - self.pan.x) / self.zoom;
        let anchor_y = (cursor.y - self.pan.y) / self.zoom;
        ViewTransform {
            zoom: new_zoom,
            pan: Point2D::new(cursor.x - anchor_x * new_zoom, cursor.y - anchor_y * new_zoom),
        }
    }
}

/// Model-to-screen mapping for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    viewport: ViewportSize,
    center: Point2D,
    base_scale: f64,
    scale: f64,
    pan: Point2D,
}

impl Projector {
    /// Fit the union of `bounds` and `paper` into the viewport.
    ///
    /// Returns `None` when there is nothing to draw.
    pub fn new(
        bounds: Option<BoundingBox>,
        paper: Option<PaperRect>,
        viewport: ViewportSize,
        view: ViewTransform,
        padding: f64,
    ) -> Option<Self> {
        let combined = match (bounds, paper.map(|p| p.bounds())) {
            (Some(b), Some(p)) => b.union(p),
            (Some(b), None) => b,
            (None, Some(p)) => p,
            (None, None) => return None,
        };

        let span_x = combined.width().max(MIN_SPAN_MM);
        let span_y = combined.height().max(MIN_SPAN_MM);
        // Tiny surfaces would otherwise flip or collapse the drawing
        let avail_x = (viewport.width - 2.0 * padding).max(1.0);
        let avail_y = (viewport.height - 2.0 * padding).max(1.0);
        let base_scale = (avail_x / span_x).min(avail_y / span_y);

        Some(Self {
            viewport,
            center: combined.center(),
            base_scale,
            scale: base_scale * view.zoom(),
            pan: view.pan,
        })
    }

    /// Pixels per model unit at zoom 1
    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    /// Pixels per model unit at the current zoom
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Model point that sits at the viewport center before panning
    pub fn center(&self) -> Point2D {
        self.center
    }

    pub fn map_point(&self, x: f64, y: f64) -> Point2D {
        Point2D::new(
            self.viewport.width / 2.0 + self.pan.x + (x - self.center.x) * self.scale,
            self.viewport.height / 2.0 + self.pan.y - (y - self.center.y) * self.scale,
        )
    }

    /// Inverse of [`Projector::map_point`]
    pub fn unmap_point(&self, screen_x: f64, screen_y: f64) -> Point2D {
        Point2D::new(
            self.center.x + (screen_x - self.viewport.width / 2.0 - self.pan.x) / self.scale,
            self.center.y - (screen_y - self.viewport.height / 2.0 - self.pan.y) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn square() -> BoundingBox {
        BoundingBox {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 0.0,
            max_y: 10.0,
        }
    }

    #[test]
    fn test_nothing_to_draw() {
        let projector = Projector::new(
            None,
            None,
            ViewportSize::new(800.0, 600.0),
            ViewTransform::default(),
            20.0,
        );
        assert!(projector.is_none());
    }

    #[test]
    fn test_base_scale_uses_limiting_axis() {
        let projector = Projector::new(
            Some(square()),
            None,
            ViewportSize::new(840.0, 440.0),
            ViewTransform::default(),
            20.0,
        )
        .expect("projector");
        // 800/10 horizontally, 400/10 vertically
        assert!((projector.base_scale() - 40.0).abs() < EPS);
    }

    #[test]
    fn test_center_maps_to_viewport_center() {
        let projector = Projector::new(
            Some(square()),
            None,
            ViewportSize::new(800.0, 600.0),
            ViewTransform::default(),
            20.0,
        )
        .expect("projector");
        let p = projector.map_point(5.0, 5.0);
        assert!((p.x - 400.0).abs() < EPS);
        assert!((p.y - 300.0).abs() < EPS);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let projector = Projector::new(
            Some(square()),
            None,
            ViewportSize::new(800.0, 600.0),
            ViewTransform::default(),
            20.0,
        )
        .expect("projector");
        let low = projector.map_point(0.0, 0.0);
        let high = projector.map_point(0.0, 10.0);
        assert!(high.y < low.y);
    }

    #[test]
    fn test_degenerate_bounds_use_minimum_span() {
        let point = BoundingBox::at(Point2D::new(3.0, 3.0));
        let projector = Projector::new(
            Some(point),
            None,
            ViewportSize::new(140.0, 140.0),
            ViewTransform::default(),
            20.0,
        )
        .expect("projector");
        assert!((projector.base_scale() - 100.0).abs() < EPS);
        assert!(projector.map_point(3.0, 3.0).x.is_finite());
    }

    #[test]
    fn test_paper_extends_bounds() {
        let paper = PaperRect::new(200.0, 100.0);
        let projector = Projector::new(
            Some(square()),
            Some(paper),
            ViewportSize::new(840.0, 640.0),
            ViewTransform::default(),
            20.0,
        )
        .expect("projector");
        // Combined bounds are x -100..100, y -50..50
        assert!((projector.base_scale() - 4.0).abs() < EPS);
        assert_eq!(projector.center(), Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_unmap_inverts_map() {
        let view = ViewTransform::new(2.5, Point2D::new(-37.0, 12.0));
        let projector = Projector::new(
            Some(square()),
            None,
            ViewportSize::new(800.0, 600.0),
            view,
            20.0,
        )
        .expect("projector");
        let screen = projector.map_point(7.25, -3.5);
        let model = projector.unmap_point(screen.x, screen.y);
        assert!((model.x - 7.25).abs() < 1e-9);
        assert!((model.y + 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        assert_eq!(clamp_zoom(10.0), 4.0);
        assert_eq!(clamp_zoom(0.01), 0.25);
        assert_eq!(clamp_zoom(f64::NAN), 1.0);
        assert_eq!(ViewTransform::new(100.0, Point2D::default()).zoom(), 4.0);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_content_fixed() {
        let viewport = ViewportSize::new(800.0, 600.0);
        let before = ViewTransform::new(1.3, Point2D::new(25.0, -40.0));
        let cursor_screen = Point2D::new(610.0, 120.0);
        let cursor = Point2D::new(
            cursor_screen.x - viewport.width / 2.0,
            cursor_screen.y - viewport.height / 2.0,
        );

        let p0 = Projector::new(Some(square()), None, viewport, before, 20.0).expect("projector");
        let model = p0.unmap_point(cursor_screen.x, cursor_screen.y);

        let after = before.zoomed_at(cursor, 1.05);
        let p1 = Projector::new(Some(square()), None, viewport, after, 20.0).expect("projector");
        let back = p1.map_point(model.x, model.y);

        assert!((back.x - cursor_screen.x).abs() < 1e-6);
        assert!((back.y - cursor_screen.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_at_limit_leaves_pan_alone() {
        let view = ViewTransform::new(4.0, Point2D::new(10.0, 10.0));
        let after = view.zoomed_at(Point2D::new(100.0, -50.0), 1.05);
        assert_eq!(after, view);
    }
}
