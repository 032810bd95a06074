//! Drawing surfaces for the 2D preview.
//!
//! The renderer only needs three primitives, so any backend (a GUI canvas,
//! an SVG file, a test recorder) can host the preview.

use std::fmt::{self, Write};

use super::viewport::Point2D;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Line appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    /// Dash and gap lengths in pixels; `None` draws a solid line
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64, opacity: f64) -> Self {
        Self {
            color,
            width,
            opacity,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f64, opacity: f64, dash: f64, gap: f64) -> Self {
        Self {
            color,
            width,
            opacity,
            dash: Some((dash, gap)),
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.dash.is_some()
    }
}

/// Minimal 2D drawing interface, in screen pixels.
pub trait DrawingSurface {
    /// Fill the whole surface
    fn clear(&mut self, background: Color);

    fn draw_line(&mut self, from: Point2D, to: Point2D, stroke: &Stroke);

    /// Outline a rectangle whose top-left corner is `origin`
    fn draw_rect(&mut self, origin: Point2D, width: f64, height: f64, stroke: &Stroke);
}

/// Recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Line {
        from: Point2D,
        to: Point2D,
        stroke: Stroke,
    },
    Rect {
        origin: Point2D,
        width: f64,
        height: f64,
        stroke: Stroke,
    },
}

/// Surface that records every call, for headless inspection.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point2D, &Point2D, &Stroke)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line { from, to, stroke } => Some((from, to, stroke)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Rect { .. }))
    }
}

impl DrawingSurface for DisplayList {
    fn clear(&mut self, background: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(background));
    }

    fn draw_line(&mut self, from: Point2D, to: Point2D, stroke: &Stroke) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn draw_rect(&mut self, origin: Point2D, width: f64, height: f64, stroke: &Stroke) {
        self.ops.push(DrawOp::Rect {
            origin,
            width,
            height,
            stroke: *stroke,
        });
    }
}

/// Surface that builds a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    fn stroke_attrs(stroke: &Stroke) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.2}""#,
            stroke.color, stroke.width, stroke.opacity
        );
        if let Some((dash, gap)) = stroke.dash {
            let _ = write!(attrs, r#" stroke-dasharray="{:.1} {:.1}""#, dash, gap);
        }
        attrs
    }

    /// Finish the document
    pub fn into_svg(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

impl DrawingSurface for SvgSurface {
    fn clear(&mut self, background: Color) {
        self.body.clear();
        let _ = writeln!(
            self.body,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width, self.height, background
        );
    }

    fn draw_line(&mut self, from: Point2D, to: Point2D, stroke: &Stroke) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {} stroke-linecap="round"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            Self::stroke_attrs(stroke)
        );
    }

    fn draw_rect(&mut self, origin: Point2D, width: f64, height: f64, stroke: &Stroke) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" {}/>"#,
            origin.x,
            origin.y,
            width,
            height,
            Self::stroke_attrs(stroke)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Color = Color::rgb(0x1f, 0x29, 0x37);

    #[test]
    fn test_color_hex() {
        assert_eq!(INK.to_string(), "#1f2937");
    }

    #[test]
    fn test_display_list_clear_resets_ops() {
        let mut list = DisplayList::new();
        list.draw_line(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
            &Stroke::solid(INK, 1.0, 1.0),
        );
        list.clear(Color::rgb(255, 255, 255));
        assert_eq!(list.ops().len(), 1);
        assert_eq!(list.lines().count(), 0);
    }

    #[test]
    fn test_svg_output() {
        let mut svg = SvgSurface::new(100.0, 50.0);
        svg.clear(Color::rgb(255, 255, 255));
        svg.draw_line(
            Point2D::new(1.0, 2.0),
            Point2D::new(3.0, 4.0),
            &Stroke::dashed(INK, 1.0, 0.4, 4.0, 4.0),
        );
        svg.draw_rect(
            Point2D::new(5.0, 5.0),
            10.0,
            20.0,
            &Stroke::solid(INK, 1.0, 1.0),
        );
        let doc = svg.into_svg();

        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"viewBox="0 0 100 50""#));
        assert!(doc.contains(r#"x1="1.00" y1="2.00" x2="3.00" y2="4.00""#));
        assert!(doc.contains(r#"stroke-dasharray="4.0 4.0""#));
        assert!(doc.contains(r#"width="10.00" height="20.00" fill="none""#));
        assert!(doc.trim_end().ends_with("</svg>"));
    }
}
