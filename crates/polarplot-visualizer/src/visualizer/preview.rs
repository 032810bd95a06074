//! Observable preview model
//!
//! `PreviewState` holds every input of the preview pipeline: the parsed
//! source, the selected paper, the view transform and the surface size.
//! Each mutation publishes a [`PreviewEvent`] on the attached bus so a
//! host can re-run the (pure) draw pass.

use std::sync::Arc;

use polarplot_core::constants::{CANVAS_PADDING_PX, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use polarplot_core::{AppEvent, EventBus, Paper, PreviewEvent};
use tracing::{debug, trace};

use super::toolpath_cache::ToolpathCache;
use super::viewport::{PaperRect, Point2D, Projector, ViewTransform, ViewportSize};
use crate::gcode::{GcodeParser, ParsedToolpath};

#[derive(Debug, Clone)]
pub struct PreviewState {
    parser: GcodeParser,
    cache: ToolpathCache,
    paper: Option<Paper>,
    view: ViewTransform,
    viewport: ViewportSize,
    padding: f64,
    bus: Option<Arc<EventBus>>,
}

impl PreviewState {
    pub fn new(viewport: ViewportSize) -> Self {
        Self {
            parser: GcodeParser::new(),
            cache: ToolpathCache::new(),
            paper: None,
            view: ViewTransform::default(),
            viewport,
            padding: CANVAS_PADDING_PX,
            bus: None,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Publish change notifications on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    fn notify(&self, event: PreviewEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Preview(event));
        }
    }

    fn notify_view(&self) {
        self.notify(PreviewEvent::ViewChanged {
            zoom: self.view.zoom(),
            pan_x: self.view.pan.x,
            pan_y: self.view.pan.y,
        });
    }

    /// Replace the G-code source.
    ///
    /// Returns `true` if the text differed from the current source and the
    /// segment list was rebuilt.
    pub fn set_source(&mut self, source: &str) -> bool {
        if !self.cache.update(&self.parser, source) {
            return false;
        }
        let segment_count = self.cache.len();
        debug!("Preview source replaced: {} segments", segment_count);
        self.notify(PreviewEvent::SourceChanged { segment_count });
        true
    }

    pub fn toolpath(&self) -> Arc<ParsedToolpath> {
        self.cache.toolpath()
    }

    pub fn paper(&self) -> Option<&Paper> {
        self.paper.as_ref()
    }

    pub fn set_paper(&mut self, paper: Option<Paper>) {
        if self.paper == paper {
            return;
        }
        self.paper = paper;
        self.notify(PreviewEvent::PaperChanged {
            paper: self.paper.as_ref().map(|p| p.name.clone()),
        });
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        if self.view == view {
            return;
        }
        self.view = view;
        trace!(
            "View set: zoom {:.3}, pan ({:.1}, {:.1})",
            view.zoom(),
            view.pan.x,
            view.pan.y
        );
        self.notify_view();
    }

    /// Move the pan offset, keeping the zoom
    pub fn set_pan(&mut self, pan: Point2D) {
        self.set_view(ViewTransform::new(self.view.zoom(), pan));
    }

    /// Zoom 1, no pan. Always notifies.
    pub fn reset_view(&mut self) {
        self.view = ViewTransform::default();
        debug!("View reset");
        self.notify_view();
    }

    /// Zoom by `factor` keeping the content under the screen point `at` fixed
    pub fn zoom_at(&mut self, at: Point2D, factor: f64) {
        let center = self.viewport.center();
        let cursor = Point2D::new(at.x - center.x, at.y - center.y);
        let view = self.view.zoomed_at(cursor, factor);
        self.set_view(view);
    }

    /// One zoom-in step about the viewport center
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.viewport.center(), ZOOM_IN_FACTOR);
    }

    /// One zoom-out step about the viewport center
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.viewport.center(), ZOOM_OUT_FACTOR);
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn resize(&mut self, viewport: ViewportSize) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.notify(PreviewEvent::ViewportResized {
            width: viewport.width,
            height: viewport.height,
        });
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Mapping for the current inputs, `None` when there is nothing to draw
    pub fn projector(&self) -> Option<Projector> {
        Projector::new(
            self.cache.toolpath().bounds,
            self.paper.as_ref().map(PaperRect::from),
            self.viewport,
            self.view,
            self.padding,
        )
    }
}
