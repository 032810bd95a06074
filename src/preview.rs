//! Headless preview: G-code file in, SVG document out.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Args;
use polarplot_core::Paper;
use polarplot_settings::PreviewSettings;
use polarplot_visualizer::{
    BoundingBox, PlotRenderer, Point2D, PreviewState, SvgSurface, ToolpathStats, ViewTransform,
    ViewportSize,
};
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct PreviewArgs {
    /// G-code file to render
    pub file: PathBuf,

    /// Where to write the SVG
    #[arg(short, long, default_value = "preview.svg")]
    pub output: PathBuf,

    /// Paper outline to draw (A5, A4, A3, Letter)
    #[arg(long)]
    pub paper: Option<String>,

    /// Turn the paper sideways
    #[arg(long)]
    pub landscape: bool,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Zoom applied on top of the fit
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f64,

    /// Horizontal pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub pan_x: f64,

    /// Vertical pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub pan_y: f64,
}

/// What a render produced
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOutput {
    pub svg: String,
    pub stats: ToolpathStats,
    pub bounds: Option<BoundingBox>,
}

impl PreviewOutput {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} draw moves ({:.1} mm), {} travel moves ({:.1} mm)",
            self.stats.draw_moves,
            self.stats.draw_distance,
            self.stats.travel_moves,
            self.stats.travel_distance
        );
        if let Some(b) = self.bounds {
            text.push_str(&format!(
                ", extent X {:.1}..{:.1} Y {:.1}..{:.1}",
                b.min_x, b.max_x, b.min_y, b.max_y
            ));
        }
        text
    }
}

/// Paper named on the command line, falling back to the configured default
pub fn resolve_paper(
    name: Option<&str>,
    landscape: bool,
    settings: &PreviewSettings,
) -> anyhow::Result<Option<Paper>> {
    let paper = match name {
        Some(name) => {
            Some(Paper::by_name(name).ok_or_else(|| anyhow!("unknown paper '{}'", name))?)
        }
        None => settings.paper()?,
    };
    Ok(paper.map(|p| if landscape { p.landscape() } else { p }))
}

/// Render `source` onto an SVG canvas
pub fn render(
    source: &str,
    paper: Option<Paper>,
    viewport: ViewportSize,
    view: ViewTransform,
    padding: f64,
) -> PreviewOutput {
    let mut state = PreviewState::new(viewport).with_padding(padding);
    state.set_source(source);
    state.set_paper(paper);
    state.set_view(view);

    let toolpath = state.toolpath();
    let renderer = PlotRenderer::new(state);
    let mut surface = SvgSurface::new(viewport.width, viewport.height);
    renderer.draw(&mut surface);

    PreviewOutput {
        svg: surface.into_svg(),
        stats: toolpath.stats(),
        bounds: toolpath.bounds,
    }
}

pub fn run_preview(args: &PreviewArgs, settings: &PreviewSettings) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let paper = resolve_paper(args.paper.as_deref(), args.landscape, settings)?;

    let width = args.width.unwrap_or(settings.canvas_width);
    let height = args.height.unwrap_or(settings.canvas_height);
    if width == 0 || height == 0 {
        return Err(anyhow!("canvas size must be non-zero, got {}x{}", width, height));
    }

    let output = render(
        &source,
        paper,
        ViewportSize::new(f64::from(width), f64::from(height)),
        ViewTransform::new(args.zoom, Point2D::new(args.pan_x, args.pan_y)),
        settings.padding_px,
    );

    std::fs::write(&args.output, &output.svg)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote preview to {}", args.output.display());
    println!("{}", output.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_square() {
        let output = render(
            "G0 X5 Y5\nG1 X15 Y5\nG1 X15 Y15\nG1 X5 Y15\nG1 X5 Y5",
            None,
            ViewportSize::new(400.0, 300.0),
            ViewTransform::default(),
            20.0,
        );
        assert_eq!(output.stats.draw_moves, 4);
        assert_eq!(output.stats.travel_moves, 1);
        assert!((output.stats.draw_distance - 40.0).abs() < 1e-9);
        assert_eq!(output.svg.matches("<line").count(), 5);
        assert!(output.summary().contains("4 draw moves (40.0 mm)"));
    }

    #[test]
    fn test_empty_source_still_writes_document() {
        let output = render(
            "; nothing here",
            None,
            ViewportSize::new(400.0, 300.0),
            ViewTransform::default(),
            20.0,
        );
        assert!(output.svg.starts_with("<svg"));
        assert!(output.bounds.is_none());
        assert_eq!(output.svg.matches("<line").count(), 0);
    }

    #[test]
    fn test_resolve_paper() {
        let settings = PreviewSettings {
            default_paper: Some("A5".to_string()),
            ..PreviewSettings::default()
        };

        let paper = resolve_paper(None, false, &settings).unwrap();
        assert_eq!(paper.map(|p| p.name), Some("A5".to_string()));

        let paper = resolve_paper(Some("a4"), true, &settings).unwrap().unwrap();
        assert_eq!((paper.width_mm, paper.height_mm), (297.0, 210.0));

        assert!(resolve_paper(Some("B9"), false, &settings).is_err());
    }

    fn preview_args(dir: &TempDir, source: &str) -> PreviewArgs {
        let file = dir.path().join("plot.gcode");
        std::fs::write(&file, source).unwrap();
        PreviewArgs {
            file,
            output: dir.path().join("plot.svg"),
            paper: None,
            landscape: false,
            width: Some(640),
            height: Some(480),
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    #[test]
    fn test_preview_writes_svg_with_paper() {
        let dir = TempDir::new().unwrap();
        let mut args = preview_args(&dir, "G0 X-20 Y-20\nG1 X20 Y-20\nG1 X20 Y20\n");
        args.paper = Some("a5".to_string());

        run_preview(&args, &PreviewSettings::default()).unwrap();

        let svg = std::fs::read_to_string(&args.output).unwrap();
        assert!(svg.contains(r#"width="640" height="480""#));
        assert_eq!(svg.matches("<line").count(), 3);
        // background plus paper outline
        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_preview_uses_configured_paper() {
        let dir = TempDir::new().unwrap();
        let args = preview_args(&dir, "G1 X1 Y1");
        let settings = PreviewSettings {
            default_paper: Some("Letter".to_string()),
            ..PreviewSettings::default()
        };

        run_preview(&args, &settings).unwrap();
        let svg = std::fs::read_to_string(&args.output).unwrap();
        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_preview_rejects_unknown_paper() {
        let dir = TempDir::new().unwrap();
        let mut args = preview_args(&dir, "G1 X1 Y1");
        args.paper = Some("Tabloid".to_string());

        assert!(run_preview(&args, &PreviewSettings::default()).is_err());
        assert!(!args.output.exists());
    }

    #[test]
    fn test_preview_missing_input() {
        let dir = TempDir::new().unwrap();
        let mut args = preview_args(&dir, "");
        args.file = dir.path().join("absent.gcode");

        let err = run_preview(&args, &PreviewSettings::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.gcode"));
    }
}
