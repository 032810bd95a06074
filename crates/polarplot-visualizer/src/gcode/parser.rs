//! G-code motion parser
//!
//! Turns program text into an ordered list of straight motion segments and
//! the bounding box of their endpoints.
//!
//! The parser is a single forward pass with one piece of state, the pen
//! cursor, which starts at the origin. For every line:
//! - everything from `;` onward is dropped and the rest trimmed
//! - lines without a whole-word `G0`/`G00` (travel) or `G1`/`G01` (draw)
//!   are skipped and leave the cursor alone
//! - `X`/`Y` arguments default to the cursor's current value
//! - a coordinate that is present but not a number skips the line
//! - a move to the current cursor position is dropped
//!
//! Position resets (`G92`) and unit selection (`G20`/`G21`) are not
//! interpreted. Programs that rely on them preview in the wrong place.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::visualizer::viewport::{BoundingBox, Point2D};

/// One straight pen movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSegment {
    pub from: Point2D,
    pub to: Point2D,
    /// `true` for draw moves (`G1`), `false` for travel moves (`G0`)
    pub pen_down: bool,
}

impl MotionSegment {
    /// Euclidean length in model units
    pub fn length(&self) -> f64 {
        self.from.distance_to(self.to)
    }
}

/// Result of parsing a program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedToolpath {
    /// Segments in source line order
    pub segments: Vec<MotionSegment>,
    /// Exact extent of all segment endpoints, `None` when there are no segments
    pub bounds: Option<BoundingBox>,
}

impl ParsedToolpath {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Summary counts and distances
    pub fn stats(&self) -> ToolpathStats {
        let mut stats = ToolpathStats::default();
        for segment in &self.segments {
            if segment.pen_down {
                stats.draw_moves += 1;
                stats.draw_distance += segment.length();
            } else {
                stats.travel_moves += 1;
                stats.travel_distance += segment.length();
            }
        }
        stats
    }
}

/// Move counts and distances for a parsed program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathStats {
    pub draw_moves: usize,
    pub travel_moves: usize,
    pub draw_distance: f64,
    pub travel_distance: f64,
}

/// Linear-motion G-code parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcodeParser;

fn motion_regex() -> &'static Regex {
    static MOTION_REGEX: OnceLock<Regex> = OnceLock::new();
    MOTION_REGEX.get_or_init(|| Regex::new(r"(?i)\bG0?([01])\b").expect("invalid regex pattern"))
}

fn x_regex() -> &'static Regex {
    static X_REGEX: OnceLock<Regex> = OnceLock::new();
    X_REGEX.get_or_init(|| Regex::new(r"(?i)X([-+.0-9]+)").expect("invalid regex pattern"))
}

fn y_regex() -> &'static Regex {
    static Y_REGEX: OnceLock<Regex> = OnceLock::new();
    Y_REGEX.get_or_init(|| Regex::new(r"(?i)Y([-+.0-9]+)").expect("invalid regex pattern"))
}

/// Outcome of reading one coordinate argument.
enum Axis {
    Missing,
    Value(f64),
    Invalid,
}

fn read_axis(regex: &Regex, line: &str) -> Axis {
    match regex.captures(line).and_then(|caps| caps.get(1)) {
        None => Axis::Missing,
        Some(m) => match m.as_str().parse::<f64>() {
            Ok(value) if value.is_finite() => Axis::Value(value),
            _ => Axis::Invalid,
        },
    }
}

impl GcodeParser {
    /// Create a new G-code parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a full program. Never fails; unusable lines are skipped.
    pub fn parse(&self, text: &str) -> ParsedToolpath {
        debug!("Starting G-code parse, input size: {} bytes", text.len());

        let mut segments = Vec::new();
        let mut bounds: Option<BoundingBox> = None;
        let mut cursor = Point2D::new(0.0, 0.0);
        let mut ignored_lines = 0usize;
        let mut invalid_lines = 0usize;

        for (line_num, raw) in text.lines().enumerate() {
            let line = match raw.find(';') {
                Some(idx) => &raw[..idx],
                None => raw,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some(pen_down) = motion_regex()
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str() == "1")
            else {
                ignored_lines += 1;
                continue;
            };

            let x = match read_axis(x_regex(), line) {
                Axis::Missing => cursor.x,
                Axis::Value(v) => v,
                Axis::Invalid => {
                    trace!("Line {}: unparseable X, skipped", line_num + 1);
                    invalid_lines += 1;
                    continue;
                }
            };
            let y = match read_axis(y_regex(), line) {
                Axis::Missing => cursor.y,
                Axis::Value(v) => v,
                Axis::Invalid => {
                    trace!("Line {}: unparseable Y, skipped", line_num + 1);
                    invalid_lines += 1;
                    continue;
                }
            };

            let target = Point2D::new(x, y);
            if target == cursor {
                continue;
            }

            segments.push(MotionSegment {
                from: cursor,
                to: target,
                pen_down,
            });

            let bbox = bounds.get_or_insert_with(|| BoundingBox::at(cursor));
            bbox.include(cursor);
            bbox.include(target);
            cursor = target;
        }

        debug!(
            "Parse complete: {} segments, {} lines ignored, {} lines with invalid coordinates",
            segments.len(),
            ignored_lines,
            invalid_lines
        );

        ParsedToolpath { segments, bounds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedToolpath {
        GcodeParser::new().parse(text)
    }

    #[test]
    fn test_square_scenario() {
        let result = parse("G0 X0 Y0\nG1 X10 Y0\nG1 X10 Y10\nG0 X0 Y0\n");

        assert_eq!(result.segments.len(), 3);
        assert_eq!(
            result.segments[0],
            MotionSegment {
                from: Point2D::new(0.0, 0.0),
                to: Point2D::new(10.0, 0.0),
                pen_down: true,
            }
        );
        assert_eq!(
            result.segments[1],
            MotionSegment {
                from: Point2D::new(10.0, 0.0),
                to: Point2D::new(10.0, 10.0),
                pen_down: true,
            }
        );
        assert_eq!(
            result.segments[2],
            MotionSegment {
                from: Point2D::new(10.0, 10.0),
                to: Point2D::new(0.0, 0.0),
                pen_down: false,
            }
        );

        let bounds = result.bounds.expect("bounds should exist");
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_y, 10.0);
    }

    #[test]
    fn test_empty_input() {
        let result = parse("");
        assert!(result.is_empty());
        assert!(result.bounds.is_none());
    }

    #[test]
    fn test_comments_are_stripped() {
        let result = parse("; header\nG1 X5 ; Y99 is a comment\n   ;G1 X100\n");
        assert_eq!(result.len(), 1);
        assert_eq!(result.segments[0].to, Point2D::new(5.0, 0.0));
    }

    #[test]
    fn test_missing_axis_keeps_cursor_value() {
        let result = parse("G1 X5 Y7\nG1 X9\nG1 Y-3");
        assert_eq!(result.segments[1].to, Point2D::new(9.0, 7.0));
        assert_eq!(result.segments[2].to, Point2D::new(9.0, -3.0));
    }

    #[test]
    fn test_long_and_lowercase_tokens() {
        let result = parse("g00 x1 y1\nG01 X2 Y2\ng1 x3 y3\nG0 X4 Y4");
        let kinds: Vec<bool> = result.segments.iter().map(|s| s.pen_down).collect();
        assert_eq!(kinds, vec![false, true, true, false]);
    }

    #[test]
    fn test_tokens_must_be_whole_words() {
        let result = parse("G10 X5\nG11 X6\nG001 X7\nXG1 X8\nG2 X9 Y9 I1 J1");
        assert!(result.is_empty());
    }

    #[test]
    fn test_other_commands_do_not_move_cursor() {
        let result = parse("G1 X10 Y10\nG92 X0 Y0\nG21\nM3 S1000\nG1 X20 Y10");
        assert_eq!(result.len(), 2);
        assert_eq!(result.segments[1].from, Point2D::new(10.0, 10.0));
    }

    #[test]
    fn test_invalid_number_skips_line() {
        let result = parse("G1 X10 Y10\nG1 X1.2.3 Y5\nG1 X- Y5\nG1 X20 Y20");
        assert_eq!(result.len(), 2);
        assert_eq!(result.segments[1].from, Point2D::new(10.0, 10.0));
        assert_eq!(result.segments[1].to, Point2D::new(20.0, 20.0));
    }

    #[test]
    fn test_no_op_moves_are_dropped() {
        let result = parse("G1 X0 Y0\nG1\nG0 X3\nG1 X3 Y0");
        assert_eq!(result.len(), 1);
        assert!(!result.segments[0].pen_down);
    }

    #[test]
    fn test_bounds_exclude_origin_when_unvisited() {
        let result = parse("G0 X100 Y100\nG1 X200 Y150");
        let bounds = result.bounds.expect("bounds should exist");
        // The first travel starts at the origin, so it is included
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 200.0);
        assert_eq!(bounds.max_y, 150.0);
    }

    #[test]
    fn test_signed_decimals() {
        let result = parse("G1 X-12.5 Y+3.25\nG1 X.5 Y-.75");
        assert_eq!(result.segments[0].to, Point2D::new(-12.5, 3.25));
        assert_eq!(result.segments[1].to, Point2D::new(0.5, -0.75));
    }

    #[test]
    fn test_stats() {
        let stats = parse("G1 X3 Y4\nG0 X3 Y0\nG1 X0 Y0").stats();
        assert_eq!(stats.draw_moves, 2);
        assert_eq!(stats.travel_moves, 1);
        assert!((stats.draw_distance - 8.0).abs() < 1e-9);
        assert!((stats.travel_distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_crlf_line_endings() {
        let result = parse("G1 X1 Y1\r\nG1 X2 Y2\r\n");
        assert_eq!(result.len(), 2);
    }
}
