//! G-code motion parsing
//!
//! Only linear motion (`G0`/`G1`) is interpreted; everything else is
//! skipped without touching the cursor.

pub mod parser;

pub use parser::{GcodeParser, MotionSegment, ParsedToolpath, ToolpathStats};
