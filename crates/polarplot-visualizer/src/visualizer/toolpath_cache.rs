use crate::gcode::{GcodeParser, ParsedToolpath};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Parsed toolpath keyed by a hash of its source text.
///
/// A changed source always replaces the whole segment list.
#[derive(Debug, Default, Clone)]
pub struct ToolpathCache {
    content_hash: Option<u64>,
    toolpath: Arc<ParsedToolpath>,
}

impl ToolpathCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_source(source: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        hasher.finish()
    }

    pub fn needs_update(&self, source: &str) -> bool {
        self.content_hash != Some(Self::hash_source(source))
    }

    /// Reparse `source` unless it matches the cached text.
    ///
    /// Returns `true` when the toolpath was replaced.
    pub fn update(&mut self, parser: &GcodeParser, source: &str) -> bool {
        let new_hash = Self::hash_source(source);
        if self.content_hash == Some(new_hash) {
            debug!("G-code hash unchanged, skipping parse");
            return false;
        }

        debug!("Parsing new G-code (hash: {})", new_hash);
        self.toolpath = Arc::new(parser.parse(source));
        self.content_hash = Some(new_hash);
        true
    }

    pub fn toolpath(&self) -> Arc<ParsedToolpath> {
        Arc::clone(&self.toolpath)
    }

    pub fn len(&self) -> usize {
        self.toolpath.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toolpath.is_empty()
    }

    pub fn clear(&mut self) {
        self.content_hash = None;
        self.toolpath = Arc::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_source_is_parsed_once() {
        let parser = GcodeParser::new();
        let mut cache = ToolpathCache::new();

        assert!(cache.needs_update("G1 X1"));
        assert!(cache.update(&parser, "G1 X1"));
        assert!(!cache.needs_update("G1 X1"));
        assert!(!cache.update(&parser, "G1 X1"));
        assert_eq!(cache.len(), 1);

        assert!(cache.update(&parser, "G1 X1\nG1 X2"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_empty_source_still_caches() {
        let parser = GcodeParser::new();
        let mut cache = ToolpathCache::new();
        assert!(cache.update(&parser, ""));
        assert!(!cache.update(&parser, ""));
        assert!(cache.is_empty());

        cache.clear();
        assert!(cache.needs_update(""));
    }
}
