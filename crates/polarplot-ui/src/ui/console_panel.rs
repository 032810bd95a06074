//! Console Panel
//!
//! Paged view of the session log with collapsible long responses and
//! scroll-follow behaviour for new entries.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime};
use polarplot_core::constants::{FOLLOW_THRESHOLD_PX, LOG_PAGE_SIZE, RESPONSE_PREVIEW_CHARS};
use polarplot_core::{LogEntry, SessionEvent};
use tracing::trace;

/// Console sizing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolePanelConfig {
    /// Entries per page
    pub page_size: usize,
    /// Responses longer than this many characters start collapsed
    pub response_preview_chars: usize,
    /// Distance from the bottom, in pixels, that still counts as following
    pub follow_threshold_px: f64,
}

impl Default for ConsolePanelConfig {
    fn default() -> Self {
        Self {
            page_size: LOG_PAGE_SIZE,
            response_preview_chars: RESPONSE_PREVIEW_CHARS,
            follow_threshold_px: FOLLOW_THRESHOLD_PX,
        }
    }
}

/// What the host should do with its scroll position after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    /// Scroll to the newest entry
    FollowToBottom,
    /// Leave the scroll position alone
    Stay,
}

/// Tracks whether the operator is reading the newest entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFollow {
    threshold: f64,
    distance_from_bottom: f64,
}

impl ScrollFollow {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            distance_from_bottom: 0.0,
        }
    }

    /// Record the host's scroll metrics, in pixels
    pub fn update(&mut self, scroll_top: f64, viewport_height: f64, content_height: f64) {
        self.distance_from_bottom = (content_height - scroll_top - viewport_height).max(0.0);
    }

    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom <= self.threshold
    }

    /// Decide, before content is added, whether to follow it
    pub fn action(&self, forced: bool) -> ScrollAction {
        if forced || self.is_near_bottom() {
            ScrollAction::FollowToBottom
        } else {
            ScrollAction::Stay
        }
    }

    fn pin_to_bottom(&mut self) {
        self.distance_from_bottom = 0.0;
    }
}

/// Console/Output panel for the session log
#[derive(Debug, Clone)]
pub struct ConsolePanel {
    config: ConsolePanelConfig,
    entries: Vec<LogEntry>,
    /// 1-based
    current_page: usize,
    /// Indices of entries whose long response is shown in full
    expanded: HashSet<usize>,
    scroll: ScrollFollow,
}

impl Default for ConsolePanel {
    fn default() -> Self {
        Self::new(ConsolePanelConfig::default())
    }
}

impl ConsolePanel {
    pub fn new(config: ConsolePanelConfig) -> Self {
        let config = ConsolePanelConfig {
            page_size: config.page_size.max(1),
            ..config
        };
        Self {
            config,
            entries: Vec::new(),
            current_page: 1,
            expanded: HashSet::new(),
            scroll: ScrollFollow::new(config.follow_threshold_px),
        }
    }

    pub fn config(&self) -> &ConsolePanelConfig {
        &self.config
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `ceil(len / page_size)`; zero for an empty log
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.config.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Go to `page`, clamped to the available pages
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.page_count().max(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Entries on the current page, with their log indices
    pub fn page_entries(&self) -> impl Iterator<Item = (usize, &LogEntry)> {
        let start = (self.current_page - 1) * self.config.page_size;
        self.entries
            .iter()
            .enumerate()
            .skip(start)
            .take(self.config.page_size)
    }

    pub fn scroll(&self) -> &ScrollFollow {
        &self.scroll
    }

    /// Report the host's scroll metrics
    pub fn update_scroll(&mut self, scroll_top: f64, viewport_height: f64, content_height: f64) {
        self.scroll
            .update(scroll_top, viewport_height, content_height);
    }

    /// Add one entry and jump to the last page
    pub fn append(&mut self, entry: LogEntry) -> ScrollAction {
        let action = self.scroll.action(false);
        self.entries.push(entry);
        self.current_page = self.page_count();
        if action == ScrollAction::FollowToBottom {
            self.scroll.pin_to_bottom();
        }
        trace!(
            "Console append: {} entries, page {}/{}",
            self.entries.len(),
            self.current_page,
            self.page_count()
        );
        action
    }

    /// Replace every entry, e.g. after a full log reload. Always follows.
    pub fn replace(&mut self, entries: Vec<LogEntry>) -> ScrollAction {
        self.entries = entries;
        self.expanded.clear();
        self.set_page(self.page_count());
        self.scroll.pin_to_bottom();
        self.scroll.action(true)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.expanded.clear();
        self.current_page = 1;
        self.scroll.pin_to_bottom();
    }

    /// Apply a session change.
    ///
    /// Reloads carry only a count, so the caller passes the session's
    /// entries for those; other events ignore `entries`.
    pub fn apply(&mut self, event: &SessionEvent, entries: &[LogEntry]) -> Option<ScrollAction> {
        match event {
            SessionEvent::EntryAppended { entry, .. } => Some(self.append(entry.clone())),
            SessionEvent::LogReloaded { .. } => Some(self.replace(entries.to_vec())),
            SessionEvent::LogCleared => {
                self.clear();
                Some(ScrollAction::FollowToBottom)
            }
            SessionEvent::StateChanged(_) | SessionEvent::CommandFailed { .. } => None,
        }
    }

    /// Whether the response at `index` is long enough to collapse
    pub fn is_collapsible(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.response.chars().count() > self.config.response_preview_chars)
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    /// Flip expand/collapse for a long response. Returns the new state.
    pub fn toggle_expanded(&mut self, index: usize) -> bool {
        if !self.is_collapsible(index) {
            return false;
        }
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }

    /// Response text as currently shown
    pub fn display_response(&self, index: usize) -> Option<Cow<'_, str>> {
        let entry = self.entries.get(index)?;
        if self.is_expanded(index) {
            return Some(Cow::Borrowed(&entry.response));
        }
        Some(truncate_response(
            &entry.response,
            self.config.response_preview_chars,
        ))
    }

    /// Render the entry at `index` as console lines
    pub fn format_entry(&self, index: usize) -> Option<String> {
        let entry = self.entries.get(index)?;
        let response = self.display_response(index)?;
        let mut text = format!("[{}] > {}", format_timestamp(&entry.timestamp), entry.command);
        for line in response.lines() {
            text.push_str("\n  ");
            text.push_str(line);
        }
        Some(text)
    }
}

/// Cut `response` to `max_chars` characters plus an ellipsis
pub fn truncate_response(response: &str, max_chars: usize) -> Cow<'_, str> {
    match response.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}…", &response[..cut])),
        None => Cow::Borrowed(response),
    }
}

/// `HH:MM:SS` for an ISO-8601 timestamp, or the raw string if it
/// does not parse
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format("%H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%H:%M:%S").to_string();
    }
    timestamp.to_string()
}
