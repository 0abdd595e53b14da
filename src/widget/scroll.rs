//! Scroll state for `overflow: scroll | auto` containers.

use crate::geometry::{Offset, Region, Size};

// ---------------------------------------------------------------------------
// ScrollState
// ---------------------------------------------------------------------------

/// Offset of a scroll container's viewport into its virtual content.
///
/// The offset is always clamped into `[0, content - viewport]` per axis; a
/// viewport larger than its content pins the offset at zero. Layout updates
/// the two sizes each pass, re-clamping whatever offset the application set
/// in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    offset: Offset,
    content_size: Size,
    viewport_size: Size,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Maximum legal offset per axis.
    pub fn max_scroll(&self) -> Offset {
        Offset::new(
            self.content_size.width - self.viewport_size.width,
            self.content_size.height - self.viewport_size.height,
        )
    }

    /// Jump to an absolute offset, clamped. Returns whether it moved.
    pub fn scroll_to(&mut self, offset: Offset) -> bool {
        let clamped = offset.clamped(self.max_scroll());
        if clamped == self.offset {
            return false;
        }
        self.offset = clamped;
        true
    }

    /// Scroll by a delta, clamped. Returns whether it moved.
    pub fn scroll_by(&mut self, delta: Offset) -> bool {
        self.scroll_to(self.offset + delta)
    }

    pub fn is_scrollable_x(&self) -> bool {
        self.content_size.width > self.viewport_size.width
    }

    pub fn is_scrollable_y(&self) -> bool {
        self.content_size.height > self.viewport_size.height
    }

    /// The window into content coordinates currently on screen.
    pub fn visible_region(&self) -> Region {
        Region::new(
            self.offset.x,
            self.offset.y,
            self.viewport_size.width,
            self.viewport_size.height,
        )
    }

    /// Update the content extent, re-clamping the offset.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
        self.offset = self.offset.clamped(self.max_scroll());
    }

    /// Update the viewport extent, re-clamping the offset.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.offset = self.offset.clamped(self.max_scroll());
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state(content: (i32, i32), viewport: (i32, i32)) -> ScrollState {
        let mut s = ScrollState::new();
        s.set_content_size(Size::new(content.0, content.1));
        s.set_viewport_size(Size::new(viewport.0, viewport.1));
        s
    }

    #[test]
    fn new_state_at_origin() {
        let s = ScrollState::new();
        assert_eq!(s.offset(), Offset::ZERO);
        assert!(!s.is_scrollable_x());
        assert!(!s.is_scrollable_y());
    }

    #[test]
    fn scroll_to_clamps() {
        let mut s = state((100, 50), (80, 24));
        assert!(s.scroll_to(Offset::new(500, 500)));
        assert_eq!(s.offset(), Offset::new(20, 26));

        assert!(s.scroll_to(Offset::new(-5, -5)));
        assert_eq!(s.offset(), Offset::ZERO);
    }

    #[test]
    fn scroll_to_same_reports_unmoved() {
        let mut s = state((100, 50), (80, 24));
        assert!(!s.scroll_to(Offset::ZERO));
    }

    #[test]
    fn scroll_by_accumulates() {
        let mut s = state((100, 100), (10, 10));
        s.scroll_by(Offset::new(3, 4));
        s.scroll_by(Offset::new(3, 4));
        assert_eq!(s.offset(), Offset::new(6, 8));
    }

    #[test]
    fn content_smaller_than_viewport_pins_at_zero() {
        let mut s = state((5, 5), (80, 24));
        assert!(!s.scroll_to(Offset::new(3, 3)));
        assert_eq!(s.offset(), Offset::ZERO);
    }

    #[test]
    fn shrinking_content_reclamps_offset() {
        let mut s = state((100, 100), (10, 10));
        s.scroll_to(Offset::new(90, 90));
        assert_eq!(s.offset(), Offset::new(90, 90));

        s.set_content_size(Size::new(50, 50));
        assert_eq!(s.offset(), Offset::new(40, 40));
    }

    #[test]
    fn growing_viewport_reclamps_offset() {
        let mut s = state((100, 100), (10, 10));
        s.scroll_to(Offset::new(90, 90));
        s.set_viewport_size(Size::new(60, 60));
        assert_eq!(s.offset(), Offset::new(40, 40));
    }

    #[test]
    fn visible_region_tracks_offset() {
        let mut s = state((100, 100), (10, 5));
        s.scroll_to(Offset::new(20, 30));
        assert_eq!(s.visible_region(), Region::new(20, 30, 10, 5));
    }

    #[test]
    fn scrollable_predicates() {
        let s = state((100, 10), (80, 24));
        assert!(s.is_scrollable_x());
        assert!(!s.is_scrollable_y());
    }
}
