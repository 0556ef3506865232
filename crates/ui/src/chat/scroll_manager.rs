use gpui::{Pixels, ScrollHandle, px};

/// How close to the tail the viewport must be for new rows to pull it down.
const FOLLOW_THRESHOLD: Pixels = px(24.);

/// Keeps the message list anchored to its newest row.
///
/// A reader who scrolled up into the history stays put when rows arrive; one
/// sitting at (or near) the bottom is carried along.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    /// Whether the last painted frame left the viewport at the tail.
    pub fn is_following_tail(&self) -> bool {
        near_tail(
            self.scroll_handle.offset().y,
            self.scroll_handle.max_offset().height,
        )
    }

    /// Call after rows were appended and before the next frame.
    ///
    /// The jump is resolved by gpui during prepaint, once the new rows have
    /// been measured, so the appended row ends up fully on screen.
    pub fn rows_appended(&self) -> bool {
        let follow = self.is_following_tail();
        if follow {
            self.scroll_handle.scroll_to_bottom();
        }
        follow
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

/// gpui scrolls with negative Y offsets, so `offset + max` reaches 0 at the tail.
fn near_tail(offset: Pixels, max_offset: Pixels) -> bool {
    if max_offset <= Pixels::ZERO {
        return true;
    }

    (offset + max_offset).abs() <= FOLLOW_THRESHOLD
}
