#![forbid(unsafe_code)]

//! Events pushed into the engine by the embedding host.
//!
//! The host owns the real event loop (browser, test harness, replay script)
//! and forwards only what the tour engine reacts to.

use crate::geometry::Size;

/// Keys the tour overlay responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourKey {
    Escape,
    Enter,
    ArrowLeft,
    ArrowRight,
}

/// A host event relevant to the tour engine.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The window was resized to the given viewport size.
    Resize(Size),
    /// The document (or a scroll container) scrolled.
    Scroll,
    /// A key was pressed while the overlay had focus.
    Key(TourKey),
    /// The router settled on a new path.
    RouteChanged(String),
}

impl HostEvent {
    /// True for events that move elements relative to the viewport.
    #[must_use]
    pub fn is_viewport_change(&self) -> bool {
        matches!(self, HostEvent::Resize(_) | HostEvent::Scroll)
    }
}
