#![forbid(unsafe_code)]

//! Capabilities the engine consumes from its host.
//!
//! The engine never touches a real DOM or router. It sees them through the
//! two narrow traits below, which makes every algorithm testable against
//! synthetic geometry.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{Rect, Size};

/// Client-side router.
///
/// Navigation is fire-and-forget: the engine requests a path and moves on.
pub trait Router {
    /// The current path, e.g. `/dashboard`.
    fn current_path(&self) -> String;

    /// Request navigation to `path`.
    fn navigate(&mut self, path: &str);
}

/// Element lookup and measurement.
///
/// Implementations resolve a selector to the first matching element in
/// document order. Empty or invalid selectors resolve to nothing.
pub trait ElementLocator {
    /// Bounding rectangle of the first element matching `selector`, in
    /// viewport coordinates.
    fn bounding_rect(&self, selector: &str) -> Option<Rect>;

    /// Scroll the first element matching `selector` to the center of the
    /// viewport on both axes. Returns `false` if nothing matched.
    fn scroll_into_view(&mut self, selector: &str) -> bool;

    /// Current viewport (window inner) size.
    fn viewport(&self) -> Size;
}

#[derive(Debug)]
struct RouterState {
    path: String,
    history: Vec<String>,
}

/// In-memory router for headless hosts and tests.
///
/// Clones share state, so a fake DOM can observe the path the engine
/// navigated to.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    inner: Rc<RefCell<RouterState>>,
}

impl MemoryRouter {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RouterState {
                path: path.into(),
                history: Vec::new(),
            })),
        }
    }

    /// Every path requested through [`Router::navigate`], oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.borrow().history.clone()
    }

    /// Move to `path` without recording it, as a user clicking a link would.
    pub fn set_path(&self, path: impl Into<String>) {
        self.inner.borrow_mut().path = path.into();
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.inner.borrow().path.clone()
    }

    fn navigate(&mut self, path: &str) {
        let mut state = self.inner.borrow_mut();
        state.path = path.to_string();
        state.history.push(path.to_string());
    }
}
