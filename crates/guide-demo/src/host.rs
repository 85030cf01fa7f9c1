#![forbid(unsafe_code)]

//! Headless stand-in for the browser: a page-aware element table with a
//! scrollable document, sharing its route with the engine's router.

use guide_core::event::HostEvent;
use guide_core::geometry::{Point, Rect, Size};
use guide_core::host::{ElementLocator, MemoryRouter, Router};

/// One element in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub selector: String,
    /// Route fragment the element is rendered on; `None` for the app shell.
    pub page: Option<String>,
    pub rect: Rect,
}

/// Fake DOM keyed by selector.
///
/// Lookups only see elements whose page is part of the router's current
/// path, mirroring a router that unmounts the previous page.
#[derive(Debug, Clone)]
pub struct HeadlessDom {
    router: MemoryRouter,
    viewport: Size,
    scroll: Point,
    elements: Vec<Element>,
}

impl HeadlessDom {
    #[must_use]
    pub fn new(router: MemoryRouter, viewport: Size) -> Self {
        Self {
            router,
            viewport,
            scroll: Point::default(),
            elements: Vec::new(),
        }
    }

    /// The dashboard layout the built-in catalog targets.
    #[must_use]
    pub fn dashboard(router: MemoryRouter, viewport: Size) -> Self {
        Self::new(router, viewport)
            .with_element("#sidebar-nav", None, Rect::new(0.0, 64.0, 240.0, 640.0))
            .with_element(
                "#instances-list",
                Some("instancias"),
                Rect::new(280.0, 120.0, 900.0, 420.0),
            )
            .with_element(
                "#new-campaign",
                Some("campanhas"),
                Rect::new(1080.0, 80.0, 160.0, 40.0),
            )
            .with_element(
                "#campaign-list",
                Some("campanhas"),
                Rect::new(280.0, 1400.0, 900.0, 480.0),
            )
            .with_element(
                "#import-leads",
                Some("leads"),
                Rect::new(280.0, 80.0, 180.0, 40.0),
            )
            .with_element(
                "#leads-table",
                Some("leads"),
                Rect::new(280.0, 160.0, 960.0, 900.0),
            )
            .with_element(
                "#agent-form",
                Some("agentes"),
                Rect::new(280.0, 120.0, 600.0, 700.0),
            )
    }

    #[must_use]
    pub fn with_element(mut self, selector: &str, page: Option<&str>, rect: Rect) -> Self {
        self.insert(selector, page, rect);
        self
    }

    /// Add an element after construction, as a lazily rendered page would.
    pub fn insert(&mut self, selector: &str, page: Option<&str>, rect: Rect) {
        self.elements.push(Element {
            selector: selector.to_string(),
            page: page.map(str::to_string),
            rect,
        });
    }

    /// Remove every element matching `selector`.
    pub fn remove(&mut self, selector: &str) {
        self.elements.retain(|element| element.selector != selector);
    }

    #[must_use]
    pub fn scroll_offset(&self) -> Point {
        self.scroll
    }

    /// Resize the window and return the event to forward.
    pub fn resize(&mut self, size: Size) -> HostEvent {
        self.viewport = size;
        HostEvent::Resize(size)
    }

    /// Scroll the document by a delta and return the event to forward.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> HostEvent {
        self.scroll = Point::new((self.scroll.x + dx).max(0.0), (self.scroll.y + dy).max(0.0));
        HostEvent::Scroll
    }

    /// Follow a link without going through the engine.
    pub fn visit(&mut self, path: &str) -> HostEvent {
        self.router.set_path(path);
        self.scroll = Point::default();
        HostEvent::RouteChanged(path.to_string())
    }

    fn find(&self, selector: &str) -> Option<&Element> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        let path = self.router.current_path();
        self.elements.iter().find(|element| {
            element.selector == selector
                && element
                    .page
                    .as_deref()
                    .is_none_or(|page| path.contains(page))
        })
    }
}

impl ElementLocator for HeadlessDom {
    fn bounding_rect(&self, selector: &str) -> Option<Rect> {
        self.find(selector)
            .map(|element| element.rect.translate(-self.scroll.x, -self.scroll.y))
    }

    fn scroll_into_view(&mut self, selector: &str) -> bool {
        let Some(center) = self.find(selector).map(|element| element.rect.center()) else {
            return false;
        };
        self.scroll = Point::new(
            (center.x - self.viewport.width / 2.0).max(0.0),
            (center.y - self.viewport.height / 2.0).max(0.0),
        );
        tracing::trace!(
            selector,
            x = self.scroll.x,
            y = self.scroll.y,
            "scrolled into view"
        );
        true
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}
