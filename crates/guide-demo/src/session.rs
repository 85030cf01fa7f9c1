#![forbid(unsafe_code)]

//! Host loop glue: one tour machine, one overlay, one headless DOM.
//!
//! Every entry point takes the host clock so a session can be replayed
//! deterministically.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use guide_core::Catalog;
use guide_core::event::HostEvent;
use guide_core::geometry::Size;
use guide_core::host::MemoryRouter;
use guide_runtime::{CompletionStore, MachineConfig, TourCommand, TourEvent, TourMachine};
use guide_widgets::{OverlayFrame, PositionConfig, TourOverlay};

use crate::host::HeadlessDom;

/// A running dashboard session.
#[derive(Debug)]
pub struct Session {
    machine: TourMachine<MemoryRouter>,
    overlay: TourOverlay,
    dom: HeadlessDom,
}

impl Session {
    /// Build a session on the dashboard layout, starting at `path`.
    pub fn new(
        catalog: Arc<Catalog>,
        store: CompletionStore,
        config: MachineConfig,
        path: &str,
        viewport: Size,
    ) -> Self {
        let router = MemoryRouter::new(path);
        let dom = HeadlessDom::dashboard(router.clone(), viewport);
        Self::with_dom(catalog, store, config, router, dom)
    }

    /// Build a session around a custom DOM sharing `router`.
    pub fn with_dom(
        catalog: Arc<Catalog>,
        store: CompletionStore,
        config: MachineConfig,
        router: MemoryRouter,
        dom: HeadlessDom,
    ) -> Self {
        Self {
            machine: TourMachine::with_config(catalog, store, router, config),
            overlay: TourOverlay::new(PositionConfig::default()),
            dom,
        }
    }

    #[must_use]
    pub fn machine(&self) -> &TourMachine<MemoryRouter> {
        &self.machine
    }

    #[must_use]
    pub fn overlay(&self) -> &TourOverlay {
        &self.overlay
    }

    #[must_use]
    pub fn dom(&self) -> &HeadlessDom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut HeadlessDom {
        &mut self.dom
    }

    /// Mount the engine. Returns whether auto-start was armed.
    pub fn mount(&mut self, now: Duration) -> bool {
        let armed = self.machine.mount(now);
        self.sync(now);
        armed
    }

    pub fn dispose(&mut self) {
        self.machine.dispose();
        self.overlay.teardown();
    }

    /// Advance the clock.
    pub fn tick(&mut self, now: Duration) -> Option<TourEvent> {
        let event = self.machine.tick(now);
        if event.is_some() {
            self.sync(now);
        }
        event
    }

    pub fn start(&mut self, tour_id: &str, now: Duration) -> Option<TourEvent> {
        let event = self.machine.start_tour(tour_id);
        self.sync(now);
        event
    }

    /// Apply a user intent, as a tooltip button click would.
    pub fn apply(&mut self, command: TourCommand, now: Duration) -> Option<TourEvent> {
        let event = self.machine.apply(command);
        self.sync(now);
        event
    }

    /// Forward a host event. Viewport events nobody subscribed to are
    /// dropped before reaching the overlay.
    pub fn dispatch(&mut self, event: &HostEvent, now: Duration) -> Option<TourEvent> {
        if event.is_viewport_change() && !self.overlay.listeners().wants(event) {
            tracing::trace!(?event, "viewport event without listeners");
            return None;
        }
        let view = self.machine.view();
        let command = self.overlay.handle_event(event, &view, &mut self.dom)?;
        self.apply(command, now)
    }

    /// Frame the renderer would draw at `now`.
    #[must_use]
    pub fn frame(&self, now: Duration) -> Option<OverlayFrame<'_>> {
        self.overlay.frame(&self.machine.view(), now)
    }

    /// One-line text rendering of the current frame.
    #[must_use]
    pub fn describe(&self, now: Duration) -> String {
        let Some(frame) = self.frame(now) else {
            return if self.machine.state().is_active() {
                "(tour active, step not shown)".to_string()
            } else {
                "(no tour)".to_string()
            };
        };
        let tooltip = frame.tooltip();
        let mut line = String::new();
        if let Some(progress) = &frame.progress {
            let _ = write!(line, "[{progress}] ");
        }
        let _ = write!(
            line,
            "{} @ ({:.0}, {:.0}) {}",
            frame.title,
            tooltip.x,
            tooltip.y,
            frame.placement().as_str()
        );
        if frame.layout.is_flipped() {
            let _ = write!(line, " (flipped from {})", frame.layout.requested.as_str());
        }
        if !frame.visible {
            line.push_str(" [fading in]");
        }
        line
    }

    fn sync(&mut self, now: Duration) {
        let view = self.machine.view();
        self.overlay.sync(&view, &mut self.dom, now);
    }
}
