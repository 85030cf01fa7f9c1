#![forbid(unsafe_code)]

//! Presentation controller for the active tour step.
//!
//! `TourOverlay` sits between the state machine's [`TourView`] and the host
//! renderer. It binds to the current step, scrolls its target into view once,
//! keeps the tooltip geometry current through a scoped viewport
//! subscription, maps keys to [`TourCommand`]s, and produces an
//! [`OverlayFrame`] the renderer draws verbatim.
//!
//! The overlay never mutates the machine. Commands returned from
//! [`TourOverlay::handle_event`] are applied by the host with
//! [`TourMachine::apply`](guide_runtime::TourMachine::apply), followed by
//! another [`TourOverlay::sync`].
//!
//! # Lifecycle
//!
//! ```text
//! sync(view) ──► new step? ──► drop old subscription
//!                    │         subscribe (resize [+ scroll])
//!                    │         scroll target into view (valid steps only)
//!                    │         layout
//!                    └──► same step, no layout yet ──► retry layout
//! inactive view ──► teardown (subscription released)
//! ```

use std::time::Duration;

use guide_core::event::{HostEvent, TourKey};
use guide_core::geometry::{Rect, Size};
use guide_core::host::ElementLocator;
use guide_core::tour::{Placement, StepAction, TourStep};
use guide_runtime::{
    TourCommand, TourView, ViewportInterest, ViewportListeners, ViewportSubscription,
};

use crate::positioning::{PositionConfig, TooltipLayout, layout_step};

/// Which controls the renderer should show for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TourControls {
    pub next: bool,
    pub previous: bool,
    pub skip: bool,
    pub finish: bool,
}

impl TourControls {
    fn for_step(step: &TourStep, view: &TourView<'_>) -> Self {
        let last = view.is_last();
        Self {
            next: step.show_next && !last,
            previous: step.show_previous && !view.is_first(),
            skip: step.show_skip && view.allow_skip(),
            finish: step.show_finish || last,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub step_index: usize,
    pub total_steps: usize,
    /// `"3 / 7"` when the tour shows progress.
    pub progress: Option<String>,
    pub layout: TooltipLayout,
    pub action: Option<&'a StepAction>,
    pub controls: TourControls,
    /// False until the step's fade-in delay has elapsed.
    pub visible: bool,
}

impl OverlayFrame<'_> {
    #[inline]
    #[must_use]
    pub fn tooltip(&self) -> Rect {
        self.layout.tooltip
    }

    #[inline]
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.layout.placement
    }

    #[inline]
    #[must_use]
    pub fn spotlight(&self) -> Option<Rect> {
        self.layout.spotlight
    }

    /// Class to keep on the target while the step is shown.
    #[must_use]
    pub fn highlight_class(&self) -> Option<&str> {
        match self.action {
            Some(StepAction::Highlight { class }) => Some(class.as_str()),
            _ => None,
        }
    }

    /// Dimmed regions around the spotlight.
    ///
    /// Without a spotlight the whole viewport is dimmed. Otherwise up to four
    /// bands (above, below, left, right) surround the cut-out; empty bands
    /// are omitted.
    #[must_use]
    pub fn backdrop(&self) -> Vec<Rect> {
        let viewport = Rect::from_size(self.layout.viewport);
        let Some(spot) = self.layout.spotlight else {
            return vec![viewport];
        };
        [
            Rect::new(0.0, 0.0, viewport.width, spot.top()),
            Rect::new(
                0.0,
                spot.bottom(),
                viewport.width,
                viewport.bottom() - spot.bottom(),
            ),
            Rect::new(0.0, spot.top(), spot.left(), spot.height),
            Rect::new(
                spot.right(),
                spot.top(),
                viewport.right() - spot.right(),
                spot.height,
            ),
        ]
        .into_iter()
        .filter(|band| !band.is_empty())
        .collect()
    }
}

/// Map a key press to a machine command for the given view.
///
/// - `Escape` skips, only when the tour allows skipping.
/// - `Enter` / `ArrowRight` advance, finishing on the last step.
/// - `ArrowLeft` goes back, except on the first step.
#[must_use]
pub fn command_for_key(key: TourKey, view: &TourView<'_>) -> Option<TourCommand> {
    if !view.is_active {
        return None;
    }
    match key {
        TourKey::Escape => view.allow_skip().then_some(TourCommand::Skip),
        TourKey::Enter | TourKey::ArrowRight => Some(if view.is_last() {
            TourCommand::Finish
        } else {
            TourCommand::Next
        }),
        TourKey::ArrowLeft => (!view.is_first()).then_some(TourCommand::Previous),
    }
}

#[derive(Debug)]
struct BoundStep {
    tour_id: String,
    index: usize,
    whole_screen: bool,
    entered_at: Duration,
    delay: Duration,
    scrolled: bool,
    layout: Option<TooltipLayout>,
    subscription: ViewportSubscription,
}

impl BoundStep {
    fn is_for(&self, view: &TourView<'_>) -> bool {
        view.tour_id() == Some(self.tour_id.as_str()) && view.current_step_index == self.index
    }
}

/// Per-step presentation state.
#[derive(Debug, Default)]
pub struct TourOverlay {
    config: PositionConfig,
    listeners: ViewportListeners,
    bound: Option<BoundStep>,
}

impl TourOverlay {
    #[must_use]
    pub fn new(config: PositionConfig) -> Self {
        Self {
            config,
            listeners: ViewportListeners::new(),
            bound: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    /// Listener table the host consults before forwarding viewport events.
    #[must_use]
    pub fn listeners(&self) -> &ViewportListeners {
        &self.listeners
    }

    /// Current tooltip geometry, if the target has been resolved.
    #[must_use]
    pub fn layout(&self) -> Option<&TooltipLayout> {
        self.bound.as_ref().and_then(|bound| bound.layout.as_ref())
    }

    /// Bring the overlay in line with `view`.
    pub fn sync(&mut self, view: &TourView<'_>, locator: &mut dyn ElementLocator, now: Duration) {
        let (Some(tour_id), Some(step)) = (view.tour_id(), view.current_step) else {
            self.teardown();
            return;
        };
        if !view.is_active {
            self.teardown();
            return;
        }

        if !self.bound.as_ref().is_some_and(|bound| bound.is_for(view)) {
            self.bind(tour_id, view.current_step_index, step, now);
        }
        self.refresh(step, view.step_valid, locator, false);
    }

    /// React to a host event. Keys yield commands; viewport and route events
    /// refresh the layout.
    pub fn handle_event(
        &mut self,
        event: &HostEvent,
        view: &TourView<'_>,
        locator: &mut dyn ElementLocator,
    ) -> Option<TourCommand> {
        match event {
            HostEvent::Key(key) => command_for_key(*key, view),
            HostEvent::Resize(_) | HostEvent::Scroll => {
                let wanted = self
                    .bound
                    .as_ref()
                    .is_some_and(|bound| bound.is_for(view) && bound.subscription.matches(event));
                if wanted && let Some(step) = view.current_step {
                    self.relayout(step, view.step_valid, locator);
                }
                None
            }
            HostEvent::RouteChanged(_) => {
                if self.bound.as_ref().is_some_and(|bound| bound.is_for(view))
                    && let Some(step) = view.current_step
                {
                    self.refresh(step, view.step_valid, locator, true);
                }
                None
            }
        }
    }

    /// Frame to render at `now`, or `None` when nothing should be drawn
    /// (inactive, step on another page, target not found).
    #[must_use]
    pub fn frame<'a>(&self, view: &TourView<'a>, now: Duration) -> Option<OverlayFrame<'a>> {
        if !view.is_active || !view.step_valid {
            return None;
        }
        let step = view.current_step?;
        let bound = self.bound.as_ref().filter(|bound| bound.is_for(view))?;
        let layout = bound.layout?;

        let progress = view.show_progress().then(|| {
            format!("{} / {}", view.current_step_index + 1, view.total_steps)
        });

        Some(OverlayFrame {
            title: &step.title,
            content: &step.content,
            step_index: view.current_step_index,
            total_steps: view.total_steps,
            progress,
            layout,
            action: step.action.as_ref(),
            controls: TourControls::for_step(step, view),
            visible: now >= bound.entered_at.saturating_add(bound.delay),
        })
    }

    /// Release the current step binding and its subscription.
    pub fn teardown(&mut self) {
        if let Some(bound) = self.bound.take() {
            tracing_debug_unbind(&bound);
        }
    }

    fn bind(&mut self, tour_id: &str, index: usize, step: &TourStep, now: Duration) {
        let whole_screen = step.is_whole_screen();
        let interest = if whole_screen {
            ViewportInterest::RESIZE
        } else {
            ViewportInterest::RESIZE | ViewportInterest::SCROLL
        };
        // Old subscription drops here, before the new one is registered.
        self.teardown();
        self.bound = Some(BoundStep {
            tour_id: tour_id.to_string(),
            index,
            whole_screen,
            entered_at: now,
            delay: Duration::from_millis(step.delay.unwrap_or(0)),
            scrolled: false,
            layout: None,
            subscription: self.listeners.subscribe(interest),
        });
    }

    /// Scroll on first valid sight, then lay out if missing (or always when
    /// `force`, e.g. after the page changed underneath).
    fn refresh(
        &mut self,
        step: &TourStep,
        valid: bool,
        locator: &mut dyn ElementLocator,
        force: bool,
    ) {
        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        if !valid {
            return;
        }
        if !bound.scrolled && !bound.whole_screen {
            bound.scrolled = locator.scroll_into_view(&step.target);
        }
        if force || bound.layout.is_none() {
            self.relayout(step, valid, locator);
        }
    }

    fn relayout(&mut self, step: &TourStep, valid: bool, locator: &dyn ElementLocator) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "overlay_layout",
            step = step.id.as_str(),
            target = step.target.as_str(),
            placement = step.placement.as_str(),
        )
        .entered();

        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        bound.layout = if valid {
            layout_step(step, locator, &self.config)
        } else {
            None
        };
        trace_layout(bound.layout.as_ref());
    }

    /// Viewport size of the current layout, if any.
    #[must_use]
    pub fn viewport(&self) -> Option<Size> {
        self.layout().map(|layout| layout.viewport)
    }
}

#[cfg(feature = "tracing")]
fn tracing_debug_unbind(bound: &BoundStep) {
    tracing::debug!(
        tour_id = bound.tour_id.as_str(),
        index = bound.index,
        sub_id = bound.subscription.id(),
        "overlay unbound"
    );
}

#[cfg(not(feature = "tracing"))]
fn tracing_debug_unbind(_bound: &BoundStep) {}

#[cfg(feature = "tracing")]
fn trace_layout(layout: Option<&TooltipLayout>) {
    match layout {
        Some(layout) => tracing::debug!(
            x = layout.tooltip.x,
            y = layout.tooltip.y,
            flipped = layout.is_flipped(),
            "tooltip placed"
        ),
        None => tracing::debug!("target not resolved"),
    }
}

#[cfg(not(feature = "tracing"))]
fn trace_layout(_layout: Option<&TooltipLayout>) {}
