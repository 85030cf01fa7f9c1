#![forbid(unsafe_code)]

//! Guided tour state machine.
//!
//! [`TourMachine`] owns the single active-tour state for one application
//! session. It walks the steps of a catalog tour, keeps the router on the
//! page each step expects, and records completion in a [`CompletionStore`].
//!
//! # Invariants
//!
//! 1. At most one tour is active. Starting a tour first deactivates any
//!    other.
//! 2. `current_tour.is_none()` iff `!is_active`, after every public call.
//! 3. While active, `current_step_index < steps.len()`.
//! 4. Route navigation for a step is requested before its index is
//!    published.
//! 5. Public operations never panic and never return errors; anomalies end up
//!    as a log line, a no-op, or [`TourState::error`].
//!
//! # Lifecycle
//!
//! ```text
//! new ──► mount(now) ──► tick(now)* / transitions* ──► dispose()
//!            │
//!            └─ arms the auto-start timer for the default tour
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use guide_core::catalog::Catalog;
use guide_core::host::Router;
use guide_core::tour::{TourConfig, TourStep};

use crate::state_persistence::CompletionStore;
use crate::timer::SettleTimer;

/// Delay between mount and the automatic start of the default tour.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1500;

/// Recoverable configuration errors surfaced through [`TourState::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// A tour id that the catalog does not contain.
    UnknownTour(String),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::UnknownTour(id) => write!(f, "unknown tour: {id}"),
        }
    }
}

impl std::error::Error for TourError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourAdvanceReason {
    Next,
    Previous,
    Jump,
}

/// Observable outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    Started {
        tour_id: String,
        /// Started by the auto-start timer rather than the user.
        auto: bool,
    },
    StepChanged {
        tour_id: String,
        from: usize,
        to: usize,
        reason: TourAdvanceReason,
    },
    /// `next_step` ran past the last step.
    Completed { tour_id: String },
    /// The user left through "Skip".
    Skipped { tour_id: String, at_step: usize },
    /// The user left through "Finish".
    Finished { tour_id: String, at_step: usize },
    /// Force-deactivated without recording completion.
    Reset { tour_id: String },
}

impl TourEvent {
    #[must_use]
    pub fn tour_id(&self) -> &str {
        match self {
            TourEvent::Started { tour_id, .. }
            | TourEvent::StepChanged { tour_id, .. }
            | TourEvent::Completed { tour_id }
            | TourEvent::Skipped { tour_id, .. }
            | TourEvent::Finished { tour_id, .. }
            | TourEvent::Reset { tour_id } => tour_id,
        }
    }

    /// True for the three ways a tour ends with completion recorded.
    #[must_use]
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            TourEvent::Completed { .. } | TourEvent::Skipped { .. } | TourEvent::Finished { .. }
        )
    }
}

/// User intents, as produced by tooltip controls and keyboard handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourCommand {
    Next,
    Previous,
    Skip,
    Finish,
    Reset,
    GoTo(usize),
}

/// The engine's single piece of mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourState {
    is_active: bool,
    current_tour: Option<Arc<TourConfig>>,
    current_step_index: usize,
    completed_tours: BTreeSet<String>,
    error: Option<TourError>,
}

impl TourState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn current_tour(&self) -> Option<&TourConfig> {
        self.current_tour.as_deref()
    }

    /// Meaningless while inactive (always 0 then).
    #[must_use]
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        self.current_tour
            .as_ref()
            .and_then(|tour| tour.steps.get(self.current_step_index))
    }

    #[must_use]
    pub fn completed_tours(&self) -> &BTreeSet<String> {
        &self.completed_tours
    }

    #[must_use]
    pub fn error(&self) -> Option<&TourError> {
        self.error.as_ref()
    }
}

/// Machine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Offer the catalog's default tour on first mount (default: true).
    pub auto_start: bool,
    /// Settling delay before the auto-start fires.
    pub settle_delay: Duration,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

impl MachineConfig {
    #[must_use]
    pub fn auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct TourView<'a> {
    pub is_active: bool,
    pub tour: Option<&'a TourConfig>,
    pub current_step: Option<&'a TourStep>,
    pub current_step_index: usize,
    pub total_steps: usize,
    /// Result of [`TourMachine::is_current_step_valid`].
    pub step_valid: bool,
}

impl TourView<'_> {
    #[must_use]
    pub fn tour_id(&self) -> Option<&str> {
        self.tour.map(|tour| tour.id.as_str())
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_step_index == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.total_steps > 0 && self.current_step_index + 1 == self.total_steps
    }

    #[must_use]
    pub fn allow_skip(&self) -> bool {
        self.tour.is_some_and(|tour| tour.allow_skip)
    }

    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.tour.is_some_and(|tour| tour.show_progress)
    }
}

/// One row of a tour launcher menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub step_count: usize,
    pub completed: bool,
}

/// The tour state machine.
pub struct TourMachine<R: Router> {
    catalog: Arc<Catalog>,
    store: CompletionStore,
    router: R,
    config: MachineConfig,
    state: TourState,
    auto_start: SettleTimer,
    mounted: bool,
}

impl<R: Router> TourMachine<R> {
    /// Construct the machine and rehydrate completions from `store`.
    pub fn new(catalog: Arc<Catalog>, store: CompletionStore, router: R) -> Self {
        Self::with_config(catalog, store, router, MachineConfig::default())
    }

    pub fn with_config(
        catalog: Arc<Catalog>,
        store: CompletionStore,
        router: R,
        config: MachineConfig,
    ) -> Self {
        let completed_tours = store.load();
        tracing::debug!(
            backend = store.backend_name(),
            completed = completed_tours.len(),
            "tour machine created"
        );
        Self {
            catalog,
            store,
            router,
            config,
            state: TourState {
                completed_tours,
                ..TourState::default()
            },
            auto_start: SettleTimer::new(),
            mounted: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> &TourState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    #[must_use]
    pub fn store(&self) -> &CompletionStore {
        &self.store
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Deadline of the pending auto-start, if armed.
    #[must_use]
    pub fn pending_auto_start(&self) -> Option<Duration> {
        self.auto_start.deadline()
    }

    #[must_use]
    pub fn is_tour_completed(&self, tour_id: &str) -> bool {
        self.state.completed_tours.contains(tour_id)
    }

    /// True if the current step has no page constraint, or its constraint is
    /// a substring of the router's current path. False while inactive.
    #[must_use]
    pub fn is_current_step_valid(&self) -> bool {
        match self.state.current_step() {
            Some(step) => step.matches_route(&self.router.current_path()),
            None => false,
        }
    }

    /// Presentation snapshot.
    #[must_use]
    pub fn view(&self) -> TourView<'_> {
        let tour = self.state.current_tour();
        TourView {
            is_active: self.state.is_active,
            tour,
            current_step: self.state.current_step(),
            current_step_index: self.state.current_step_index,
            total_steps: tour.map_or(0, TourConfig::step_count),
            step_valid: self.is_current_step_valid(),
        }
    }

    /// Catalog tours with their completion flag, in catalog order.
    #[must_use]
    pub fn available_tours(&self) -> Vec<TourListing> {
        self.catalog
            .iter()
            .map(|tour| TourListing {
                id: tour.id.clone(),
                name: tour.name.clone(),
                description: tour.description.clone(),
                step_count: tour.step_count(),
                completed: self.is_tour_completed(&tour.id),
            })
            .collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Attach to the hosting application.
    ///
    /// Arms the auto-start timer when the default tour is flagged
    /// `auto_start`, has never been completed, and has never been offered.
    /// The offered flag is written immediately, so the tour is offered at
    /// most once per profile whatever the user does with it. Returns whether
    /// the timer was armed.
    pub fn mount(&mut self, now: Duration) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;

        if !self.config.auto_start {
            return false;
        }
        let Some(tour) = self.catalog.default_tour() else {
            return false;
        };
        if !tour.auto_start
            || self.state.completed_tours.contains(&tour.id)
            || self.store.welcome_offered()
        {
            tracing::debug!(tour_id = %tour.id, "auto-start not needed");
            return false;
        }

        self.store.mark_welcome_offered();
        self.auto_start.arm(now, self.config.settle_delay);
        tracing::debug!(
            tour_id = %tour.id,
            delay_ms = self.config.settle_delay.as_millis() as u64,
            "auto-start armed"
        );
        true
    }

    /// Advance host time. Fires the pending auto-start when due.
    pub fn tick(&mut self, now: Duration) -> Option<TourEvent> {
        if !self.auto_start.fire(now) {
            return None;
        }
        if self.state.is_active {
            tracing::debug!("auto-start suppressed, a tour is already active");
            return None;
        }
        let id = self.catalog.default_tour()?.id.clone();
        self.begin(&id, true)
    }

    /// Detach: cancel timers and drop the active tour without recording
    /// completion.
    pub fn dispose(&mut self) {
        self.auto_start.cancel();
        if self.state.is_active {
            self.deactivate();
        }
        self.mounted = false;
        tracing::debug!("tour machine disposed");
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Start `tour_id` at its first step.
    ///
    /// Unknown ids set [`TourState::error`] and leave everything else
    /// untouched. Completed tours may be restarted.
    pub fn start_tour(&mut self, tour_id: &str) -> Option<TourEvent> {
        self.begin(tour_id, false)
    }

    pub fn next_step(&mut self) -> Option<TourEvent> {
        let (tour, index) = self.active()?;
        if index + 1 >= tour.step_count() {
            return Some(self.complete(CompletionKind::Completed));
        }
        Some(self.move_to(&tour, index + 1, TourAdvanceReason::Next))
    }

    pub fn previous_step(&mut self) -> Option<TourEvent> {
        let (tour, index) = self.active()?;
        if index == 0 {
            return None;
        }
        Some(self.move_to(&tour, index - 1, TourAdvanceReason::Previous))
    }

    /// Jump to `index`. Out-of-range requests are ignored.
    ///
    /// Jumping to the current step changes nothing but its route: the user
    /// is taken back to the step's page and no event is returned.
    pub fn go_to_step(&mut self, index: usize) -> Option<TourEvent> {
        let (tour, current) = self.active()?;
        if index >= tour.step_count() {
            return None;
        }
        if index == current {
            self.sync_route(&tour.steps[index]);
            return None;
        }
        Some(self.move_to(&tour, index, TourAdvanceReason::Jump))
    }

    /// Record completion and deactivate, from any step.
    pub fn skip_tour(&mut self) -> Option<TourEvent> {
        self.active()?;
        Some(self.complete(CompletionKind::Skipped))
    }

    /// Same transition as [`skip_tour`](Self::skip_tour), reported as
    /// `Finished`.
    pub fn finish_tour(&mut self) -> Option<TourEvent> {
        self.active()?;
        Some(self.complete(CompletionKind::Finished))
    }

    /// Force-deactivate without touching persistence.
    pub fn reset_tour(&mut self) -> Option<TourEvent> {
        self.state.error = None;
        let (tour, _) = self.active()?;
        self.deactivate();
        tracing::debug!(tour_id = %tour.id, "tour reset");
        Some(TourEvent::Reset {
            tour_id: tour.id.clone(),
        })
    }

    /// Dispatch a [`TourCommand`].
    pub fn apply(&mut self, command: TourCommand) -> Option<TourEvent> {
        match command {
            TourCommand::Next => self.next_step(),
            TourCommand::Previous => self.previous_step(),
            TourCommand::Skip => self.skip_tour(),
            TourCommand::Finish => self.finish_tour(),
            TourCommand::Reset => self.reset_tour(),
            TourCommand::GoTo(index) => self.go_to_step(index),
        }
    }

    /// Forget every completion and the auto-start flag.
    pub fn clear_progress(&mut self) {
        self.state.completed_tours.clear();
        self.store.clear();
        tracing::debug!("tour progress cleared");
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn active(&self) -> Option<(Arc<TourConfig>, usize)> {
        if !self.state.is_active {
            return None;
        }
        let tour = self.state.current_tour.clone()?;
        Some((tour, self.state.current_step_index))
    }

    fn begin(&mut self, tour_id: &str, auto: bool) -> Option<TourEvent> {
        let Some(tour) = self.catalog.get(tour_id).cloned() else {
            tracing::warn!(tour_id, "start requested for unknown tour");
            self.state.error = Some(TourError::UnknownTour(tour_id.to_string()));
            return None;
        };
        let first = tour.steps.first()?;

        self.auto_start.cancel();
        if let Some(previous) = self.state.current_tour.as_ref() {
            tracing::debug!(
                previous = %previous.id,
                next = %tour.id,
                "replacing active tour"
            );
            self.deactivate();
        }

        self.sync_route(first);
        self.state.current_tour = Some(Arc::clone(&tour));
        self.state.current_step_index = 0;
        self.state.is_active = true;
        self.state.error = None;

        tracing::debug!(tour_id = %tour.id, auto, steps = tour.step_count(), "tour started");
        Some(TourEvent::Started {
            tour_id: tour.id.clone(),
            auto,
        })
    }

    fn move_to(&mut self, tour: &TourConfig, to: usize, reason: TourAdvanceReason) -> TourEvent {
        let from = self.state.current_step_index;
        self.sync_route(&tour.steps[to]);
        self.state.current_step_index = to;
        tracing::debug!(tour_id = %tour.id, from, to, ?reason, "tour step changed");
        TourEvent::StepChanged {
            tour_id: tour.id.clone(),
            from,
            to,
            reason,
        }
    }

    fn complete(&mut self, kind: CompletionKind) -> TourEvent {
        let at_step = self.state.current_step_index;
        let tour_id = self
            .state
            .current_tour
            .as_ref()
            .map(|tour| tour.id.clone())
            .unwrap_or_default();

        self.auto_start.cancel();
        self.state.completed_tours.insert(tour_id.clone());
        self.persist();
        self.deactivate();

        tracing::debug!(tour_id = %tour_id, at_step, ?kind, "tour ended");
        match kind {
            CompletionKind::Completed => TourEvent::Completed { tour_id },
            CompletionKind::Skipped => TourEvent::Skipped { tour_id, at_step },
            CompletionKind::Finished => TourEvent::Finished { tour_id, at_step },
        }
    }

    fn deactivate(&mut self) {
        self.state.is_active = false;
        self.state.current_tour = None;
        self.state.current_step_index = 0;
    }

    /// Write completions, leaving out tours that opt out of persistence.
    fn persist(&self) {
        let persisted: BTreeSet<String> = self
            .state
            .completed_tours
            .iter()
            .filter(|id| self.catalog.get(id).is_none_or(|tour| tour.persistent))
            .cloned()
            .collect();
        self.store.save(&persisted);
    }

    fn sync_route(&mut self, step: &TourStep) {
        let Some(route) = step.next_route.as_deref() else {
            return;
        };
        let current = self.router.current_path();
        if current != route {
            tracing::debug!(from = %current, to = route, step = %step.id, "navigating for tour step");
            self.router.navigate(route);
        }
    }
}

impl<R: Router> fmt::Debug for TourMachine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourMachine")
            .field("state", &self.state)
            .field("mounted", &self.mounted)
            .field("auto_start", &self.auto_start)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum CompletionKind {
    Completed,
    Skipped,
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::host::MemoryRouter;
    use guide_core::tour::{Placement, WHOLE_SCREEN_TARGET};

    fn welcome() -> TourConfig {
        TourConfig::new("welcome", "Welcome")
            .auto_start(true)
            .step(
                TourStep::new("hello", WHOLE_SCREEN_TARGET, "Hello", "Welcome aboard")
                    .placement(Placement::Center),
            )
            .step(
                TourStep::new("instances", "#instances-list", "Instances", "Connect WhatsApp")
                    .page("instancias")
                    .next_route("/instancias"),
            )
            .step(TourStep::new("menu", "#sidebar", "Menu", "Everything lives here"))
    }

    fn campaigns() -> TourConfig {
        TourConfig::new("campaigns", "Campaigns")
            .step(
                TourStep::new("list", "#campaign-list", "Campaigns", "Your campaigns")
                    .next_route("/campanhas"),
            )
            .step(TourStep::new("create", "#new-campaign", "Create", "Start one here"))
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(vec![welcome(), campaigns()])
                .and_then(|c| c.with_default("welcome"))
                .expect("valid catalog"),
        )
    }

    fn machine() -> TourMachine<MemoryRouter> {
        TourMachine::new(
            catalog(),
            CompletionStore::in_memory(),
            MemoryRouter::new("/dashboard"),
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn starts_inactive() {
        let m = machine();
        assert!(!m.state().is_active());
        assert!(m.state().current_tour().is_none());
        assert!(!m.is_current_step_valid());
        assert_eq!(m.view().total_steps, 0);
    }

    #[test]
    fn start_sets_first_step() {
        let mut m = machine();
        let event = m.start_tour("welcome");
        assert_eq!(
            event,
            Some(TourEvent::Started {
                tour_id: "welcome".into(),
                auto: false
            })
        );
        assert!(m.state().is_active());
        assert_eq!(m.state().current_step_index(), 0);
        assert_eq!(m.view().total_steps, 3);
        assert!(m.router().history().is_empty(), "first step has no route");
    }

    #[test]
    fn unknown_tour_sets_error_and_keeps_state() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        let before_index = m.state().current_step_index();

        assert!(m.start_tour("nope").is_none());
        assert_eq!(
            m.state().error(),
            Some(&TourError::UnknownTour("nope".into()))
        );
        assert!(m.state().is_active());
        assert_eq!(m.state().current_step_index(), before_index);
        assert_eq!(m.state().current_tour().map(|t| t.id.as_str()), Some("welcome"));
    }

    #[test]
    fn successful_start_clears_error() {
        let mut m = machine();
        m.start_tour("nope");
        assert!(m.state().error().is_some());
        m.start_tour("campaigns");
        assert!(m.state().error().is_none());
    }

    #[test]
    fn start_navigates_when_first_step_has_route() {
        let mut m = machine();
        m.start_tour("campaigns");
        assert_eq!(m.router().current_path(), "/campanhas");
        assert_eq!(m.router().history(), vec!["/campanhas".to_string()]);
    }

    #[test]
    fn start_skips_navigation_when_already_there() {
        let mut m = TourMachine::new(
            catalog(),
            CompletionStore::in_memory(),
            MemoryRouter::new("/campanhas"),
        );
        m.start_tour("campaigns");
        assert!(m.router().history().is_empty());
    }

    #[test]
    fn starting_another_tour_replaces_the_active_one() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        m.start_tour("campaigns");
        assert_eq!(m.state().current_tour().map(|t| t.id.as_str()), Some("campaigns"));
        assert_eq!(m.state().current_step_index(), 0);
        assert!(!m.is_tour_completed("welcome"), "replacement is not completion");
    }

    #[test]
    fn next_advances_and_navigates() {
        let mut m = machine();
        m.start_tour("welcome");
        let event = m.next_step();
        assert_eq!(
            event,
            Some(TourEvent::StepChanged {
                tour_id: "welcome".into(),
                from: 0,
                to: 1,
                reason: TourAdvanceReason::Next,
            })
        );
        assert_eq!(m.router().current_path(), "/instancias");
        assert!(m.is_current_step_valid());
    }

    #[test]
    fn next_past_last_completes() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        m.next_step();
        let event = m.next_step();
        assert_eq!(
            event,
            Some(TourEvent::Completed {
                tour_id: "welcome".into()
            })
        );
        assert!(!m.state().is_active());
        assert!(m.state().current_tour().is_none());
        assert_eq!(m.state().current_step_index(), 0);
        assert!(m.is_tour_completed("welcome"));
        assert!(m.store().load().contains("welcome"));
    }

    #[test]
    fn transitions_are_noops_while_inactive() {
        let mut m = machine();
        let before = m.state().clone();
        assert!(m.next_step().is_none());
        assert!(m.previous_step().is_none());
        assert!(m.go_to_step(1).is_none());
        assert!(m.skip_tour().is_none());
        assert!(m.finish_tour().is_none());
        assert!(m.reset_tour().is_none());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn previous_at_zero_is_bit_for_bit_noop() {
        let mut m = machine();
        m.start_tour("welcome");
        let before = m.state().clone();
        assert!(m.previous_step().is_none());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn previous_navigates_back_to_route() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        m.next_step();
        m.router_mut().set_path("/elsewhere");
        let event = m.previous_step();
        assert!(matches!(
            event,
            Some(TourEvent::StepChanged {
                from: 2,
                to: 1,
                reason: TourAdvanceReason::Previous,
                ..
            })
        ));
        assert_eq!(m.router().current_path(), "/instancias");
    }

    #[test]
    fn go_to_step_out_of_range_is_ignored() {
        let mut m = machine();
        m.start_tour("welcome");
        let before = m.state().clone();
        assert!(m.go_to_step(3).is_none());
        assert!(m.go_to_step(usize::MAX).is_none());
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn go_to_step_jumps_and_navigates() {
        let mut m = machine();
        m.start_tour("welcome");
        let event = m.go_to_step(1);
        assert!(matches!(
            event,
            Some(TourEvent::StepChanged {
                to: 1,
                reason: TourAdvanceReason::Jump,
                ..
            })
        ));
        assert_eq!(m.router().current_path(), "/instancias");
    }

    #[test]
    fn go_to_current_step_returns_to_its_page() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        assert_eq!(m.router().current_path(), "/instancias");

        m.router().set_path("/dashboard");
        assert!(m.go_to_step(1).is_none(), "index unchanged");
        assert_eq!(m.state().current_step_index(), 1);
        assert_eq!(m.router().current_path(), "/instancias");
    }

    #[test]
    fn skip_and_finish_both_record_completion() {
        for command in [TourCommand::Skip, TourCommand::Finish] {
            let mut m = machine();
            m.start_tour("welcome");
            let event = m.apply(command).expect("ended");
            assert!(event.is_completion());
            assert!(!m.state().is_active());
            assert!(m.is_tour_completed("welcome"));
            assert!(m.store().load().contains("welcome"));
        }
    }

    #[test]
    fn skip_reports_the_step_it_left_from() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        assert_eq!(
            m.skip_tour(),
            Some(TourEvent::Skipped {
                tour_id: "welcome".into(),
                at_step: 1
            })
        );
    }

    #[test]
    fn reset_does_not_persist_and_is_idempotent() {
        let mut m = machine();
        m.start_tour("welcome");
        m.next_step();
        assert!(matches!(m.reset_tour(), Some(TourEvent::Reset { .. })));
        let once = m.state().clone();
        assert!(m.reset_tour().is_none());
        assert_eq!(m.state(), &once);
        assert!(!m.is_tour_completed("welcome"));
        assert!(m.store().load().is_empty());
    }

    #[test]
    fn completed_tours_can_restart() {
        let mut m = machine();
        m.start_tour("campaigns");
        m.finish_tour();
        assert!(m.is_tour_completed("campaigns"));
        assert!(m.start_tour("campaigns").is_some());
        assert!(m.state().is_active());
    }

    #[test]
    fn non_persistent_tours_stay_out_of_storage() {
        let catalog = Arc::new(
            Catalog::new(vec![
                campaigns().persistent(false),
                TourConfig::new("leads", "Leads").step(TourStep::new("a", "#a", "A", "A")),
            ])
            .expect("catalog"),
        );
        let mut m = TourMachine::new(
            catalog,
            CompletionStore::in_memory(),
            MemoryRouter::new("/"),
        );
        m.start_tour("campaigns");
        m.skip_tour();
        m.start_tour("leads");
        m.skip_tour();
        assert!(m.is_tour_completed("campaigns"), "session still knows");
        let stored = m.store().load();
        assert!(!stored.contains("campaigns"));
        assert!(stored.contains("leads"));
    }

    #[test]
    fn completions_rehydrate_from_store() {
        let store = CompletionStore::in_memory();
        store.save(&["campaigns".to_string()].into_iter().collect());
        let m = TourMachine::new(catalog(), store, MemoryRouter::new("/"));
        assert!(m.is_tour_completed("campaigns"));
        assert!(!m.is_tour_completed("welcome"));
    }

    #[test]
    fn step_validity_follows_route() {
        let mut m = machine();
        m.start_tour("welcome");
        assert!(m.is_current_step_valid());
        m.next_step();
        assert!(m.is_current_step_valid());
        m.router_mut().set_path("/dashboard");
        assert!(!m.is_current_step_valid());
        assert!(!m.view().step_valid);
    }

    #[test]
    fn auto_start_fires_after_settle_delay() {
        let mut m = machine();
        assert!(m.mount(ms(0)));
        assert!(m.store().welcome_offered());
        assert!(m.tick(ms(DEFAULT_SETTLE_DELAY_MS - 1)).is_none());
        let event = m.tick(ms(DEFAULT_SETTLE_DELAY_MS));
        assert_eq!(
            event,
            Some(TourEvent::Started {
                tour_id: "welcome".into(),
                auto: true
            })
        );
        assert!(m.tick(ms(10_000)).is_none(), "fires once");
    }

    #[test]
    fn auto_start_is_offered_once_per_profile() {
        let store = CompletionStore::in_memory();
        store.mark_welcome_offered();
        let mut m = TourMachine::new(catalog(), store, MemoryRouter::new("/"));
        assert!(!m.mount(ms(0)));
        assert!(m.pending_auto_start().is_none());
    }

    #[test]
    fn auto_start_skipped_when_completed() {
        let store = CompletionStore::in_memory();
        store.save(&["welcome".to_string()].into_iter().collect());
        let mut m = TourMachine::new(catalog(), store, MemoryRouter::new("/"));
        assert!(!m.mount(ms(0)));
    }

    #[test]
    fn auto_start_disabled_by_config() {
        let mut m = TourMachine::with_config(
            catalog(),
            CompletionStore::in_memory(),
            MemoryRouter::new("/"),
            MachineConfig::default().auto_start(false),
        );
        assert!(!m.mount(ms(0)));
        assert!(!m.store().welcome_offered());
    }

    #[test]
    fn manual_start_cancels_pending_auto_start() {
        let mut m = machine();
        m.mount(ms(0));
        m.start_tour("campaigns");
        assert!(m.pending_auto_start().is_none());
        m.skip_tour();
        assert!(m.tick(ms(60_000)).is_none());
        assert!(!m.state().is_active());
    }

    #[test]
    fn mount_is_once() {
        let mut m = machine();
        assert!(m.mount(ms(0)));
        assert!(!m.mount(ms(5)));
        assert_eq!(m.pending_auto_start(), Some(ms(DEFAULT_SETTLE_DELAY_MS)));
    }

    #[test]
    fn custom_settle_delay() {
        let mut m = TourMachine::with_config(
            catalog(),
            CompletionStore::in_memory(),
            MemoryRouter::new("/"),
            MachineConfig::default().settle_delay(ms(10)),
        );
        m.mount(ms(100));
        assert!(m.tick(ms(110)).is_some());
    }

    #[test]
    fn dispose_cancels_and_deactivates_without_persisting() {
        let mut m = machine();
        m.mount(ms(0));
        m.dispose();
        assert!(m.tick(ms(60_000)).is_none());

        m.start_tour("welcome");
        m.dispose();
        assert!(!m.state().is_active());
        assert!(m.store().load().is_empty());
        assert!(!m.is_mounted());
    }

    #[test]
    fn view_reports_position() {
        let mut m = machine();
        m.start_tour("welcome");
        let view = m.view();
        assert!(view.is_first() && !view.is_last());
        assert_eq!(view.tour_id(), Some("welcome"));
        assert!(view.allow_skip() && view.show_progress());
        m.go_to_step(2);
        let view = m.view();
        assert!(view.is_last());
        assert_eq!(view.current_step.map(|s| s.id.as_str()), Some("menu"));
    }

    #[test]
    fn available_tours_lists_completion() {
        let mut m = machine();
        m.start_tour("campaigns");
        m.finish_tour();
        let listing = m.available_tours();
        assert_eq!(listing.len(), 2);
        assert!(!listing[0].completed);
        assert!(listing[1].completed);
        assert_eq!(listing[0].step_count, 3);
    }

    #[test]
    fn clear_progress_forgets_everything() {
        let mut m = machine();
        m.mount(ms(0));
        m.start_tour("campaigns");
        m.finish_tour();
        m.clear_progress();
        assert!(!m.is_tour_completed("campaigns"));
        assert!(m.store().load().is_empty());
        assert!(!m.store().welcome_offered());
    }

    #[test]
    fn tour_error_display() {
        assert_eq!(
            TourError::UnknownTour("x".into()).to_string(),
            "unknown tour: x"
        );
    }
}
