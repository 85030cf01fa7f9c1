#![forbid(unsafe_code)]

//! Declarative tour definitions.
//!
//! A [`TourConfig`] is an ordered list of [`TourStep`]s. Both are plain data:
//! the state machine reads them, nothing mutates them after authoring.

use serde::{Deserialize, Serialize};

/// Selector that stands for "the whole screen" rather than a real element.
pub const WHOLE_SCREEN_TARGET: &str = "body";

/// Preferred side of the target on which the tooltip appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    /// Ignore target geometry and center in the viewport.
    Center,
}

impl Placement {
    /// Lowercase name, as used in catalogs and CSS class suffixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Center => "center",
        }
    }
}

/// Effect applied to the target element while its step is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepAction {
    /// Keep the given class on the target for the duration of the step.
    Highlight { class: String },
    /// Pulse the target once when the step appears.
    Pulse,
}

fn default_true() -> bool {
    true
}

/// One screen of guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStep {
    /// Unique within the owning tour.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Element selector, or [`WHOLE_SCREEN_TARGET`].
    pub target: String,
    #[serde(default)]
    pub placement: Placement,
    /// Route fragment that must appear in the current path for this step to
    /// be valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Route to navigate to when this step becomes current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<StepAction>,
    /// Fade-in delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default = "default_true")]
    pub show_next: bool,
    #[serde(default = "default_true")]
    pub show_previous: bool,
    #[serde(default = "default_true")]
    pub show_skip: bool,
    #[serde(default)]
    pub show_finish: bool,
}

impl TourStep {
    /// Create a step with default controls and `Bottom` placement.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        target: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            target: target.into(),
            placement: Placement::default(),
            page: None,
            next_route: None,
            action: None,
            delay: None,
            show_next: true,
            show_previous: true,
            show_skip: true,
            show_finish: false,
        }
    }

    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    #[must_use]
    pub fn next_route(mut self, route: impl Into<String>) -> Self {
        self.next_route = Some(route.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: StepAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(ms);
        self
    }

    /// Set the four control flags at once: next, previous, skip, finish.
    #[must_use]
    pub fn controls(mut self, next: bool, previous: bool, skip: bool, finish: bool) -> Self {
        self.show_next = next;
        self.show_previous = previous;
        self.show_skip = skip;
        self.show_finish = finish;
        self
    }

    /// True when the step is not anchored to a specific element.
    #[must_use]
    pub fn is_whole_screen(&self) -> bool {
        self.placement == Placement::Center || self.target.trim() == WHOLE_SCREEN_TARGET
    }

    /// Check the step's page affinity against a route path.
    ///
    /// Steps without a `page` constraint are valid on every route.
    #[must_use]
    pub fn matches_route(&self, path: &str) -> bool {
        match &self.page {
            Some(page) => path.contains(page.as_str()),
            None => true,
        }
    }
}

/// An ordered walkthrough plus its presentation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<TourStep>,
    /// Begin automatically for users who never completed it.
    #[serde(default)]
    pub auto_start: bool,
    /// Remember completion across sessions.
    #[serde(default = "default_true")]
    pub persistent: bool,
    #[serde(default = "default_true")]
    pub allow_skip: bool,
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl TourConfig {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
            auto_start: false,
            persistent: true,
            allow_skip: true,
            show_progress: true,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn step(mut self, step: TourStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    #[must_use]
    pub fn allow_skip(mut self, allow_skip: bool) -> Self {
        self.allow_skip = allow_skip;
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[inline]
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
