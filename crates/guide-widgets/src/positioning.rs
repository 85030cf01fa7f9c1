#![forbid(unsafe_code)]

//! Target resolution and tooltip positioning.
//!
//! # Invariants
//!
//! 1. A tooltip that fits inside the viewport minus margins is never placed
//!    outside it.
//! 2. When vertical clamping moves the tooltip off its requested side, the
//!    effective placement is flipped so the arrow points the right way.
//! 3. A target that cannot be resolved produces no layout at all (never a
//!    tooltip at the origin).
//!
//! # Algorithm
//!
//! ```text
//! center / whole-screen ──► centered rect ─────────────────────┐
//! resolve target ─► miss? ─► None                               │
//!        │                                                      ▼
//!        └─► candidate (gap from target edge, cross-axis centered)
//!              ─► horizontal clamp [margin, width - margin]
//!              ─► vertical clamp [margin, height - margin] + flip
//! ```

use guide_core::geometry::{Rect, Size};
use guide_core::host::ElementLocator;
use guide_core::tour::{Placement, TourStep};

/// Stand-off between the target edge and the tooltip.
pub const DEFAULT_GAP: f64 = 12.0;
/// Minimum distance kept between the tooltip and the viewport edge.
pub const DEFAULT_MARGIN: f64 = 16.0;
/// Extra space drawn around the target in the spotlight cut-out.
pub const DEFAULT_HIGHLIGHT_PADDING: f64 = 8.0;
pub const DEFAULT_TOOLTIP_SIZE: Size = Size::new(320.0, 180.0);

/// Positioning configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionConfig {
    /// Gap between tooltip and target (default: 12).
    pub gap: f64,
    /// Viewport margin (default: 16).
    pub margin: f64,
    /// Measured tooltip size.
    pub tooltip_size: Size,
    /// Spotlight padding around the target (default: 8).
    pub highlight_padding: f64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            margin: DEFAULT_MARGIN,
            tooltip_size: DEFAULT_TOOLTIP_SIZE,
            highlight_padding: DEFAULT_HIGHLIGHT_PADDING,
        }
    }
}

impl PositionConfig {
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn tooltip_size(mut self, size: Size) -> Self {
        self.tooltip_size = size;
        self
    }

    #[must_use]
    pub fn highlight_padding(mut self, padding: f64) -> Self {
        self.highlight_padding = padding;
        self
    }
}

/// Resolved tooltip geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipLayout {
    pub tooltip: Rect,
    /// Placement after any flip.
    pub placement: Placement,
    /// Placement the step asked for.
    pub requested: Placement,
    /// Target rect, absent for centered steps.
    pub target: Option<Rect>,
    /// Padded target rect clipped to the viewport, for the dimming overlay.
    pub spotlight: Option<Rect>,
    pub viewport: Size,
}

impl TooltipLayout {
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.placement != self.requested
    }
}

/// Resolve `selector` to a bounding rect. Blank selectors and zero-size
/// elements (hidden, detached) count as misses.
#[must_use]
pub fn resolve_target(locator: &dyn ElementLocator, selector: &str) -> Option<Rect> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }
    locator
        .bounding_rect(selector)
        .filter(|rect| !rect.is_empty())
}

/// Tooltip centered in the viewport.
#[must_use]
pub fn center_tooltip(viewport: Size, config: &PositionConfig) -> TooltipLayout {
    TooltipLayout {
        tooltip: Rect::from_size(viewport).centered(config.tooltip_size),
        placement: Placement::Center,
        requested: Placement::Center,
        target: None,
        spotlight: None,
        viewport,
    }
}

/// Place the tooltip next to `target` on the `placement` side, clamped to
/// the viewport.
#[must_use]
pub fn place_tooltip(
    target: Rect,
    viewport: Size,
    placement: Placement,
    config: &PositionConfig,
) -> TooltipLayout {
    let size = config.tooltip_size;
    let gap = config.gap;
    let margin = config.margin;
    let center = target.center();

    let (mut x, mut y) = match placement {
        Placement::Top => (center.x - size.width / 2.0, target.top() - gap - size.height),
        Placement::Bottom => (center.x - size.width / 2.0, target.bottom() + gap),
        Placement::Left => (target.left() - gap - size.width, center.y - size.height / 2.0),
        Placement::Right => (target.right() + gap, center.y - size.height / 2.0),
        Placement::Center => return center_tooltip(viewport, config),
    };

    // Horizontal: the left margin wins when the tooltip is wider than the
    // viewport allows.
    let max_x = viewport.width - margin - size.width;
    if x < margin {
        x = margin;
    } else if x > max_x {
        x = max_x.max(margin);
    }

    let mut effective = placement;
    let max_y = viewport.height - margin - size.height;
    if y < margin {
        y = margin;
        effective = Placement::Bottom;
    } else if y > max_y {
        y = max_y.max(margin);
        effective = Placement::Top;
    }

    let viewport_rect = Rect::from_size(viewport);
    TooltipLayout {
        tooltip: Rect::new(x, y, size.width, size.height),
        placement: effective,
        requested: placement,
        target: Some(target),
        spotlight: target
            .inflate(config.highlight_padding)
            .intersection_opt(&viewport_rect),
        viewport,
    }
}

/// Full pipeline for one step: whole-screen check, target resolution,
/// placement.
///
/// Returns `None` when the step's target is not in the document. Callers
/// retry on the next relevant render.
#[must_use]
pub fn layout_step(
    step: &TourStep,
    locator: &dyn ElementLocator,
    config: &PositionConfig,
) -> Option<TooltipLayout> {
    let viewport = locator.viewport();
    if step.is_whole_screen() {
        return Some(center_tooltip(viewport, config));
    }
    let target = resolve_target(locator, &step.target)?;
    Some(place_tooltip(target, viewport, step.placement, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_core::tour::WHOLE_SCREEN_TARGET;
    use std::collections::HashMap;

    struct FakeLocator {
        viewport: Size,
        rects: HashMap<String, Rect>,
    }

    impl FakeLocator {
        fn new(width: f64, height: f64) -> Self {
            Self {
                viewport: Size::new(width, height),
                rects: HashMap::new(),
            }
        }

        fn with(mut self, selector: &str, rect: Rect) -> Self {
            self.rects.insert(selector.to_string(), rect);
            self
        }
    }

    impl ElementLocator for FakeLocator {
        fn bounding_rect(&self, selector: &str) -> Option<Rect> {
            self.rects.get(selector).copied()
        }

        fn scroll_into_view(&mut self, selector: &str) -> bool {
            self.rects.contains_key(selector)
        }

        fn viewport(&self) -> Size {
            self.viewport
        }
    }

    fn config() -> PositionConfig {
        PositionConfig::default().tooltip_size(Size::new(200.0, 100.0))
    }

    const VIEWPORT: Size = Size::new(1280.0, 800.0);

    // ── Placement tests ───────────────────────────────────────────────

    #[test]
    fn bottom_inside_viewport_is_unclamped() {
        let target = Rect::new(500.0, 200.0, 100.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &config());
        assert_eq!(layout.tooltip.top(), target.bottom() + DEFAULT_GAP);
        assert_eq!(layout.tooltip.left(), 450.0, "centered under the target");
        assert_eq!(layout.placement, Placement::Bottom);
        assert!(!layout.is_flipped());
    }

    #[test]
    fn top_overflow_flips_to_bottom_and_clamps() {
        let target = Rect::new(500.0, 20.0, 100.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Top, &config());
        assert_eq!(layout.placement, Placement::Bottom);
        assert_eq!(layout.requested, Placement::Top);
        assert!(layout.is_flipped());
        assert_eq!(layout.tooltip.top(), DEFAULT_MARGIN);
    }

    #[test]
    fn bottom_overflow_flips_to_top_and_clamps() {
        let target = Rect::new(500.0, 740.0, 100.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &config());
        assert_eq!(layout.placement, Placement::Top);
        assert_eq!(layout.tooltip.bottom(), VIEWPORT.height - DEFAULT_MARGIN);
    }

    #[test]
    fn top_with_room_stays_top() {
        let target = Rect::new(500.0, 400.0, 100.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Top, &config());
        assert_eq!(layout.placement, Placement::Top);
        assert_eq!(layout.tooltip.bottom(), target.top() - DEFAULT_GAP);
    }

    #[test]
    fn left_and_right_center_vertically() {
        let target = Rect::new(600.0, 300.0, 80.0, 80.0);
        let right = place_tooltip(target, VIEWPORT, Placement::Right, &config());
        assert_eq!(right.tooltip.left(), target.right() + DEFAULT_GAP);
        assert_eq!(right.tooltip.center().y, target.center().y);

        let left = place_tooltip(target, VIEWPORT, Placement::Left, &config());
        assert_eq!(left.tooltip.right(), target.left() - DEFAULT_GAP);
        assert_eq!(left.placement, Placement::Left);
    }

    #[test]
    fn horizontal_clamp_left_edge() {
        let target = Rect::new(0.0, 300.0, 40.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &config());
        assert_eq!(layout.tooltip.left(), DEFAULT_MARGIN);
        assert_eq!(layout.placement, Placement::Bottom);
    }

    #[test]
    fn horizontal_clamp_right_edge() {
        let target = Rect::new(1250.0, 300.0, 30.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &config());
        assert_eq!(layout.tooltip.right(), VIEWPORT.width - DEFAULT_MARGIN);
    }

    #[test]
    fn too_wide_tooltip_keeps_left_margin() {
        let cfg = config().tooltip_size(Size::new(2000.0, 100.0));
        let target = Rect::new(600.0, 300.0, 40.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &cfg);
        assert_eq!(layout.tooltip.left(), DEFAULT_MARGIN);
    }

    #[test]
    fn left_placement_flips_on_vertical_overflow() {
        let target = Rect::new(600.0, 0.0, 40.0, 20.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Left, &config());
        assert_eq!(layout.tooltip.top(), DEFAULT_MARGIN);
        assert_eq!(layout.placement, Placement::Bottom);
    }

    #[test]
    fn offscreen_target_still_yields_onscreen_tooltip() {
        let target = Rect::new(-400.0, -900.0, 100.0, 40.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Bottom, &config());
        assert_eq!(layout.tooltip.left(), DEFAULT_MARGIN);
        assert_eq!(layout.tooltip.top(), DEFAULT_MARGIN);
        assert!(layout.spotlight.is_none(), "target not visible");
    }

    #[test]
    fn spotlight_is_padded_and_clipped() {
        let target = Rect::new(2.0, 100.0, 50.0, 20.0);
        let layout = place_tooltip(target, VIEWPORT, Placement::Right, &config());
        let spot = layout.spotlight.expect("visible target");
        assert_eq!(spot.left(), 0.0, "clipped at viewport edge");
        assert_eq!(spot.top(), 100.0 - DEFAULT_HIGHLIGHT_PADDING);
        assert_eq!(spot.right(), 52.0 + DEFAULT_HIGHLIGHT_PADDING);
    }

    #[test]
    fn center_ignores_target() {
        let layout = place_tooltip(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            VIEWPORT,
            Placement::Center,
            &config(),
        );
        assert_eq!(layout.tooltip, Rect::new(540.0, 350.0, 200.0, 100.0));
        assert!(layout.target.is_none());
        assert!(layout.spotlight.is_none());
    }

    // ── Resolution tests ──────────────────────────────────────────────

    #[test]
    fn missing_target_yields_no_layout() {
        let locator = FakeLocator::new(1280.0, 800.0);
        let step = TourStep::new("s", "#missing", "t", "c");
        assert!(layout_step(&step, &locator, &config()).is_none());
    }

    #[test]
    fn blank_selector_is_a_miss() {
        let locator = FakeLocator::new(1280.0, 800.0).with("", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(resolve_target(&locator, "").is_none());
        assert!(resolve_target(&locator, "   ").is_none());
    }

    #[test]
    fn hidden_element_is_a_miss() {
        let locator = FakeLocator::new(1280.0, 800.0).with("#hidden", Rect::default());
        assert!(resolve_target(&locator, "#hidden").is_none());
    }

    #[test]
    fn whole_screen_step_is_centered_without_lookup() {
        let locator = FakeLocator::new(1000.0, 600.0);
        let step = TourStep::new("s", WHOLE_SCREEN_TARGET, "t", "c");
        let layout = layout_step(&step, &locator, &config()).expect("centered");
        assert_eq!(layout.placement, Placement::Center);
        assert_eq!(layout.tooltip.center().x, 500.0);
        assert_eq!(layout.tooltip.center().y, 300.0);
    }

    #[test]
    fn resolved_step_uses_step_placement() {
        let locator =
            FakeLocator::new(1280.0, 800.0).with("#nav", Rect::new(100.0, 300.0, 60.0, 60.0));
        let step = TourStep::new("s", "#nav", "t", "c").placement(Placement::Right);
        let layout = layout_step(&step, &locator, &config()).expect("resolved");
        assert_eq!(layout.placement, Placement::Right);
        assert_eq!(layout.tooltip.left(), 160.0 + DEFAULT_GAP);
        assert_eq!(layout.viewport, Size::new(1280.0, 800.0));
    }

    #[test]
    fn config_builder_chaining() {
        let cfg = PositionConfig::default()
            .gap(4.0)
            .margin(2.0)
            .highlight_padding(1.0)
            .tooltip_size(Size::new(10.0, 5.0));
        assert_eq!(cfg.gap, 4.0);
        assert_eq!(cfg.margin, 2.0);
        assert_eq!(cfg.highlight_padding, 1.0);
        assert_eq!(cfg.tooltip_size, Size::new(10.0, 5.0));
    }
}
