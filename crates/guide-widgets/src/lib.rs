#![forbid(unsafe_code)]

//! Tooltip positioning and overlay presentation for guided tours.
//!
//! - [`positioning`]: target resolution and the clamp-and-flip placement
//!   algorithm, pure over an [`ElementLocator`](guide_core::ElementLocator).
//! - [`overlay`]: per-step controller that owns the viewport subscription,
//!   maps keys to commands, and produces render-ready frames.

pub mod overlay;
pub mod positioning;

pub use overlay::{OverlayFrame, TourControls, TourOverlay, command_for_key};
pub use positioning::{
    DEFAULT_GAP, DEFAULT_HIGHLIGHT_PADDING, DEFAULT_MARGIN, DEFAULT_TOOLTIP_SIZE, PositionConfig,
    TooltipLayout, center_tooltip, layout_step, place_tooltip, resolve_target,
};
