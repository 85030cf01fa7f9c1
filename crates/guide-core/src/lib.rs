#![forbid(unsafe_code)]

//! Core: geometry, tour data model, catalog, and host capabilities.
//!
//! # Role in the guided tour engine
//! `guide-core` is the foundation layer. It defines the declarative tour
//! model and the traits through which the engine reaches the host's router
//! and DOM. It contains no state machine and no rendering.
//!
//! # Primary responsibilities
//! - **Tour model**: `TourStep`, `TourConfig`, `Placement`, `StepAction`.
//! - **Catalog**: validated, read-only lookup of tours by id.
//! - **Capabilities**: `Router` and `ElementLocator`.
//! - **Geometry**: pixel-space `Rect`, `Size`, `Point`.
//! - **Events**: host events (resize, scroll, keys, route changes).
//!
//! # How it fits in the system
//! `guide-runtime` drives the state machine over these types and
//! `guide-widgets` turns the current step into tooltip geometry.

pub mod catalog;
pub mod event;
pub mod geometry;
pub mod host;
pub mod tour;

pub use catalog::{Catalog, CatalogError};
pub use event::{HostEvent, TourKey};
pub use geometry::{Point, Rect, Size};
pub use host::{ElementLocator, MemoryRouter, Router};
pub use tour::{Placement, StepAction, TourConfig, TourStep, WHOLE_SCREEN_TARGET};
