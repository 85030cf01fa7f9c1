#![forbid(unsafe_code)]

//! Headless dashboard host for the guided tour engine.
//!
//! Wires [`guide_runtime::TourMachine`] and [`guide_widgets::TourOverlay`]
//! to a fake DOM and an in-memory router, ships the dashboard tour catalog,
//! and exposes the pieces the `guide-demo` binary and its end-to-end tests
//! drive.

pub mod catalog;
pub mod cli;
pub mod error;
pub mod host;
pub mod session;

pub use error::DemoError;
pub use host::HeadlessDom;
pub use session::Session;
