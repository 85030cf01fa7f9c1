#![forbid(unsafe_code)]

//! Runtime: the tour state machine and the resources it owns.
//!
//! # Role in the guided tour engine
//! `guide-runtime` holds the only mutable state of the engine. It sequences
//! steps, keeps the router in sync with the current step, remembers which
//! tours a profile has completed, and hands out scoped viewport
//! subscriptions for the presentation layer.
//!
//! # Execution model
//! Single-threaded and host-driven. The host passes time in (`mount`,
//! `tick`) and calls transitions from UI events; nothing here spawns threads
//! or blocks.
//!
//! # Key components
//! - [`TourMachine`]: transitions, auto-start, presentation snapshot.
//! - [`CompletionStore`]: best-effort completion persistence over a
//!   [`StorageBackend`].
//! - [`ViewportListeners`] / [`ViewportSubscription`]: resize/scroll
//!   interest with drop-based release.
//! - [`SettleTimer`]: one-shot deadline used by auto-start.

pub mod state_persistence;
pub mod subscription;
pub mod timer;
pub mod tour;

#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    CompletionStore, MemoryStorage, StorageBackend, StorageError, StorageResult, StoredEntry,
};
pub use subscription::{SubId, ViewportInterest, ViewportListeners, ViewportSubscription};
pub use timer::SettleTimer;
pub use tour::{
    DEFAULT_SETTLE_DELAY_MS, MachineConfig, TourAdvanceReason, TourCommand, TourError, TourEvent,
    TourListing, TourMachine, TourState, TourView,
};
