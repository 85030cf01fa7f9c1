#![forbid(unsafe_code)]

//! Scoped viewport subscriptions.
//!
//! A step anchored to a real element must follow that element through
//! resize and scroll. Instead of relying on cleanup-callback convention, the
//! subscription is an owned [`ViewportSubscription`] handle: while it lives,
//! the host forwards matching events; when it is dropped (step change, tour
//! end, overlay teardown) it unregisters itself.
//!
//! # How it works
//!
//! 1. The overlay calls [`ViewportListeners::subscribe`] when a step with a
//!    real target becomes current.
//! 2. The host asks [`ViewportListeners::wants`] before forwarding a
//!    resize/scroll event, so idle pages pay nothing.
//! 3. Dropping the handle removes its entry from the shared table.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use guide_core::event::HostEvent;

bitflags! {
    /// Viewport changes a subscription cares about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViewportInterest: u8 {
        const RESIZE = 0b01;
        const SCROLL = 0b10;
    }
}

impl ViewportInterest {
    /// Interest bit raised by `event`, or empty for non-viewport events.
    #[must_use]
    pub fn of(event: &HostEvent) -> Self {
        match event {
            HostEvent::Resize(_) => ViewportInterest::RESIZE,
            HostEvent::Scroll => ViewportInterest::SCROLL,
            _ => ViewportInterest::empty(),
        }
    }
}

/// A unique identifier for a subscription.
pub type SubId = u64;

#[derive(Debug, Default)]
struct ListenerTable {
    next_id: SubId,
    active: HashMap<SubId, ViewportInterest>,
}

/// Shared table of live viewport subscriptions.
///
/// Cheap to clone; clones refer to the same table. Single-threaded by
/// construction (`Rc`), matching the UI-thread execution model.
#[derive(Clone, Default)]
pub struct ViewportListeners {
    table: Rc<RefCell<ListenerTable>>,
}

impl ViewportListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest and return the owning handle.
    #[must_use = "dropping the handle unsubscribes immediately"]
    pub fn subscribe(&self, interest: ViewportInterest) -> ViewportSubscription {
        let mut table = self.table.borrow_mut();
        table.next_id += 1;
        let id = table.next_id;
        table.active.insert(id, interest);
        tracing::debug!(sub_id = id, ?interest, "viewport subscription started");
        ViewportSubscription {
            id,
            interest,
            table: Rc::downgrade(&self.table),
        }
    }

    /// True if any live subscription wants `event`.
    #[must_use]
    pub fn wants(&self, event: &HostEvent) -> bool {
        let raised = ViewportInterest::of(event);
        if raised.is_empty() {
            return false;
        }
        self.table
            .borrow()
            .active
            .values()
            .any(|interest| interest.intersects(raised))
    }

    /// Number of live subscriptions.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.table.borrow().active.len()
    }
}

impl fmt::Debug for ViewportListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportListeners")
            .field("active", &self.active_count())
            .finish()
    }
}

/// Owned registration; unsubscribes on drop.
#[derive(Debug)]
pub struct ViewportSubscription {
    id: SubId,
    interest: ViewportInterest,
    table: Weak<RefCell<ListenerTable>>,
}

impl ViewportSubscription {
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn interest(&self) -> ViewportInterest {
        self.interest
    }

    /// Whether this subscription should react to `event`.
    #[must_use]
    pub fn matches(&self, event: &HostEvent) -> bool {
        self.interest.intersects(ViewportInterest::of(event))
    }

    /// Unsubscribe explicitly. Equivalent to dropping the handle.
    pub fn release(self) {}
}

impl Drop for ViewportSubscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().active.remove(&self.id);
            tracing::debug!(sub_id = self.id, "viewport subscription stopped");
        }
    }
}
