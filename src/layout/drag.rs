//! Bounce-back after a drag that ends on top of another node.
//!
//! The node is first shown at the impact position; once the settle delay has
//! elapsed it moves back to where the drag started. Time is read through
//! [`Clock`] so the sequence can be driven without real delays.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::model::Point;

pub trait Clock {
    /// Monotonic time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    SettlingAtImpact { impact: Point, settle_at: Duration },
    Resolved { position: Point },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragBounce {
    pub node_id: String,
    /// Top-left position the node had before the drag started.
    pub origin: Point,
    phase: DragPhase,
}

impl DragBounce {
    pub fn begin(
        node_id: impl Into<String>,
        impact: Point,
        origin: Point,
        now: Duration,
        delay: Duration,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            origin,
            phase: DragPhase::SettlingAtImpact {
                impact,
                settle_at: now + delay,
            },
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, DragPhase::Resolved { .. })
    }

    /// Where the node should be drawn right now.
    pub fn displayed_position(&self) -> Point {
        match self.phase {
            DragPhase::SettlingAtImpact { impact, .. } => impact,
            DragPhase::Resolved { position } => position,
        }
    }

    /// Completes the bounce once the delay has elapsed. `resolve` receives the
    /// origin and returns the position actually used, which lets the caller
    /// re-check the origin against the canvas as it is at settle time.
    pub fn poll(&mut self, now: Duration, resolve: impl FnOnce(Point) -> Point) -> Option<Point> {
        let DragPhase::SettlingAtImpact { settle_at, .. } = self.phase else {
            return None;
        };
        if now < settle_at {
            return None;
        }
        let position = resolve(self.origin);
        self.phase = DragPhase::Resolved { position };
        Some(position)
    }
}
