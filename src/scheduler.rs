use std::time::{Duration, Instant};

/// Time source for the scheduler. Production code uses [`SystemClock`];
/// tests drive a fake.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// What kind of render the host should perform when a request fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPass {
    /// Settled redraw: every layer renders.
    Full,
    /// Interactive pass: layers with `render_on_animate: false` are skipped.
    Animation,
}

/// Coalesces redraw requests so a burst of invalidations (pan, zoom, resize,
/// data updates) produces a single full render once input goes quiet.
///
/// `request_redraw` arms a deadline `quiescence` in the future; further
/// requests push the deadline back (latest wins). `poll` reports when the
/// deadline has passed. `request_animation_frame` bypasses the window and
/// fires on the next poll, but never cancels a pending full render.
pub struct RedrawScheduler<C: Clock = SystemClock> {
    clock: C,
    quiescence: Duration,
    deadline: Option<Instant>,
    animation_pending: bool,
}

impl RedrawScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for RedrawScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RedrawScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            quiescence: Duration::from_millis(500),
            deadline: None,
            animation_pending: false,
        }
    }

    pub fn set_quiescence(&mut self, quiescence: Duration) {
        self.quiescence = quiescence;
    }

    /// Ask for a settled redraw. Repeated calls within the quiescence window
    /// collapse into one, timed from the latest call.
    pub fn request_redraw(&mut self) {
        self.deadline = Some(self.clock.now() + self.quiescence);
    }

    /// Ask for an immediate animation pass on the next poll.
    pub fn request_animation_frame(&mut self) {
        self.animation_pending = true;
    }

    /// Drop any pending request of either kind.
    pub fn cancel_pending(&mut self) {
        self.deadline = None;
        self.animation_pending = false;
    }

    /// Whether any request is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some() || self.animation_pending
    }

    /// Collapse a pending full redraw into firing right now, skipping the
    /// rest of its quiescence window. Returns whether one was pending.
    pub fn fire_now(&mut self) -> bool {
        if self.deadline.is_some() {
            self.deadline = Some(self.clock.now());
            true
        } else {
            false
        }
    }

    /// Check the clock and return the pass to render, if any is due. A due
    /// full redraw takes priority over a pending animation frame and clears
    /// it, since the full pass repaints everything anyway.
    pub fn poll(&mut self) -> Option<RenderPass> {
        if let Some(deadline) = self.deadline {
            if self.clock.now() >= deadline {
                self.deadline = None;
                self.animation_pending = false;
                return Some(RenderPass::Full);
            }
        }
        if self.animation_pending {
            self.animation_pending = false;
            return Some(RenderPass::Animation);
        }
        None
    }
}
