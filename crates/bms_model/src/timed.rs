//! Simulated-time plumbing.
//!
//! Nothing in the model keeps a clock. Items that change over time implement
//! [`TimedItem`] and are ticked once per simulated minute by whoever owns them,
//! usually a [`Scheduler`].

use tracing::trace;

/// Something that progresses with simulated time
pub trait TimedItem {
    /// Progress this item by one simulated minute
    fn elapse_one_minute(&mut self);
}

/// Owns a set of timed items and ticks them together.
///
/// Items are ticked in registration order. Independent items must not rely on
/// that order.
pub struct Scheduler<T: TimedItem> {
    items: Vec<T>,
    minutes: u64,
}

impl<T: TimedItem> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimedItem> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            minutes: 0,
        }
    }

    /// Register an item, returning its handle
    pub fn register(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Advance every registered item by one minute
    pub fn tick(&mut self) {
        for item in &mut self.items {
            item.elapse_one_minute();
        }
        self.minutes += 1;
        trace!(minute = self.minutes, items = self.items.len(), "Scheduler tick");
    }

    /// Advance every registered item by `minutes` minutes
    pub fn run(&mut self, minutes: u64) {
        for _ in 0..minutes {
            self.tick();
        }
    }

    /// Total simulated minutes so far
    pub fn minutes_elapsed(&self) -> u64 {
        self.minutes
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.items.get_mut(handle)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

}
