//! Predicate gate installed on a [`super::MessageQueue`].

use std::fmt;

/// Holds back every message the predicate matches.
///
/// A filter never discards anything: matching messages stay in the queue,
/// in order, until the filter is removed.
pub struct MessageFilter<M> {
    name: &'static str,
    predicate: Box<dyn Fn(&M) -> bool + Send + Sync>,
}

impl<M> MessageFilter<M> {
    /// Creates a named filter. `predicate` returns `true` for messages that
    /// must be held back.
    pub fn new(name: &'static str, predicate: impl Fn(&M) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
        }
    }

    /// Returns true if `message` must stay in the queue.
    #[inline]
    #[must_use]
    pub fn holds_back(&self, message: &M) -> bool {
        (self.predicate)(message)
    }

    /// Name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<M> fmt::Debug for MessageFilter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFilter").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_is_applied() {
        let filter = MessageFilter::new("even", |n: &u32| n % 2 == 0);
        assert!(filter.holds_back(&4));
        assert!(!filter.holds_back(&5));
        assert_eq!(filter.name(), "even");
    }
}
