//! Blocking priority queue with close, cancel-wait and filtering.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::{MessageFilter, MessagePriority};
use crate::error::{CoreError, CoreResult};

/// Result of a [`MessageQueue::pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum PopOutcome<M> {
    /// The next visible message.
    Message(M),
    /// [`MessageQueue::cancel_wait`] released the waiter.
    Interrupted,
    /// The timeout passed to `pop` elapsed with nothing visible.
    TimedOut,
    /// The queue is closed. Every later `pop` returns this too.
    Closed,
}

struct QueueState<M> {
    messages: VecDeque<M>,
    filter: Option<MessageFilter<M>>,
    closed: bool,
    /// Sticky: a cancel issued before anyone waits is still honored.
    interrupted: bool,
}

impl<M> QueueState<M> {
    fn first_visible(&self) -> Option<usize> {
        match &self.filter {
            None => (!self.messages.is_empty()).then_some(0),
            Some(filter) => self.messages.iter().position(|m| !filter.holds_back(m)),
        }
    }

    fn take_visible(&mut self) -> Option<M> {
        let index = self.first_visible()?;
        self.messages.remove(index)
    }
}

/// Inbound work queue of a render worker.
///
/// Many producers, one consumer. Producers never block.
pub struct MessageQueue<M> {
    state: Mutex<QueueState<M>>,
    /// Signaled on push, cancel, close and filter removal.
    changed: Condvar,
}

impl<M> MessageQueue<M> {
    /// Creates an open, unfiltered queue.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                messages: VecDeque::with_capacity(capacity),
                filter: None,
                closed: false,
                interrupted: false,
            }),
            changed: Condvar::new(),
        }
    }

    /// Queues a message.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::QueueClosed`] once [`Self::close`] has been called.
    pub fn push(&self, message: M, priority: MessagePriority) -> CoreResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CoreError::QueueClosed);
        }
        match priority {
            MessagePriority::Normal => state.messages.push_back(message),
            MessagePriority::High => state.messages.push_front(message),
        }
        self.changed.notify_one();
        Ok(())
    }

    /// Waits for the next visible message.
    ///
    /// With `timeout == None` this only returns on a message, a cancel or a
    /// close.
    pub fn pop(&self, timeout: Option<Duration>) -> PopOutcome<M> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return PopOutcome::Closed;
            }
            if state.interrupted {
                state.interrupted = false;
                return PopOutcome::Interrupted;
            }
            if let Some(message) = state.take_visible() {
                return PopOutcome::Message(message);
            }

            match deadline {
                None => self.changed.wait(&mut state),
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out() {
                        // One last look: the wakeup may have raced the deadline.
                        if state.closed {
                            return PopOutcome::Closed;
                        }
                        return state
                            .take_visible()
                            .map_or(PopOutcome::TimedOut, PopOutcome::Message);
                    }
                }
            }
        }
    }

    /// Takes the next visible message without waiting.
    pub fn try_pop(&self) -> Option<M> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.take_visible()
    }

    /// Releases a blocked [`Self::pop`] with [`PopOutcome::Interrupted`].
    ///
    /// If nobody is waiting, the next `pop` returns `Interrupted` at once.
    pub fn cancel_wait(&self) {
        let mut state = self.state.lock();
        state.interrupted = true;
        self.changed.notify_all();
    }

    /// Closes the queue. Pending messages are dropped and every waiter is
    /// released with [`PopOutcome::Closed`].
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.messages.clear();
        self.changed.notify_all();
    }

    /// Returns true once [`Self::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Installs `filter`, replacing any previous one.
    pub fn enable_filtering(&self, filter: MessageFilter<M>) {
        let mut state = self.state.lock();
        tracing::debug!(filter = filter.name(), "message filtering enabled");
        state.filter = Some(filter);
    }

    /// Removes the filter; held-back messages become visible in place.
    pub fn disable_filtering(&self) {
        let mut state = self.state.lock();
        if let Some(filter) = state.filter.take() {
            tracing::debug!(filter = filter.name(), "message filtering disabled");
            self.changed.notify_all();
        }
    }

    /// Returns true while a filter is installed.
    #[must_use]
    pub fn is_filtering(&self) -> bool {
        self.state.lock().filter.is_some()
    }

    /// Number of queued messages, held-back ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    /// Returns true if no message is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of messages the current filter holds back.
    #[must_use]
    pub fn held_back_count(&self) -> usize {
        let state = self.state.lock();
        state
            .filter
            .as_ref()
            .map_or(0, |f| state.messages.iter().filter(|m| f.holds_back(m)).count())
    }
}

impl<M> Default for MessageQueue<M> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<M> fmt::Debug for MessageQueue<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MessageQueue")
            .field("len", &state.messages.len())
            .field("filter", &state.filter)
            .field("closed", &state.closed)
            .finish()
    }
}
