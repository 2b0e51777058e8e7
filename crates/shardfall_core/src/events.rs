use std::collections::VecDeque;
use std::fmt;

/// Single-tick event queue. Producers push during a tick, the consumer drains
/// everything before the tick ends.
pub struct EventQueue<T> {
    events: VecDeque<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: T) {
        self.events.push_back(event);
    }

    pub fn try_pop(&mut self) -> Option<T> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, T> {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.events.iter()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.events.iter()).finish()
    }
}
